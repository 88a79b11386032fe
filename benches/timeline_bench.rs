use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stagehand::{styles, CssValue, EngineConfig, Layer, MemoryHost, Rule, Timeline};

// Performance benchmarks for value parsing and frame resolution
fn bench_value_parsing(c: &mut Criterion) {
    c.bench_function("parse_numeric", |b| {
        b.iter(|| CssValue::parse(black_box("10px 20px 0 -4.5em")))
    });

    c.bench_function("parse_transform", |b| {
        b.iter(|| CssValue::parse(black_box("translate(10px, 20px) rotate(45deg) scale(1.5)")))
    });

    c.bench_function("parse_color", |b| b.iter(|| CssValue::parse(black_box("#1e90ff"))));
}

fn bench_interpolation(c: &mut Criterion) {
    let from = CssValue::parse("translate(0px, 0px) rotate(0deg) scale(1)");
    let to = CssValue::parse("translate(120px, 80px) rotate(180deg) scale(2)");
    c.bench_function("interpolate_transform", |b| {
        b.iter(|| black_box(&from).interpolate(black_box(&to), black_box(0.37)))
    });

    let black = CssValue::parse("#000000");
    let white = CssValue::parse("#ffffff");
    c.bench_function("interpolate_color", |b| {
        b.iter(|| black_box(&black).interpolate(black_box(&white), black_box(0.5)))
    });
}

fn build_timeline(items: usize) -> Timeline<MemoryHost> {
    let mut host = MemoryHost::new();
    let layer = host.create_element("section");
    for i in 0..items {
        host.append(layer, "div", &["item", if i % 2 == 0 { "even" } else { "odd" }]);
    }

    let rules = vec![
        Rule::range(
            "stage>>.item",
            [0.0, 4.0],
            styles([("opacity", "0"), ("transform", "translateY(20px)")]),
            styles([("opacity", "1"), ("transform", "translateY(0px)")]),
        ),
        Rule::range(
            "stage>>.even",
            [1.0, 3.0],
            styles([("background", "#000000")]),
            styles([("background", "#ffffff")]),
        ),
        Rule::instant("stage", 2.0, styles([("visibility", "visible")])),
    ];

    let mut timeline = Timeline::new(host, vec![Layer::new("stage", layer)], EngineConfig::default());
    timeline.define(&rules).expect("benchmark rules are valid");
    timeline
}

fn bench_timeline(c: &mut Criterion) {
    let mut timeline = build_timeline(100);
    let mut progress = 0.0;
    c.bench_function("seek_100_elements", |b| {
        b.iter(|| {
            progress = (progress + 0.137) % 1.0;
            timeline.seek(black_box(progress));
        })
    });

    c.bench_function("play_through_100_elements", |b| {
        b.iter_batched(
            || build_timeline(100),
            |mut timeline| while timeline.tick(black_box(16.0)) {},
            criterion::BatchSize::LargeInput,
        )
    });

    c.bench_function("define_rules", |b| b.iter(|| build_timeline(black_box(20))));
}

criterion_group!(benches, bench_value_parsing, bench_interpolation, bench_timeline);
criterion_main!(benches);
