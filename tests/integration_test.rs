use rand::seq::SliceRandom;
use stagehand::{
    styles, Animation, Config, CssValue, DefineError, EngineConfig, Layer, MemoryHost, NodeId,
    Rule, TimeUnit, Timeline, ValidationError,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn stage() -> (MemoryHost, NodeId, NodeId) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut host = MemoryHost::new();
    let layer = host.create_element("section");
    let child = host.append(layer, "div", &["c"]);
    (host, layer, child)
}

#[test]
fn test_forward_half_way_through_a_range() {
    let (host, layer, child) = stage();
    let mut timeline = Timeline::new(host, vec![Layer::new("L", layer)], EngineConfig::default());
    timeline
        .define(&[Rule::range(
            "L>>.c",
            [0.0, 4.0],
            styles([("opacity", "0")]),
            styles([("opacity", "1")]),
        )])
        .unwrap();

    timeline.forward(Some(2000.0));
    assert_eq!(timeline.host().style(child, "opacity"), Some("0.5"));
}

#[test]
fn test_duration_ignores_declaration_order() {
    let rules = vec![
        Rule::range("L", [0.0, 5.0], styles([("width", "0px")]), styles([("width", "10px")])),
        Rule::range("L", [3.0, 7.0], styles([("width", "10px")]), styles([("width", "20px")])),
        Rule::instant("L", 1.0, styles([("color", "#ff0000")])),
    ];

    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let mut shuffled = rules.clone();
        shuffled.shuffle(&mut rng);

        let (host, layer, _) = stage();
        let mut timeline =
            Timeline::new(host, vec![Layer::new("L", layer)], EngineConfig::default());
        timeline.define(&shuffled).unwrap();
        assert_eq!(timeline.duration(), 7000.0);
    }
}

#[test]
fn test_define_reports_missing_property() {
    let (host, layer, _) = stage();
    let animation = Animation::new(host, vec![Layer::new("L", layer)], EngineConfig::default());

    let err = animation
        .define(&[Rule::range(
            "L",
            [0.0, 1.0],
            styles([("a", "0"), ("b", "0")]),
            styles([("a", "1")]),
        )])
        .unwrap_err();

    match err {
        DefineError::Validation(ValidationError::PropertyMismatch { property, .. }) => {
            assert_eq!(property, "b")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!animation.is_defined());
}

#[test]
fn test_mixed_units_in_transform_stay_static() {
    assert_eq!(
        CssValue::parse("translate(42, 1337px)"),
        CssValue::Static("translate(42, 1337px)".to_string())
    );
}

#[test]
fn test_color_blends_per_channel() {
    let black = CssValue::parse("#000000");
    let white = CssValue::parse("#ffffff");
    assert_eq!(black.interpolate(&white, 0.5).to_css_string(), "#808080");
}

#[test]
fn test_transform_blends_every_argument() {
    let (host, layer, _) = stage();
    let mut timeline = Timeline::new(host, vec![Layer::new("L", layer)], EngineConfig::default());
    timeline
        .define(&[Rule::range(
            "L",
            [0.0, 1.0],
            styles([("transform", "translate(0px, 0px) rotate(0deg)")]),
            styles([("transform", "translate(100px, 50px) rotate(90deg)")]),
        )])
        .unwrap();

    timeline.seek(0.5);
    assert_eq!(
        timeline.host().style(layer, "transform"),
        Some("translate(50px,25px) rotate(45deg)")
    );
}

fn scrub(progress: &[f64]) -> (MemoryHost, NodeId, NodeId) {
    let rules = [
        Rule::range("L>>.c", [0.0, 2.0], styles([("width", "0px")]), styles([("width", "1024px")])),
        Rule::range("L", [2.0, 4.0], styles([("left", "0px")]), styles([("left", "64px")])),
        Rule::instant("L", 3.0, styles([("visibility", "hidden")])),
    ];

    let (host, layer, child) = stage();
    let mut timeline = Timeline::new(host, vec![Layer::new("L", layer)], EngineConfig::default());
    timeline.define(&rules).unwrap();
    for p in progress {
        timeline.seek(*p);
    }

    let mut host = MemoryHost::new();
    std::mem::swap(&mut host, timeline.host_mut());
    (host, layer, child)
}

#[test]
fn test_seek_is_order_independent() {
    for (path, target) in [
        (vec![0.75, 0.25, 0.375], 0.375),
        (vec![0.75, 0.25, 0.625], 0.625),
        (vec![1.0, 0.0, 0.625], 0.625),
    ] {
        let (scrubbed, layer, child) = scrub(&path);
        let (direct, _, _) = scrub(&[target]);
        assert_eq!(scrubbed.styles(layer), direct.styles(layer), "path {path:?}");
        assert_eq!(scrubbed.styles(child), direct.styles(child), "path {path:?}");
    }

    let (host, layer, child) = scrub(&[0.75, 0.25, 0.625]);
    assert_eq!(host.style(child, "width"), Some("1024px"));
    assert_eq!(host.style(layer, "left"), Some("16px"));
    assert_eq!(host.style(layer, "visibility"), None);
}

#[test]
fn test_reset_leaves_no_animated_styles() {
    let (host, layer, child) = stage();
    let animation = Animation::new(host, vec![Layer::new("L", layer)], EngineConfig::default());
    animation
        .define(&[
            Rule::range("L>>.c", [0.0, 1.0], styles([("opacity", "0")]), styles([("opacity", "1")])),
            Rule::instant("L", 0.5, styles([("color", "#123456")])),
        ])
        .unwrap();

    animation.seek(1.0);
    assert!(animation.is_completed());
    assert_eq!(animation.with_host(|h| h.style(child, "opacity").map(str::to_string)), Some("1".to_string()));

    animation.reset();
    assert_eq!(animation.current_time(), 0.0);
    assert!(!animation.is_completed());
    assert!(animation.with_host(|h| h.styles(layer).is_empty() && h.styles(child).is_empty()));
}

#[test]
fn test_rules_from_json() {
    let rules: Vec<Rule> = serde_json::from_str(
        r#"[
            {"selector": "L>>.c", "timespan": [0, 2], "from": {"opacity": "0"}, "to": {"opacity": "1"}},
            {"selector": "L", "at": 1, "styles": {"display": "block"}}
        ]"#,
    )
    .unwrap();

    let (host, layer, child) = stage();
    let animation = Animation::new(host, vec![Layer::new("L", layer)], EngineConfig::default());
    animation.define(&rules).unwrap();
    assert_eq!(animation.duration(), 2000.0);

    animation.forward(Some(1500.0));
    animation.with_host(|h| {
        assert_eq!(h.style(child, "opacity"), Some("0.75"));
        assert_eq!(h.style(layer, "display"), Some("block"));
    });
}

#[test]
fn test_from_config_in_milliseconds() {
    let config = Config::from_toml_str(
        r#"
[engine]
time_unit = "milliseconds"
timestep_ms = 25

[[rules]]
selector = "L>>.c"
timespan = [0, 200]
from = { width = "0px" }
to = { width = "200px" }
"#,
    )
    .unwrap();
    assert_eq!(config.engine.time_unit, TimeUnit::Milliseconds);

    let (host, layer, child) = stage();
    let animation = Animation::from_config(host, vec![Layer::new("L", layer)], &config).unwrap();
    assert_eq!(animation.duration(), 200.0);

    animation.forward(None);
    assert_eq!(animation.current_time(), 25.0);
    assert_eq!(
        animation.with_host(|h| h.style(child, "width").map(str::to_string)),
        Some("25px".to_string())
    );
}

#[tokio::test]
async fn test_load_from_file() {
    let config_content = r#"
[[rules]]
selector = "L"
timespan = [1, 2]
from = { opacity = "0" }
to = { opacity = "1" }
"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(config_content.as_bytes())
        .expect("Failed to write to temp file");
    let temp_path = temp_file.path().to_str().unwrap();

    let (host, layer, _) = stage();
    let animation = Animation::load(temp_path, host, vec![Layer::new("L", layer)])
        .await
        .expect("Failed to load animation");

    assert!(animation.is_defined());
    assert_eq!(animation.duration(), 2000.0);
}

#[tokio::test]
async fn test_load_json_by_extension() {
    let mut temp_file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    temp_file
        .write_all(br#"{"rules": [{"selector": "L>>.c", "timespan": [0, 3], "from": {"opacity": "0"}, "to": {"opacity": "1"}}]}"#)
        .expect("Failed to write to temp file");
    let temp_path = temp_file.path().to_str().unwrap();

    let (host, layer, _) = stage();
    let animation = Animation::load(temp_path, host, vec![Layer::new("L", layer)])
        .await
        .expect("Failed to load animation");
    assert_eq!(animation.duration(), 3000.0);
}

#[tokio::test]
async fn test_load_rejects_unresolvable_selector() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(b"[[rules]]\nselector = \"nowhere\"\nat = 0\nstyles = { opacity = \"1\" }\n")
        .expect("Failed to write to temp file");
    let temp_path = temp_file.path().to_str().unwrap();

    let (host, layer, _) = stage();
    let result = Animation::load(temp_path, host, vec![Layer::new("L", layer)]).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_play_runs_to_completion() {
    let (host, layer, child) = stage();
    let animation = Animation::new(host, vec![Layer::new("L", layer)], EngineConfig::default());
    animation
        .define(&[Rule::range(
            "L>>.c",
            [0.0, 0.5],
            styles([("opacity", "0")]),
            styles([("opacity", "1")]),
        )])
        .unwrap();

    animation.play();
    assert!(animation.is_playing());

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    assert!(animation.is_completed());
    assert!(!animation.is_playing());
    assert_eq!(animation.current_time(), 500.0);
    assert_eq!(
        animation.with_host(|h| h.style(child, "opacity").map(str::to_string)),
        Some("1".to_string())
    );
}
