use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::rules::{ParsedRule, ParsedStyles, Rule};
use crate::config::EngineConfig;
use crate::core::registry::{ActiveStyles, ObjectRegistry, StyleCache};
use crate::error::DefineError;
use crate::host::{Layer, StyleHost};

/// Synchronous timeline core.
///
/// Owns the parsed rules, the object registry and the cache of applied
/// styles, and resolves any instant into style writes on the host. Playback
/// scheduling lives in [`crate::animation::Animation`].
pub struct Timeline<H: StyleHost> {
    host: H,
    layers: HashMap<String, H::Element>,
    config: EngineConfig,
    rules: Vec<ParsedRule>,
    registry: ObjectRegistry<H::Element>,
    active: StyleCache<H::Element>,
    current_time: f64,
    duration: f64,
    completed: bool,
}

impl<H: StyleHost> Timeline<H> {
    /// Create a timeline over `layers`; a duplicate id keeps the last element.
    ///
    /// A timestep that is not a positive finite number is replaced by the
    /// default one.
    pub fn new(
        host: H,
        layers: impl IntoIterator<Item = Layer<H::Element>>,
        config: EngineConfig,
    ) -> Self {
        let config = if config.has_valid_timestep() {
            config
        } else {
            warn!(
                "⚠️  Invalid timestep {}ms, falling back to {}ms",
                config.timestep_ms,
                EngineConfig::default().timestep_ms
            );
            EngineConfig {
                timestep_ms: EngineConfig::default().timestep_ms,
                ..config
            }
        };
        let layers: HashMap<String, H::Element> = layers
            .into_iter()
            .map(|layer| (layer.id, layer.element))
            .collect();
        debug!("🧱 Timeline created with {} layers", layers.len());

        Self {
            host,
            layers,
            config,
            rules: Vec::new(),
            registry: ObjectRegistry::new(),
            active: StyleCache::new(),
            current_time: 0.0,
            duration: 0.0,
            completed: false,
        }
    }

    /// Replace the rule set.
    ///
    /// Nothing is installed unless every rule validates and resolves. Styles
    /// applied under the previous rule set stay until the next frame update
    /// or `reset`.
    pub fn define(&mut self, rules: &[Rule]) -> Result<(), DefineError> {
        let mut parsed = rules
            .iter()
            .map(|rule| rule.to_parsed(self.config.time_unit))
            .collect::<Result<Vec<_>, _>>()?;
        let registry = ObjectRegistry::resolve(&self.host, &self.layers, &parsed)?;

        parsed.sort_by(|a, b| a.end().total_cmp(&b.end()));
        let duration = parsed.iter().map(ParsedRule::end).fold(0.0, f64::max);

        info!(
            "🎬 Defined {} rules over {} selectors, duration {}ms",
            parsed.len(),
            registry.len(),
            duration
        );
        self.rules = parsed;
        self.registry = registry;
        self.duration = duration;
        Ok(())
    }

    pub fn is_defined(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Advance by `step` ms (default: configured timestep), clamped to the duration
    pub fn forward(&mut self, step: Option<f64>) {
        if !self.is_defined() {
            warn!("⚠️  forward() called before any rules were defined");
            return;
        }
        let step = step.unwrap_or(self.config.timestep_ms);
        if step.is_nan() || step < 0.0 {
            warn!("⚠️  Ignoring invalid forward step {}", step);
            return;
        }

        let candidate = self.current_time + step;
        if candidate >= self.duration {
            self.update_frame(self.duration);
            self.completed = true;
        } else {
            self.update_frame(candidate);
        }
    }

    /// Step back by `step` ms; ignored when it would cross time zero
    pub fn back(&mut self, step: Option<f64>) {
        if !self.is_defined() {
            warn!("⚠️  back() called before any rules were defined");
            return;
        }
        let step = step.unwrap_or(self.config.timestep_ms);
        if step.is_nan() || step < 0.0 {
            warn!("⚠️  Ignoring invalid back step {}", step);
            return;
        }

        let candidate = self.current_time - step;
        if candidate >= 0.0 {
            self.update_frame(candidate);
            self.completed = false;
        }
    }

    /// Jump to `progress` of the duration, clamped to [0, 1]
    pub fn seek(&mut self, progress: f64) {
        if !self.is_defined() {
            warn!("⚠️  seek() called before any rules were defined");
            return;
        }
        if progress.is_nan() {
            warn!("⚠️  Ignoring NaN seek progress");
            return;
        }

        let progress = progress.clamp(0.0, 1.0);
        let time = (progress * self.duration).round();
        self.update_frame(time);
        self.completed = progress == 1.0;
    }

    /// One fixed step of the play loop. Returns false once the end is reached.
    pub fn tick(&mut self, step: f64) -> bool {
        let next = self.current_time + step;
        if next >= self.duration {
            self.update_frame(self.duration);
            self.completed = true;
            info!("✅ Timeline completed at {}ms", self.duration);
            false
        } else {
            self.update_frame(next);
            true
        }
    }

    /// Remove every applied style and rewind to time zero
    pub fn reset(&mut self) {
        for (selector, active) in self.active.drain() {
            for property in active.styles.keys() {
                for element in &active.elements {
                    self.host.remove_style(element, property);
                }
            }
            debug!("🧹 Cleared {} styles from '{}'", active.styles.len(), selector);
        }
        self.current_time = 0.0;
        self.completed = false;
    }

    /// Reset and forget the rule set
    pub fn clear(&mut self) {
        self.reset();
        self.rules.clear();
        self.registry = ObjectRegistry::new();
        self.duration = 0.0;
    }

    /// Render the state at `time` and make it the current time
    pub fn update_frame(&mut self, time: f64) {
        let state = self.styles_at(time);
        self.apply(state);
        self.current_time = time;
    }

    /// Authoritative styles at `time`, moving from the current time
    fn styles_at(&self, time: f64) -> HashMap<String, ParsedStyles> {
        let previous = self.current_time;
        let mut state: HashMap<String, ParsedStyles> = HashMap::new();

        // rules are sorted by end time, so later ends win
        for rule in self.rules.iter().filter(|rule| rule.is_completed(time)) {
            let styles = state.entry(rule.selector().to_string()).or_default();
            for (property, value) in rule.end_styles() {
                styles.insert(property.clone(), value.clone());
            }
        }

        for rule in self.rules.iter().filter(|rule| rule.is_in_progress(time)) {
            let ParsedRule::Range {
                selector,
                start,
                end,
                from,
                to,
            } = rule
            else {
                continue;
            };

            // rates are taken relative to the part of the rule not yet covered
            let (target, rate) = if time >= previous {
                let relative = previous.max(*start);
                (to, blend_rate(time - relative, end - relative))
            } else {
                let relative = previous.min(*end);
                (from, blend_rate(relative - time, relative - start))
            };

            let applied = self.active.get(selector).map(|active| &active.styles);
            let styles = state.entry(selector.clone()).or_default();
            for (property, target_value) in target {
                let baseline = applied
                    .and_then(|applied| applied.get(property))
                    .or_else(|| from.get(property))
                    .unwrap_or(target_value);
                styles.insert(property.clone(), baseline.interpolate(target_value, rate));
            }
        }

        state
    }

    /// Diff `state` against the cache and write the difference to the host.
    ///
    /// Selectors are applied in the order they first appear in the sorted
    /// rules, so when two selectors share an element the later one wins. A
    /// value equal to the cached one is skipped only if no other selector
    /// removed or wrote that element's property during this frame.
    fn apply(&mut self, mut state: HashMap<String, ParsedStyles>) {
        let mut touched: Vec<(H::Element, String)> = Vec::new();

        for (selector, active) in self.active.iter_mut() {
            let next = state.get(selector);
            let stale: Vec<String> = active
                .styles
                .keys()
                .filter(|property| next.map_or(true, |next| !next.contains_key(*property)))
                .cloned()
                .collect();

            for property in stale {
                for element in &active.elements {
                    self.host.remove_style(element, &property);
                    touched.push((element.clone(), property.clone()));
                }
                active.styles.remove(&property);
            }
        }
        self.active.retain(|_, active| !active.styles.is_empty());

        for selector in self.selector_order() {
            let Some(styles) = state.remove(&selector) else {
                continue;
            };
            let Some(elements) = self.registry.get(&selector) else {
                continue;
            };
            let active = self
                .active
                .entry(selector)
                .or_insert_with(|| ActiveStyles {
                    elements: elements.to_vec(),
                    styles: ParsedStyles::new(),
                });

            // the selector now resolves elsewhere after a redefine
            if active.elements.as_slice() != elements {
                for property in active.styles.keys() {
                    for element in &active.elements {
                        self.host.remove_style(element, property);
                        touched.push((element.clone(), property.clone()));
                    }
                }
                active.styles.clear();
                active.elements = elements.to_vec();
            }

            for (property, value) in styles {
                let shared = active.elements.iter().any(|element| {
                    touched
                        .iter()
                        .any(|(other, name)| other == element && *name == property)
                });
                if !shared && active.styles.get(&property) == Some(&value) {
                    continue;
                }

                let css = value.to_css_string();
                for element in &active.elements {
                    self.host.set_style(element, &property, &css);
                    touched.push((element.clone(), property.clone()));
                }
                active.styles.insert(property, value);
            }
        }
    }

    /// Distinct selectors in the order they first appear in the rules
    fn selector_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for rule in &self.rules {
            if !order.iter().any(|selector| selector == rule.selector()) {
                order.push(rule.selector().to_string());
            }
        }
        order
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rules sorted by end time
    pub fn rules(&self) -> &[ParsedRule] {
        &self.rules
    }

    /// Styles the engine currently has applied for `selector`
    pub fn active_styles(&self, selector: &str) -> Option<&ParsedStyles> {
        self.active.get(selector).map(|active| &active.styles)
    }

    pub fn has_active_styles(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

fn blend_rate(elapsed: f64, span: f64) -> f64 {
    if span <= 0.0 {
        1.0
    } else {
        (elapsed / span).clamp(0.0, 1.0)
    }
}
