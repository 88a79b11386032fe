use std::collections::HashMap;
use tracing::debug;

use crate::animation::rules::{ParsedRule, ParsedStyles, Selector};
use crate::error::ResolutionError;
use crate::host::StyleHost;

/// Resolved selector -> element handles for the current rule set
#[derive(Debug)]
pub struct ObjectRegistry<E> {
    objects: HashMap<String, Vec<E>>,
}

impl<E: Clone> ObjectRegistry<E> {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }

    /// Resolve the selector of every rule against the registered layers
    pub fn resolve<H>(
        host: &H,
        layers: &HashMap<String, E>,
        rules: &[ParsedRule],
    ) -> Result<Self, ResolutionError>
    where
        H: StyleHost<Element = E>,
    {
        let mut objects = HashMap::new();

        for rule in rules {
            let raw = rule.selector();
            if objects.contains_key(raw) {
                continue;
            }

            let selector = Selector::parse(raw)?;
            let layer = layers
                .get(&selector.layer)
                .ok_or_else(|| ResolutionError::UnknownLayer {
                    selector: raw.to_string(),
                    layer: selector.layer.clone(),
                })?;

            let elements = match &selector.object {
                Some(object) => host.query_all(layer, object),
                None => vec![layer.clone()],
            };
            if elements.is_empty() {
                return Err(ResolutionError::NoMatch {
                    selector: raw.to_string(),
                });
            }

            debug!("🎯 Selector '{}' resolved to {} element(s)", raw, elements.len());
            objects.insert(raw.to_string(), elements);
        }

        Ok(Self { objects })
    }

    pub fn get(&self, selector: &str) -> Option<&[E]> {
        self.objects.get(selector).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<E: Clone> Default for ObjectRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Styles the engine has written to the elements of one selector.
///
/// The elements are kept alongside so the styles can still be removed after
/// the registry has been rebuilt by another `define`.
#[derive(Debug, Clone)]
pub struct ActiveStyles<E> {
    pub elements: Vec<E>,
    pub styles: ParsedStyles,
}

/// Exactly the styles currently applied by the engine, per selector
pub type StyleCache<E> = HashMap<String, ActiveStyles<E>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::rules::{styles, Rule};
    use crate::config::TimeUnit;
    use crate::host::{MemoryHost, NodeId};

    fn parsed(selector: &str) -> ParsedRule {
        Rule::instant(selector, 0.0, styles([("opacity", "1")]))
            .to_parsed(TimeUnit::Seconds)
            .unwrap()
    }

    fn setup() -> (MemoryHost, HashMap<String, NodeId>, NodeId, NodeId) {
        let mut host = MemoryHost::new();
        let layer = host.create_element("div");
        let item = host.append(layer, "span", &["item"]);
        let layers = HashMap::from([("L".to_string(), layer)]);
        (host, layers, layer, item)
    }

    #[test]
    fn test_resolve_layer_and_object() {
        let (host, layers, layer, item) = setup();
        let registry =
            ObjectRegistry::resolve(&host, &layers, &[parsed("L"), parsed("L >> .item"), parsed("L")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("L"), Some(&[layer][..]));
        assert_eq!(registry.get("L >> .item"), Some(&[item][..]));
    }

    #[test]
    fn test_unknown_layer_names_selector() {
        let (host, layers, _, _) = setup();
        let err = ObjectRegistry::resolve(&host, &layers, &[parsed("X>>.item")]).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnknownLayer {
                selector: "X>>.item".into(),
                layer: "X".into()
            }
        );
    }

    #[test]
    fn test_missing_object_names_selector() {
        let (host, layers, _, _) = setup();
        let err = ObjectRegistry::resolve(&host, &layers, &[parsed("L>>.nope")]).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::NoMatch {
                selector: "L>>.nope".into()
            }
        );
    }
}
