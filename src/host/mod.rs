use std::fmt::Debug;

pub mod memory;

pub use memory::{MemoryHost, NodeId};

/// Adapter over the element tree the engine writes styles into.
///
/// Elements are non-owning handles; the host decides what they point to and
/// keeps them alive for as long as rules reference them.
pub trait StyleHost: Send + 'static {
    type Element: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// All descendants of `root` matching a class-based object selector
    fn query_all(&self, root: &Self::Element, selector: &str) -> Vec<Self::Element>;

    fn set_style(&mut self, element: &Self::Element, property: &str, value: &str);

    fn remove_style(&mut self, element: &Self::Element, property: &str);
}

/// A named host element that rule selectors can address
#[derive(Debug, Clone, PartialEq)]
pub struct Layer<E> {
    pub id: String,
    pub element: E,
}

impl<E> Layer<E> {
    pub fn new(id: impl Into<String>, element: E) -> Self {
        Self {
            id: id.into(),
            element,
        }
    }
}
