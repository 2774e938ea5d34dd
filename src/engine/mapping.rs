use std::collections::{BTreeMap, HashMap, HashSet};

use crate::overlay::renderer::PlacedOverlay;
use crate::page::page_model::ElementId;

/// Element -> overlay and label -> element, kept in lockstep.
///
/// Every mutation goes through this type so that the two views can never
/// disagree: an element has an overlay iff its label maps back to it.
#[derive(Debug, Default)]
pub struct LabelMap {
    by_element: HashMap<ElementId, PlacedOverlay>,
    by_label: BTreeMap<String, ElementId>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Record a placed overlay. Returns the overlay it displaced, if the
    /// element already had one.
    ///
    /// The caller guarantees the label is not held by another element.
    pub fn insert(&mut self, element: ElementId, overlay: PlacedOverlay) -> Option<PlacedOverlay> {
        debug_assert!(
            self.by_label.get(&overlay.label).is_none_or(|owner| *owner == element),
            "label {} already mapped",
            overlay.label
        );
        let previous = self.remove(element);
        self.by_label.insert(overlay.label.clone(), element);
        self.by_element.insert(element, overlay);
        previous
    }

    pub fn remove(&mut self, element: ElementId) -> Option<PlacedOverlay> {
        let overlay = self.by_element.remove(&element)?;
        self.by_label.remove(&overlay.label);
        Some(overlay)
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.by_element.contains_key(&element)
    }

    pub fn get(&self, element: ElementId) -> Option<&PlacedOverlay> {
        self.by_element.get(&element)
    }

    pub fn get_mut(&mut self, element: ElementId) -> Option<&mut PlacedOverlay> {
        self.by_element.get_mut(&element)
    }

    pub fn label_of(&self, element: ElementId) -> Option<&str> {
        self.by_element.get(&element).map(|o| o.label.as_str())
    }

    pub fn element_for(&self, label: &str) -> Option<ElementId> {
        self.by_label.get(label).copied()
    }

    /// Labels starting with `prefix`, in label order.
    pub fn with_prefix(&self, prefix: &str) -> Vec<(String, ElementId)> {
        self.by_label
            .range(prefix.to_string()..)
            .take_while(|(label, _)| label.starts_with(prefix))
            .map(|(label, element)| (label.clone(), *element))
            .collect()
    }

    /// Mapped elements, in label order.
    pub fn elements(&self) -> Vec<ElementId> {
        self.by_label.values().copied().collect()
    }

    /// `(label, element)` pairs in label order.
    pub fn labels(&self) -> Vec<(String, ElementId)> {
        self.by_label
            .iter()
            .map(|(label, element)| (label.clone(), *element))
            .collect()
    }

    /// Remove every element not in `live`, returning their overlays.
    pub fn retain_live(&mut self, live: &HashSet<ElementId>) -> Vec<PlacedOverlay> {
        let stale: Vec<ElementId> = self
            .by_element
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        stale.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Empty both views, returning the overlays that were mapped.
    pub fn drain(&mut self) -> Vec<PlacedOverlay> {
        self.by_label.clear();
        self.by_element.drain().map(|(_, overlay)| overlay).collect()
    }
}
