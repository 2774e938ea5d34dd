use std::collections::HashSet;

use crate::page::host::PageHost;
use crate::page::page_model::{ElementId, ElementInfo};

/// Collect every clickable element in the document.
///
/// Anchors, form controls, and inline `cursor: pointer` elements come first,
/// in document order, followed by elements that are clickable only through
/// their computed or hover cursor. Each element appears once. Label slots are
/// assigned in this order, so it must stay stable for an unchanged page.
pub fn scan(host: &dyn PageHost) -> Vec<ElementId> {
    scan_described(host).into_iter().map(|(id, _)| id).collect()
}

/// [`scan`], keeping what the host reported about each candidate.
pub fn scan_described(host: &dyn PageHost) -> Vec<(ElementId, ElementInfo)> {
    let described: Vec<(ElementId, ElementInfo)> = host
        .document_elements()
        .into_iter()
        .filter_map(|id| host.describe(id).map(|info| (id, info)))
        .collect();

    let mut seen = HashSet::with_capacity(described.len());
    let mut candidates = Vec::new();

    for (id, info) in &described {
        if (info.is_link_or_control() || info.inline_pointer) && seen.insert(*id) {
            candidates.push((*id, info.clone()));
        }
    }

    for (id, info) in described {
        if info.has_pointer_cursor() && seen.insert(id) {
            candidates.push((id, info));
        }
    }

    candidates
}
