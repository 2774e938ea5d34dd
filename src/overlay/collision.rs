use std::collections::HashSet;
use std::hash::Hash;

use crate::page::geometry::Rect;

/// Slack added around every badge before testing for overlap.
pub const OVERLAP_BUFFER_PX: f64 = 5.0;

/// Pick the badges to drop so that no two remaining badges overlap.
///
/// Every unordered pair is compared once, in input order. When a pair
/// overlaps and neither side is already suppressed, the lower badge (greater
/// `top`) is suppressed; on equal tops the later entry loses. This is a
/// greedy local pass and makes no attempt to keep the largest possible set.
pub fn resolve<K>(boxes: &[(K, Rect)]) -> HashSet<K>
where
    K: Copy + Eq + Hash,
{
    let mut suppressed = HashSet::new();

    for (i, (key_a, rect_a)) in boxes.iter().enumerate() {
        if suppressed.contains(key_a) {
            continue;
        }

        for (key_b, rect_b) in &boxes[i + 1..] {
            if suppressed.contains(key_b) {
                continue;
            }

            if rect_a.overlaps(rect_b, OVERLAP_BUFFER_PX) {
                let lower = if rect_a.top > rect_b.top { *key_a } else { *key_b };
                suppressed.insert(lower);

                if lower == *key_a {
                    break;
                }
            }
        }
    }

    suppressed
}
