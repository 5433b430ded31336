// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Entity model: markers, links, regions and the serialized project document.

use std::collections::HashSet;

pub mod link;
pub mod marker;
pub mod project;
pub mod region;

/// Outcome of feeding a pointer event to a placement tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Input accepted; the tool is waiting for more.
    Pending,
    /// An entity with this id was created.
    Created(String),
    /// Input ignored; nothing was created.
    Rejected(Rejection),
}

/// Why a placement was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutOfBounds,
    NoImage,
    ZeroLength,
    TooFewPoints,
    TooSmall,
    NotPlacing,
}

/// Build a fresh entity id such as `camera-3f2a...`.
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Keep the first entity for each id; later duplicates are dropped.
pub(crate) fn retain_unique_ids<T>(items: &mut Vec<T>, id: impl Fn(&T) -> &str, what: &str) {
    let mut seen = HashSet::new();
    items.retain(|item| {
        let key = id(item);
        let fresh = seen.insert(key.to_string());
        if !fresh {
            log::warn!("Dropping {} with duplicate id {}", what, key);
        }
        fresh
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_unique_ids_keeps_first() {
        let mut items = vec![("a", 1), ("b", 2), ("a", 3)];
        retain_unique_ids(&mut items, |item| item.0, "item");
        assert_eq!(items, vec![("a", 1), ("b", 2)]);
    }
}
