// Demo record generators

use crate::domain::{ChangeRecord, NodeChange, PSetChange};
use crate::error::Result;
use serde_json::json;

pub const DEFAULT_NODE_COUNT: usize = 25;
pub const DEFAULT_LINKS_PER_NODE: usize = 5;
pub const DEFAULT_PSET_COUNT: usize = 25;

/// Organizer nodes `ChangeSetNode_{i}`, each with `links_per_node` links
pub fn demo_nodes(count: usize, links_per_node: usize) -> Result<Vec<ChangeRecord>> {
    (0..count)
        .map(|i| {
            let links = (0..links_per_node)
                .map(|j| format!("frn:DemoLink-{}-{}", i, j))
                .collect();
            let node = NodeChange {
                id: Some(format!("ChangeSetNode_{}", i)),
                name: Some(format!("Change set node {}", i)),
                links: Some(links),
            };
            Ok(ChangeRecord::from_change(&node)?)
        })
        .collect()
}

/// Property sets for `frn:DemoLink-{i}` under one library definition
pub fn demo_psets(
    library_id: &str,
    definition_id: &str,
    count: usize,
) -> Result<Vec<ChangeRecord>> {
    (0..count)
        .map(|i| {
            let props = json!({
                "str": format!("DemoStringValue-{}", i),
                "num": i,
            });
            let pset = PSetChange {
                library_id: library_id.to_string(),
                definition_id: definition_id.to_string(),
                link: format!("frn:DemoLink-{}", i),
                props: props.as_object().cloned().unwrap_or_default(),
            };
            Ok(ChangeRecord::from_change(&pset)?)
        })
        .collect()
}
