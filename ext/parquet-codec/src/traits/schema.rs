use crate::{Schema, SchemaNode};

/// Trait for schema introspection
///
/// This trait provides methods for examining and querying schemas
/// without modifying them. Unlike [`Schema::columns`], it also sees groups.
pub trait SchemaInspector {
    /// Get the total number of nodes (including the root and groups)
    fn field_count(&self) -> usize;

    /// Get a node below the root by dotted path (e.g., "address.city")
    fn get_field_by_path(&self, path: &str) -> Option<&SchemaNode>;

    /// Check if schema contains a node at `path`
    fn has_field(&self, path: &str) -> bool;

    /// Get all node paths in the schema, groups before their children
    fn all_field_paths(&self) -> Vec<String>;
}

impl SchemaInspector for Schema {
    fn field_count(&self) -> usize {
        let mut count = 1;
        let mut pending: Vec<&SchemaNode> = self.root().children().iter().collect();
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children());
        }
        count
    }

    fn get_field_by_path(&self, path: &str) -> Option<&SchemaNode> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut node = find_child(self.root().children(), first)?;
        for part in parts {
            node = find_child(node.children(), part)?;
        }
        Some(node)
    }

    fn has_field(&self, path: &str) -> bool {
        self.get_field_by_path(path).is_some()
    }

    fn all_field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        // (node, index of the parent's path in `paths`)
        let mut pending: Vec<(&SchemaNode, Option<usize>)> = self
            .root()
            .children()
            .iter()
            .rev()
            .map(|c| (c, None))
            .collect();
        while let Some((node, parent)) = pending.pop() {
            let current_path = match parent {
                None => node.name().to_string(),
                Some(idx) => format!("{}.{}", paths[idx], node.name()),
            };
            paths.push(current_path);

            let idx = paths.len() - 1;
            pending.extend(node.children().iter().rev().map(|c| (c, Some(idx))));
        }
        paths
    }
}

// Helper functions for schema inspection
fn find_child<'a>(children: &'a [SchemaNode], name: &str) -> Option<&'a SchemaNode> {
    children.iter().find(|c| c.name() == name)
}
