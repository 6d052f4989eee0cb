use crate::graph::NodeId;
use std::collections::HashMap;

/// Name-based symbol index used to link import references.
///
/// Maps a bare symbol name to the first node registered under it. Later
/// registrations of the same name are ignored, so two `User` classes in
/// different files resolve to whichever file was registered first.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    by_name: HashMap<String, NodeId>,

    /// Names that were registered more than once.
    collisions: usize,
}

impl SymbolTable {
    /// Creates a new empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol. Returns false if the name was already taken.
    pub fn insert(&mut self, name: &str, id: NodeId) -> bool {
        if self.by_name.contains_key(name) {
            self.collisions += 1;
            return false;
        }
        self.by_name.insert(name.to_string(), id);
        true
    }

    /// Resolves a bare name to a node id.
    pub fn resolve(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Number of registrations dropped because the name was taken.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        let mut table = SymbolTable::new();
        let first = NodeId::new(1);
        let second = NodeId::new(2);

        assert!(table.insert("User", first));
        assert!(!table.insert("User", second));

        assert_eq!(table.resolve("User"), Some(first));
        assert_eq!(table.resolve("Order"), None);
        assert_eq!(table.collisions(), 1);
        assert_eq!(table.len(), 1);
    }
}
