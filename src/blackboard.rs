use crate::Symbol;
use std::{any::Any, collections::HashMap};

/// A single scope of blackboard memory.
///
/// Values are stored as `Box<dyn Any>` so any `'static` type fits, and read back
/// with a typed `get`. Reading with the wrong type yields `None`.
pub type Memory = HashMap<Symbol, Box<dyn Any>>;

#[derive(Default, Debug)]
struct TreeMemory {
    memory: Memory,
    node_memory: HashMap<Symbol, Memory>,
}

/// Blackboard is the memory shared by the nodes of one or more trees driving a
/// single agent.
///
/// There are three scopes:
///
/// * global memory, visible to every node of every tree,
/// * per-tree memory, visible to the nodes of one tree,
/// * per-node-per-tree memory, private to one node in one tree.
///
/// The scope is selected by the optional `tree_scope` and `node_scope` arguments.
/// A `node_scope` without a `tree_scope` is ignored and the global memory is used.
///
/// ```rust
/// # use behavior3::{Blackboard, Symbol};
/// let tree: Symbol = "tree-1".into();
/// let node: Symbol = "node-1".into();
/// let mut blackboard = Blackboard::default();
/// blackboard.set("hp", 10, Some(tree), Some(node));
/// assert_eq!(blackboard.get::<i32>("hp", Some(tree), Some(node)), Some(&10));
/// assert_eq!(blackboard.get::<i32>("hp", Some(tree), None), None);
/// ```
///
/// The engine itself keeps its bookkeeping here too (`openNodes` and `nodeCount`
/// in tree memory, `isOpen` in node memory), which is what lets one tree
/// definition drive any number of agents.
#[derive(Default, Debug)]
pub struct Blackboard {
    base: Memory,
    trees: HashMap<Symbol, TreeMemory>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: 'static>(
        &mut self,
        key: impl Into<Symbol>,
        value: V,
        tree_scope: Option<Symbol>,
        node_scope: Option<Symbol>,
    ) {
        self.memory_mut(tree_scope, node_scope)
            .insert(key.into(), Box::new(value));
    }

    pub fn get<V: 'static>(
        &self,
        key: impl Into<Symbol>,
        tree_scope: Option<Symbol>,
        node_scope: Option<Symbol>,
    ) -> Option<&V> {
        self.memory(tree_scope, node_scope)?
            .get(&key.into())
            .and_then(|value| value.downcast_ref())
    }

    pub fn get_mut<V: 'static>(
        &mut self,
        key: impl Into<Symbol>,
        tree_scope: Option<Symbol>,
        node_scope: Option<Symbol>,
    ) -> Option<&mut V> {
        self.memory_mut(tree_scope, node_scope)
            .get_mut(&key.into())
            .and_then(|value| value.downcast_mut())
    }

    /// Removes a value and returns it if it had the requested type.
    pub fn remove<V: 'static>(
        &mut self,
        key: impl Into<Symbol>,
        tree_scope: Option<Symbol>,
        node_scope: Option<Symbol>,
    ) -> Option<V> {
        self.memory_mut(tree_scope, node_scope)
            .remove(&key.into())
            .and_then(|value| value.downcast().ok())
            .map(|value| *value)
    }

    fn memory(&self, tree_scope: Option<Symbol>, node_scope: Option<Symbol>) -> Option<&Memory> {
        match (tree_scope, node_scope) {
            (Some(tree), Some(node)) => self.trees.get(&tree)?.node_memory.get(&node),
            (Some(tree), None) => self.trees.get(&tree).map(|tree| &tree.memory),
            (None, _) => Some(&self.base),
        }
    }

    fn memory_mut(&mut self, tree_scope: Option<Symbol>, node_scope: Option<Symbol>) -> &mut Memory {
        match (tree_scope, node_scope) {
            (Some(tree), Some(node)) => self
                .trees
                .entry(tree)
                .or_default()
                .node_memory
                .entry(node)
                .or_default(),
            (Some(tree), None) => &mut self.trees.entry(tree).or_default().memory,
            (None, _) => &mut self.base,
        }
    }
}

#[cfg(test)]
mod test;
