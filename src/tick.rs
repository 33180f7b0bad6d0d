use crate::{BehaviorTree, Blackboard, Lazy, NodeHeader, Symbol};

pub(crate) static OPEN_NODES: Lazy<Symbol> = Lazy::new(|| "openNodes".into());
pub(crate) static NODE_COUNT: Lazy<Symbol> = Lazy::new(|| "nodeCount".into());
pub(crate) static IS_OPEN: Lazy<Symbol> = Lazy::new(|| "isOpen".into());

/// Receives every lifecycle step of every node visited during a tick.
///
/// All methods default to no-ops, so an implementation only overrides the events
/// it cares about.
pub trait TickObserver {
    fn on_enter(&mut self, _node: &NodeHeader) {}
    fn on_open(&mut self, _node: &NodeHeader) {}
    fn on_tick(&mut self, _node: &NodeHeader) {}
    fn on_close(&mut self, _node: &NodeHeader) {}
    fn on_exit(&mut self, _node: &NodeHeader) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEvent {
    Enter,
    Open,
    Tick,
    Close,
    Exit,
}

/// A [`TickObserver`] that records the events in the order they happened.
#[derive(Default, Debug, Clone)]
pub struct EventLog {
    pub events: Vec<(NodeEvent, Symbol)>,
}

impl EventLog {
    /// Ids of the nodes that received `event`, in order.
    pub fn nodes(&self, event: NodeEvent) -> Vec<Symbol> {
        self.events
            .iter()
            .filter(|(ev, _)| *ev == event)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Events received by a single node, in order.
    pub fn events_of(&self, node: impl Into<Symbol>) -> Vec<NodeEvent> {
        let node = node.into();
        self.events
            .iter()
            .filter(|(_, id)| *id == node)
            .map(|(ev, _)| *ev)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TickObserver for EventLog {
    fn on_enter(&mut self, node: &NodeHeader) {
        self.events.push((NodeEvent::Enter, node.id));
    }

    fn on_open(&mut self, node: &NodeHeader) {
        self.events.push((NodeEvent::Open, node.id));
    }

    fn on_tick(&mut self, node: &NodeHeader) {
        self.events.push((NodeEvent::Tick, node.id));
    }

    fn on_close(&mut self, node: &NodeHeader) {
        self.events.push((NodeEvent::Close, node.id));
    }

    fn on_exit(&mut self, node: &NodeHeader) {
        self.events.push((NodeEvent::Exit, node.id));
    }
}

/// The context of a single traversal of a tree.
///
/// A new `Tick` is created by [`BehaviorTree::tick`] and passed to every node
/// visited. It gives nodes access to the target object, the blackboard and the
/// tree, and it keeps the list of nodes that are still open at the end of the
/// traversal.
///
/// Nodes must not keep per-run state in themselves, since one node instance may
/// serve many agents. Use [`Tick::memory`] and [`Tick::set_memory`], which are
/// scoped to the current tree and node.
pub struct Tick<'a, T = ()> {
    tree: &'a BehaviorTree<T>,
    target: &'a mut T,
    blackboard: &'a mut Blackboard,
    debug: Option<&'a mut dyn TickObserver>,
    open_nodes: Vec<Symbol>,
    node_count: usize,
    /// Nodes being executed, innermost last
    stack: Vec<Symbol>,
}

impl<'a, T> Tick<'a, T> {
    pub(crate) fn new(
        tree: &'a BehaviorTree<T>,
        target: &'a mut T,
        blackboard: &'a mut Blackboard,
        debug: Option<&'a mut dyn TickObserver>,
    ) -> Self {
        Self {
            tree,
            target,
            blackboard,
            debug,
            open_nodes: vec![],
            node_count: 0,
            stack: vec![],
        }
    }

    pub fn tree(&self) -> &BehaviorTree<T> {
        self.tree
    }

    pub fn tree_id(&self) -> Symbol {
        self.tree.id()
    }

    pub fn target(&self) -> &T {
        &*self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut *self.target
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    /// Id of the node whose callback is currently running.
    pub fn node_id(&self) -> Option<Symbol> {
        self.stack.last().copied()
    }

    /// Reads the per-node memory of the current node in the current tree.
    pub fn memory<V: 'static>(&self, key: impl Into<Symbol>) -> Option<&V> {
        self.blackboard
            .get(key, Some(self.tree.id()), self.node_id())
    }

    /// Writes the per-node memory of the current node in the current tree.
    pub fn set_memory<V: 'static>(&mut self, key: impl Into<Symbol>, value: V) {
        let (tree, node) = (self.tree.id(), self.node_id());
        self.blackboard.set(key, value, Some(tree), node);
    }

    /// Nodes entered in this traversal and not closed yet, in entry order.
    pub fn open_nodes(&self) -> &[Symbol] {
        &self.open_nodes
    }

    /// Number of nodes entered so far, counting repeated visits.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub(crate) fn push_node(&mut self, id: Symbol) {
        self.stack.push(id);
    }

    pub(crate) fn pop_node(&mut self) {
        self.stack.pop();
    }

    /// Whether the node was left open by a previous visit.
    pub(crate) fn is_open(&self, id: Symbol) -> bool {
        self.blackboard
            .get::<bool>(*IS_OPEN, Some(self.tree.id()), Some(id))
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn enter_node(&mut self, node: &NodeHeader) {
        self.node_count += 1;
        if !self.open_nodes.contains(&node.id) {
            self.open_nodes.push(node.id);
        }
        if let Some(debug) = self.debug.as_deref_mut() {
            debug.on_enter(node);
        }
    }

    pub(crate) fn open_node(&mut self, node: &NodeHeader) {
        self.blackboard
            .set(*IS_OPEN, true, Some(self.tree.id()), Some(node.id));
        if let Some(debug) = self.debug.as_deref_mut() {
            debug.on_open(node);
        }
    }

    pub(crate) fn tick_node(&mut self, node: &NodeHeader) {
        if let Some(debug) = self.debug.as_deref_mut() {
            debug.on_tick(node);
        }
    }

    pub(crate) fn close_node(&mut self, node: &NodeHeader) {
        self.blackboard
            .set(*IS_OPEN, false, Some(self.tree.id()), Some(node.id));
        self.open_nodes.retain(|id| *id != node.id);
        if let Some(debug) = self.debug.as_deref_mut() {
            debug.on_close(node);
        }
    }

    pub(crate) fn exit_node(&mut self, node: &NodeHeader) {
        if let Some(debug) = self.debug.as_deref_mut() {
            debug.on_exit(node);
        }
    }
}
