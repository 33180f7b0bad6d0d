use crate::{
    error::{AddChildError, AddChildResult},
    BehaviorNode, BehaviorResult, Category, NumChildren, Parameters, Symbol, Tick,
};
use tracing::trace;

/// Identity and metadata of a node, everything but its behavior and children.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHeader {
    /// Unique in a tree
    pub id: Symbol,
    /// Name of the type of the node, as registered in the [`crate::Registry`]
    pub name: String,
    pub category: Category,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Static configuration given to the constructor
    pub parameters: Parameters,
    /// Free-form editor metadata, not used by execution
    pub properties: Parameters,
}

/// A behavior node with its metadata and the child nodes it owns.
pub struct BehaviorNodeContainer<T = ()> {
    pub(crate) header: NodeHeader,
    pub(crate) node: Box<dyn BehaviorNode<T>>,
    pub(crate) child_nodes: Vec<BehaviorNodeContainer<T>>,
}

impl<T> BehaviorNodeContainer<T> {
    /// Wraps a node with a freshly generated id.
    ///
    /// The generated id is an interned [`Symbol`] that lives until the process
    /// exits. A host that builds trees by hand over and over should use
    /// [`BehaviorNodeContainer::new_with_id`] with stable ids instead, so the
    /// same symbols are reused.
    pub fn new(name: impl ToString, node: Box<dyn BehaviorNode<T>>) -> Self {
        Self::new_with_id(Symbol::unique(), name, node)
    }

    pub fn new_with_id(
        id: impl Into<Symbol>,
        name: impl ToString,
        node: Box<dyn BehaviorNode<T>>,
    ) -> Self {
        let header = NodeHeader {
            id: id.into(),
            name: name.to_string(),
            category: node.category(),
            title: None,
            description: None,
            parameters: Parameters::new(),
            properties: Parameters::new(),
        };
        Self::from_parts(header, node)
    }

    pub fn new_node(name: impl ToString, node: impl BehaviorNode<T> + 'static) -> Self {
        Self::new(name, Box::new(node))
    }

    pub(crate) fn from_parts(header: NodeHeader, node: Box<dyn BehaviorNode<T>>) -> Self {
        Self {
            header,
            node,
            child_nodes: vec![],
        }
    }

    pub fn with_id(mut self, id: impl Into<Symbol>) -> Self {
        self.header.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl ToString) -> Self {
        self.header.title = Some(title.to_string());
        self
    }

    pub fn with_description(mut self, description: impl ToString) -> Self {
        self.header.description = Some(description.to_string());
        self
    }

    pub fn with_child(mut self, child: BehaviorNodeContainer<T>) -> Result<Self, AddChildError> {
        self.add_child(child)?;
        Ok(self)
    }

    pub fn add_child(&mut self, child: BehaviorNodeContainer<T>) -> AddChildResult {
        if NumChildren::Finite(self.child_nodes.len()) < self.node.max_children() {
            self.child_nodes.push(child);
            Ok(())
        } else {
            Err(AddChildError::TooManyNodes)
        }
    }

    /// Checks the child count against what the category demands.
    /// Only decorators have a lower bound.
    pub fn check_children(&self) -> AddChildResult {
        if self.header.category == Category::Decorator && self.child_nodes.is_empty() {
            Err(AddChildError::NotEnoughNodes)
        } else {
            Ok(())
        }
    }

    pub fn header(&self) -> &NodeHeader {
        &self.header
    }

    pub fn id(&self) -> Symbol {
        self.header.id
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn category(&self) -> Category {
        self.header.category
    }

    pub fn children(&self) -> &[BehaviorNodeContainer<T>] {
        &self.child_nodes
    }

    /// Depth-first search for a node by id in this subtree.
    pub fn find(&self, id: Symbol) -> Option<&BehaviorNodeContainer<T>> {
        if self.header.id == id {
            return Some(self);
        }
        self.child_nodes.iter().find_map(|child| child.find(id))
    }

    /// Calls every node in this subtree, parents before children.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a BehaviorNodeContainer<T>)) {
        f(self);
        for child in &self.child_nodes {
            child.visit(f);
        }
    }

    /// Propagates the tick signal to this node.
    ///
    /// Runs the lifecycle callbacks in order: `enter`, `open` (only if the node
    /// was not left open by a previous tick), `tick`, `close` (only if the result
    /// is not [`BehaviorResult::Running`]) and `exit`.
    pub fn execute(&self, tick: &mut Tick<T>) -> BehaviorResult {
        tick.push_node(self.header.id);

        tick.enter_node(&self.header);
        self.node.enter(tick);

        if !tick.is_open(self.header.id) {
            tick.open_node(&self.header);
            self.node.open(tick);
        }

        tick.tick_node(&self.header);
        let status = self.node.tick(tick, &self.child_nodes);
        trace!(node = %self.header.id, name = %self.header.name, ?status, "ticked");

        if status != BehaviorResult::Running {
            tick.close_node(&self.header);
            self.node.close(tick);
        }

        tick.exit_node(&self.header);
        self.node.exit(tick);

        tick.pop_node();
        status
    }

    /// Closes a node that was left running but not visited again.
    pub(crate) fn force_close(&self, tick: &mut Tick<T>) {
        tick.push_node(self.header.id);
        tick.close_node(&self.header);
        self.node.close(tick);
        tick.exit_node(&self.header);
        self.node.exit(tick);
        tick.pop_node();
    }
}
