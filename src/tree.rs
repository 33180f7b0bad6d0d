use crate::{
    error::LoadError,
    parser::{load, NodeData, TreeData},
    tick::{NODE_COUNT, OPEN_NODES},
    BehaviorNodeContainer, BehaviorResult, Blackboard, Category, Parameters, Registry, Symbol,
    Tick, TickObserver,
};
use std::collections::BTreeMap;
use tracing::debug;

/// A behavior tree: a root node and everything it owns.
///
/// The tree keeps no execution state of its own. The nodes left running by the
/// previous tick are recorded in the blackboard passed to [`BehaviorTree::tick`],
/// so the same tree can be ticked for any number of agents, each with its own
/// blackboard.
pub struct BehaviorTree<T = ()> {
    id: Symbol,
    title: Option<String>,
    description: Option<String>,
    properties: Parameters,
    root: BehaviorNodeContainer<T>,
}

impl<T> BehaviorTree<T> {
    /// A tree with a freshly generated id, which is interned for good like the
    /// node ids of [`BehaviorNodeContainer::new`].
    pub fn new(root: BehaviorNodeContainer<T>) -> Self {
        Self::new_with_id(Symbol::unique(), root)
    }

    pub fn new_with_id(id: impl Into<Symbol>, root: BehaviorNodeContainer<T>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            properties: Parameters::new(),
            root,
        }
    }

    pub fn load(data: &TreeData, registry: &Registry<T>) -> Result<Self, LoadError> {
        load(data, registry)
    }

    pub fn load_json(src: &str, registry: &Registry<T>) -> Result<Self, LoadError> {
        load(&TreeData::from_json(src)?, registry)
    }

    pub fn load_yaml(src: &str, registry: &Registry<T>) -> Result<Self, LoadError> {
        load(&TreeData::from_yaml(src)?, registry)
    }

    pub fn with_id(mut self, id: impl Into<Symbol>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_description(mut self, description: impl ToString) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_properties(mut self, properties: Parameters) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> Symbol {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn properties(&self) -> &Parameters {
        &self.properties
    }

    pub fn root(&self) -> &BehaviorNodeContainer<T> {
        &self.root
    }

    pub fn find(&self, id: impl Into<Symbol>) -> Option<&BehaviorNodeContainer<T>> {
        self.root.find(id.into())
    }

    /// Propagates the tick signal through the tree, starting from the root.
    ///
    /// Nodes that were left running by the previous tick on the same blackboard
    /// but were not visited this time are closed after the traversal, in the
    /// order they were entered.
    pub fn tick(&self, target: &mut T, blackboard: &mut Blackboard) -> BehaviorResult {
        self.run(Tick::new(self, target, blackboard, None))
    }

    /// Same as [`BehaviorTree::tick`], reporting every lifecycle step to `observer`.
    pub fn tick_with_observer<'a>(
        &'a self,
        target: &'a mut T,
        blackboard: &'a mut Blackboard,
        observer: &'a mut dyn TickObserver,
    ) -> BehaviorResult {
        self.run(Tick::new(self, target, blackboard, Some(observer)))
    }

    fn run(&self, mut tick: Tick<T>) -> BehaviorResult {
        let status = self.root.execute(&mut tick);

        let last_open = tick
            .blackboard()
            .get::<Vec<Symbol>>(*OPEN_NODES, Some(self.id), None)
            .cloned()
            .unwrap_or_default();
        let current_open = tick.open_nodes().to_vec();

        // A node that was running and completed on this visit is closed already
        for id in last_open.iter().filter(|id| !current_open.contains(id)) {
            if !tick.is_open(*id) {
                continue;
            }
            if let Some(node) = self.root.find(*id) {
                debug!(tree = %self.id, node = %id, name = node.name(), "closing stale node");
                node.force_close(&mut tick);
            }
        }

        let node_count = tick.node_count();
        let blackboard = tick.blackboard_mut();
        blackboard.set(*OPEN_NODES, current_open, Some(self.id), None);
        blackboard.set(*NODE_COUNT, node_count, Some(self.id), None);

        status
    }

    /// Nodes left running by the last tick on `blackboard`, in entry order.
    pub fn open_nodes<'b>(&self, blackboard: &'b Blackboard) -> &'b [Symbol] {
        blackboard
            .get::<Vec<Symbol>>(*OPEN_NODES, Some(self.id), None)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of nodes entered by the last tick on `blackboard`.
    pub fn node_count(&self, blackboard: &Blackboard) -> usize {
        blackboard
            .get::<usize>(*NODE_COUNT, Some(self.id), None)
            .copied()
            .unwrap_or(0)
    }

    /// Serializes the structure and metadata of the tree. Execution state in
    /// blackboards is not part of it.
    pub fn dump(&self) -> TreeData {
        let mut nodes = BTreeMap::new();
        self.root.visit(&mut |node| {
            let header = node.header();
            let mut child_ids = node.children().iter().map(|child| child.id().to_string());
            let (child, children) = match header.category {
                Category::Decorator => (child_ids.next(), vec![]),
                _ => (None, child_ids.collect()),
            };
            nodes.insert(
                header.id.to_string(),
                NodeData {
                    id: Some(header.id.to_string()),
                    name: header.name.clone(),
                    title: header.title.clone(),
                    description: header.description.clone(),
                    parameters: header.parameters.clone(),
                    properties: header.properties.clone(),
                    child,
                    children,
                },
            );
        });

        TreeData {
            id: Some(self.id.to_string()),
            title: self.title.clone(),
            description: self.description.clone(),
            root: Some(self.root.id().to_string()),
            properties: self.properties.clone(),
            nodes,
        }
    }

    pub fn dump_json(&self) -> serde_json::Result<String> {
        self.dump().to_json()
    }

    pub fn dump_yaml(&self) -> serde_yaml::Result<String> {
        self.dump().to_yaml()
    }
}
