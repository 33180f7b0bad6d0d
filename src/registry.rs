use crate::{
    error::ParameterError,
    nodes::{
        ErrorNode, FailerNode, InverterNode, LimiterNode, MaxTimeNode, MemPriorityNode,
        MemSequenceNode, PriorityNode, RepeatUntilFailureNode, RepeatUntilSuccessNode,
        RepeaterNode, RunnerNode, SequenceNode, SucceederNode, WaitNode,
    },
    BehaviorNode, Category, Parameters,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, str::FromStr};

pub type Constructor<T> =
    Box<dyn Fn(&Parameters) -> Result<Box<dyn BehaviorNode<T>>, ParameterError>>;

/// Wraps a parameterless constructor.
pub fn boxify<T, N>(cons: impl (Fn() -> N) + 'static) -> Constructor<T>
where
    T: 'static,
    N: BehaviorNode<T> + 'static,
{
    Box::new(
        move |_: &Parameters| -> Result<Box<dyn BehaviorNode<T>>, ParameterError> {
            Ok(Box::new(cons()))
        },
    )
}

/// Wraps a constructor that reads the node parameters.
pub fn boxify_with<T, N>(
    cons: impl (Fn(&Parameters) -> Result<N, ParameterError>) + 'static,
) -> Constructor<T>
where
    T: 'static,
    N: BehaviorNode<T> + 'static,
{
    Box::new(
        move |params: &Parameters| -> Result<Box<dyn BehaviorNode<T>>, ParameterError> {
            Ok(Box::new(cons(params)?))
        },
    )
}

/// Reads a node parameter.
///
/// Values written by the editor are often strings, so a string is parsed with
/// `FromStr` if it cannot be taken as `V` directly. Returns `Ok(None)` if the
/// parameter is absent or null.
pub fn get_parameter<V>(params: &Parameters, key: &str) -> Result<Option<V>, ParameterError>
where
    V: DeserializeOwned + FromStr,
    <V as FromStr>::Err: std::fmt::Display,
{
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ParameterError::new(key, e)),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ParameterError::new(key, e)),
    }
}

/// Catalog metadata of a node type, as shown in an editor's node palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default values, overridden by the parameters in a tree document
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub parameters: Parameters,
}

impl NodeSpec {
    pub fn new(name: impl ToString, category: Category) -> Self {
        Self {
            name: name.to_string(),
            category,
            title: None,
            description: None,
            parameters: Parameters::new(),
        }
    }

    pub fn composite(name: impl ToString) -> Self {
        Self::new(name, Category::Composite)
    }

    pub fn decorator(name: impl ToString) -> Self {
        Self::new(name, Category::Decorator)
    }

    pub fn action(name: impl ToString) -> Self {
        Self::new(name, Category::Action)
    }

    pub fn condition(name: impl ToString) -> Self {
        Self::new(name, Category::Condition)
    }

    pub fn with_title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_description(mut self, description: impl ToString) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_parameter(mut self, key: impl ToString, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }
}

struct Entry<T> {
    spec: NodeSpec,
    constructor: Constructor<T>,
}

/// A mapping from node type names to their constructors.
///
/// The default registry knows the built-in composites, decorators and actions.
pub struct Registry<T = ()> {
    node_types: HashMap<String, Entry<T>>,
}

impl<T: 'static> Default for Registry<T> {
    fn default() -> Self {
        let mut ret = Self {
            node_types: HashMap::new(),
        };
        ret.register(NodeSpec::composite("Sequence"), boxify(|| SequenceNode));
        ret.register(NodeSpec::composite("Priority"), boxify(|| PriorityNode));
        ret.register(NodeSpec::composite("MemSequence"), boxify(|| MemSequenceNode));
        ret.register(NodeSpec::composite("MemPriority"), boxify(|| MemPriorityNode));
        ret.register(NodeSpec::decorator("Inverter"), boxify(|| InverterNode));
        ret.register(
            NodeSpec::decorator("Limiter"),
            boxify_with(LimiterNode::from_parameters),
        );
        ret.register(
            NodeSpec::decorator("MaxTime"),
            boxify_with(MaxTimeNode::from_parameters),
        );
        ret.register(
            NodeSpec::decorator("Repeater").with_parameter("maxLoop", -1),
            boxify_with(RepeaterNode::from_parameters),
        );
        ret.register(
            NodeSpec::decorator("RepeatUntilFailure").with_parameter("maxLoop", -1),
            boxify_with(RepeatUntilFailureNode::from_parameters),
        );
        ret.register(
            NodeSpec::decorator("RepeatUntilSuccess").with_parameter("maxLoop", -1),
            boxify_with(RepeatUntilSuccessNode::from_parameters),
        );
        ret.register(NodeSpec::action("Succeeder"), boxify(|| SucceederNode));
        ret.register(NodeSpec::action("Failer"), boxify(|| FailerNode));
        ret.register(NodeSpec::action("Error"), boxify(|| ErrorNode));
        ret.register(NodeSpec::action("Runner"), boxify(|| RunnerNode));
        ret.register(
            NodeSpec::action("Wait").with_parameter("milliseconds", 0),
            boxify_with(WaitNode::from_parameters),
        );
        ret
    }
}

impl<T> Registry<T> {
    /// A registry without any node types, not even the built-in ones.
    pub fn empty() -> Self {
        Self {
            node_types: HashMap::new(),
        }
    }

    /// Registers a node type, replacing any previous one with the same name.
    pub fn register(&mut self, spec: NodeSpec, constructor: Constructor<T>) {
        self.node_types
            .insert(spec.name.clone(), Entry { spec, constructor });
    }

    /// Instantiates a node, or returns `None` if the type is unknown.
    ///
    /// `parameters` are laid over the defaults of the node spec.
    pub fn build(
        &self,
        type_name: &str,
        parameters: &Parameters,
    ) -> Option<Result<Box<dyn BehaviorNode<T>>, ParameterError>> {
        let entry = self.node_types.get(type_name)?;
        if entry.spec.parameters.is_empty() {
            return Some((entry.constructor)(parameters));
        }
        let mut merged = entry.spec.parameters.clone();
        merged.extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        Some((entry.constructor)(&merged))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.node_types.contains_key(type_name)
    }

    pub fn spec(&self, type_name: &str) -> Option<&NodeSpec> {
        self.node_types.get(type_name).map(|entry| &entry.spec)
    }

    /// All registered node specs, sorted by name.
    pub fn catalog(&self) -> Vec<NodeSpec> {
        let mut specs: Vec<_> = self
            .node_types
            .values()
            .map(|entry| entry.spec.clone())
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Updates titles, descriptions and default parameters of registered node
    /// types from catalog entries, e.g. a node list exported by an editor.
    /// Entries for unknown names are returned, since they have no behavior.
    pub fn describe(&mut self, specs: impl IntoIterator<Item = NodeSpec>) -> Vec<NodeSpec> {
        let mut unknown = vec![];
        for spec in specs {
            match self.node_types.get_mut(&spec.name) {
                Some(entry) => {
                    let category = entry.spec.category;
                    entry.spec = NodeSpec { category, ..spec };
                }
                None => unknown.push(spec),
            }
        }
        unknown
    }
}
