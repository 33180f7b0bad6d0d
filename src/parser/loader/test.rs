use super::*;
use crate::{
    boxify, boxify_with, error::AddChildError, error::ParameterError, get_parameter,
    BehaviorNode, BehaviorResult, Blackboard, Category, NodeSpec, Parameters, Tick,
};

fn load_json(src: &str) -> Result<BehaviorTree, LoadError> {
    load(&TreeData::from_json(src)?, &Registry::default())
}

/// Appends its word to the target.
struct Say(String);

impl Say {
    fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        get_parameter::<String>(params, "word")?
            .map(Say)
            .ok_or_else(|| ParameterError::missing("word"))
    }
}

impl BehaviorNode<Vec<String>> for Say {
    fn category(&self) -> Category {
        Category::Action
    }

    fn tick(
        &self,
        tick: &mut Tick<Vec<String>>,
        _: &[BehaviorNodeContainer<Vec<String>>],
    ) -> BehaviorResult {
        tick.target_mut().push(self.0.clone());
        BehaviorResult::Success
    }
}

fn say_registry() -> Registry<Vec<String>> {
    let mut registry = Registry::default();
    registry.register(
        NodeSpec::action("Say").with_parameter("word", "hello"),
        boxify_with(Say::from_parameters),
    );
    registry
}

#[test]
fn test_load() {
    let src = r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Sequence", "children": ["b", "c", "d"] },
            "b": { "name": "Say" },
            "c": { "name": "Say", "parameters": { "word": "world" } },
            "d": { "name": "Inverter", "child": "e" },
            "e": { "name": "Failer" }
        }
    }"#;
    let tree = load(&TreeData::from_json(src).unwrap(), &say_registry()).unwrap();

    let mut words = vec![];
    let result = tree.tick(&mut words, &mut Blackboard::default());
    assert_eq!(result, BehaviorResult::Success);
    assert_eq!(words, vec!["hello", "world"]);
}

#[test]
fn test_load_yaml() {
    let src = r#"
id: yaml tree
root: a
nodes:
  a:
    name: MemSequence
    children: [b, c]
  b:
    name: Say
    parameters:
      word: foo
  c:
    name: Repeater
    parameters:
      maxLoop: "2"
    child: d
  d:
    name: Say
"#;
    let tree = load(&TreeData::from_yaml(src).unwrap(), &say_registry()).unwrap();
    assert_eq!(Symbol::from("yaml tree"), tree.id());

    let mut words = vec![];
    tree.tick(&mut words, &mut Blackboard::default());
    assert_eq!(words, vec!["foo", "hello", "hello"]);
}

#[test]
fn test_missing_root() {
    let res = load_json(r#"{ "nodes": { "a": { "name": "Succeeder" } } }"#);
    assert!(matches!(res, Err(LoadError::MissingRoot)));
}

#[test]
fn test_missing_node() {
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": { "a": { "name": "Sequence", "children": ["b"] } }
    }"#,
    );
    assert!(matches!(res, Err(LoadError::MissingNode(id)) if id == "b"));

    let res = load_json(r#"{ "root": "a", "nodes": {} }"#);
    assert!(matches!(res, Err(LoadError::MissingNode(id)) if id == "a"));
}

#[test]
fn test_unknown_node_type() {
    let res = load_json(r#"{ "root": "a", "nodes": { "a": { "name": "Dance" } } }"#);
    assert!(matches!(
        res,
        Err(LoadError::UnknownNodeType { node, name }) if node == "a" && name == "Dance"
    ));
}

#[test]
fn test_custom_node_needs_registration() {
    let src = r#"{ "root": "a", "nodes": { "a": { "name": "Say" } } }"#;
    let data = TreeData::from_json(src).unwrap();
    assert!(load(&data, &Registry::<Vec<String>>::default()).is_err());
    assert!(load(&data, &say_registry()).is_ok());
}

#[test]
fn test_decorator_children() {
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Inverter", "children": ["b", "c"] },
            "b": { "name": "Succeeder" },
            "c": { "name": "Succeeder" }
        }
    }"#,
    );
    assert!(matches!(
        res,
        Err(LoadError::AddChildError(AddChildError::TooManyNodes, id)) if id == "a"
    ));

    // "child" and "children" together
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Inverter", "child": "b", "children": ["c"] },
            "b": { "name": "Succeeder" },
            "c": { "name": "Succeeder" }
        }
    }"#,
    );
    assert!(matches!(
        res,
        Err(LoadError::AddChildError(AddChildError::TooManyNodes, _))
    ));

    let res = load_json(r#"{ "root": "a", "nodes": { "a": { "name": "Inverter" } } }"#);
    assert!(matches!(
        res,
        Err(LoadError::AddChildError(AddChildError::NotEnoughNodes, id)) if id == "a"
    ));

    // A single entry in "children" is fine for a decorator
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Inverter", "children": ["b"] },
            "b": { "name": "Failer" }
        }
    }"#,
    );
    let tree = res.unwrap();
    assert_eq!(
        BehaviorResult::Success,
        tree.tick(&mut (), &mut Blackboard::default())
    );
}

#[test]
fn test_leaf_with_children() {
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Succeeder", "children": ["b"] },
            "b": { "name": "Succeeder" }
        }
    }"#,
    );
    assert!(matches!(
        res,
        Err(LoadError::AddChildError(AddChildError::TooManyNodes, id)) if id == "a"
    ));
}

#[test]
fn test_shared_node() {
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Sequence", "children": ["b", "b"] },
            "b": { "name": "Succeeder" }
        }
    }"#,
    );
    assert!(matches!(res, Err(LoadError::SharedNode(id)) if id == "b"));
}

#[test]
fn test_cycle() {
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Sequence", "children": ["b"] },
            "b": { "name": "Sequence", "children": ["a"] }
        }
    }"#,
    );
    assert!(matches!(res, Err(LoadError::SharedNode(id)) if id == "a"));
}

#[test]
fn test_id_mismatch() {
    let res = load_json(r#"{ "root": "a", "nodes": { "a": { "id": "b", "name": "Succeeder" } } }"#);
    assert!(matches!(
        res,
        Err(LoadError::IdMismatch { key, id }) if key == "a" && id == "b"
    ));
}

#[test]
fn test_invalid_parameter() {
    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Limiter", "child": "b" },
            "b": { "name": "Succeeder" }
        }
    }"#,
    );
    assert!(matches!(
        res,
        Err(LoadError::InvalidParameter { node, source }) if node == "a" && source.key == "maxLoop"
    ));

    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Limiter", "parameters": { "maxLoop": "abc" }, "child": "b" },
            "b": { "name": "Succeeder" }
        }
    }"#,
    );
    assert!(matches!(res, Err(LoadError::InvalidParameter { .. })));

    let res = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Limiter", "parameters": { "maxLoop": "1" }, "child": "b" },
            "b": { "name": "Succeeder" }
        }
    }"#,
    );
    let tree = res.unwrap();
    let mut bb = Blackboard::default();
    assert_eq!(BehaviorResult::Success, tree.tick(&mut (), &mut bb));
    assert_eq!(BehaviorResult::Failure, tree.tick(&mut (), &mut bb));
}

#[test]
fn test_malformed_document() {
    let res = load_json(r#"{ "root": "a", "nodes": { "a": { "title": "no name" } } }"#);
    assert!(matches!(res, Err(LoadError::Json(_))));
}

#[test]
fn test_unreachable_node_is_dropped() {
    let tree = load_json(
        r#"{
        "root": "a",
        "nodes": {
            "a": { "name": "Succeeder" },
            "b": { "name": "Failer" }
        }
    }"#,
    )
    .unwrap();
    assert!(tree.find("b").is_none());
    assert_eq!(1, tree.dump().nodes.len());
}

#[test]
fn test_metadata_is_kept() {
    let src = r#"{
        "id": "t",
        "title": "Tree",
        "description": "A tree",
        "root": "a",
        "properties": { "version": 3 },
        "nodes": {
            "a": {
                "id": "a",
                "name": "Sequence",
                "title": "Do things",
                "description": "In order",
                "properties": { "x": 10, "y": 20 },
                "children": ["b"]
            },
            "b": { "id": "b", "name": "Wait", "parameters": { "milliseconds": 10 } }
        }
    }"#;
    let tree = load_json(src).unwrap();
    let root = tree.root().header();
    assert_eq!(Some("Do things"), root.title.as_deref());
    assert_eq!(Some("In order"), root.description.as_deref());
    assert_eq!(Some(&serde_json::json!(10)), root.properties.get("x"));
    assert_eq!(Category::Composite, root.category);

    // Only the document parameters are kept, not the registry defaults
    let wait = tree.find("b").unwrap().header();
    assert_eq!(1, wait.parameters.len());

    assert_eq!(TreeData::from_json(src).unwrap(), tree.dump());
}

#[test]
fn test_parameterless_registration() {
    struct Nop;

    impl BehaviorNode for Nop {
        fn category(&self) -> Category {
            Category::Condition
        }

        fn tick(&self, _: &mut Tick, _: &[BehaviorNodeContainer]) -> BehaviorResult {
            BehaviorResult::Failure
        }
    }

    let mut registry: Registry = Registry::empty();
    registry.register(NodeSpec::condition("Nop"), boxify(|| Nop));
    let data = TreeData::from_json(r#"{ "root": "a", "nodes": { "a": { "name": "Nop" } } }"#)
        .unwrap();
    let tree = load(&data, &registry).unwrap();
    assert_eq!(Category::Condition, tree.root().category());
    assert_eq!(
        BehaviorResult::Failure,
        tree.tick(&mut (), &mut Blackboard::default())
    );

    // The empty registry has no built-ins
    let data = TreeData::from_json(r#"{ "root": "a", "nodes": { "a": { "name": "Sequence" } } }"#)
        .unwrap();
    assert!(load(&data, &registry).is_err());
}
