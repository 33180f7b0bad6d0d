use super::*;

#[test]
fn test_global_scope() {
    let mut bb = Blackboard::default();
    bb.set("key", 42, None, None);
    assert_eq!(Some(&42), bb.get::<i32>("key", None, None));
    assert_eq!(None, bb.get::<i32>("key", Some("tree".into()), None));
}

#[test]
fn test_node_scope_is_private() {
    let tree: Symbol = "tree".into();
    let node: Symbol = "node".into();
    let mut bb = Blackboard::default();
    bb.set("key", "node value", Some(tree), Some(node));

    assert_eq!(Some(&"node value"), bb.get::<&str>("key", Some(tree), Some(node)));
    // The per-tree memory does not see per-node values
    assert_eq!(None, bb.get::<&str>("key", Some(tree), None));
    assert_eq!(None, bb.get::<&str>("key", None, None));
    assert_eq!(None, bb.get::<&str>("key", Some(tree), Some("other".into())));
}

#[test]
fn test_tree_scope() {
    let mut bb = Blackboard::default();
    bb.set("key", 1, Some("a".into()), None);
    bb.set("key", 2, Some("b".into()), None);
    assert_eq!(Some(&1), bb.get::<i32>("key", Some("a".into()), None));
    assert_eq!(Some(&2), bb.get::<i32>("key", Some("b".into()), None));
    assert_eq!(None, bb.get::<i32>("key", None, None));
}

#[test]
fn test_node_scope_without_tree_falls_back_to_global() {
    let mut bb = Blackboard::default();
    bb.set("key", 1, None, None);
    bb.set("key", 2, None, Some("node".into()));
    assert_eq!(Some(&2), bb.get::<i32>("key", None, None));
    assert_eq!(Some(&2), bb.get::<i32>("key", None, Some("another".into())));
}

#[test]
fn test_wrong_type() {
    let mut bb = Blackboard::default();
    bb.set("key", 1usize, None, None);
    assert_eq!(None, bb.get::<i32>("key", None, None));
    assert_eq!(None, bb.remove::<String>("key", None, None));
}

#[test]
fn test_get_mut_and_remove() {
    let tree: Symbol = "tree".into();
    let mut bb = Blackboard::default();
    bb.set("counter", 0usize, Some(tree), None);
    *bb.get_mut::<usize>("counter", Some(tree), None).unwrap() += 3;
    assert_eq!(Some(3), bb.remove::<usize>("counter", Some(tree), None));
    assert_eq!(None, bb.get::<usize>("counter", Some(tree), None));
}
