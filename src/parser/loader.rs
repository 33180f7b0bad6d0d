use std::collections::HashSet;

use super::document::TreeData;
use crate::{
    error::LoadError, BehaviorNodeContainer, BehaviorTree, NodeHeader, Registry, Symbol,
};
use tracing::warn;

/// Instantiate a behavior tree from its serialized form.
///
/// Every node type named in `data` must be known to `registry`. The nodes must
/// form a strict tree below `root`: each node is referenced at most once and
/// every reference must exist. Nodes that cannot be reached from `root` are
/// dropped with a warning.
pub fn load<T>(data: &TreeData, registry: &Registry<T>) -> Result<BehaviorTree<T>, LoadError> {
    let root_id = data.root.as_deref().ok_or(LoadError::MissingRoot)?;

    let mut visited = HashSet::new();
    let root = load_recurse(root_id, data, registry, &mut visited)?;

    for id in data.nodes.keys().filter(|id| !visited.contains(id.as_str())) {
        warn!(node = %id, "node is not reachable from the root and is dropped");
    }

    let mut tree = match data.id {
        Some(ref id) => BehaviorTree::new_with_id(id.as_str(), root),
        None => BehaviorTree::new(root),
    }
    .with_properties(data.properties.clone());
    if let Some(ref title) = data.title {
        tree = tree.with_title(title);
    }
    if let Some(ref description) = data.description {
        tree = tree.with_description(description);
    }
    Ok(tree)
}

fn load_recurse<'src, T>(
    id: &'src str,
    data: &'src TreeData,
    registry: &Registry<T>,
    visited: &mut HashSet<&'src str>,
) -> Result<BehaviorNodeContainer<T>, LoadError> {
    // A second visit means the node is shared between parents, or the
    // references form a cycle. Either way it is not a tree.
    if !visited.insert(id) {
        return Err(LoadError::SharedNode(id.to_owned()));
    }

    let spec = data
        .nodes
        .get(id)
        .ok_or_else(|| LoadError::MissingNode(id.to_owned()))?;

    if let Some(ref declared) = spec.id {
        if declared != id {
            return Err(LoadError::IdMismatch {
                key: id.to_owned(),
                id: declared.clone(),
            });
        }
    }

    let node = registry
        .build(&spec.name, &spec.parameters)
        .ok_or_else(|| LoadError::UnknownNodeType {
            node: id.to_owned(),
            name: spec.name.clone(),
        })?
        .map_err(|source| LoadError::InvalidParameter {
            node: id.to_owned(),
            source,
        })?;

    let header = NodeHeader {
        id: Symbol::from(id),
        name: spec.name.clone(),
        category: node.category(),
        title: spec.title.clone(),
        description: spec.description.clone(),
        parameters: spec.parameters.clone(),
        properties: spec.properties.clone(),
    };
    let mut container = BehaviorNodeContainer::from_parts(header, node);

    for child_id in spec.children.iter().chain(spec.child.iter()) {
        let child = load_recurse(child_id, data, registry, visited)?;
        container
            .add_child(child)
            .map_err(|e| LoadError::AddChildError(e, id.to_owned()))?;
    }
    container
        .check_children()
        .map_err(|e| LoadError::AddChildError(e, id.to_owned()))?;

    Ok(container)
}

#[cfg(test)]
mod test;
