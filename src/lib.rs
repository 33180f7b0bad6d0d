//! # behavior3 (Rust crate)
//!
//! A behavior tree execution engine with scoped blackboard memory.
//!
//!
//! ## Overview
//!
//! A behavior tree is a tree of reusable decision and action nodes. The host
//! application (a game loop, typically) sends a periodic _tick_ to the tree,
//! which is propagated from the root down to the leaves. Every node answers
//! with one of four statuses: [`BehaviorResult::Success`], [`BehaviorResult::Failure`],
//! [`BehaviorResult::Running`] or [`BehaviorResult::Error`].
//!
//! Nodes belong to one of four categories:
//!
//! * Composite: any number of children, e.g. [`SequenceNode`], [`PriorityNode`]
//! * Decorator: exactly one child, e.g. [`InverterNode`], [`RepeaterNode`]
//! * Action: a leaf that does something
//! * Condition: a leaf that checks something
//!
//! The tree and its nodes do not hold any execution state. Everything a node needs
//! to remember between ticks lives in a [`Blackboard`], which the host passes to
//! every tick. So a single tree instance can drive any number of agents, one
//! blackboard each.
//!
//!
//! ## How it looks like
//!
//! Define an action by implementing the [`BehaviorNode`] trait.
//! The target type parameter is the object the tree acts upon.
//!
//! ```rust
//! use behavior3::*;
//!
//! struct Guard {
//!     stamina: u32,
//! }
//!
//! struct Rest;
//!
//! impl BehaviorNode<Guard> for Rest {
//!     fn category(&self) -> Category {
//!         Category::Action
//!     }
//!
//!     fn tick(&self, tick: &mut Tick<Guard>, _: &[BehaviorNodeContainer<Guard>]) -> BehaviorResult {
//!         let guard = tick.target_mut();
//!         guard.stamina += 1;
//!         if guard.stamina < 3 {
//!             BehaviorResult::Running
//!         } else {
//!             BehaviorResult::Success
//!         }
//!     }
//! }
//! ```
//!
//! Then build a tree, either by hand
//!
//! ```rust
//! # use behavior3::*;
//! # struct Rest;
//! # impl BehaviorNode for Rest { fn category(&self) -> Category { Category::Action }
//! # fn tick(&self, _: &mut Tick, _: &[BehaviorNodeContainer]) -> BehaviorResult { BehaviorResult::Success } }
//! let mut root = BehaviorNodeContainer::new_node("Sequence", SequenceNode);
//! root.add_child(BehaviorNodeContainer::new_node("Rest", Rest)).unwrap();
//! let tree = BehaviorTree::new(root);
//! ```
//!
//! or by loading a document with a [`Registry`] that knows your node types.
//!
//! ```rust
//! # use behavior3::*;
//! # struct Rest;
//! # impl BehaviorNode for Rest { fn category(&self) -> Category { Category::Action }
//! # fn tick(&self, _: &mut Tick, _: &[BehaviorNodeContainer]) -> BehaviorResult { BehaviorResult::Success } }
//! let mut registry = Registry::default();
//! registry.register(NodeSpec::action("Rest"), boxify(|| Rest));
//!
//! let tree = BehaviorTree::load_json(r#"{
//!     "id": "guard",
//!     "root": "1",
//!     "nodes": {
//!         "1": { "name": "Sequence", "children": ["2"] },
//!         "2": { "name": "Rest" }
//!     }
//! }"#, &registry).unwrap();
//!
//! let mut blackboard = Blackboard::default();
//! assert_eq!(tree.tick(&mut (), &mut blackboard), BehaviorResult::Success);
//! ```
//!
//!
//! ## Node lifecycle
//!
//! Each visit to a node runs up to five callbacks in this order:
//!
//! * `enter`: always
//! * `open`: only if the node was not left running by a previous tick
//! * `tick`: always, returns the status
//! * `close`: only if the status is not `Running`
//! * `exit`: always
//!
//! If a node returned `Running` in one tick and is not visited in the next one
//! (because some other branch was taken), the tree closes it after the traversal.
//! That is the only way to cancel a running node.
//!
//!
//! ## The tree document
//!
//! Trees are stored as a flat map of nodes keyed by id, in JSON or YAML.
//!
//! ```raw
//! {
//!   "id": "tree id", "title": "...", "description": "...",
//!   "root": "node id",
//!   "nodes": {
//!     "node id": {
//!       "name": "registered node type",
//!       "title": "...", "description": "...",
//!       "parameters": { ... }, "properties": { ... },
//!       "child": "node id",          # decorators
//!       "children": ["node id", ...] # composites
//!     }
//!   }
//! }
//! ```
//!
//! [`BehaviorTree::dump`] writes back the same shape with structure and metadata only.

mod blackboard;
mod container;
pub mod error;
mod nodes;
pub mod parser;
mod registry;
mod symbol;
mod tick;
mod tree;

pub use crate::blackboard::{Blackboard, Memory};
pub use crate::container::{BehaviorNodeContainer, NodeHeader};
pub use crate::nodes::{
    ErrorNode, FailerNode, InverterNode, LimiterNode, MaxTimeNode, MemPriorityNode,
    MemSequenceNode, PriorityNode, RepeatUntilFailureNode, RepeatUntilSuccessNode, RepeaterNode,
    RunnerNode, SequenceNode, SucceederNode, WaitNode,
};
pub use crate::symbol::Symbol;
pub use crate::tick::{EventLog, NodeEvent, Tick, TickObserver};
pub use crate::tree::BehaviorTree;
pub use crate::{
    parser::{load, NodeData, TreeData},
    registry::{boxify, boxify_with, get_parameter, Constructor, NodeSpec, Registry},
};
pub use ::once_cell::sync::Lazy;

use crate::error::StatusError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Static node configuration, and free-form editor properties.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[repr(i32)]
pub enum BehaviorResult {
    Success = 1,
    Failure = 2,
    /// The node should keep running in the next tick
    Running = 3,
    /// Something unexpected happened. It propagates like `Failure`, the host
    /// decides what to make of it.
    Error = 4,
}

impl From<BehaviorResult> for i32 {
    fn from(result: BehaviorResult) -> Self {
        result as i32
    }
}

impl TryFrom<i32> for BehaviorResult {
    type Error = StatusError;

    fn try_from(value: i32) -> Result<Self, StatusError> {
        match value {
            1 => Ok(BehaviorResult::Success),
            2 => Ok(BehaviorResult::Failure),
            3 => Ok(BehaviorResult::Running),
            4 => Ok(BehaviorResult::Error),
            _ => Err(StatusError(value)),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Composite,
    Decorator,
    Action,
    Condition,
}

impl Display for Category {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(match self {
            Self::Composite => "composite",
            Self::Decorator => "decorator",
            Self::Action => "action",
            Self::Condition => "condition",
        })
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum NumChildren {
    Finite(usize),
    Infinite,
}

impl PartialOrd for NumChildren {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(match (self, other) {
            (NumChildren::Finite(_), NumChildren::Infinite) => std::cmp::Ordering::Less,
            (NumChildren::Infinite, NumChildren::Finite(_)) => std::cmp::Ordering::Greater,
            (NumChildren::Finite(lhs), NumChildren::Finite(rhs)) => lhs.cmp(rhs),
            (NumChildren::Infinite, NumChildren::Infinite) => return None,
        })
    }
}

/// The behavior of a node.
///
/// Only `category` and `tick` are required. The other callbacks are no-ops by
/// default; override them to set up and tear down per-run state, which must be
/// kept in the blackboard (see [`Tick::set_memory`]) and never in `self`.
pub trait BehaviorNode<T = ()> {
    fn category(&self) -> Category;

    fn enter(&self, _tick: &mut Tick<T>) {}

    fn open(&self, _tick: &mut Tick<T>) {}

    /// Does the actual work. Composites and decorators propagate the tick to
    /// `children` with [`BehaviorNodeContainer::execute`].
    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult;

    fn close(&self, _tick: &mut Tick<T>) {}

    fn exit(&self, _tick: &mut Tick<T>) {}

    fn max_children(&self) -> NumChildren {
        match self.category() {
            Category::Composite => NumChildren::Infinite,
            Category::Decorator => NumChildren::Finite(1),
            Category::Action | Category::Condition => NumChildren::Finite(0),
        }
    }
}
