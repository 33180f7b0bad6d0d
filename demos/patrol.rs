//! A guard that patrols until it spots an intruder, then chases it.
//!
//! Run with `RUST_LOG=behavior3=debug` to see stale nodes being closed, or pass
//! the path of a JSON or YAML tree document to run that instead of the built-in one.

use behavior3::{
    boxify, boxify_with, error::ParameterError, get_parameter, BehaviorNode,
    BehaviorNodeContainer, BehaviorResult, BehaviorTree, Blackboard, Category, EventLog,
    NodeEvent, NodeSpec, Parameters, Registry, Tick,
};
use tracing_subscriber::EnvFilter;

const TREE: &str = r#"{
    "id": "guard",
    "title": "Guard",
    "root": "root",
    "nodes": {
        "root": { "name": "Priority", "title": "Guard", "children": ["attack", "patrol"] },
        "attack": { "name": "MemSequence", "children": ["sight", "chase", "rest"] },
        "sight": { "name": "IntruderInSight" },
        "chase": { "name": "Chase" },
        "rest": { "name": "Wait", "parameters": { "milliseconds": 0 } },
        "patrol": { "name": "Patrol", "parameters": { "range": 4 } }
    }
}"#;

#[derive(Debug, Default)]
struct Guard {
    position: i32,
    intruder: Option<i32>,
}

struct IntruderInSight;

impl BehaviorNode<Guard> for IntruderInSight {
    fn category(&self) -> Category {
        Category::Condition
    }

    fn tick(&self, tick: &mut Tick<Guard>, _: &[BehaviorNodeContainer<Guard>]) -> BehaviorResult {
        match tick.target().intruder {
            Some(_) => BehaviorResult::Success,
            None => BehaviorResult::Failure,
        }
    }
}

struct Chase;

impl BehaviorNode<Guard> for Chase {
    fn category(&self) -> Category {
        Category::Action
    }

    fn tick(&self, tick: &mut Tick<Guard>, _: &[BehaviorNodeContainer<Guard>]) -> BehaviorResult {
        let guard = tick.target_mut();
        let Some(intruder) = guard.intruder else {
            return BehaviorResult::Failure;
        };
        guard.position += (intruder - guard.position).signum();
        if guard.position == intruder {
            guard.intruder = None;
            BehaviorResult::Success
        } else {
            BehaviorResult::Running
        }
    }
}

struct Patrol {
    range: i32,
}

impl Patrol {
    fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        get_parameter(params, "range")?
            .map(|range| Self { range })
            .ok_or_else(|| ParameterError::missing("range"))
    }
}

impl BehaviorNode<Guard> for Patrol {
    fn category(&self) -> Category {
        Category::Action
    }

    fn open(&self, tick: &mut Tick<Guard>) {
        tick.set_memory("direction", 1i32);
    }

    fn tick(&self, tick: &mut Tick<Guard>, _: &[BehaviorNodeContainer<Guard>]) -> BehaviorResult {
        let mut direction = tick.memory::<i32>("direction").copied().unwrap_or(1);
        let position = tick.target().position + direction;
        if position <= -self.range || self.range <= position {
            direction = -direction;
        }
        tick.set_memory("direction", direction);
        tick.target_mut().position = position;
        BehaviorResult::Running
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut registry = Registry::default();
    registry.register(
        NodeSpec::condition("IntruderInSight").with_title("Intruder in sight"),
        boxify(|| IntruderInSight),
    );
    registry.register(NodeSpec::action("Chase"), boxify(|| Chase));
    registry.register(
        NodeSpec::action("Patrol").with_parameter("range", 3),
        boxify_with(Patrol::from_parameters),
    );

    let tree = match std::env::args().nth(1) {
        Some(path) => {
            let src = std::fs::read_to_string(&path)?;
            if path.ends_with(".yaml") || path.ends_with(".yml") {
                BehaviorTree::load_yaml(&src, &registry)?
            } else {
                BehaviorTree::load_json(&src, &registry)?
            }
        }
        None => BehaviorTree::load_json(TREE, &registry)?,
    };

    let mut guard = Guard::default();
    let mut blackboard = Blackboard::new();
    let mut log = EventLog::default();

    for step in 0..12 {
        if step == 5 {
            guard.intruder = Some(guard.position - 3);
        }
        log.clear();
        let status = tree.tick_with_observer(&mut guard, &mut blackboard, &mut log);
        let ticked: Vec<_> = log
            .nodes(NodeEvent::Tick)
            .iter()
            .map(|id| id.to_string())
            .collect();
        println!(
            "step {step:2}: {status:?} at {:3} ticked [{}] open {:?}",
            guard.position,
            ticked.join(", "),
            tree.open_nodes(&blackboard)
        );
    }

    println!("{}", tree.dump_yaml()?);
    Ok(())
}
