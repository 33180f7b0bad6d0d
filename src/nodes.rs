use crate::{
    error::ParameterError, get_parameter, BehaviorNode, BehaviorNodeContainer, BehaviorResult,
    Category, Lazy, Parameters, Symbol, Tick,
};
use std::time::{Duration, Instant};

static RUNNING_CHILD: Lazy<Symbol> = Lazy::new(|| "runningChild".into());
static LOOP_COUNT: Lazy<Symbol> = Lazy::new(|| "i".into());
static START_TIME: Lazy<Symbol> = Lazy::new(|| "startTime".into());

fn is_done(status: BehaviorResult) -> bool {
    matches!(status, BehaviorResult::Success | BehaviorResult::Failure)
}

/// Reads `maxLoop`, where a negative value means no limit.
fn max_loop(params: &Parameters) -> Result<Option<usize>, ParameterError> {
    Ok(get_parameter::<i64>(params, "maxLoop")?
        .and_then(|value| usize::try_from(value).ok()))
}

fn elapsed_since_open<T>(tick: &Tick<T>) -> Duration {
    tick.memory::<Instant>(*START_TIME)
        .map(Instant::elapsed)
        .unwrap_or_default()
}

/// Ticks the children in order until one of them does not succeed.
#[derive(Default, Clone, Copy)]
pub struct SequenceNode;

impl<T> BehaviorNode<T> for SequenceNode {
    fn category(&self) -> Category {
        Category::Composite
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        for child in children {
            let status = child.execute(tick);
            if status != BehaviorResult::Success {
                return status;
            }
        }
        BehaviorResult::Success
    }
}

/// Ticks the children in order until one of them does not fail.
#[derive(Default, Clone, Copy)]
pub struct PriorityNode;

impl<T> BehaviorNode<T> for PriorityNode {
    fn category(&self) -> Category {
        Category::Composite
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        for child in children {
            let status = child.execute(tick);
            if status != BehaviorResult::Failure {
                return status;
            }
        }
        BehaviorResult::Failure
    }
}

/// Like [`SequenceNode`], but resumes from the child that returned `Running`
/// instead of starting over.
#[derive(Default, Clone, Copy)]
pub struct MemSequenceNode;

impl<T> BehaviorNode<T> for MemSequenceNode {
    fn category(&self) -> Category {
        Category::Composite
    }

    fn open(&self, tick: &mut Tick<T>) {
        tick.set_memory(*RUNNING_CHILD, 0usize);
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        let from = tick.memory::<usize>(*RUNNING_CHILD).copied().unwrap_or(0);
        for (i, child) in children.iter().enumerate().skip(from) {
            let status = child.execute(tick);
            if status != BehaviorResult::Success {
                if status == BehaviorResult::Running {
                    tick.set_memory(*RUNNING_CHILD, i);
                }
                return status;
            }
        }
        BehaviorResult::Success
    }
}

/// Like [`PriorityNode`], but resumes from the child that returned `Running`
/// instead of starting over.
#[derive(Default, Clone, Copy)]
pub struct MemPriorityNode;

impl<T> BehaviorNode<T> for MemPriorityNode {
    fn category(&self) -> Category {
        Category::Composite
    }

    fn open(&self, tick: &mut Tick<T>) {
        tick.set_memory(*RUNNING_CHILD, 0usize);
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        let from = tick.memory::<usize>(*RUNNING_CHILD).copied().unwrap_or(0);
        for (i, child) in children.iter().enumerate().skip(from) {
            let status = child.execute(tick);
            if status != BehaviorResult::Failure {
                if status == BehaviorResult::Running {
                    tick.set_memory(*RUNNING_CHILD, i);
                }
                return status;
            }
        }
        BehaviorResult::Failure
    }
}

/// Swaps `Success` and `Failure` of the child.
#[derive(Default, Clone, Copy)]
pub struct InverterNode;

impl<T> BehaviorNode<T> for InverterNode {
    fn category(&self) -> Category {
        Category::Decorator
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        let Some(child) = children.first() else {
            return BehaviorResult::Error;
        };
        match child.execute(tick) {
            BehaviorResult::Success => BehaviorResult::Failure,
            BehaviorResult::Failure => BehaviorResult::Success,
            status => status,
        }
    }
}

/// Lets the child complete at most `maxLoop` times, then fails without ticking
/// it. The count is kept per agent and is never reset.
#[derive(Clone, Copy)]
pub struct LimiterNode {
    max_loop: usize,
}

impl LimiterNode {
    pub fn new(max_loop: usize) -> Self {
        Self { max_loop }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        get_parameter::<usize>(params, "maxLoop")?
            .map(Self::new)
            .ok_or_else(|| ParameterError::missing("maxLoop"))
    }
}

impl<T> BehaviorNode<T> for LimiterNode {
    fn category(&self) -> Category {
        Category::Decorator
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        let Some(child) = children.first() else {
            return BehaviorResult::Error;
        };
        let i = tick.memory::<usize>(*LOOP_COUNT).copied().unwrap_or(0);
        if i < self.max_loop {
            let status = child.execute(tick);
            if is_done(status) {
                tick.set_memory(*LOOP_COUNT, i + 1);
            }
            return status;
        }
        BehaviorResult::Failure
    }
}

/// Fails if the child is still working after `maxTime` milliseconds since this
/// node was opened.
#[derive(Clone, Copy)]
pub struct MaxTimeNode {
    max_time: Duration,
}

impl MaxTimeNode {
    pub fn new(max_time: Duration) -> Self {
        Self { max_time }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        get_parameter::<u64>(params, "maxTime")?
            .map(|ms| Self::new(Duration::from_millis(ms)))
            .ok_or_else(|| ParameterError::missing("maxTime"))
    }
}

impl<T> BehaviorNode<T> for MaxTimeNode {
    fn category(&self) -> Category {
        Category::Decorator
    }

    fn open(&self, tick: &mut Tick<T>) {
        tick.set_memory(*START_TIME, Instant::now());
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        let Some(child) = children.first() else {
            return BehaviorResult::Error;
        };
        let status = child.execute(tick);
        if elapsed_since_open(tick) > self.max_time {
            return BehaviorResult::Failure;
        }
        status
    }
}

/// Which child results keep a repeating decorator looping.
#[derive(Clone, Copy)]
enum RepeatPolicy {
    UntilRunning,
    UntilFailure,
    UntilSuccess,
}

impl RepeatPolicy {
    fn keeps_looping(self, status: BehaviorResult) -> bool {
        match self {
            Self::UntilRunning => is_done(status),
            Self::UntilFailure => status == BehaviorResult::Success,
            Self::UntilSuccess => status == BehaviorResult::Failure,
        }
    }
}

/// Shared loop of the repeating decorators. The iteration count survives
/// `Running` results and is reset on `open`.
fn repeat<T>(
    tick: &mut Tick<T>,
    children: &[BehaviorNodeContainer<T>],
    max_loop: Option<usize>,
    policy: RepeatPolicy,
) -> BehaviorResult {
    let Some(child) = children.first() else {
        return BehaviorResult::Error;
    };
    let mut i = tick.memory::<usize>(*LOOP_COUNT).copied().unwrap_or(0);
    let mut status = BehaviorResult::Success;
    while max_loop.map_or(true, |max_loop| i < max_loop) {
        status = child.execute(tick);
        if policy.keeps_looping(status) {
            i += 1;
        } else {
            break;
        }
    }
    tick.set_memory(*LOOP_COUNT, i);
    status
}

/// Repeats the child `maxLoop` times, or forever if `maxLoop` is negative or
/// absent, stopping early only on `Running` or `Error`.
#[derive(Default, Clone, Copy)]
pub struct RepeaterNode {
    max_loop: Option<usize>,
}

impl RepeaterNode {
    pub fn new(max_loop: Option<usize>) -> Self {
        Self { max_loop }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        Ok(Self::new(max_loop(params)?))
    }
}

impl<T> BehaviorNode<T> for RepeaterNode {
    fn category(&self) -> Category {
        Category::Decorator
    }

    fn open(&self, tick: &mut Tick<T>) {
        tick.set_memory(*LOOP_COUNT, 0usize);
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        repeat(tick, children, self.max_loop, RepeatPolicy::UntilRunning)
    }
}

/// Repeats the child while it succeeds, up to `maxLoop` times.
#[derive(Default, Clone, Copy)]
pub struct RepeatUntilFailureNode {
    max_loop: Option<usize>,
}

impl RepeatUntilFailureNode {
    pub fn new(max_loop: Option<usize>) -> Self {
        Self { max_loop }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        Ok(Self::new(max_loop(params)?))
    }
}

impl<T> BehaviorNode<T> for RepeatUntilFailureNode {
    fn category(&self) -> Category {
        Category::Decorator
    }

    fn open(&self, tick: &mut Tick<T>) {
        tick.set_memory(*LOOP_COUNT, 0usize);
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        repeat(tick, children, self.max_loop, RepeatPolicy::UntilFailure)
    }
}

/// Repeats the child while it fails, up to `maxLoop` times.
#[derive(Default, Clone, Copy)]
pub struct RepeatUntilSuccessNode {
    max_loop: Option<usize>,
}

impl RepeatUntilSuccessNode {
    pub fn new(max_loop: Option<usize>) -> Self {
        Self { max_loop }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        Ok(Self::new(max_loop(params)?))
    }
}

impl<T> BehaviorNode<T> for RepeatUntilSuccessNode {
    fn category(&self) -> Category {
        Category::Decorator
    }

    fn open(&self, tick: &mut Tick<T>) {
        tick.set_memory(*LOOP_COUNT, 0usize);
    }

    fn tick(&self, tick: &mut Tick<T>, children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        repeat(tick, children, self.max_loop, RepeatPolicy::UntilSuccess)
    }
}

#[derive(Default, Clone, Copy)]
pub struct SucceederNode;

impl<T> BehaviorNode<T> for SucceederNode {
    fn category(&self) -> Category {
        Category::Action
    }

    fn tick(&self, _tick: &mut Tick<T>, _children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        BehaviorResult::Success
    }
}

#[derive(Default, Clone, Copy)]
pub struct FailerNode;

impl<T> BehaviorNode<T> for FailerNode {
    fn category(&self) -> Category {
        Category::Action
    }

    fn tick(&self, _tick: &mut Tick<T>, _children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        BehaviorResult::Failure
    }
}

#[derive(Default, Clone, Copy)]
pub struct ErrorNode;

impl<T> BehaviorNode<T> for ErrorNode {
    fn category(&self) -> Category {
        Category::Action
    }

    fn tick(&self, _tick: &mut Tick<T>, _children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        BehaviorResult::Error
    }
}

#[derive(Default, Clone, Copy)]
pub struct RunnerNode;

impl<T> BehaviorNode<T> for RunnerNode {
    fn category(&self) -> Category {
        Category::Action
    }

    fn tick(&self, _tick: &mut Tick<T>, _children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        BehaviorResult::Running
    }
}

/// Keeps running until `milliseconds` have passed since it was opened.
#[derive(Default, Clone, Copy)]
pub struct WaitNode {
    duration: Duration,
}

impl WaitNode {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let ms = get_parameter::<u64>(params, "milliseconds")?.unwrap_or(0);
        Ok(Self::new(Duration::from_millis(ms)))
    }
}

impl<T> BehaviorNode<T> for WaitNode {
    fn category(&self) -> Category {
        Category::Action
    }

    fn open(&self, tick: &mut Tick<T>) {
        tick.set_memory(*START_TIME, Instant::now());
    }

    fn tick(&self, tick: &mut Tick<T>, _children: &[BehaviorNodeContainer<T>]) -> BehaviorResult {
        if elapsed_since_open(tick) >= self.duration {
            BehaviorResult::Success
        } else {
            BehaviorResult::Running
        }
    }
}
