//! Behavior-tree AI
//!
//! An AI-bearing entity owns one [`BehaviorTree`], built once by its maker.
//! Each enemy turn the tree is ticked against the player; composites decide
//! which leaf runs, and action leaves return effect records for the turn loop.
//! Leaves share scratch state (a remembered travel target, an approach point)
//! through the tree's [`Namespace`], which is passed down explicitly in the
//! [`TickContext`].

mod nodes;
pub mod trees;

use core::fmt::Debug;

use hashbrown::HashMap;
use strum::Display;
use tracing::debug;

use crate::config::EngineConfig;
use crate::effect::EffectRecord;
use crate::entity::{Entity, EntityId};
use crate::geometry::Point;
use crate::rng::GameRng;
use crate::world::World;

pub use nodes::{
    AtLInfinityRadius, Attack, Chance, IsAdjacent, MoveTowards, MoveTowardsRadius, Skitter,
    SpawnEntity, TravelToRandomPosition, WithinFov, WithinRadius,
};

/// Result state of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Status {
    Success,
    Failure,
    /// Reserved; no node in this crate reports it
    Running,
}

/// What a node returned
#[derive(Debug, Clone)]
pub struct Tick {
    pub status: Status,
    pub effects: Vec<EffectRecord>,
}

impl Tick {
    pub fn success(effects: Vec<EffectRecord>) -> Self {
        Self {
            status: Status::Success,
            effects,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: Status::Failure,
            effects: Vec::new(),
        }
    }

    /// Outcome of a pure predicate
    pub fn check(condition: bool) -> Self {
        if condition {
            Self::success(Vec::new())
        } else {
            Self::failure()
        }
    }
}

/// Scratch value stored in a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Point(Point),
    Int(i32),
    Flag(bool),
}

/// Key-value scratch space owned by a tree
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    values: HashMap<&'static str, Value>,
}

impl Namespace {
    pub const TRAVEL_TARGET: &'static str = "travel_target";
    pub const APPROACH_POINT: &'static str = "approach_point";

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).copied()
    }

    pub fn point(&self, key: &str) -> Option<Point> {
        match self.get(key) {
            Some(Value::Point(p)) => Some(p),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &'static str, value: Value) {
        self.values.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}

/// Everything a node may look at while ticking
pub struct TickContext<'a> {
    pub owner: EntityId,
    pub target: EntityId,
    pub world: &'a World,
    pub rng: &'a mut GameRng,
    pub namespace: &'a mut Namespace,
    pub config: &'a EngineConfig,
}

impl<'a> TickContext<'a> {
    pub fn owner(&self) -> Option<&'a Entity> {
        self.world.get(self.owner)
    }

    pub fn target(&self) -> Option<&'a Entity> {
        self.world.get(self.target)
    }

    /// Owner and target positions, when both exist
    pub fn positions(&self) -> Option<(Point, Point)> {
        Some((self.owner()?.pos, self.target()?.pos))
    }
}

/// A node in a behavior tree
pub trait Behavior: BehaviorClone + Debug {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick;
}

#[doc(hidden)]
pub trait BehaviorClone {
    fn clone_box(&self) -> Box<dyn Behavior>;
}

impl<T> BehaviorClone for T
where
    T: 'static + Behavior + Clone,
{
    fn clone_box(&self) -> Box<dyn Behavior> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Behavior> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Ticks children in order; stops at the first failure and otherwise
/// reports the last child's result
#[derive(Debug, Clone)]
pub struct Sequence(pub Vec<Box<dyn Behavior>>);

impl Behavior for Sequence {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let mut last = Tick::success(Vec::new());
        for child in &mut self.0 {
            last = child.tick(ctx);
            if last.status == Status::Failure {
                break;
            }
        }
        last
    }
}

/// Ticks children in order; stops at the first success and otherwise fails
/// with no effects
#[derive(Debug, Clone)]
pub struct Selection(pub Vec<Box<dyn Behavior>>);

impl Behavior for Selection {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        for child in &mut self.0 {
            let tick = child.tick(ctx);
            if tick.status == Status::Success {
                return tick;
            }
        }
        Tick::failure()
    }
}

/// Flips success and failure of its child
#[derive(Debug, Clone)]
pub struct Negate(pub Box<dyn Behavior>);

impl Behavior for Negate {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let mut tick = self.0.tick(ctx);
        tick.status = match tick.status {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        };
        tick
    }
}

/// Box a node
pub fn node<B: Behavior + 'static>(behavior: B) -> Box<dyn Behavior> {
    Box::new(behavior)
}

/// Root node plus the namespace it shares with every descendant
#[derive(Debug, Clone)]
pub struct BehaviorTree {
    root: Box<dyn Behavior>,
    pub namespace: Namespace,
}

impl BehaviorTree {
    pub fn new(root: Box<dyn Behavior>) -> Self {
        Self {
            root,
            namespace: Namespace::default(),
        }
    }

    pub fn tick(
        &mut self,
        owner: EntityId,
        target: EntityId,
        world: &World,
        rng: &mut GameRng,
        config: &EngineConfig,
    ) -> Tick {
        let mut ctx = TickContext {
            owner,
            target,
            world,
            rng,
            namespace: &mut self.namespace,
            config,
        };
        let tick = self.root.tick(&mut ctx);
        debug!(
            entity = owner.0,
            status = %tick.status,
            effects = tick.effects.len(),
            "behavior tree ticked"
        );
        tick
    }
}

/// AI capability: a behavior tree ticked once per enemy turn
#[derive(Debug, Clone)]
pub struct Ai {
    pub tree: BehaviorTree,
}

impl Ai {
    pub fn new(root: Box<dyn Behavior>) -> Self {
        Self {
            tree: BehaviorTree::new(root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::map::GameMap;

    /// Fixed-result leaf for exercising composites
    #[derive(Debug, Clone)]
    struct Fixed {
        status: Status,
        label: &'static str,
        ticks: u32,
    }

    impl Fixed {
        fn new(status: Status, label: &'static str) -> Self {
            Self {
                status,
                label,
                ticks: 0,
            }
        }
    }

    impl Behavior for Fixed {
        fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
            self.ticks += 1;
            ctx.namespace.set(self.label, Value::Int(self.ticks as i32));
            match self.status {
                Status::Success => Tick::success(vec![EffectRecord::message(self.label)]),
                _ => Tick::failure(),
            }
        }
    }

    fn run(root: Box<dyn Behavior>) -> (Tick, Namespace) {
        let world = World::new(GameMap::new(3, 3));
        let mut tree = BehaviorTree::new(root);
        let mut rng = GameRng::new(1);
        let tick = tree.tick(
            EntityId(1),
            EntityId(2),
            &world,
            &mut rng,
            &EngineConfig::default(),
        );
        (tick, tree.namespace)
    }

    fn labels(tick: &Tick) -> Vec<String> {
        tick.effects
            .iter()
            .flat_map(|r| r.effects())
            .filter_map(|e| match e {
                Effect::Message(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_selection_returns_first_success() {
        let (tick, ns) = run(node(Selection(vec![
            node(Fixed::new(Status::Failure, "a")),
            node(Fixed::new(Status::Success, "b")),
            node(Fixed::new(Status::Success, "c")),
        ])));
        assert_eq!(tick.status, Status::Success);
        assert_eq!(labels(&tick), vec!["b"]);
        assert!(ns.get("c").is_none());
    }

    #[test]
    fn test_selection_all_fail_is_empty_failure() {
        let (tick, _) = run(node(Selection(vec![
            node(Fixed::new(Status::Failure, "a")),
            node(Fixed::new(Status::Failure, "b")),
        ])));
        assert_eq!(tick.status, Status::Failure);
        assert!(tick.effects.is_empty());
    }

    #[test]
    fn test_sequence_stops_at_failure() {
        let (tick, ns) = run(node(Sequence(vec![
            node(Fixed::new(Status::Success, "a")),
            node(Fixed::new(Status::Failure, "b")),
            node(Fixed::new(Status::Success, "c")),
        ])));
        assert_eq!(tick.status, Status::Failure);
        assert!(tick.effects.is_empty());
        assert!(ns.get("c").is_none());
    }

    #[test]
    fn test_sequence_reports_last_child() {
        let (tick, _) = run(node(Sequence(vec![
            node(Fixed::new(Status::Success, "a")),
            node(Fixed::new(Status::Success, "b")),
        ])));
        assert_eq!(tick.status, Status::Success);
        assert_eq!(labels(&tick), vec!["b"]);
    }

    #[test]
    fn test_negate_flips_and_keeps_effects() {
        let (tick, _) = run(node(Negate(node(Fixed::new(Status::Success, "a")))));
        assert_eq!(tick.status, Status::Failure);
        assert_eq!(labels(&tick), vec!["a"]);

        let (tick, _) = run(node(Negate(node(Fixed::new(Status::Failure, "b")))));
        assert_eq!(tick.status, Status::Success);
    }

    #[test]
    fn test_namespace_is_shared_across_nodes() {
        let (_, ns) = run(node(Sequence(vec![
            node(Fixed::new(Status::Success, "a")),
            node(Fixed::new(Status::Success, "b")),
        ])));
        assert_eq!(ns.get("a"), Some(Value::Int(1)));
        assert_eq!(ns.get("b"), Some(Value::Int(1)));
    }

    #[test]
    fn test_cloned_tree_is_independent() {
        let tree = BehaviorTree::new(node(Fixed::new(Status::Success, "a")));
        let mut copy = tree.clone();
        copy.namespace.set(Namespace::TRAVEL_TARGET, Value::Flag(true));
        assert!(tree.namespace.get(Namespace::TRAVEL_TARGET).is_none());
    }
}
