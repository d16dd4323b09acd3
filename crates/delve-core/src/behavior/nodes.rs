//! Leaf nodes
//!
//! Conditions are predicates over owner/target geometry and map visibility and
//! never produce effects. Actions always succeed, with zero or more effects.

use tracing::{debug, warn};

use super::{Behavior, Namespace, Tick, TickContext, Value};
use crate::effect::{Effect, EffectRecord};
use crate::entity::Entity;
use crate::geometry::Point;

/// Owner touches its target
#[derive(Debug, Clone, Copy)]
pub struct IsAdjacent;

impl Behavior for IsAdjacent {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        Tick::check(
            ctx.positions()
                .is_some_and(|(owner, target)| owner.is_adjacent(target)),
        )
    }
}

/// Owner stands in the player's field of view
#[derive(Debug, Clone, Copy)]
pub struct WithinFov;

impl Behavior for WithinFov {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        Tick::check(ctx.owner().is_some_and(|o| ctx.world.map.is_in_fov(o.pos)))
    }
}

/// Target within Euclidean distance `r`
#[derive(Debug, Clone, Copy)]
pub struct WithinRadius(pub i32);

impl Behavior for WithinRadius {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let r = self.0;
        Tick::check(
            ctx.positions()
                .is_some_and(|(owner, target)| owner.distance_sq(target) <= r * r),
        )
    }
}

/// Target exactly `r` tiles away in Chebyshev distance
#[derive(Debug, Clone, Copy)]
pub struct AtLInfinityRadius(pub i32);

impl Behavior for AtLInfinityRadius {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let r = self.0;
        Tick::check(
            ctx.positions()
                .is_some_and(|(owner, target)| owner.chebyshev(target) == r),
        )
    }
}

/// Succeeds with probability `p`
#[derive(Debug, Clone, Copy)]
pub struct Chance(pub f64);

impl Behavior for Chance {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        Tick::check(ctx.rng.chance(self.0))
    }
}

/// Melee the target
#[derive(Debug, Clone, Copy)]
pub struct Attack;

impl Behavior for Attack {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let effects = ctx
            .owner()
            .and_then(|o| o.components.attacker.as_ref())
            .map(|attacker| attacker.attack(ctx.owner, ctx.target, ctx.world))
            .unwrap_or_default();
        Tick::success(effects)
    }
}

/// Step along the path to the target
#[derive(Debug, Clone, Copy)]
pub struct MoveTowards;

impl Behavior for MoveTowards {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let effects = ctx
            .target()
            .map(|t| {
                vec![EffectRecord::single(Effect::MoveTowards {
                    entity: ctx.owner,
                    target: t.pos,
                })]
            })
            .unwrap_or_default();
        Tick::success(effects)
    }
}

/// Approach a tile `r` tiles (Chebyshev) from the target, keeping distance
#[derive(Debug, Clone, Copy)]
pub struct MoveTowardsRadius(pub i32);

impl MoveTowardsRadius {
    fn ring(center: Point, r: i32) -> impl Iterator<Item = Point> {
        (-r..=r)
            .flat_map(move |dy| (-r..=r).map(move |dx| center.offset(dx, dy)))
            .filter(move |p| p.chebyshev(center) == r)
    }
}

impl Behavior for MoveTowardsRadius {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let Some((owner, target)) = ctx.positions() else {
            return Tick::success(Vec::new());
        };
        let r = self.0;
        if owner.chebyshev(target) == r {
            ctx.namespace.remove(Namespace::APPROACH_POINT);
            return Tick::success(Vec::new());
        }

        let world = ctx.world;
        let map = &world.map;
        let usable = |p: Point| p.chebyshev(target) == r && map.is_open(p) && !map.is_water(p);
        let point = ctx
            .namespace
            .point(Namespace::APPROACH_POINT)
            .filter(|p| usable(*p))
            .or_else(|| {
                Self::ring(target, r)
                    .filter(|p| usable(*p))
                    .min_by_key(|p| p.distance_sq(owner))
            });

        match point {
            Some(point) => {
                ctx.namespace
                    .set(Namespace::APPROACH_POINT, Value::Point(point));
                Tick::success(vec![EffectRecord::single(Effect::MoveTowards {
                    entity: ctx.owner,
                    target: point,
                })])
            }
            None => Tick::success(Vec::new()),
        }
    }
}

/// Scuttle onto a random open neighbouring tile
#[derive(Debug, Clone, Copy)]
pub struct Skitter;

impl Behavior for Skitter {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let Some(owner) = ctx.owner() else {
            return Tick::success(Vec::new());
        };
        let options = ctx.world.map.open_neighbors(owner.pos);
        let effects = ctx
            .rng
            .choose(&options)
            .map(|p| {
                vec![EffectRecord::single(Effect::Move {
                    entity: ctx.owner,
                    dx: p.x - owner.pos.x,
                    dy: p.y - owner.pos.y,
                })]
            })
            .unwrap_or_default();
        Tick::success(effects)
    }
}

/// Wander towards a remembered random tile, picking a new one on arrival
#[derive(Debug, Clone, Copy)]
pub struct TravelToRandomPosition;

impl Behavior for TravelToRandomPosition {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let Some(owner) = ctx.owner() else {
            return Tick::success(Vec::new());
        };
        let remembered = ctx
            .namespace
            .point(Namespace::TRAVEL_TARGET)
            .filter(|p| *p != owner.pos && ctx.world.map.is_walkable(*p));

        let destination = remembered.or_else(|| {
            let picked = ctx
                .world
                .map
                .random_open_point(ctx.rng, ctx.config.spawn_max_tries);
            if picked.is_none() {
                warn!(entity = ctx.owner.0, "no travel target found");
            }
            picked
        });

        match destination {
            Some(p) => {
                ctx.namespace.set(Namespace::TRAVEL_TARGET, Value::Point(p));
                Tick::success(vec![EffectRecord::single(Effect::MoveTowards {
                    entity: ctx.owner,
                    target: p,
                })])
            }
            None => {
                ctx.namespace.remove(Namespace::TRAVEL_TARGET);
                Tick::success(Vec::new())
            }
        }
    }
}

/// Spawn a new entity on a random open tile next to the owner
#[derive(Debug, Clone, Copy)]
pub struct SpawnEntity {
    pub maker: fn(Point) -> Entity,
}

impl Behavior for SpawnEntity {
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Tick {
        let Some(owner) = ctx.owner() else {
            return Tick::success(Vec::new());
        };
        let neighbors = owner.pos.neighbors();
        let world = ctx.world;
        let map = &world.map;

        for _ in 0..ctx.config.spawn_max_tries {
            let Some(&p) = ctx.rng.choose(&neighbors) else {
                break;
            };
            if map.is_open(p) && !map.is_water(p) {
                let spawned = (self.maker)(p);
                debug!(entity = ctx.owner.0, at = ?p, name = %spawned.name, "spawning");
                return Tick::success(vec![
                    EffectRecord::message(format!("{} summons a {}.", owner.name, spawned.name))
                        .with(Effect::AddEntity(Box::new(spawned))),
                ]);
            }
        }
        warn!(entity = ctx.owner.0, "spawn search exhausted");
        Tick::success(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{BehaviorTree, Status, node};
    use crate::config::EngineConfig;
    use crate::entity::EntityId;
    use crate::maker;
    use crate::map::{GameMap, Rect};
    use crate::rng::GameRng;
    use crate::world::World;

    struct Fixture {
        world: World,
        owner: EntityId,
        target: EntityId,
    }

    fn fixture(owner: Point, target: Point) -> Fixture {
        let mut map = GameMap::new(12, 12);
        map.carve_room(Rect::new(1, 1, 9, 9));
        let mut world = World::new(map);
        let owner = world.spawn(maker::orc(owner));
        let target = world.spawn_player(maker::player(target, &EngineConfig::default()));
        Fixture {
            world,
            owner,
            target,
        }
    }

    fn tick(f: &Fixture, behavior: Box<dyn Behavior>) -> (Tick, BehaviorTree) {
        let mut tree = BehaviorTree::new(behavior);
        let mut rng = GameRng::new(11);
        let t = tree.tick(
            f.owner,
            f.target,
            &f.world,
            &mut rng,
            &EngineConfig::default(),
        );
        (t, tree)
    }

    #[test]
    fn test_adjacency_conditions() {
        let f = fixture(Point::new(3, 3), Point::new(4, 4));
        assert_eq!(tick(&f, node(IsAdjacent)).0.status, Status::Success);
        assert_eq!(tick(&f, node(WithinRadius(1))).0.status, Status::Failure);
        assert_eq!(tick(&f, node(WithinRadius(2))).0.status, Status::Success);
        assert_eq!(tick(&f, node(AtLInfinityRadius(1))).0.status, Status::Success);
        assert_eq!(tick(&f, node(AtLInfinityRadius(2))).0.status, Status::Failure);
    }

    #[test]
    fn test_conditions_have_no_effects() {
        let f = fixture(Point::new(3, 3), Point::new(4, 4));
        for behavior in [node(IsAdjacent), node(WithinFov), node(WithinRadius(9))] {
            assert!(tick(&f, behavior).0.effects.is_empty());
        }
    }

    #[test]
    fn test_attack_emits_damage_for_power() {
        let f = fixture(Point::new(3, 3), Point::new(4, 4));
        let (t, _) = tick(&f, node(Attack));
        assert_eq!(t.status, Status::Success);
        let damage = t
            .effects
            .iter()
            .flat_map(|r| r.effects())
            .find_map(|e| match e {
                Effect::Damage { amount, target, .. } => Some((*amount, *target)),
                _ => None,
            });
        assert_eq!(damage, Some((3, f.target)));
    }

    #[test]
    fn test_move_towards_radius_targets_ring() {
        let f = fixture(Point::new(2, 2), Point::new(7, 7));
        let (t, tree) = tick(&f, node(MoveTowardsRadius(3)));
        let remembered = tree.namespace.point(Namespace::APPROACH_POINT);
        assert_eq!(remembered.map(|p| p.chebyshev(Point::new(7, 7))), Some(3));
        assert!(matches!(
            t.effects[0].effects()[0],
            Effect::MoveTowards { target, .. } if Some(target) == remembered
        ));
    }

    #[test]
    fn test_travel_remembers_destination() {
        let f = fixture(Point::new(2, 2), Point::new(7, 7));
        let (t, tree) = tick(&f, node(TravelToRandomPosition));
        assert_eq!(t.status, Status::Success);
        let p = tree.namespace.point(Namespace::TRAVEL_TARGET);
        assert!(p.is_some_and(|p| f.world.map.is_walkable(p)));
    }

    #[test]
    fn test_spawn_places_on_open_neighbor() {
        let f = fixture(Point::new(5, 5), Point::new(8, 8));
        let (t, _) = tick(&f, node(SpawnEntity { maker: maker::zombie }));
        let spawned = t
            .effects
            .iter()
            .flat_map(|r| r.effects())
            .find_map(|e| match e {
                Effect::AddEntity(e) => Some(e.pos),
                _ => None,
            });
        assert!(spawned.is_some_and(|p| p.is_adjacent(Point::new(5, 5))));
    }

    #[test]
    fn test_spawn_fails_quietly_when_boxed_in() {
        let mut map = GameMap::new(3, 3);
        map.set_walkable(Point::new(1, 1), true);
        let mut world = World::new(map);
        let owner = world.spawn(maker::necromancer(Point::new(1, 1)));
        let f = Fixture {
            world,
            owner,
            target: owner,
        };
        let (t, _) = tick(&f, node(SpawnEntity { maker: maker::zombie }));
        assert_eq!(t.status, Status::Success);
        assert!(t.effects.is_empty());
    }
}
