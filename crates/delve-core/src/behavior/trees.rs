//! Monster archetypes as behavior-tree shapes

use super::nodes::*;
use super::{Ai, Negate, Selection, Sequence, node};
use crate::maker;

/// Melee when adjacent, chase when visible, otherwise wander
pub fn hunter() -> Ai {
    Ai::new(node(Selection(vec![
        node(Sequence(vec![node(IsAdjacent), node(Attack)])),
        node(Sequence(vec![node(WithinFov), node(MoveTowards)])),
        node(TravelToRandomPosition),
    ])))
}

/// Chases anything within `radius`, visible or not
pub fn tracker(radius: i32) -> Ai {
    Ai::new(node(Selection(vec![
        node(Sequence(vec![node(IsAdjacent), node(Attack)])),
        node(Sequence(vec![node(WithinRadius(radius)), node(MoveTowards)])),
        node(TravelToRandomPosition),
    ])))
}

/// Closes in when near, scuttles about at random otherwise
pub fn skitterer(radius: i32) -> Ai {
    Ai::new(node(Selection(vec![
        node(Sequence(vec![node(IsAdjacent), node(Attack)])),
        node(Sequence(vec![node(Negate(node(WithinRadius(radius)))), node(Skitter)])),
        node(MoveTowards),
    ])))
}

/// Keeps `distance` tiles from the player and raises zombies from there
pub fn summoner(distance: i32, chance: f64) -> Ai {
    Ai::new(node(Selection(vec![
        node(Sequence(vec![node(IsAdjacent), node(Attack)])),
        node(Sequence(vec![
            node(WithinFov),
            node(AtLInfinityRadius(distance)),
            node(Chance(chance)),
            node(SpawnEntity {
                maker: maker::zombie,
            }),
        ])),
        node(Sequence(vec![node(WithinFov), node(MoveTowardsRadius(distance))])),
        node(TravelToRandomPosition),
    ])))
}
