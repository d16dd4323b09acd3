//! Entity makers
//!
//! One factory per kind of thing in the dungeon. Makers build fully equipped
//! entities but do not place them: hand the result to
//! [`World::spawn`](crate::world::World::spawn) or an `AddEntity` effect.

use crate::behavior::trees;
use crate::components::{
    Attacker, Burnable, Commitable, Consumable, Defender, Dissipatable, Encroachable, Equipable,
    Equipment, Floatable, Harmable, Inventory, Item, Movable, Slot, Spreadable, Swimmable,
    Throwable, Usable,
};
use crate::config::EngineConfig;
use crate::consts::*;
use crate::damage::{DamageCallback, DamageTransformer, Elements, Pipeline};
use crate::entity::{Color, Entity, RenderOrder};
use crate::geometry::Point;
use crate::map::{Avoid, TileFlags};

/// HP restored by a healing potion
pub const HEALING_AMOUNT: i32 = 8;
pub const FIREBOMB_DAMAGE: i32 = 6;
pub const FIREBOMB_RADIUS: i32 = 2;
pub const MAGIC_MISSILE_DAMAGE: i32 = 5;
pub const MAGIC_MISSILE_USES: u32 = 3;

pub fn player(pos: Point, config: &EngineConfig) -> Entity {
    Entity::new("Player", pos, S_PLAYER, Color::WHITE, true, RenderOrder::Actor)
        .with(Attacker::new(2))
        .with(Harmable::standard(30))
        .with(Defender::default())
        .with(Movable::new(Avoid::empty()))
        .with(Burnable::Flesh)
        .with(Swimmable::new(config.swim_stamina))
        .with(Inventory::new(config.inventory_capacity))
        .with(Equipment::default())
}

fn monster(
    name: &str,
    pos: Point,
    glyph: char,
    color: Color,
    hp: i32,
    power: i32,
) -> Entity {
    Entity::new(name, pos, glyph, color, true, RenderOrder::Actor)
        .with(Attacker::new(power))
        .with(Harmable::standard(hp))
        .with(Defender::default())
        .with(Movable::new(Avoid::WATER | Avoid::FIRE))
        .with(Burnable::Flesh)
}

pub fn orc(pos: Point) -> Entity {
    monster("Orc", pos, 'o', Color::DARK_GREEN, 10, 3).with(trees::hunter())
}

/// Big, armoured, and weak to fire
pub fn troll(pos: Point) -> Entity {
    let weakness = Pipeline::new().with_transformer(DamageTransformer::Elemental {
        strength: -2,
        element: Elements::FIRE,
    });
    let hide = Pipeline::new().with_transformer(DamageTransformer::Armor { defense: 1 });
    monster("Troll", pos, 'T', Color::GREEN, 20, 6)
        .with(Harmable::standard(20).with_pipeline(weakness))
        .with(Defender::new(hide))
        .with(trees::tracker(6))
}

pub fn kruthik(pos: Point) -> Entity {
    monster("Kruthik", pos, 'k', Color::BROWN, 2, 1).with(trees::skitterer(4))
}

/// Splits in two when hurt; floats, so only fire is avoided
pub fn pink_jelly(pos: Point) -> Entity {
    monster("Pink Jelly", pos, 'j', Color::PINK, 20, 1)
        .with(Harmable::pink_jelly(20))
        .with(Movable::new(Avoid::FIRE))
        .with(Floatable)
        .with(trees::hunter())
}

pub fn necromancer(pos: Point) -> Entity {
    monster("Necromancer", pos, 'N', Color::PURPLE, 8, 2).with(trees::summoner(3, 0.3))
}

pub fn zombie(pos: Point) -> Entity {
    let resist = Pipeline::new().with_transformer(DamageTransformer::Elemental {
        strength: 2,
        element: Elements::NECROTIC,
    });
    monster("Zombie", pos, 'Z', Color::GREY, 6, 2)
        .with(Harmable::standard(6).with_pipeline(resist))
        .with(trees::hunter())
}

fn terrain(name: &str, pos: Point, glyph: char, color: Color, layers: TileFlags) -> Entity {
    Entity::new(name, pos, glyph, color, false, RenderOrder::Terrain)
        .with(Commitable::terrain(layers))
}

pub fn water(pos: Point) -> Entity {
    terrain("Water", pos, S_WATER, Color::BLUE, TileFlags::WATER).with(Encroachable::Water)
}

pub fn ice(pos: Point) -> Entity {
    terrain("Ice", pos, S_ICE, Color::LIGHT_BLUE, TileFlags::ICE)
}

pub fn shrub(pos: Point) -> Entity {
    terrain("Shrub", pos, S_SHRUB, Color::GREEN, TileFlags::empty())
        .with(Burnable::Fuel)
        .with(Encroachable::Shrub)
}

pub fn grass(pos: Point) -> Entity {
    terrain("Grass", pos, S_GRASS, Color::DARK_GREEN, TileFlags::empty()).with(Burnable::Fuel)
}

pub fn necrotic_soil(pos: Point, damage: i32) -> Entity {
    terrain("Necrotic Soil", pos, S_NECROTIC, Color::PURPLE, TileFlags::empty())
        .with(Encroachable::NecroticSoil { damage })
}

pub fn fire(pos: Point, config: &EngineConfig) -> Entity {
    terrain("Fire", pos, S_FIRE, Color::ORANGE, TileFlags::FIRE)
        .with(Spreadable::Fire {
            probability: config.fire_spread_probability,
        })
        .with(Dissipatable {
            probability: config.fire_dissipate_probability,
        })
        .with(Encroachable::Fire)
}

/// A steam cloud; hangs over terrain rather than replacing it
pub fn steam(pos: Point, spread: f64, dissipate: f64) -> Entity {
    Entity::new("Steam", pos, S_STEAM, Color::WHITE, false, RenderOrder::Terrain)
        .with(Commitable::new(TileFlags::STEAM))
        .with(Spreadable::Steam { probability: spread })
        .with(Dissipatable {
            probability: dissipate,
        })
}

fn item(name: &str, pos: Point, glyph: char, color: Color) -> Entity {
    Entity::new(name, pos, glyph, color, false, RenderOrder::Item)
}

pub fn healing_potion(pos: Point) -> Entity {
    item("Healing Potion", pos, '!', Color::RED)
        .with(Item {
            usable: Usable::Heal {
                amount: HEALING_AMOUNT,
            },
            throwable: Throwable::Null,
        })
        .with(Consumable::finite(1))
}

/// +2 to hit, and every blow sweeps the two tiles flanking the target
pub fn sword(pos: Point) -> Entity {
    let mut equipable = Equipable::new(Slot::Weapon);
    equipable.offense = Pipeline::new()
        .with_transformer(DamageTransformer::Bonus { amount: 2 })
        .with_callback(DamageCallback::Sweep);
    item("Sword", pos, '/', Color::GREY)
        .with(Item::default())
        .with(equipable)
}

pub fn armor(pos: Point) -> Entity {
    let mut equipable = Equipable::new(Slot::Armor);
    equipable.defense = Pipeline::new()
        .with_transformer(DamageTransformer::Armor { defense: 2 })
        .with_callback(DamageCallback::Reflect { amount: 1 });
    item("Armor", pos, '[', Color::BROWN)
        .with(Item::default())
        .with(equipable)
}

pub fn firebomb(pos: Point) -> Entity {
    item("Firebomb", pos, '*', Color::ORANGE)
        .with(Item {
            usable: Usable::Null,
            throwable: Throwable::Fireblast {
                damage: FIREBOMB_DAMAGE,
                radius: FIREBOMB_RADIUS,
            },
        })
        .with(Consumable::finite(1))
}

pub fn magic_missile_scroll(pos: Point) -> Entity {
    item("Scroll of Magic Missile", pos, '?', Color::YELLOW)
        .with(Item {
            usable: Usable::Null,
            throwable: Throwable::MagicMissile {
                damage: MAGIC_MISSILE_DAMAGE,
            },
        })
        .with(Consumable::finite(MAGIC_MISSILE_USES))
}
