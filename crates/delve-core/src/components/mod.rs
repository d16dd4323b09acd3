//! Component capability set
//!
//! Every capability an entity may carry has a fixed slot in [`Components`].
//! Optional capabilities are `Option`s; the ones generic code queries
//! unconditionally ([`Harmable`], [`Commitable`], and the usable/throwable
//! halves of [`Item`]) have inert `Null`/default variants instead, so a check
//! like `entity.components.harmable.is_null()` covers both absence and no-op.
//!
//! Components never hold references to other entities' components. Verbs
//! that affect anything beyond their owner return [`EffectRecord`]s for the
//! turn loop to apply.
//!
//! [`EffectRecord`]: crate::effect::EffectRecord

mod combat;
mod commit;
mod environment;
mod items;
mod movable;

use strum::{Display, EnumDiscriminants, EnumIter};

pub use combat::{Attacker, Defender, HarmOutcome, Harmable, Vitality};
pub use commit::Commitable;
pub use environment::{
    Burnable, Dissipatable, Encroachable, Floatable, Spreadable, Swimmable, steam_child,
};
pub use items::{
    Consumable, Equipable, Equipment, Inventory, Item, ItemUse, Slot, Throwable, Usable, Uses,
};
pub use movable::Movable;

pub use crate::behavior::Ai;

/// The capability table of one entity
#[derive(Debug, Clone, Default)]
pub struct Components {
    pub attacker: Option<Attacker>,
    pub harmable: Harmable,
    pub defender: Option<Defender>,
    pub movable: Option<Movable>,
    pub burnable: Option<Burnable>,
    pub dissipatable: Option<Dissipatable>,
    pub spreadable: Option<Spreadable>,
    pub swimmable: Option<Swimmable>,
    pub floatable: Option<Floatable>,
    pub inventory: Option<Inventory>,
    pub item: Option<Item>,
    pub equipable: Option<Equipable>,
    pub equipment: Option<Equipment>,
    pub consumable: Option<Consumable>,
    pub ai: Option<Ai>,
    pub commitable: Commitable,
    pub encroachable: Option<Encroachable>,
}

/// A component value on its way into a slot
#[derive(Debug, Clone, EnumDiscriminants)]
#[strum_discriminants(name(ComponentKind))]
#[strum_discriminants(derive(Display, EnumIter, Hash))]
pub enum Component {
    Attacker(Attacker),
    Harmable(Harmable),
    Defender(Defender),
    Movable(Movable),
    Burnable(Burnable),
    Dissipatable(Dissipatable),
    Spreadable(Spreadable),
    Swimmable(Swimmable),
    Floatable(Floatable),
    Inventory(Inventory),
    Item(Item),
    Equipable(Equipable),
    Equipment(Equipment),
    Consumable(Consumable),
    Ai(Ai),
    Commitable(Commitable),
    Encroachable(Encroachable),
}

macro_rules! into_component {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$ty(value)
                }
            }
        )*
    };
}

into_component!(
    Attacker,
    Harmable,
    Defender,
    Movable,
    Burnable,
    Dissipatable,
    Spreadable,
    Swimmable,
    Floatable,
    Inventory,
    Item,
    Equipable,
    Equipment,
    Consumable,
    Ai,
    Commitable,
    Encroachable,
);
