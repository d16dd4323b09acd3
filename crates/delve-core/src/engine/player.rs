//! Player actions
//!
//! Turns an [`Action`] into effect records. Refusals (walls, empty floors,
//! full packs) are messages that leave the turn unspent.

use super::{Action, Engine, GameState};
use crate::effect::{Effect, EffectRecord};
use crate::entity::EntityId;
use crate::geometry::Point;

/// Records produced by one player action
#[derive(Debug, Default)]
pub(super) struct PlayerTurn {
    pub records: Vec<EffectRecord>,
    /// Whether monsters get to act afterwards
    pub consumes_turn: bool,
}

impl PlayerTurn {
    fn acted(records: Vec<EffectRecord>) -> Self {
        Self {
            records,
            consumes_turn: true,
        }
    }

    fn free(records: Vec<EffectRecord>) -> Self {
        Self {
            records,
            consumes_turn: false,
        }
    }

    fn refused(text: &str) -> Self {
        Self::free(vec![EffectRecord::message(text)])
    }
}

impl Engine {
    /// `None` when the player quits
    pub(super) fn player_action(&mut self, action: Action) -> Option<PlayerTurn> {
        let Some(player) = self.world.player_id() else {
            return Some(PlayerTurn::default());
        };

        let turn = match (self.state, action) {
            (GameState::PlayerTurn, Action::Exit) => {
                self.set_state(GameState::Exited);
                return None;
            }
            (GameState::PlayerTurn, Action::Move { dx, dy }) => self.player_move(player, dx, dy),
            (GameState::PlayerTurn, Action::Wait) => PlayerTurn::acted(Vec::new()),
            (GameState::PlayerTurn, Action::Pickup) => self.pickup(player),
            (GameState::PlayerTurn, Action::ShowInventory) => {
                self.set_state(GameState::ShowInventory);
                PlayerTurn::default()
            }
            (GameState::PlayerTurn, Action::DropInventory) => {
                self.set_state(GameState::DropInventory);
                PlayerTurn::default()
            }
            (GameState::PlayerTurn, Action::ThrowInventory) => {
                self.set_state(GameState::ThrowInventory);
                PlayerTurn::default()
            }
            (GameState::ShowInventory, Action::InventoryIndex(i)) => {
                self.set_state(GameState::PlayerTurn);
                self.use_item(player, i)
            }
            (GameState::DropInventory, Action::InventoryIndex(i)) => {
                self.set_state(GameState::PlayerTurn);
                self.drop_from_inventory(player, i)
            }
            (GameState::ThrowInventory, Action::InventoryIndex(i)) => self.select_throw(player, i),
            (GameState::Targeting, Action::CursorSelect { x, y }) => {
                self.set_state(GameState::PlayerTurn);
                self.throw_at(player, Point::new(x, y))
            }
            (
                GameState::ShowInventory
                | GameState::DropInventory
                | GameState::ThrowInventory
                | GameState::Targeting,
                Action::Cancel | Action::Exit,
            ) => {
                self.pending_throw = None;
                self.set_state(GameState::PlayerTurn);
                PlayerTurn::default()
            }
            _ => PlayerTurn::default(),
        };
        Some(turn)
    }

    /// Bump-to-attack, otherwise step
    fn player_move(&mut self, player: EntityId, dx: i32, dy: i32) -> PlayerTurn {
        let Some(p) = self.world.get(player) else {
            return PlayerTurn::default();
        };
        if (dx, dy) == (0, 0) {
            return PlayerTurn::acted(Vec::new());
        }
        let to = p.pos.offset(dx, dy);

        let foe = self
            .world
            .blocking_at(to)
            .filter(|e| e.id != player && !e.components.harmable.is_null());
        if let Some(foe) = foe {
            let records = p
                .components
                .attacker
                .as_ref()
                .map(|a| a.attack(player, foe.id, &self.world))
                .unwrap_or_default();
            return PlayerTurn::acted(records);
        }

        let can_move = p
            .components
            .movable
            .and_then(|m| m.destination(&self.world.map, p.pos, dx, dy))
            .is_some();
        if can_move {
            PlayerTurn::acted(vec![EffectRecord::single(Effect::Move {
                entity: player,
                dx,
                dy,
            })])
        } else {
            PlayerTurn::refused("That way is blocked.")
        }
    }

    fn pickup(&mut self, player: EntityId) -> PlayerTurn {
        let Some(p) = self.world.get(player) else {
            return PlayerTurn::default();
        };
        let Some(item) = self.world.entities_at(p.pos).find(|e| e.is_item()) else {
            return PlayerTurn::refused("There is nothing here to pick up.");
        };
        let full = p
            .components
            .inventory
            .as_ref()
            .is_none_or(|inv| inv.is_full());
        if full {
            return PlayerTurn::refused("You cannot carry any more.");
        }
        PlayerTurn::acted(vec![EffectRecord::single(Effect::PickUp {
            entity: player,
            item: item.id,
        })])
    }

    /// Toggle equipment, or use the item on the player
    fn use_item(&mut self, player: EntityId, index: usize) -> PlayerTurn {
        let Some(p) = self.world.get(player) else {
            return PlayerTurn::default();
        };
        let Some(item) = p
            .components
            .inventory
            .as_ref()
            .and_then(|inv| inv.get(index))
        else {
            return PlayerTurn::refused("Invalid inventory slot.");
        };
        let equipped = p
            .components
            .equipment
            .is_some_and(|eq| eq.is_equipped(item.id));

        if equipped {
            return PlayerTurn::acted(vec![EffectRecord::single(Effect::Unequip {
                entity: player,
                item: item.id,
            })]);
        }
        if item.components.equipable.is_some() {
            return PlayerTurn::acted(vec![EffectRecord::single(Effect::Equip {
                entity: player,
                item: item.id,
            })]);
        }
        let Some(usable) = item.components.item.map(|i| i.usable) else {
            return PlayerTurn::refused("You cannot use that.");
        };

        let used = usable.use_on(p, item);
        if !used.spent {
            return PlayerTurn::free(used.records);
        }
        let mut records = vec![EffectRecord::single(Effect::Consume {
            entity: player,
            item: item.id,
        })];
        records.extend(used.records);
        PlayerTurn::acted(records)
    }

    fn drop_from_inventory(&mut self, player: EntityId, index: usize) -> PlayerTurn {
        let Some(p) = self.world.get(player) else {
            return PlayerTurn::default();
        };
        let Some(item) = p
            .components
            .inventory
            .as_ref()
            .and_then(|inv| inv.get(index))
        else {
            return PlayerTurn::refused("Invalid inventory slot.");
        };
        if p.components
            .equipment
            .is_some_and(|eq| eq.is_equipped(item.id))
        {
            return PlayerTurn::refused("You cannot drop an equipped item.");
        }
        PlayerTurn::acted(vec![EffectRecord::single(Effect::Drop {
            entity: player,
            item: item.id,
        })])
    }

    fn select_throw(&mut self, player: EntityId, index: usize) -> PlayerTurn {
        let throwable = self
            .world
            .get(player)
            .and_then(|p| p.components.inventory.as_ref())
            .and_then(|inv| inv.get(index))
            .and_then(|item| {
                let t = item.components.item?.throwable;
                (!t.is_null()).then_some(item.id)
            });
        match throwable {
            Some(item) => {
                self.pending_throw = Some(item);
                self.set_state(GameState::Targeting);
                PlayerTurn::refused("Select a target.")
            }
            None => {
                self.set_state(GameState::PlayerTurn);
                PlayerTurn::refused("You cannot throw that.")
            }
        }
    }

    fn throw_at(&mut self, player: EntityId, target: Point) -> PlayerTurn {
        let Some(item_id) = self.pending_throw.take() else {
            return PlayerTurn::default();
        };
        let Some(p) = self.world.get(player) else {
            return PlayerTurn::default();
        };
        let Some(item) = p
            .components
            .inventory
            .as_ref()
            .and_then(|inv| inv.find(item_id))
        else {
            return PlayerTurn::default();
        };
        let Some(throwable) = item.components.item.map(|i| i.throwable) else {
            return PlayerTurn::default();
        };

        let thrown = throwable.throw_at(p, item, target, &self.world, &self.config);
        if !thrown.spent {
            return PlayerTurn::free(thrown.records);
        }
        let mut records = vec![EffectRecord::single(Effect::Consume {
            entity: player,
            item: item_id,
        })];
        records.extend(thrown.records);
        PlayerTurn::acted(records)
    }
}
