//! ASCII arenas
//!
//! Stand-in for the map-generation boundary: a hand-drawn layout becomes a
//! populated [`World`]. Every glyph other than a wall has floor under it.
//!
//! ```text
//! #########
//! #@..~~..#
//! #.o."^..#
//! #########
//! ```

use std::path::Path;

use crate::config::EngineConfig;
use crate::consts::*;
use crate::entity::{Entity, RenderOrder};
use crate::error::ArenaError;
use crate::geometry::Point;
use crate::maker;
use crate::map::{GameMap, Rect};
use crate::world::World;

/// Glyphs that place a thing on the floor
const PLACEABLE: &str = "~_\",&^@oTkjN!/[*?";

/// A parsed, validated layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    width: i32,
    height: i32,
    rows: Vec<Vec<char>>,
    player: Point,
}

impl Arena {
    pub fn parse(layout: &str) -> Result<Self, ArenaError> {
        let rows: Vec<Vec<char>> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.chars().collect())
            .collect();

        let Some(expected) = rows.first().map(Vec::len) else {
            return Err(ArenaError::Empty);
        };
        if expected == 0 {
            return Err(ArenaError::Empty);
        }

        let mut player = None;
        for (y, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(ArenaError::Ragged {
                    row: y,
                    expected,
                    found: row.len(),
                });
            }
            for (x, &glyph) in row.iter().enumerate() {
                let (x, y) = (x as i32, y as i32);
                if glyph != S_WALL && glyph != S_FLOOR && !PLACEABLE.contains(glyph) {
                    return Err(ArenaError::UnknownGlyph { glyph, x, y });
                }
                if glyph == S_PLAYER {
                    if player.is_some() {
                        return Err(ArenaError::DuplicatePlayer { x, y });
                    }
                    player = Some(Point::new(x, y));
                }
            }
        }

        Ok(Self {
            width: expected as i32,
            height: rows.len() as i32,
            player: player.ok_or(ArenaError::MissingPlayer)?,
            rows,
        })
    }

    /// Read and parse a layout file
    pub fn load(path: &Path) -> Result<Self, ArenaError> {
        let layout = std::fs::read_to_string(path).map_err(|e| ArenaError::CouldNotRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&layout)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn player_start(&self) -> Point {
        self.player
    }

    fn glyphs(&self) -> impl Iterator<Item = (Point, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &g)| (Point::new(x as i32, y as i32), g))
        })
    }

    /// Build the map and commit every entity the layout names
    pub fn into_world(&self, config: &EngineConfig) -> World {
        let mut map = GameMap::new(self.width, self.height);
        for (p, glyph) in self.glyphs() {
            map.set_walkable(p, glyph != S_WALL);
        }
        map.rooms.push(Rect {
            x1: 0,
            y1: 0,
            x2: self.width - 1,
            y2: self.height - 1,
        });

        let mut world = World::new(map);
        for (p, glyph) in self.glyphs() {
            if glyph == S_PLAYER {
                world.spawn_player(maker::player(p, config));
            } else if let Some(entity) = make(glyph, p, config) {
                world.spawn(entity);
            }
        }
        world
    }
}

fn make(glyph: char, p: Point, config: &EngineConfig) -> Option<Entity> {
    let entity = match glyph {
        S_WATER => maker::water(p),
        S_ICE => maker::ice(p),
        S_SHRUB => maker::shrub(p),
        S_GRASS => maker::grass(p),
        S_NECROTIC => maker::necrotic_soil(p, config.necrotic_damage),
        S_FIRE => maker::fire(p, config),
        'o' => maker::orc(p),
        'T' => maker::troll(p),
        'k' => maker::kruthik(p),
        'j' => maker::pink_jelly(p),
        'N' => maker::necromancer(p),
        '!' => maker::healing_potion(p),
        '/' => maker::sword(p),
        '[' => maker::armor(p),
        '*' => maker::firebomb(p),
        '?' => maker::magic_missile_scroll(p),
        _ => return None,
    };
    Some(entity)
}

/// Draw the world as ASCII, topmost render layer per tile
pub fn snapshot(world: &World) -> String {
    let map = &world.map;
    let mut grid: Vec<Vec<(RenderOrder, char)>> = (0..map.height())
        .map(|y| {
            (0..map.width())
                .map(|x| {
                    let glyph = if map.is_walkable(Point::new(x, y)) {
                        S_FLOOR
                    } else {
                        S_WALL
                    };
                    (RenderOrder::Terrain, glyph)
                })
                .collect()
        })
        .collect();

    for e in world.entities() {
        if let Some(cell) = grid
            .get_mut(e.pos.y as usize)
            .and_then(|row| row.get_mut(e.pos.x as usize))
        {
            if e.render_order >= cell.0 {
                *cell = (e.render_order, e.glyph);
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().map(|(_, g)| g).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Layer;

    const LAYOUT: &str = "\
#######
#@.~_o#
#.\"^!.#
#######
";

    #[test]
    fn test_parse_and_build() {
        let arena = Arena::parse(LAYOUT).unwrap();
        assert_eq!((arena.width(), arena.height()), (7, 4));
        assert_eq!(arena.player_start(), Point::new(1, 1));

        let world = arena.into_world(&EngineConfig::default());
        assert_eq!(world.player().map(|p| p.pos), Some(Point::new(1, 1)));
        assert!(world.map.is_water(Point::new(3, 1)));
        assert!(world.map.is_ice(Point::new(4, 1)));
        assert!(world.map.has_fire(Point::new(3, 2)));
        assert_eq!(world.map.count(Layer::Blocked), 2);
        assert_eq!(world.map.count(Layer::Terrain), 4);
        assert!(!world.map.is_walkable(Point::new(0, 0)));
        assert!(world.map.is_walkable(Point::new(5, 1)));
    }

    #[test]
    fn test_snapshot_round_trips_layout() {
        let world = Arena::parse(LAYOUT)
            .unwrap()
            .into_world(&EngineConfig::default());
        assert_eq!(snapshot(&world), LAYOUT.trim_end());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Arena::parse("\n\n"), Err(ArenaError::Empty));
        assert_eq!(Arena::parse("#.#\n#."), Err(ArenaError::Ragged {
            row: 1,
            expected: 3,
            found: 2
        }));
        assert_eq!(Arena::parse("#x@"), Err(ArenaError::UnknownGlyph {
            glyph: 'x',
            x: 1,
            y: 0
        }));
        assert_eq!(Arena::parse("#..#"), Err(ArenaError::MissingPlayer));
        assert!(matches!(
            Arena::load(Path::new("/nonexistent/arena.txt")),
            Err(ArenaError::CouldNotRead { .. })
        ));
        assert_eq!(
            Arena::parse("@.@"),
            Err(ArenaError::DuplicatePlayer { x: 2, y: 0 })
        );
    }
}
