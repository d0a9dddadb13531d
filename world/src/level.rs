//! Level descriptions loaded from TOML and turned into ready-to-run game areas.
//!
//! A level lists its starting resources, the path graph (either explicit
//! nodes or a flat list of tiles), the build spots, the monster and tower
//! prototypes and the wave schedules.

use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use waypoint_defence_core::{
    Catalog, ConfigurationError, GridCoord, MonsterKind, NodeId, TowerKind,
};
use waypoint_defence_system_movement::{Monster, MonsterStats};
use waypoint_defence_system_navigation::{Node, PathGraph};
use waypoint_defence_system_scenario::{Scenario, Wave, WaveEntry, WaveSchedule};
use waypoint_defence_system_tower_combat::{Tower, TowerStats};

use crate::{Config, GameArea};

/// Serializable description of a single level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelDescription {
    /// Gold available before the first tick.
    pub starting_gold: u32,
    /// Lives available before the first tick.
    pub starting_life: u32,
    /// Explicit path graph nodes.
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    /// Flat path as `[column, row]` pairs, the first tile being the spawn.
    #[serde(default)]
    pub path: Vec<[u32; 2]>,
    /// Build spot tiles as `[column, row]` pairs, in identifier order.
    #[serde(default)]
    pub build_spots: Vec<[u32; 2]>,
    /// Monster prototypes.
    #[serde(default)]
    pub monsters: Vec<MonsterDescription>,
    /// Tower prototypes.
    #[serde(default)]
    pub towers: Vec<TowerDescription>,
    /// Wave schedules.
    #[serde(default)]
    pub waves: Vec<WaveDescription>,
}

/// One node of an explicit path graph.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDescription {
    /// Node identifier referenced by `next` lists.
    pub id: u32,
    /// Tile column.
    pub column: u32,
    /// Tile row.
    pub row: u32,
    /// Successor identifiers; empty for exits.
    #[serde(default)]
    pub next: Vec<u32>,
}

/// Monster prototype entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonsterDescription {
    /// Prototype key.
    pub kind: MonsterKind,
    /// Starting health.
    pub health: u32,
    /// Tiles per second.
    pub speed: f32,
    /// Lives taken on escape.
    pub damage: u32,
    /// Gold granted on kill.
    pub reward: u32,
}

/// Tower prototype entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TowerDescription {
    /// Prototype key.
    pub kind: TowerKind,
    /// Targeting radius in tiles.
    pub range: f32,
    /// Damage per shot.
    pub damage: u32,
    /// Minimum time between shots in milliseconds.
    pub cooldown_ms: u64,
    /// Purchase price in gold.
    pub cost: u32,
}

/// Wave schedule entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveDescription {
    /// Offset from level start in milliseconds.
    #[serde(default)]
    pub start_ms: u64,
    /// Spawns relative to `start_ms`.
    #[serde(default)]
    pub entries: Vec<WaveEntryDescription>,
}

/// Group of identical spawns inside a wave.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveEntryDescription {
    /// Monster prototype to spawn.
    pub monster: MonsterKind,
    /// Offset of the first spawn from the wave start in milliseconds.
    #[serde(default)]
    pub at_ms: u64,
    /// Number of spawns.
    #[serde(default = "one")]
    pub count: u32,
    /// Spacing between consecutive spawns in milliseconds.
    #[serde(default)]
    pub interval_ms: u64,
}

/// Largest number of spawns a single wave entry may expand into.
pub const MAX_ENTRY_COUNT: u32 = 10_000;

const fn one() -> u32 {
    1
}

impl LevelDescription {
    /// Parses a level from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] when the text is not a valid
    /// level description.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(text).map_err(|error| {
            let error = ConfigurationError::Parse(error.to_string());
            tracing::error!(%error, "failed to parse level description");
            error
        })
    }

    /// Simulation settings derived from this level.
    #[must_use]
    pub const fn config(&self, rng_seed: u64) -> Config {
        Config::new(self.starting_gold, self.starting_life, rng_seed)
    }

    /// Validates the description and creates a game area seeded with `rng_seed`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] describing the first problem found.
    pub fn build(&self, rng_seed: u64) -> Result<GameArea, ConfigurationError> {
        self.build_with_config(self.config(rng_seed))
    }

    /// Creates a game area with explicit settings, ignoring the level's
    /// starting resources.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] describing the first problem found.
    pub fn build_with_config(&self, config: Config) -> Result<GameArea, ConfigurationError> {
        let area = self.assemble(config).map_err(|error| {
            tracing::error!(%error, "level description rejected");
            error
        })?;
        tracing::info!(
            nodes = self.nodes.len().max(self.path.len()),
            build_spots = self.build_spots.len(),
            waves = self.waves.len(),
            seed = config.rng_seed(),
            "level loaded"
        );
        Ok(area)
    }

    fn assemble(&self, config: Config) -> Result<GameArea, ConfigurationError> {
        if config.starting_life() == 0 {
            return Err(invalid("level", "starting_life", "must be positive"));
        }

        let graph = Arc::new(self.path_graph()?);
        let monsters = Arc::new(self.monster_catalog()?);
        let towers = Arc::new(self.tower_catalog()?);
        let scenario = Scenario::new(self.schedules()?, Arc::clone(&monsters));

        if let Some(kind) = scenario
            .referenced_kinds()
            .into_iter()
            .find(|kind| !monsters.contains(*kind))
        {
            return Err(ConfigurationError::MissingMonsterPrototype(kind));
        }

        let build_spots = self
            .build_spots
            .iter()
            .map(|&[column, row]| GridCoord::new(column, row))
            .collect();

        GameArea::new(config, graph, towers, scenario, build_spots)
    }

    fn path_graph(&self) -> Result<PathGraph, ConfigurationError> {
        match (self.nodes.is_empty(), self.path.is_empty()) {
            (true, true) => Err(ConfigurationError::EmptyGraph),
            (false, false) => Err(ConfigurationError::AmbiguousPath),
            (true, false) => {
                let tiles: Vec<GridCoord> = self
                    .path
                    .iter()
                    .map(|&[column, row]| GridCoord::new(column, row))
                    .collect();
                PathGraph::linear(&tiles)
            }
            (false, true) => PathGraph::from_nodes(
                self.nodes
                    .iter()
                    .map(|node| {
                        Node::new(
                            NodeId::new(node.id),
                            GridCoord::new(node.column, node.row),
                            node.next.iter().copied().map(NodeId::new).collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }

    fn monster_catalog(&self) -> Result<Catalog<MonsterKind, Monster>, ConfigurationError> {
        let mut catalog = Catalog::new();
        for description in &self.monsters {
            let subject = format!("monster {:?}", description.kind);
            if description.health == 0 {
                return Err(invalid(&subject, "health", "must be positive"));
            }
            if !description.speed.is_finite() || description.speed <= 0.0 {
                return Err(invalid(&subject, "speed", "must be positive and finite"));
            }
            let monster = Monster::new(
                description.kind,
                MonsterStats {
                    health: description.health,
                    speed: description.speed,
                    damage: description.damage,
                    reward: description.reward,
                },
            );
            if catalog.register(description.kind, monster).is_some() {
                tracing::warn!(kind = ?description.kind, "monster prototype replaced");
            }
        }
        Ok(catalog)
    }

    fn tower_catalog(&self) -> Result<Catalog<TowerKind, Tower>, ConfigurationError> {
        let mut catalog = Catalog::new();
        for description in &self.towers {
            let subject = format!("tower {:?}", description.kind);
            if !description.range.is_finite() || description.range <= 0.0 {
                return Err(invalid(&subject, "range", "must be positive and finite"));
            }
            if description.cooldown_ms == 0 {
                return Err(invalid(&subject, "cooldown_ms", "must be positive"));
            }
            let tower = Tower::new(
                description.kind,
                TowerStats {
                    range: description.range,
                    damage: description.damage,
                    cooldown: Duration::from_millis(description.cooldown_ms),
                    cost: description.cost,
                },
            );
            if catalog.register(description.kind, tower).is_some() {
                tracing::warn!(kind = ?description.kind, "tower prototype replaced");
            }
        }
        Ok(catalog)
    }

    fn schedules(&self) -> Result<Vec<WaveSchedule>, ConfigurationError> {
        self.waves
            .iter()
            .enumerate()
            .map(|(index, wave)| {
                let mut entries = Vec::new();
                for group in &wave.entries {
                    if group.count == 0 {
                        return Err(invalid(
                            &format!("wave {index}"),
                            "count",
                            "must be positive",
                        ));
                    }
                    if group.count > MAX_ENTRY_COUNT {
                        return Err(invalid(
                            &format!("wave {index}"),
                            "count",
                            "exceeds the per-entry spawn limit",
                        ));
                    }
                    let mut at = Duration::from_millis(group.at_ms);
                    for _ in 0..group.count {
                        entries.push(WaveEntry::new(group.monster, at));
                        at = at.saturating_add(Duration::from_millis(group.interval_ms));
                    }
                }
                Ok(WaveSchedule::new(
                    Duration::from_millis(wave.start_ms),
                    Wave::new(entries),
                ))
            })
            .collect()
    }
}

fn invalid(subject: &str, field: &'static str, reason: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        subject: subject.to_owned(),
        field,
        reason,
    }
}
