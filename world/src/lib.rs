#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game area state management for Waypoint Defence.
//!
//! The [`GameArea`] owns every live monster, the build spots and their
//! towers, the gold ledger and the life counter. Adapters drive it through
//! [`apply`] (or the equivalent inherent methods) and read it through the
//! [`query`] module. One tick runs to completion inside a single `&mut`
//! call, so a host sharing the area across threads only needs to guard that
//! call to keep partially applied ticks unobservable.

mod build_spot;
mod economy;
pub mod level;

use std::{sync::Arc, time::Duration};

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use waypoint_defence_core::{
    BuildSpotId, Catalog, Command, ConfigurationError, Event, GridCoord, MonsterId, NodeId,
    Outcome, PlacementError, Position, SaleError, TowerKind,
};
use waypoint_defence_system_movement::Monster;
use waypoint_defence_system_navigation::PathGraph;
use waypoint_defence_system_scenario::Scenario;
use waypoint_defence_system_tower_combat::Tower;

pub use build_spot::BuildSpot;
pub use economy::EconomyManager;
pub use level::LevelDescription;

/// How long a shot stays visible to renderers unless configured otherwise.
pub const DEFAULT_SHOT_LIFETIME: Duration = Duration::from_millis(200);

/// Settings a game area is created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    starting_gold: u32,
    starting_life: u32,
    rng_seed: u64,
    shot_lifetime: Duration,
}

impl Config {
    /// Creates a configuration with the default shot lifetime.
    #[must_use]
    pub const fn new(starting_gold: u32, starting_life: u32, rng_seed: u64) -> Self {
        Self {
            starting_gold,
            starting_life,
            rng_seed,
            shot_lifetime: DEFAULT_SHOT_LIFETIME,
        }
    }

    /// Overrides how long shot records are kept for renderers.
    #[must_use]
    pub const fn with_shot_lifetime(mut self, shot_lifetime: Duration) -> Self {
        self.shot_lifetime = shot_lifetime;
        self
    }

    /// Gold available before the first tick.
    #[must_use]
    pub const fn starting_gold(&self) -> u32 {
        self.starting_gold
    }

    /// Lives available before the first tick.
    #[must_use]
    pub const fn starting_life(&self) -> u32 {
        self.starting_life
    }

    /// Seed for spawn node and route selection.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// How long shot records are kept for renderers.
    #[must_use]
    pub const fn shot_lifetime(&self) -> Duration {
        self.shot_lifetime
    }
}

/// Represents the authoritative state of one level playthrough.
///
/// Cloning deep-copies every monster, build spot, tower, the ledger, the life
/// counter, the remaining scenario schedule and the random number generator.
/// The path graph and the tower catalog are immutable and stay shared.
#[derive(Clone, Debug)]
pub struct GameArea {
    config: Config,
    graph: Arc<PathGraph>,
    spawn_nodes: Vec<NodeId>,
    tower_catalog: Arc<Catalog<TowerKind, Tower>>,
    scenario: Scenario,
    monsters: Vec<LiveMonster>,
    build_spots: Vec<BuildSpot>,
    economy: EconomyManager,
    life: u32,
    shots: Vec<ShotRecord>,
    elapsed: Duration,
    paused: bool,
    outcome: Option<Outcome>,
    next_monster_id: u32,
    rng: ChaCha8Rng,
}

#[derive(Clone, Debug)]
struct LiveMonster {
    id: MonsterId,
    monster: Monster,
}

#[derive(Clone, Copy, Debug)]
struct ShotRecord {
    from: Position,
    to: Position,
    fired_at: Duration,
}

impl GameArea {
    /// Creates a game area from injected level collaborators.
    ///
    /// Build spots receive identifiers in the order they are listed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoSpawnNodes`] when every node of
    /// `graph` has an incoming edge.
    pub fn new(
        config: Config,
        graph: Arc<PathGraph>,
        tower_catalog: Arc<Catalog<TowerKind, Tower>>,
        scenario: Scenario,
        build_spots: Vec<GridCoord>,
    ) -> Result<Self, ConfigurationError> {
        let spawn_nodes: Vec<NodeId> = graph.spawns().iter().map(|node| node.id()).collect();
        if spawn_nodes.is_empty() {
            return Err(ConfigurationError::NoSpawnNodes);
        }

        let build_spots = build_spots
            .into_iter()
            .zip(0_u32..)
            .map(|(coord, index)| BuildSpot::new(BuildSpotId::new(index), coord))
            .collect();

        Ok(Self {
            graph,
            spawn_nodes,
            tower_catalog,
            scenario,
            monsters: Vec::new(),
            build_spots,
            economy: EconomyManager::new(config.starting_gold),
            life: config.starting_life,
            shots: Vec::new(),
            elapsed: Duration::ZERO,
            paused: false,
            outcome: None,
            next_monster_id: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
        })
    }

    /// Runs one simulation tick.
    ///
    /// Ticks are no-ops while paused and after the level reached an outcome.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.paused || self.outcome.is_some() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        out.push(Event::TimeAdvanced { dt });

        self.spawn_due_monsters(dt, out);
        for live in &mut self.monsters {
            live.monster.update(dt);
        }
        self.reap_monsters(out);
        self.fire_towers(dt, out);
        self.reap_monsters(out);
        self.expire_shots();
        self.evaluate_outcome(out);
    }

    /// Buys a tower of `kind` onto `spot`.
    ///
    /// Rejections leave the area untouched and are reported as
    /// [`Event::TowerPlacementRejected`].
    pub fn place_tower(&mut self, spot: BuildSpotId, kind: TowerKind, out: &mut Vec<Event>) {
        let reject = |reason: PlacementError, out: &mut Vec<Event>| {
            tracing::debug!(spot = spot.get(), ?kind, ?reason, "tower placement rejected");
            out.push(Event::TowerPlacementRejected { spot, kind, reason });
        };

        let Some(build_spot) = self.build_spots.get_mut(spot_index(spot)) else {
            return reject(PlacementError::UnknownSpot, out);
        };
        if build_spot.is_occupied() {
            return reject(PlacementError::Occupied, out);
        }
        let Some(tower) = self.tower_catalog.create(kind) else {
            return reject(PlacementError::UnknownTower, out);
        };

        let cost = tower.cost();
        if !self.economy.spend_gold(cost, out) {
            return reject(PlacementError::InsufficientGold, out);
        }
        if let Err(tower) = build_spot.place(tower) {
            self.economy.earn_gold(tower.cost(), out);
            return reject(PlacementError::Occupied, out);
        }

        tracing::debug!(spot = spot.get(), ?kind, cost, "tower placed");
        out.push(Event::TowerPlaced { spot, kind, cost });
    }

    /// Sells the tower occupying `spot` for half its cost, rounded down.
    ///
    /// Rejections leave the area untouched and are reported as
    /// [`Event::TowerSaleRejected`].
    pub fn sell_tower(&mut self, spot: BuildSpotId, out: &mut Vec<Event>) {
        let Some(build_spot) = self.build_spots.get_mut(spot_index(spot)) else {
            out.push(Event::TowerSaleRejected {
                spot,
                reason: SaleError::UnknownSpot,
            });
            return;
        };
        let Some(tower) = build_spot.take() else {
            out.push(Event::TowerSaleRejected {
                spot,
                reason: SaleError::Vacant,
            });
            return;
        };

        let refund = tower.sell_value();
        self.economy.earn_gold(refund, out);
        tracing::debug!(spot = spot.get(), kind = ?tower.kind(), refund, "tower sold");
        out.push(Event::TowerSold {
            spot,
            kind: tower.kind(),
            refund,
        });
    }

    /// Suspends ticking.
    pub fn pause(&mut self, out: &mut Vec<Event>) {
        if !self.paused {
            self.paused = true;
            out.push(Event::Paused);
        }
    }

    /// Resumes ticking.
    pub fn resume(&mut self, out: &mut Vec<Event>) {
        if self.paused {
            self.paused = false;
            out.push(Event::Resumed);
        }
    }

    fn spawn_due_monsters(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut spawned = Vec::new();
        let _ = self.scenario.update(dt, &mut spawned);

        for mut monster in spawned {
            let Some(&node) = self.spawn_nodes.choose(&mut self.rng) else {
                continue;
            };
            let Some(path) = self.graph.path_from(node, &mut self.rng) else {
                tracing::warn!(node = node.get(), "spawn node missing from graph");
                continue;
            };
            monster.place_on(path);

            let id = MonsterId::new(self.next_monster_id);
            self.next_monster_id = self.next_monster_id.wrapping_add(1);
            tracing::debug!(monster = id.get(), kind = ?monster.kind(), node = node.get(), "monster spawned");
            out.push(Event::MonsterSpawned {
                monster: id,
                kind: monster.kind(),
                node,
            });
            self.monsters.push(LiveMonster { id, monster });
        }
    }

    fn reap_monsters(&mut self, out: &mut Vec<Event>) {
        let monsters = std::mem::take(&mut self.monsters);
        for live in monsters {
            let kind = live.monster.kind();
            if live.monster.is_dead() {
                let reward = live.monster.reward();
                out.push(Event::MonsterKilled {
                    monster: live.id,
                    kind,
                    reward,
                });
                self.economy.earn_gold(reward, out);
            } else if live.monster.has_reached_end() {
                let damage = live.monster.damage();
                self.life = self.life.saturating_sub(damage);
                tracing::debug!(monster = live.id.get(), ?kind, life = self.life, "monster escaped");
                out.push(Event::MonsterEscaped {
                    monster: live.id,
                    kind,
                    damage,
                });
                out.push(Event::LifeChanged { life: self.life });
            } else {
                self.monsters.push(live);
            }
        }
    }

    fn fire_towers(&mut self, dt: Duration, out: &mut Vec<Event>) {
        for build_spot in &mut self.build_spots {
            let position = build_spot.position();
            let spot = build_spot.id();
            let Some(tower) = build_spot.tower_mut() else {
                continue;
            };

            let targets = self.monsters.iter_mut().map(|live| &mut live.monster);
            let Some(shot) = tower.update(dt, targets, position) else {
                continue;
            };

            let target = self.monsters[shot.target].id;
            out.push(Event::TowerFired {
                spot,
                target,
                damage: shot.damage,
            });
            self.shots.push(ShotRecord {
                from: shot.from,
                to: shot.to,
                fired_at: self.elapsed,
            });
        }
    }

    fn expire_shots(&mut self) {
        let now = self.elapsed;
        let lifetime = self.config.shot_lifetime;
        self.shots
            .retain(|shot| now.saturating_sub(shot.fired_at) < lifetime);
    }

    fn evaluate_outcome(&mut self, out: &mut Vec<Event>) {
        if self.life == 0 {
            tracing::info!(elapsed = ?self.elapsed, "game over");
            self.outcome = Some(Outcome::GameOver);
            out.push(Event::GameOver);
        } else if self.monsters.is_empty() && self.scenario.is_finished() {
            tracing::info!(
                elapsed = ?self.elapsed,
                gold = self.economy.balance(),
                life = self.life,
                "level complete"
            );
            self.outcome = Some(Outcome::LevelComplete);
            out.push(Event::LevelComplete);
        }
    }
}

fn spot_index(spot: BuildSpotId) -> usize {
    usize::try_from(spot.get()).unwrap_or(usize::MAX)
}

/// Applies the provided command to the game area.
pub fn apply(area: &mut GameArea, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => area.update(dt, out_events),
        Command::PlaceTower { spot, kind } => area.place_tower(spot, kind, out_events),
        Command::SellTower { spot } => area.sell_tower(spot, out_events),
        Command::Pause => area.pause(out_events),
        Command::Resume => area.resume(out_events),
    }
}

/// Query functions that provide read-only access to the game area.
pub mod query {
    use std::time::Duration;

    use super::{BuildSpot, EconomyManager, GameArea};
    use waypoint_defence_core::{
        BuildSpotId, BuildSpotSnapshot, BuildSpotView, MonsterId, MonsterSnapshot, MonsterView,
        Outcome, Position, ShotSnapshot, TowerKind,
    };
    use waypoint_defence_system_movement::Monster;
    use waypoint_defence_system_navigation::{Path, PathGraph};
    use waypoint_defence_system_scenario::Scenario;
    use waypoint_defence_system_tower_combat::Tower;

    /// Captures a read-only view of the live monsters.
    #[must_use]
    pub fn monster_view(area: &GameArea) -> MonsterView {
        MonsterView::from_snapshots(
            area.monsters
                .iter()
                .map(|live| MonsterSnapshot {
                    id: live.id,
                    kind: live.monster.kind(),
                    position: live.monster.position(),
                    health_fraction: live.monster.health_fraction(),
                })
                .collect(),
        )
    }

    /// Iterates the live monsters in targeting order.
    pub fn monsters(area: &GameArea) -> impl Iterator<Item = (MonsterId, &Monster)> {
        area.monsters.iter().map(|live| (live.id, &live.monster))
    }

    /// Captures a read-only view of the build spots and their towers.
    #[must_use]
    pub fn build_spot_view(area: &GameArea) -> BuildSpotView {
        BuildSpotView::from_snapshots(
            area.build_spots
                .iter()
                .map(|spot| BuildSpotSnapshot {
                    id: spot.id(),
                    position: spot.position(),
                    tower: spot.tower().map(|tower| tower.kind()),
                    range: spot.tower().map(|tower| tower.range()),
                })
                .collect(),
        )
    }

    /// Route frozen onto a live monster when it spawned.
    #[must_use]
    pub fn monster_route(area: &GameArea, monster: MonsterId) -> Option<&[Position]> {
        area.monsters
            .iter()
            .find(|live| live.id == monster)
            .and_then(|live| live.monster.path())
            .map(Path::waypoints)
    }

    /// Tower kinds that can be bought in this level, in catalog order.
    #[must_use]
    pub fn tower_kinds(area: &GameArea) -> Vec<TowerKind> {
        area.tower_catalog.keys().collect()
    }

    /// Shared template of a tower kind, for showing costs and ranges.
    #[must_use]
    pub fn tower_prototype(area: &GameArea, kind: TowerKind) -> Option<&Tower> {
        area.tower_catalog.prototype(kind)
    }

    /// Provides read-only access to a single build spot.
    #[must_use]
    pub fn build_spot(area: &GameArea, spot: BuildSpotId) -> Option<&BuildSpot> {
        area.build_spots.get(super::spot_index(spot))
    }

    /// Recent shots with their fade fraction, oldest first.
    #[must_use]
    pub fn shot_view(area: &GameArea) -> Vec<ShotSnapshot> {
        let lifetime = area.config.shot_lifetime.as_secs_f32();
        area.shots
            .iter()
            .map(|shot| {
                let age = area.elapsed.saturating_sub(shot.fired_at).as_secs_f32();
                let fade = if lifetime > 0.0 {
                    (1.0 - age / lifetime).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                ShotSnapshot {
                    from: shot.from,
                    to: shot.to,
                    fade,
                }
            })
            .collect()
    }

    /// Current gold balance.
    #[must_use]
    pub fn gold(area: &GameArea) -> u32 {
        area.economy.balance()
    }

    /// Provides read-only access to the gold ledger.
    #[must_use]
    pub fn economy(area: &GameArea) -> &EconomyManager {
        &area.economy
    }

    /// Lives left.
    #[must_use]
    pub fn life(area: &GameArea) -> u32 {
        area.life
    }

    /// Reports whether ticking is suspended.
    #[must_use]
    pub fn is_paused(area: &GameArea) -> bool {
        area.paused
    }

    /// Terminal result, once reached.
    #[must_use]
    pub fn outcome(area: &GameArea) -> Option<Outcome> {
        area.outcome
    }

    /// Simulated time accumulated by unpaused ticks.
    #[must_use]
    pub fn elapsed(area: &GameArea) -> Duration {
        area.elapsed
    }

    /// Clock of the spawn scheduler.
    #[must_use]
    pub fn scenario_time(area: &GameArea) -> Duration {
        area.scenario.time()
    }

    /// Provides read-only access to the spawn scheduler.
    #[must_use]
    pub fn scenario(area: &GameArea) -> &Scenario {
        &area.scenario
    }

    /// Provides read-only access to the level's path graph.
    #[must_use]
    pub fn graph(area: &GameArea) -> &PathGraph {
        &area.graph
    }
}
