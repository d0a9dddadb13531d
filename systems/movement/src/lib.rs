#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Monster runtime entities and their per-tick movement along frozen paths.
//!
//! A monster is cloned from a catalog prototype when its wave entry comes due,
//! receives a [`Path`] resolved once from the level graph, and then walks that
//! path waypoint by waypoint. Arrival snaps onto the waypoint and drops any
//! leftover travel for the tick, so a monster never rounds more than one
//! corner per update.

use std::time::Duration;

use waypoint_defence_core::{MonsterKind, Position};
use waypoint_defence_system_navigation::Path;

/// Distance below which a monster counts as standing on its target waypoint.
pub const ARRIVAL_EPSILON: f32 = 1e-4;

/// Tunable attributes shared by every instance of a monster prototype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterStats {
    /// Health at spawn time.
    pub health: u32,
    /// Movement speed in tiles per second.
    pub speed: f32,
    /// Lives removed when the monster reaches the end of its path.
    pub damage: u32,
    /// Gold granted when the monster is killed.
    pub reward: u32,
}

/// Mutable monster instance living in the game area.
#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    kind: MonsterKind,
    health: u32,
    max_health: u32,
    speed: f32,
    damage: u32,
    reward: u32,
    position: Position,
    path: Option<Path>,
    waypoint: usize,
    reached_end: bool,
}

impl Monster {
    /// Creates a pathless monster, typically registered as a catalog prototype.
    #[must_use]
    pub fn new(kind: MonsterKind, stats: MonsterStats) -> Self {
        Self {
            kind,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            damage: stats.damage,
            reward: stats.reward,
            position: Position::default(),
            path: None,
            waypoint: 0,
            reached_end: false,
        }
    }

    /// Freezes `path` onto the monster and places it on the first waypoint.
    ///
    /// An empty path leaves the monster stationary; a single-waypoint path
    /// finishes on the next update.
    pub fn place_on(&mut self, path: Path) {
        if let Some(start) = path.get(0) {
            self.position = start;
        }
        self.waypoint = 1;
        self.reached_end = false;
        self.path = Some(path).filter(|path| !path.is_empty());
    }

    /// Advances the monster along its path by `dt` of simulated time.
    pub fn update(&mut self, dt: Duration) {
        if self.reached_end {
            return;
        }
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let Some(target) = path.get(self.waypoint) else {
            self.reached_end = true;
            return;
        };

        let remaining = self.position.distance(target);
        if remaining < ARRIVAL_EPSILON {
            self.position = target;
            self.advance();
            return;
        }

        let step = self.speed * dt.as_secs_f32();
        if step >= remaining {
            self.position = target;
            self.advance();
        } else {
            self.position = self.position.step_towards(target, step);
        }
    }

    fn advance(&mut self) {
        self.waypoint += 1;
        let len = self.path.as_ref().map_or(0, Path::len);
        if self.waypoint >= len {
            self.reached_end = true;
        }
    }

    /// Removes `amount` health, clamping at zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Reports whether the monster's health is exhausted.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Reports whether the monster walked past its final waypoint.
    #[must_use]
    pub fn has_reached_end(&self) -> bool {
        self.reached_end
    }

    /// Distance still to travel: to the current target plus the rest of the path.
    #[must_use]
    pub fn remaining_distance(&self) -> f32 {
        let Some(path) = self.path.as_ref() else {
            return 0.0;
        };
        match path.get(self.waypoint) {
            Some(target) => self.position.distance(target) + path.length_from(self.waypoint),
            None => 0.0,
        }
    }

    /// Prototype key, doubling as the appearance key.
    #[must_use]
    pub const fn kind(&self) -> MonsterKind {
        self.kind
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Health at spawn time.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current health divided by maximum health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    /// Movement speed in tiles per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Lives removed when the monster reaches the end of its path.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Gold granted when the monster is killed.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Current logical position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Route frozen onto the monster at spawn time, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }
}
