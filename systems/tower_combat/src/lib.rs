#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower runtime entities that pick targets and fire once per cooldown.

use std::time::Duration;

use waypoint_defence_core::{Position, TowerKind};
use waypoint_defence_system_movement::Monster;

/// Share of a tower's purchase cost refunded when it is sold, in percent.
pub const SELL_REFUND_PERCENT: u32 = 50;

/// Tunable attributes shared by every instance of a tower prototype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Targeting radius in tiles, inclusive.
    pub range: f32,
    /// Damage applied per shot.
    pub damage: u32,
    /// Minimum time between two shots.
    pub cooldown: Duration,
    /// Purchase price in gold.
    pub cost: u32,
}

/// Record of a single shot, handed back to the caller for bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Position of the tower that fired.
    pub from: Position,
    /// Position of the target when it was hit.
    pub to: Position,
    /// Position of the target in the monster sequence passed to the update.
    pub target: usize,
    /// Damage dealt by the shot.
    pub damage: u32,
}

/// Mutable tower instance occupying a build spot.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    kind: TowerKind,
    range: f32,
    damage: u32,
    cooldown: Duration,
    cost: u32,
    since_last_shot: Duration,
}

impl Tower {
    /// Creates a tower, typically registered as a catalog prototype.
    ///
    /// The tower starts fully loaded so it may fire on its first update.
    #[must_use]
    pub fn new(kind: TowerKind, stats: TowerStats) -> Self {
        Self {
            kind,
            range: stats.range,
            damage: stats.damage,
            cooldown: stats.cooldown,
            cost: stats.cost,
            since_last_shot: stats.cooldown,
        }
    }

    /// Advances the cooldown and fires at the first living monster in range.
    ///
    /// Monsters are scanned in iteration order. At most one monster is hit
    /// per call. Without a target in range the tower stays loaded and keeps
    /// its timer running.
    pub fn update<'a, I>(&mut self, dt: Duration, monsters: I, position: Position) -> Option<Shot>
    where
        I: IntoIterator<Item = &'a mut Monster>,
    {
        self.since_last_shot = self.since_last_shot.saturating_add(dt);
        if self.since_last_shot < self.cooldown {
            return None;
        }

        let (target, monster) = monsters.into_iter().enumerate().find(|(_, monster)| {
            !monster.is_dead() && position.distance(monster.position()) <= self.range
        })?;

        monster.take_damage(self.damage);
        self.since_last_shot = Duration::ZERO;
        Some(Shot {
            from: position,
            to: monster.position(),
            target,
            damage: self.damage,
        })
    }

    /// Gold refunded when the tower is sold, rounded down.
    #[must_use]
    pub fn sell_value(&self) -> u32 {
        let refund = u64::from(self.cost) * u64::from(SELL_REFUND_PERCENT) / 100;
        u32::try_from(refund).unwrap_or(u32::MAX)
    }

    /// Prototype key, doubling as the appearance key.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Targeting radius in tiles.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Damage applied per shot.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Minimum time between two shots.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Purchase price in gold.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Time accumulated since the last shot.
    #[must_use]
    pub const fn time_since_last_shot(&self) -> Duration {
        self.since_last_shot
    }
}
