#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game area, and the pure simulation systems. Adapters submit
//! [`Command`] values describing desired mutations, the game area executes
//! those commands via its `apply` entry point, and then reports [`Event`]
//! values describing everything that changed. Renderers never touch live
//! entities; they read the snapshot views defined here instead.

mod catalog;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use catalog::Catalog;

/// Commands that express all permissible game area mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a tower of the provided kind is bought onto a build spot.
    PlaceTower {
        /// Build spot that should receive the tower.
        spot: BuildSpotId,
        /// Catalog key of the tower to construct.
        kind: TowerKind,
    },
    /// Requests that the tower occupying a build spot is sold.
    SellTower {
        /// Build spot whose tower should be sold.
        spot: BuildSpotId,
    },
    /// Suspends the simulation; ticks become no-ops until resumed.
    Pause,
    /// Resumes a paused simulation.
    Resume,
}

/// Events reported by the game area after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a monster entered the level at a spawn node.
    MonsterSpawned {
        /// Identifier assigned to the monster by the game area.
        monster: MonsterId,
        /// Prototype the monster was cloned from.
        kind: MonsterKind,
        /// Spawn node the monster starts from.
        node: NodeId,
    },
    /// Reports that a monster's health dropped to zero.
    MonsterKilled {
        /// Identifier of the slain monster.
        monster: MonsterId,
        /// Prototype the monster was cloned from.
        kind: MonsterKind,
        /// Gold granted for the kill.
        reward: u32,
    },
    /// Reports that a monster walked off the final waypoint of its path.
    MonsterEscaped {
        /// Identifier of the escaped monster.
        monster: MonsterId,
        /// Prototype the monster was cloned from.
        kind: MonsterKind,
        /// Lives removed by the escape.
        damage: u32,
    },
    /// Reports that a tower fired at a monster.
    TowerFired {
        /// Build spot hosting the tower that fired.
        spot: BuildSpotId,
        /// Monster that was hit.
        target: MonsterId,
        /// Damage applied to the monster.
        damage: u32,
    },
    /// Confirms that a tower was bought onto a build spot.
    TowerPlaced {
        /// Build spot now hosting the tower.
        spot: BuildSpotId,
        /// Kind of tower that was placed.
        kind: TowerKind,
        /// Gold paid for the tower.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Build spot named by the request.
        spot: BuildSpotId,
        /// Kind of tower requested.
        kind: TowerKind,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold and removed from its build spot.
    TowerSold {
        /// Build spot that is vacant again.
        spot: BuildSpotId,
        /// Kind of tower that was sold.
        kind: TowerKind,
        /// Gold refunded for the sale.
        refund: u32,
    },
    /// Reports that a tower sale request was rejected.
    TowerSaleRejected {
        /// Build spot named by the request.
        spot: BuildSpotId,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Announces the gold balance after a mutation.
    GoldChanged {
        /// Balance after the mutation.
        balance: u32,
    },
    /// Announces the remaining lives after a monster escaped.
    LifeChanged {
        /// Lives left after the change.
        life: u32,
    },
    /// Announces that the simulation was paused.
    Paused,
    /// Announces that the simulation was resumed.
    Resumed,
    /// The player ran out of lives. Reported at most once per game area.
    GameOver,
    /// Every wave was spawned and no monster remains. Reported at most once
    /// per game area.
    LevelComplete,
}

/// Terminal result of a level playthrough.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Life reached zero.
    GameOver,
    /// The scenario finished and the field was cleared.
    LevelComplete,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// No build spot exists with the provided identifier.
    UnknownSpot,
    /// The build spot already hosts a tower.
    Occupied,
    /// The tower catalog has no prototype for the requested kind.
    UnknownTower,
    /// The player cannot afford the tower.
    InsufficientGold,
}

/// Reasons a tower sale request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleError {
    /// No build spot exists with the provided identifier.
    UnknownSpot,
    /// The build spot has no tower to sell.
    Vacant,
}

/// Malformed or incomplete level data detected while constructing a level.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// The level file could not be parsed.
    #[error("level description could not be parsed: {0}")]
    Parse(String),
    /// A node lists a successor that does not exist in the graph.
    #[error("node {node:?} references unknown successor {successor:?}")]
    UnresolvedNode {
        /// Node whose successor list is broken.
        node: NodeId,
        /// Identifier that failed to resolve.
        successor: NodeId,
    },
    /// Two nodes share the same identifier.
    #[error("node {0:?} is defined more than once")]
    DuplicateNode(NodeId),
    /// A node can reach itself, so some routes would never end.
    #[error("node {0:?} is part of a cycle")]
    CyclicGraph(NodeId),
    /// The level defines no path nodes at all.
    #[error("level defines no path nodes")]
    EmptyGraph,
    /// Both or neither of the node graph and the flat path were provided.
    #[error("level must define exactly one of `nodes` or `path`")]
    AmbiguousPath,
    /// Every node has an incoming edge, so monsters have nowhere to enter.
    #[error("path graph has no spawn node")]
    NoSpawnNodes,
    /// A wave references a monster kind that has no prototype.
    #[error("wave references monster kind {0:?} without a prototype")]
    MissingMonsterPrototype(MonsterKind),
    /// A prototype carries a value outside its valid domain.
    #[error("invalid {field} for {subject}: {reason}")]
    InvalidValue {
        /// Prototype or section carrying the value.
        subject: String,
        /// Field name holding the value.
        field: &'static str,
        /// Why the value was refused.
        reason: &'static str,
    },
}

/// Monster prototype keys.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MonsterKind {
    /// Weak and quick to die, sent early and in numbers.
    Goblin,
    /// Fast runner with little health.
    Wolf,
    /// Sturdy infantry.
    Orc,
    /// Slow, heavily armoured brute.
    Troll,
}

/// Tower prototype keys.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Cheap, fast-firing tower with moderate range.
    Archer,
    /// Slow, hard-hitting tower.
    Cannon,
    /// Long-range tower with medium damage.
    Mage,
}

/// Unique identifier assigned to a path node.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a spawned monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a build spot, equal to its index in level load order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BuildSpotId(u32);

impl BuildSpotId {
    /// Creates a new build spot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single map tile expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Continuous logical position measured in tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a position from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Moves `step` units along the straight line towards `target`.
    ///
    /// The caller is responsible for keeping `step` below the distance to
    /// `target`; a zero-length segment returns `self` unchanged.
    #[must_use]
    pub fn step_towards(self, target: Position, step: f32) -> Position {
        let length = self.distance(target);
        if length <= 0.0 {
            return self;
        }

        let scale = step / length;
        Position::new(
            self.x + (target.x - self.x) * scale,
            self.y + (target.y - self.y) * scale,
        )
    }
}

impl From<GridCoord> for Position {
    fn from(coord: GridCoord) -> Self {
        Position::new(coord.column() as f32, coord.row() as f32)
    }
}

/// Immutable representation of a live monster used by renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Identifier assigned at spawn time.
    pub id: MonsterId,
    /// Prototype key, doubling as the appearance key.
    pub kind: MonsterKind,
    /// Current logical position.
    pub position: Position,
    /// Current health divided by maximum health, in `[0, 1]`.
    pub health_fraction: f32,
}

/// Read-only snapshot describing all live monsters.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured monster snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live monsters captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no monsters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a build spot used by renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildSpotSnapshot {
    /// Identifier of the build spot.
    pub id: BuildSpotId,
    /// Fixed logical position of the build spot.
    pub position: Position,
    /// Kind of the tower occupying the spot, if any.
    pub tower: Option<TowerKind>,
    /// Targeting range of the occupying tower, for overlay drawing.
    pub range: Option<f32>,
}

impl BuildSpotSnapshot {
    /// Reports whether a tower occupies the spot.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.tower.is_some()
    }
}

/// Read-only snapshot describing all build spots of a level.
#[derive(Clone, Debug, Default)]
pub struct BuildSpotView {
    snapshots: Vec<BuildSpotSnapshot>,
}

impl BuildSpotView {
    /// Creates a new build spot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BuildSpotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured build spots ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &BuildSpotSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BuildSpotSnapshot> {
        self.snapshots
    }
}

/// A recent tower shot kept around for visual effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotSnapshot {
    /// Position of the tower that fired.
    pub from: Position,
    /// Position of the monster when it was hit.
    pub to: Position,
    /// Remaining visibility, `1.0` when fresh fading to `0.0` at expiry.
    pub fade: f32,
}
