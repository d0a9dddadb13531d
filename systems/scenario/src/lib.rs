#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-based spawn scheduler for a level playthrough.
//!
//! The scheduler has three layers. A [`Wave`] is an ordered list of spawn
//! entries timed relative to the wave start. A [`WaveSchedule`] places one wave
//! at an absolute offset on the scenario timeline. A [`Scenario`] owns the
//! timeline clock and every schedule, and turns due entries into fresh monster
//! clones from the injected catalog.
//!
//! Every schedule polls its own wave each tick, so overlapping schedules run
//! concurrently. Entries are popped when polled, which guarantees each entry
//! spawns at most once and in non-decreasing time order.

use std::{
    collections::{BTreeSet, VecDeque},
    sync::Arc,
    time::Duration,
};

use waypoint_defence_core::{Catalog, MonsterKind};
use waypoint_defence_system_movement::Monster;

/// A single timed spawn inside a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveEntry {
    /// Catalog key of the monster to spawn.
    pub monster: MonsterKind,
    /// Spawn time relative to the start of the wave.
    pub at: Duration,
}

impl WaveEntry {
    /// Creates an entry spawning `monster` at `at` after the wave starts.
    #[must_use]
    pub const fn new(monster: MonsterKind, at: Duration) -> Self {
        Self { monster, at }
    }
}

/// Ordered list of spawn entries that are consumed as they come due.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Wave {
    entries: VecDeque<WaveEntry>,
}

impl Wave {
    /// Creates a wave, sorting the entries by spawn time.
    ///
    /// The sort is stable so entries sharing a spawn time keep their
    /// declaration order.
    #[must_use]
    pub fn new(mut entries: Vec<WaveEntry>) -> Self {
        entries.sort_by_key(|entry| entry.at);
        Self {
            entries: entries.into(),
        }
    }

    /// Removes and returns every entry timed strictly before `until`.
    ///
    /// Entries are returned in non-decreasing spawn-time order. Polling only
    /// needs the end of the elapsed window: anything earlier was either
    /// returned by a previous poll or is overdue and taken now.
    pub fn poll(&mut self, until: Duration) -> Vec<WaveEntry> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.front() {
            if entry.at >= until {
                break;
            }
            if let Some(entry) = self.entries.pop_front() {
                due.push(entry);
            }
        }
        due
    }

    /// Entries not yet polled, in spawn order.
    pub fn entries(&self) -> impl Iterator<Item = &WaveEntry> {
        self.entries.iter()
    }

    /// Number of entries not yet polled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether every entry was consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lifecycle of a schedule relative to the scenario clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduleState {
    /// The schedule's start offset lies in the future.
    Pending,
    /// The schedule started and still holds entries.
    Active,
    /// Every entry was consumed.
    Finished,
}

/// A wave placed at an absolute offset on the scenario timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveSchedule {
    start: Duration,
    wave: Wave,
}

impl WaveSchedule {
    /// Schedules `wave` to start `start` after the scenario begins.
    #[must_use]
    pub const fn new(start: Duration, wave: Wave) -> Self {
        Self { start, wave }
    }

    /// Offset of the wave on the scenario timeline.
    #[must_use]
    pub const fn start(&self) -> Duration {
        self.start
    }

    /// Wave driven by this schedule.
    #[must_use]
    pub const fn wave(&self) -> &Wave {
        &self.wave
    }

    /// Lifecycle state at scenario time `now`.
    #[must_use]
    pub fn state(&self, now: Duration) -> ScheduleState {
        if self.wave.is_empty() {
            ScheduleState::Finished
        } else if now < self.start {
            ScheduleState::Pending
        } else {
            ScheduleState::Active
        }
    }

    /// Reports whether the wave has no entries left.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.wave.is_empty()
    }

    /// Polls the entries due while the scenario clock moves from `previous`
    /// to `previous + dt`.
    ///
    /// The window end is translated into wave-relative time. Nothing is
    /// polled while the window still ends before the schedule starts.
    pub fn poll(&mut self, previous: Duration, dt: Duration) -> Vec<WaveEntry> {
        match previous.saturating_add(dt).checked_sub(self.start) {
            Some(end) => self.wave.poll(end),
            None => Vec::new(),
        }
    }
}

/// Full spawn timeline of one level playthrough.
///
/// Cloning a scenario copies the clock and every remaining entry; the monster
/// catalog is immutable and stays shared.
#[derive(Clone, Debug)]
pub struct Scenario {
    time: Duration,
    schedules: Vec<WaveSchedule>,
    catalog: Arc<Catalog<MonsterKind, Monster>>,
}

impl Scenario {
    /// Creates a scenario at time zero.
    #[must_use]
    pub fn new(schedules: Vec<WaveSchedule>, catalog: Arc<Catalog<MonsterKind, Monster>>) -> Self {
        Self {
            time: Duration::ZERO,
            schedules,
            catalog,
        }
    }

    /// Advances the clock by `dt`, pushing a fresh clone for every due entry.
    ///
    /// Entries due in the same tick are emitted in timeline order, ties broken
    /// by schedule order. An entry whose monster kind has no prototype is
    /// consumed and skipped. Returns the number of entries consumed.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<Monster>) -> usize {
        let previous = self.time;
        self.time = self.time.saturating_add(dt);

        let mut due: Vec<(Duration, WaveEntry)> = Vec::new();
        for schedule in &mut self.schedules {
            let start = schedule.start;
            due.extend(
                schedule
                    .poll(previous, dt)
                    .into_iter()
                    .map(|entry| (start.saturating_add(entry.at), entry)),
            );
        }
        due.sort_by_key(|(at, _)| *at);

        for (at, entry) in &due {
            match self.catalog.create(entry.monster) {
                Some(monster) => {
                    tracing::debug!(kind = ?entry.monster, at = ?at, "wave entry due");
                    out.push(monster);
                }
                None => {
                    tracing::warn!(
                        kind = ?entry.monster,
                        at = ?at,
                        "no prototype registered for monster kind, spawn skipped"
                    );
                }
            }
        }

        due.len()
    }

    /// Reports whether every schedule consumed all of its entries.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.schedules.iter().all(WaveSchedule::is_finished)
    }

    /// Scenario clock.
    #[must_use]
    pub const fn time(&self) -> Duration {
        self.time
    }

    /// Schedules in declaration order.
    #[must_use]
    pub fn schedules(&self) -> &[WaveSchedule] {
        &self.schedules
    }

    /// Entries not yet spawned across all schedules.
    #[must_use]
    pub fn remaining_entries(&self) -> usize {
        self.schedules
            .iter()
            .map(|schedule| schedule.wave.remaining())
            .sum()
    }

    /// Every monster kind still referenced by a remaining entry.
    #[must_use]
    pub fn referenced_kinds(&self) -> BTreeSet<MonsterKind> {
        self.schedules
            .iter()
            .flat_map(|schedule| schedule.wave.entries())
            .map(|entry| entry.monster)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(monster: MonsterKind, millis: u64) -> WaveEntry {
        WaveEntry::new(monster, Duration::from_millis(millis))
    }

    #[test]
    fn wave_sorts_entries_stably() {
        let wave = Wave::new(vec![
            entry(MonsterKind::Troll, 500),
            entry(MonsterKind::Goblin, 0),
            entry(MonsterKind::Wolf, 500),
        ]);
        let order: Vec<MonsterKind> = wave.entries().map(|entry| entry.monster).collect();
        assert_eq!(
            order,
            vec![MonsterKind::Goblin, MonsterKind::Troll, MonsterKind::Wolf]
        );
    }

    #[test]
    fn window_end_is_exclusive() {
        let mut wave = Wave::new(vec![entry(MonsterKind::Orc, 100)]);
        assert!(wave.poll(Duration::from_millis(100)).is_empty());
        assert_eq!(
            wave.poll(Duration::from_millis(101)),
            vec![entry(MonsterKind::Orc, 100)]
        );
        assert!(wave.is_empty());
    }

    #[test]
    fn overdue_entries_are_taken_by_a_later_poll() {
        let mut wave = Wave::new(vec![
            entry(MonsterKind::Wolf, 50),
            entry(MonsterKind::Goblin, 10),
        ]);
        assert_eq!(
            wave.poll(Duration::from_millis(60)),
            vec![entry(MonsterKind::Goblin, 10), entry(MonsterKind::Wolf, 50)]
        );
        assert!(wave.poll(Duration::from_millis(60)).is_empty());
    }

    #[test]
    fn schedule_state_follows_clock() {
        let schedule = WaveSchedule::new(
            Duration::from_secs(5),
            Wave::new(vec![entry(MonsterKind::Orc, 0)]),
        );
        assert_eq!(schedule.state(Duration::from_secs(4)), ScheduleState::Pending);
        assert_eq!(schedule.state(Duration::from_secs(5)), ScheduleState::Active);

        let empty = WaveSchedule::new(Duration::from_secs(5), Wave::default());
        assert_eq!(empty.state(Duration::ZERO), ScheduleState::Finished);
    }

    #[test]
    fn schedule_polls_nothing_before_its_start() {
        let mut schedule = WaveSchedule::new(
            Duration::from_secs(2),
            Wave::new(vec![entry(MonsterKind::Goblin, 0)]),
        );

        assert!(schedule
            .poll(Duration::ZERO, Duration::from_millis(1_500))
            .is_empty());
        assert!(schedule
            .poll(Duration::from_millis(1_500), Duration::from_millis(500))
            .is_empty());
        assert_eq!(
            schedule.poll(Duration::from_secs(2), Duration::from_millis(16)),
            vec![entry(MonsterKind::Goblin, 0)]
        );
    }

    #[test]
    fn relative_window_is_translated_by_start() {
        let mut schedule = WaveSchedule::new(
            Duration::from_secs(1),
            Wave::new(vec![
                entry(MonsterKind::Goblin, 200),
                entry(MonsterKind::Wolf, 900),
            ]),
        );

        let first = schedule.poll(Duration::from_millis(900), Duration::from_millis(400));
        assert_eq!(first, vec![entry(MonsterKind::Goblin, 200)]);
        assert_eq!(schedule.wave().remaining(), 1);
    }
}
