use std::{sync::Arc, time::Duration};

use proptest::prelude::*;
use waypoint_defence_core::{Catalog, MonsterKind};
use waypoint_defence_system_movement::{Monster, MonsterStats};
use waypoint_defence_system_scenario::{Scenario, Wave, WaveEntry, WaveSchedule};

fn catalog() -> Arc<Catalog<MonsterKind, Monster>> {
    let stats = |health| MonsterStats {
        health,
        speed: 1.0,
        damage: 1,
        reward: 1,
    };
    Arc::new(
        [
            (MonsterKind::Goblin, Monster::new(MonsterKind::Goblin, stats(10))),
            (MonsterKind::Wolf, Monster::new(MonsterKind::Wolf, stats(8))),
            (MonsterKind::Orc, Monster::new(MonsterKind::Orc, stats(40))),
        ]
        .into_iter()
        .collect(),
    )
}

fn entry(monster: MonsterKind, millis: u64) -> WaveEntry {
    WaveEntry::new(monster, Duration::from_millis(millis))
}

fn run(scenario: &mut Scenario, deltas: &[Duration]) -> Vec<Vec<MonsterKind>> {
    deltas
        .iter()
        .map(|dt| {
            let mut spawned = Vec::new();
            let _ = scenario.update(*dt, &mut spawned);
            spawned.iter().map(Monster::kind).collect()
        })
        .collect()
}

#[test]
fn first_tick_spawns_entry_at_time_zero() {
    let mut scenario = Scenario::new(
        vec![WaveSchedule::new(
            Duration::ZERO,
            Wave::new(vec![entry(MonsterKind::Orc, 0)]),
        )],
        catalog(),
    );

    let mut spawned = Vec::new();
    assert_eq!(scenario.update(Duration::from_millis(16), &mut spawned), 1);

    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].kind(), MonsterKind::Orc);
    assert_eq!(spawned[0].health(), 40);
    assert!(scenario.is_finished());
}

#[test]
fn overlapping_schedules_spawn_in_timeline_order() {
    let mut scenario = Scenario::new(
        vec![
            WaveSchedule::new(
                Duration::ZERO,
                Wave::new(vec![entry(MonsterKind::Goblin, 0), entry(MonsterKind::Goblin, 900)]),
            ),
            WaveSchedule::new(
                Duration::from_millis(500),
                Wave::new(vec![entry(MonsterKind::Wolf, 100)]),
            ),
        ],
        catalog(),
    );

    let ticks = run(&mut scenario, &[Duration::from_secs(1)]);
    assert_eq!(
        ticks,
        vec![vec![MonsterKind::Goblin, MonsterKind::Wolf, MonsterKind::Goblin]]
    );
    assert!(scenario.is_finished());
}

#[test]
fn schedule_waits_for_its_offset() {
    let mut scenario = Scenario::new(
        vec![WaveSchedule::new(
            Duration::from_secs(3),
            Wave::new(vec![entry(MonsterKind::Goblin, 0)]),
        )],
        catalog(),
    );

    let ticks = run(&mut scenario, &[Duration::from_secs(1); 4]);
    assert_eq!(
        ticks,
        vec![vec![], vec![], vec![], vec![MonsterKind::Goblin]]
    );
}

#[test]
fn lookup_miss_consumes_entry_without_spawning() {
    let mut scenario = Scenario::new(
        vec![WaveSchedule::new(
            Duration::ZERO,
            Wave::new(vec![entry(MonsterKind::Troll, 0), entry(MonsterKind::Wolf, 0)]),
        )],
        catalog(),
    );

    let mut spawned = Vec::new();
    assert_eq!(scenario.update(Duration::from_millis(16), &mut spawned), 2);
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].kind(), MonsterKind::Wolf);
    assert!(scenario.is_finished());
}

#[test]
fn cloned_scenario_replays_identical_spawns() {
    let schedules = vec![
        WaveSchedule::new(
            Duration::ZERO,
            Wave::new(
                (0..12)
                    .map(|index| entry(MonsterKind::Goblin, index * 250))
                    .collect(),
            ),
        ),
        WaveSchedule::new(
            Duration::from_secs(2),
            Wave::new(vec![
                entry(MonsterKind::Orc, 0),
                entry(MonsterKind::Wolf, 333),
                entry(MonsterKind::Orc, 1_200),
            ]),
        ),
    ];
    let mut original = Scenario::new(schedules, catalog());
    let warmup = [Duration::from_millis(170), Duration::from_millis(610)];
    let _ = run(&mut original, &warmup);

    let mut clone = original.clone();
    assert_eq!(clone.time(), original.time());
    assert_eq!(clone.remaining_entries(), original.remaining_entries());

    let deltas: Vec<Duration> = (1..40).map(|step| Duration::from_millis(step * 7)).collect();
    assert_eq!(run(&mut original, &deltas), run(&mut clone, &deltas));
    assert!(original.is_finished());
}

#[test]
fn referenced_kinds_cover_remaining_entries() {
    let scenario = Scenario::new(
        vec![
            WaveSchedule::new(Duration::ZERO, Wave::new(vec![entry(MonsterKind::Troll, 0)])),
            WaveSchedule::new(Duration::ZERO, Wave::new(vec![entry(MonsterKind::Wolf, 5)])),
        ],
        catalog(),
    );

    let kinds: Vec<MonsterKind> = scenario.referenced_kinds().into_iter().collect();
    assert_eq!(kinds, vec![MonsterKind::Wolf, MonsterKind::Troll]);
}

proptest! {
    #[test]
    fn wave_entries_are_polled_once_in_order(
        times in proptest::collection::vec(0u64..5_000, 0..40),
        steps in proptest::collection::vec(1u64..400, 1..80),
    ) {
        let entries: Vec<WaveEntry> = times
            .iter()
            .enumerate()
            .map(|(index, millis)| {
                let kind = if index % 2 == 0 { MonsterKind::Goblin } else { MonsterKind::Wolf };
                entry(kind, *millis)
            })
            .collect();
        let mut wave = Wave::new(entries);

        let mut clock = Duration::ZERO;
        let mut polled = Vec::new();
        for step in steps.iter().cycle() {
            if clock > Duration::from_millis(5_000) {
                break;
            }
            let next = clock + Duration::from_millis(*step);
            polled.extend(wave.poll(next));
            clock = next;
        }

        prop_assert!(wave.is_empty());
        prop_assert_eq!(polled.len(), times.len());
        prop_assert!(polled.windows(2).all(|pair| pair[0].at <= pair[1].at));

        let mut expected = times.clone();
        expected.sort_unstable();
        let observed: Vec<u64> = polled
            .iter()
            .map(|entry| u64::try_from(entry.at.as_millis()).unwrap_or(u64::MAX))
            .collect();
        prop_assert_eq!(observed, expected);
    }
}
