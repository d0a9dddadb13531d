use std::time::Duration;

use waypoint_defence_core::{MonsterKind, Position};
use waypoint_defence_system_movement::{Monster, MonsterStats, ARRIVAL_EPSILON};
use waypoint_defence_system_navigation::Path;

fn runner(speed: f32) -> Monster {
    Monster::new(
        MonsterKind::Wolf,
        MonsterStats {
            health: 10,
            speed,
            damage: 2,
            reward: 3,
        },
    )
}

fn zigzag() -> Path {
    Path::new(vec![
        Position::new(0.0, 0.0),
        Position::new(4.0, 0.0),
        Position::new(4.0, 3.0),
        Position::new(0.0, 3.0),
        Position::new(0.0, 7.5),
    ])
}

#[test]
fn remaining_distance_never_increases() {
    let mut monster = runner(1.7);
    monster.place_on(zigzag());
    let mut previous = monster.remaining_distance();
    assert!((previous - 15.5).abs() < 1e-4);

    while !monster.has_reached_end() {
        monster.update(Duration::from_millis(33));
        let current = monster.remaining_distance();
        assert!(
            current <= previous + 1e-4,
            "remaining distance grew from {previous} to {current}"
        );
        previous = current;
    }

    assert!(previous.abs() < 1e-4);
}

#[test]
fn end_is_reached_in_bounded_ticks() {
    let mut monster = runner(2.0);
    monster.place_on(zigzag());
    let dt = Duration::from_millis(16);

    // 15.5 tiles at 2 tiles/s is 7.75 s; each of the four corners may waste
    // at most one tick, so the bound only needs a small margin.
    let bound = (7.75 / dt.as_secs_f32()).ceil() as usize + 8;
    let mut ticks = 0;
    while !monster.has_reached_end() {
        monster.update(dt);
        ticks += 1;
        assert!(ticks <= bound, "monster failed to finish within {bound} ticks");
    }

    assert_eq!(monster.position(), Position::new(0.0, 7.5));
}

#[test]
fn large_tick_rounds_only_one_corner() {
    let mut monster = runner(100.0);
    monster.place_on(zigzag());

    monster.update(Duration::from_secs(1));
    assert_eq!(monster.position(), Position::new(4.0, 0.0));
    monster.update(Duration::from_secs(1));
    assert_eq!(monster.position(), Position::new(4.0, 3.0));
    assert!(!monster.has_reached_end());
}

#[test]
fn finished_monster_stays_put() {
    let mut monster = runner(100.0);
    monster.place_on(Path::new(vec![
        Position::new(0.0, 0.0),
        Position::new(1.0, 0.0),
    ]));

    monster.update(Duration::from_secs(1));
    assert!(monster.has_reached_end());
    monster.update(Duration::from_secs(1));
    assert_eq!(monster.position(), Position::new(1.0, 0.0));
}

#[test]
fn cloned_monsters_move_independently() {
    let mut original = runner(1.0);
    original.place_on(zigzag());
    let mut clone = original.clone();

    clone.update(Duration::from_secs(2));
    clone.take_damage(4);

    assert_eq!(original.position(), Position::new(0.0, 0.0));
    assert_eq!(original.health(), 10);
    assert_eq!(clone.health(), 6);
}

#[test]
fn coincident_waypoint_is_passed_without_moving() {
    let mut monster = runner(1.0);
    monster.place_on(Path::new(vec![
        Position::new(0.0, 0.0),
        Position::new(0.0, 0.0),
        Position::new(3.0, 0.0),
    ]));

    monster.update(Duration::from_millis(500));
    assert_eq!(monster.position(), Position::new(0.0, 0.0));
    assert!(!monster.has_reached_end());
    assert!((monster.remaining_distance() - 3.0).abs() < 1e-5);

    monster.update(Duration::from_millis(500));
    assert!((monster.position().x() - 0.5).abs() < 1e-5);

    for _ in 0..10 {
        monster.update(Duration::from_millis(500));
    }
    assert!(monster.has_reached_end());
    assert_eq!(monster.position(), Position::new(3.0, 0.0));
}

#[test]
fn waypoint_within_arrival_epsilon_snaps_in_place() {
    let mut monster = runner(1.0);
    let nearby = Position::new(ARRIVAL_EPSILON / 2.0, 0.0);
    monster.place_on(Path::new(vec![
        Position::new(0.0, 0.0),
        nearby,
        Position::new(2.0, 0.0),
    ]));

    monster.update(Duration::from_secs(1));
    assert_eq!(monster.position(), nearby);

    monster.update(Duration::from_secs(5));
    assert!(monster.has_reached_end());
}
