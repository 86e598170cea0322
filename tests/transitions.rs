//! End-to-end digit transitions through the public API

use metaball_clock::Settings;
use metaball_clock::consts::*;
use metaball_clock::render::FrameData;
use metaball_clock::sim::{ClockDigits, ClockState, TickInput, tick};

const WIDTH: f32 = 1200.0;
const HEIGHT: f32 = 600.0;

fn digits(values: [u8; 4]) -> ClockDigits {
    ClockDigits::new(values).unwrap()
}

/// Settings that damp quickly enough for chases to finish within a minute
fn settling() -> Settings {
    Settings {
        drag: 3.0,
        merge_threshold: 2.0,
        ..Default::default()
    }
}

fn run(state: &mut ClockState, input: &TickInput, frames: usize) {
    for _ in 0..frames {
        tick(state, input, SIM_DT);
    }
}

fn lit_total(values: [u8; 4], per_segment: usize) -> usize {
    let shown = digits(values);
    (0..DIGIT_COUNT).map(|p| shown.get(p).lit_count() * per_segment).sum()
}

#[test]
fn test_round_trip_returns_to_full_rosters() {
    let settings = settling();
    let per_segment = settings.balls_per_segment;
    let dots = DOT_COUNT * settings.balls_per_dot;
    let mut state = ClockState::new(99, settings, digits([8, 8, 8, 8]));

    let input = TickInput::new(WIDTH, HEIGHT).with_digits(digits([8, 8, 8, 8]));
    tick(&mut state, &input, SIM_DT);
    assert_eq!(state.ball_count(), lit_total([8, 8, 8, 8], per_segment) + dots);

    // Shrink, then let every chase land
    let input = input.with_digits(digits([1, 7, 1, 7]));
    run(&mut state, &input, 60 * 60);
    assert!(state.chasers().is_empty(), "{} chases left", state.chasers().len());
    assert_eq!(state.ball_count(), lit_total([1, 7, 1, 7], per_segment) + dots);
    let settled_target = state.total_target_radius();

    // And back again
    let input = input.with_digits(digits([8, 8, 8, 8]));
    run(&mut state, &input, 60 * 30);
    assert!(state.chasers().is_empty());
    for position in 0..DIGIT_COUNT {
        assert_eq!(state.roster_count(position), 7 * per_segment);
    }
    assert_eq!(state.ball_count(), lit_total([8, 8, 8, 8], per_segment) + dots);
    assert!((state.total_target_radius() - settled_target).abs() < 1e-2);
}

/// Tick until every chase has landed, giving up after `max_frames`
fn settle(state: &mut ClockState, input: &TickInput, max_frames: usize) {
    for _ in 0..max_frames {
        if state.chasers().is_empty() {
            return;
        }
        tick(state, input, SIM_DT);
    }
}

#[test]
fn test_every_digit_pair_round_trips() {
    let settings = Settings {
        balls_per_segment: 2,
        balls_per_dot: 1,
        ..settling()
    };
    let dots = DOT_COUNT * settings.balls_per_dot;
    let mut failures = Vec::new();

    for from in 0..10u8 {
        for to in (0..10u8).filter(|&to| to != from) {
            let mut state = ClockState::new(from as u64 * 10 + to as u64, settings.clone(), digits([from; 4]));
            let home = TickInput::new(WIDTH, HEIGHT).with_digits(digits([from; 4]));
            tick(&mut state, &home, SIM_DT);

            let away = home.with_digits(digits([to; 4]));
            tick(&mut state, &away, SIM_DT);
            settle(&mut state, &away, 60 * 60);
            tick(&mut state, &home, SIM_DT);
            settle(&mut state, &home, 60 * 60);

            let lit = digits([from; 4]).get(0).lit_count();
            let rosters_full = (0..DIGIT_COUNT).all(|p| state.roster_count(p) == lit * settings.balls_per_segment);
            let count_ok = state.ball_count() == DIGIT_COUNT * lit * settings.balls_per_segment + dots;
            if !state.chasers().is_empty() || !rosters_full || !count_ok {
                failures.push((from, to, state.chasers().len(), state.ball_count()));
            }
        }
    }

    assert!(failures.is_empty(), "failures: {failures:?}");
}

#[test]
fn test_minute_rollover_only_touches_last_digit() {
    let mut state = ClockState::new(3, Settings::default(), ClockDigits::from_hm(12, 58).unwrap());
    let input = TickInput::new(WIDTH, HEIGHT).with_digits(ClockDigits::from_hm(12, 58).unwrap());
    run(&mut state, &input, 10);
    let hours: Vec<_> = (0..3).map(|p| state.rosters(p).to_vec()).collect();

    let input = input.with_digits(ClockDigits::from_hm(12, 59).unwrap());
    tick(&mut state, &input, SIM_DT);

    assert_eq!(state.digits().to_string(), "12:59");
    for (position, before) in hours.iter().enumerate() {
        let ids_before: Vec<_> = before.iter().map(|g| g.balls.clone()).collect();
        let ids_after: Vec<_> = state.rosters(position).iter().map(|g| g.balls.clone()).collect();
        assert_eq!(ids_before, ids_after);
    }
}

#[test]
fn test_same_seed_same_frames() {
    let script = [[1, 2, 3, 4], [1, 2, 3, 5], [1, 2, 4, 0], [0, 0, 0, 0]];
    let frames = |seed: u64| {
        let mut state = ClockState::new(seed, Settings::default(), digits(script[0]));
        let mut captured = Vec::new();
        for values in script {
            let input = TickInput::new(WIDTH, HEIGHT).with_digits(digits(values));
            run(&mut state, &input, 45);
            captured.push(FrameData::capture(&state, state.settings()));
        }
        captured
    };

    assert_eq!(frames(42), frames(42));
    assert_ne!(frames(42), frames(43));
}

#[test]
fn test_resize_regenerates_population() {
    let mut state = ClockState::new(8, Settings::default(), digits([2, 0, 2, 6]));
    let input = TickInput::new(WIDTH, HEIGHT);
    run(&mut state, &input, 5);
    let small_unit = state.unit();

    run(&mut state, &TickInput::new(WIDTH * 2.0, HEIGHT * 2.0), 1);
    assert!(state.unit() > small_unit);
    assert!(state.chasers().is_empty());

    let frame = FrameData::capture(&state, state.settings());
    assert_eq!(frame.globals.resolution, [WIDTH * 2.0, HEIGHT * 2.0]);
    assert_eq!(frame.globals.ball_count as usize, state.ball_count());
}
