use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use assert_matches::assert_matches;
use keypace::clock::ManualTime;
use keypace::{ClockStatus, MetricsEngine, SessionCallbacks, TestResult};

const PASSAGE: &str = "Pack my box with five dozen liquor jugs.";

fn run_to_end(
    engine: &mut MetricsEngine<ManualTime>,
    time: &ManualTime,
    mut each_second: impl FnMut(&mut MetricsEngine<ManualTime>, u32),
) -> TestResult {
    let mut second = 0;
    loop {
        each_second(engine, second);
        time.advance(Duration::from_millis(1000));
        second += 1;
        match engine.poll() {
            ClockStatus::Completed(result) => return result,
            ClockStatus::Ticked(_) => {}
            other => panic!("unexpected status {other:?}"),
        }
    }
}

#[test]
fn series_length_matches_duration() {
    for duration in [1, 3, 15] {
        let time = ManualTime::new();
        let mut engine = MetricsEngine::with_time_source(time.clone());
        engine.start(duration, PASSAGE, SessionCallbacks::new());

        let result = run_to_end(&mut engine, &time, |_, _| {});
        assert_eq!(result.wpm_data.len(), duration as usize);
    }
}

#[test]
fn sixty_seconds_three_hundred_chars_is_sixty_wpm() {
    let time = ManualTime::new();
    let mut engine = MetricsEngine::with_time_source(time.clone());
    let passage = "abcde".repeat(60);
    engine.start(60, passage.clone(), SessionCallbacks::new());

    let result = run_to_end(&mut engine, &time, |engine, second| {
        let typed = ((second as usize) + 1) * 5;
        engine.record_input(&passage[..typed]);
    });

    assert_eq!(result.characters_typed, 300);
    assert_eq!(result.wpm, 60.0);
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(result.consistency, 0.0);
    assert!(result.wpm_data.iter().all(|w| *w == 60.0));
}

#[test]
fn every_character_wrong_is_zero_accuracy() {
    let time = ManualTime::new();
    let mut engine = MetricsEngine::with_time_source(time.clone());
    engine.start(2, "aaaa", SessionCallbacks::new());

    let result = run_to_end(&mut engine, &time, |engine, _| engine.record_input("bbbb"));
    assert_eq!(result.accuracy, 0.0);
}

#[test]
fn on_tick_counts_down_to_zero() {
    let time = ManualTime::new();
    let mut engine = MetricsEngine::with_time_source(time.clone());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    engine.start(
        3,
        PASSAGE,
        SessionCallbacks::new().on_tick(move |r| sink.borrow_mut().push(r)),
    );

    run_to_end(&mut engine, &time, |_, _| {});
    assert_eq!(*seen.borrow(), vec![3, 2, 1, 0]);
}

#[test]
fn stopped_session_never_completes() {
    let time = ManualTime::new();
    let mut engine = MetricsEngine::with_time_source(time.clone());
    let completed = Rc::new(RefCell::new(false));
    let flag = completed.clone();
    engine.start(
        3,
        PASSAGE,
        SessionCallbacks::new().on_complete(move |_| *flag.borrow_mut() = true),
    );

    time.advance(Duration::from_millis(2500));
    assert_matches!(engine.poll(), ClockStatus::Ticked(2));
    engine.stop();

    for _ in 0..5 {
        time.advance(Duration::from_secs(1));
        assert_eq!(engine.poll(), ClockStatus::Idle);
    }
    assert!(!*completed.borrow());
    assert!(!engine.is_running());
}

#[test]
fn engines_are_independent() {
    let time = ManualTime::new();
    let mut a = MetricsEngine::with_time_source(time.clone());
    let mut b = MetricsEngine::with_time_source(time.clone());
    a.start(5, "first", SessionCallbacks::new());
    b.start(5, "second", SessionCallbacks::new());

    a.record_input("fi");
    assert_eq!(a.current_state().input, "fi");
    assert_eq!(b.current_state().input, "");
    assert_eq!(b.current_state().passage, "second");
}
