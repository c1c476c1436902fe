//! End-to-end trigger scenarios against the in-memory host.
//!
//! Time is driven by a [`DeterministicClock`] stepped in 1 ms increments so
//! the exact moment a recomputation lands is observable.

use flexrem_core::{DeterministicClock, MemoryHost, ScalerConfig, Trigger, ViewportScaler};
use std::time::Duration;

fn scaler(width: f64) -> ViewportScaler<MemoryHost> {
    ViewportScaler::init(MemoryHost::new(width), ScalerConfig::default())
        .expect("memory host init should succeed")
}

/// Step the clock to `until` one millisecond at a time, recording when
/// recomputations ran.
fn run_until(
    scaler: &mut ViewportScaler<MemoryHost>,
    clock: &mut DeterministicClock,
    until: Duration,
) -> Vec<Duration> {
    let mut ran = Vec::new();
    while clock.now() < until {
        let now = clock.advance_ms(1);
        if scaler.advance(now).expect("recompute should succeed") {
            ran.push(now);
        }
    }
    ran
}

#[test]
fn resize_burst_recomputes_once_after_last_event() {
    let mut scaler = scaler(375.0);
    let mut clock = DeterministicClock::new();

    // Five resize events at t = 0, 60, 120, 180, 240 ms.
    let mut ran = Vec::new();
    for i in 0..5u64 {
        if i > 0 {
            ran.extend(run_until(
                &mut scaler,
                &mut clock,
                Duration::from_millis(i * 60),
            ));
        }
        scaler.host_mut().set_device_width(375.0 + i as f64 * 10.0);
        scaler.handle(Trigger::Resize, clock.now());
    }
    ran.extend(run_until(&mut scaler, &mut clock, Duration::from_secs(2)));

    assert_eq!(ran, vec![Duration::from_millis(540)]);
    assert_eq!(scaler.recompute_count(), 2);
    assert_eq!(scaler.host().root_font_writes(), 2);
    assert_eq!(scaler.rem(), 41.5);
}

#[test]
fn spaced_resizes_each_recompute() {
    let mut scaler = scaler(375.0);
    let mut clock = DeterministicClock::new();

    scaler.handle(Trigger::Resize, clock.now());
    let first = run_until(&mut scaler, &mut clock, Duration::from_millis(400));
    scaler.handle(Trigger::Resize, clock.now());
    let second = run_until(&mut scaler, &mut clock, Duration::from_millis(800));

    assert_eq!(first, vec![Duration::from_millis(300)]);
    assert_eq!(second, vec![Duration::from_millis(700)]);
}

#[test]
fn fresh_pageshow_never_recomputes() {
    let mut scaler = scaler(375.0);
    let mut clock = DeterministicClock::new();

    assert!(
        scaler
            .handle(Trigger::PageShow { persisted: false }, clock.now())
            .is_none()
    );
    let ran = run_until(&mut scaler, &mut clock, Duration::from_secs(1));
    assert!(ran.is_empty());
    assert_eq!(scaler.recompute_count(), 1);
}

#[test]
fn restored_pageshow_recomputes_once_debounced() {
    let mut scaler = scaler(375.0);
    let mut clock = DeterministicClock::new();

    scaler.host_mut().set_device_width(320.0);
    let scheduled = scaler
        .handle(Trigger::PageShow { persisted: true }, clock.now())
        .expect("restored page should schedule");
    assert_eq!(scheduled.delay, Duration::from_millis(300));

    let ran = run_until(&mut scaler, &mut clock, Duration::from_secs(1));
    assert_eq!(ran, vec![Duration::from_millis(300)]);
    assert_eq!(scaler.rem(), 32.0);
}

#[test]
fn pageshow_and_resize_share_one_slot() {
    let mut scaler = scaler(375.0);
    let mut clock = DeterministicClock::new();

    scaler.handle(Trigger::Resize, clock.now());
    run_until(&mut scaler, &mut clock, Duration::from_millis(100));
    let scheduled = scaler
        .handle(Trigger::PageShow { persisted: true }, clock.now())
        .expect("restored page should schedule");
    assert!(scheduled.cancelled.is_some());

    let ran = run_until(&mut scaler, &mut clock, Duration::from_secs(1));
    assert_eq!(ran, vec![Duration::from_millis(400)]);
}

#[test]
fn timer_driven_host_fires_by_generation() {
    let mut scaler = scaler(375.0);

    let stale = scaler
        .handle(Trigger::Resize, Duration::ZERO)
        .expect("resize schedules")
        .task
        .generation;
    let live = scaler
        .handle(Trigger::Resize, Duration::from_millis(10))
        .expect("resize schedules")
        .task
        .generation;

    // A timer that escaped cancellation must not recompute.
    assert!(!scaler.fire(stale).expect("fire"));
    assert!(scaler.fire(live).expect("fire"));
    assert!(!scaler.fire(live).expect("fire"));
    assert_eq!(scaler.recompute_count(), 2);
}
