//! Integration tests for the overflow-corrected tick clock

use device_layer::{hal::MockTickSource, Accuracy, Clock, TickClock};
use proptest::prelude::*;

fn clock(bits: u32, rate_hz: u32) -> TickClock<MockTickSource> {
    TickClock::new(MockTickSource::new(bits, rate_hz)).unwrap()
}

// ============================================================================
// Overflow Correction
// ============================================================================

#[test]
fn sixteen_bit_counter_keeps_counting() {
    let mut clock = clock(16, 1000);
    let mut expected = 0u64;
    for _ in 0..10 {
        clock.source_mut().advance(40_000);
        expected += 40_000;
        assert_eq!(clock.ticks_since_boot(), expected);
    }
    assert_eq!(clock.source().overflow_count(), 6);
}

#[test]
fn wrap_boundary_exact() {
    let mut clock = clock(16, 1000);
    clock.source_mut().advance(65_535);
    let before = clock.ticks_since_boot();
    clock.source_mut().advance(1);
    let after = clock.ticks_since_boot();
    assert_eq!(before, 65_535);
    assert_eq!(after, 65_536);
}

#[test]
fn thirty_two_bit_counter_past_wrap() {
    let mut clock = clock(32, 1000);
    clock.source_mut().advance(u64::from(u32::MAX) + 11);
    assert_eq!(clock.ticks_since_boot(), (1u64 << 32) + 10);
}

// ============================================================================
// Interrupt Context
// ============================================================================

#[test]
fn interrupt_context_is_best_effort() {
    let mut clock = clock(16, 1000);
    clock.source_mut().advance(1_000);
    assert_eq!(clock.read_ticks().accuracy, Accuracy::Exact);

    clock.source_mut().set_in_interrupt(true);
    let reading = clock.read_ticks();
    assert_eq!(reading.accuracy, Accuracy::BestEffort);
    assert_eq!(reading.ticks, 1_000);
}

#[test]
fn interrupt_read_does_not_touch_snapshot() {
    let mut clock = clock(16, 1000);
    clock.source_mut().set_in_interrupt(true);
    clock.source_mut().advance(70_000);

    // No task-context read has refreshed the cached overflow count.
    assert_eq!(clock.ticks_since_boot(), 70_000 - 65_536);

    clock.source_mut().set_in_interrupt(false);
    assert_eq!(clock.ticks_since_boot(), 70_000);
}

#[test]
fn frequent_task_reads_keep_interrupt_reads_exact() {
    let mut clock = clock(16, 1000);
    for _ in 0..5 {
        clock.source_mut().advance(30_000);
        let task = clock.read_ticks().ticks;
        let isr = clock.ticks_from_isr().ticks;
        assert_eq!(task, isr);
    }
}

// ============================================================================
// Unit Conversion
// ============================================================================

#[test]
fn one_second_at_common_rates() {
    for rate in [100, 128, 1000, 32_768, 1_000_000] {
        let mut clock = clock(32, rate);
        clock.source_mut().advance(u64::from(rate));
        assert_eq!(clock.monotonic_us(), 1_000_000, "rate {}", rate);
        assert_eq!(clock.monotonic_ms(), 1_000, "rate {}", rate);
        assert_eq!(clock.now_ms(), 1_000);
    }
}

#[test]
fn high_rate_long_uptime_does_not_overflow() {
    // 80 MHz counter after roughly 7000 years of uptime.
    let mut clock = clock(32, 80_000_000);
    clock.source_mut().set_overflow_count(4_000_000_000);
    let ticks = clock.ticks_since_boot();
    let expected_us = u128::from(ticks) * 1_000_000 / 80_000_000;
    assert_eq!(u128::from(clock.monotonic_us()), expected_us);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn ticks_never_decrease(bits in 4u32..=32, steps in prop::collection::vec(any::<u32>(), 1..50)) {
        let mut clock = clock(bits, 1000);
        let max_step = (1u64 << bits) - 1;
        let mut last = clock.ticks_since_boot();
        let mut total = 0u64;
        for step in steps {
            let step = u64::from(step) % (max_step + 1);
            clock.source_mut().advance(step);
            total += step;
            let now = clock.ticks_since_boot();
            prop_assert!(now >= last);
            prop_assert_eq!(now, total);
            last = now;
        }
    }

    #[test]
    fn ms_is_us_truncated(ticks in 0u64..(1u64 << 48), rate in 1u32..=10_000_000) {
        let mut clock = clock(32, rate);
        clock.source_mut().advance(ticks);
        prop_assert_eq!(clock.monotonic_ms(), clock.monotonic_us() / 1000);
    }

    #[test]
    fn time_never_decreases(rate in 1u32..=1_000_000, steps in prop::collection::vec(0u64..1_000_000, 1..30)) {
        let mut clock = clock(16, rate);
        let mut last_us = 0u64;
        for step in steps {
            clock.source_mut().advance(step % 65_536);
            let us = clock.monotonic_us();
            prop_assert!(us >= last_us);
            last_us = us;
        }
    }
}
