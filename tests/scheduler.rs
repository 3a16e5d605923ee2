//! The IRQ/timer scheduler itself (spec §4.4): what gets armed, what
//! gets cancelled, and what `on_timer_fire` re-drives with.

use pit8254::clock::PIT_FREQ;
use pit8254::harness::{SharedIrq, SharedTimer, SimulatedClock};
use pit8254::{Device, PitConfig};

#[test]
fn mode0_load_arms_the_timer_at_the_terminal_count_tick() {
    let clock = SimulatedClock::new(PIT_FREQ);
    let mut device = Device::new(PitConfig::default());
    let timer = SharedTimer::new();
    let irq = SharedIrq::new();
    device.set_collaborators(Box::new(timer.clone()), Box::new(irq.clone()), &clock);

    // Control 0x30: channel 0, LSB-then-MSB, mode 0. Loading 4 at host
    // tick 0 should arm the timer for host tick 4 (one PIT tick per
    // host tick at this clock rate).
    device.write_u8(3, 0x30, &clock);
    device.write_u8(0, 4, &clock);
    device.write_u8(0, 0, &clock);

    assert_eq!(timer.0.lock().unwrap().armed_at, Some(4));
    // The IRQ line stays low until the terminal count is reached.
    assert!(!irq.0.lock().unwrap().level);
}

#[test]
fn on_timer_fire_redrives_using_the_armed_instant_not_a_late_host_clock() {
    let clock = SimulatedClock::new(PIT_FREQ);
    let mut device = Device::new(PitConfig::default());
    let timer = SharedTimer::new();
    let irq = SharedIrq::new();
    device.set_collaborators(Box::new(timer.clone()), Box::new(irq.clone()), &clock);

    // Control 0x34: channel 0, LSB-then-MSB, mode 2 (rate generator),
    // period 10. First pulse and re-arm land at host tick 10.
    device.write_u8(3, 0x34, &clock);
    device.write_u8(0, 10, &clock);
    device.write_u8(0, 0, &clock);
    assert_eq!(timer.0.lock().unwrap().armed_at, Some(10));

    // The host timer fires late, at tick 15 instead of 10.
    clock.set(15);
    device.on_timer_fire(&clock);

    // Evaluated at the armed instant (10), mode 2's one-tick pulse is
    // exactly on schedule: the IRQ line must have gone high, and the
    // channel rearms for the next period boundary at 20. Evaluated at
    // the live clock (15) instead, the pulse would be missed entirely
    // (15 % 10 != 0) and the next arm would land on the wrong tick (21).
    assert_eq!(irq.0.lock().unwrap().history.last(), Some(&true));
    assert_eq!(timer.0.lock().unwrap().armed_at, Some(20));
}
