//! HPET legacy disable/enable hooks (S6).

use pit8254::clock::PIT_FREQ;
use pit8254::harness::{SharedIrq, SharedTimer, SimulatedClock};
use pit8254::registry;
use pit8254::{ChannelMode, Device, PitConfig};

#[test]
fn disable_then_enable_resets_channel0() {
    let clock = SimulatedClock::new(PIT_FREQ);
    let device = Device::new_shared(PitConfig::default());
    let timer = SharedTimer::new();
    let irq = SharedIrq::new();
    {
        let mut guard = device.lock().unwrap();
        guard.set_collaborators(Box::new(timer.clone()), Box::new(irq.clone()), &clock);
        // Control 0x34: channel 0, LSB-then-MSB, mode 2.
        guard.write_u8(3, 0x34, &clock);
        guard.write_u8(0, 10, &clock);
        guard.write_u8(0, 0, &clock);
    }
    assert_eq!(timer.0.lock().unwrap().armed_at, Some(10));

    registry::hpet_pit_disable(&clock);
    // The disable hook must cancel the outstanding arming directly --
    // a disabled channel 0 has nothing left scheduled to rearm itself.
    assert_eq!(timer.0.lock().unwrap().armed_at, None);
    assert_eq!(
        timer.0.lock().unwrap().history.last(),
        Some(&pit8254::harness::TimerEvent::Cancelled)
    );
    clock.advance(1_000_000);

    registry::hpet_pit_enable(&clock);
    let guard = device.lock().unwrap();
    assert_eq!(guard.get_mode(0).unwrap(), ChannelMode::SquareWaveGenerator);
    assert!(guard.get_gate(0).unwrap());
    assert_eq!(guard.get_initial_count(0).unwrap(), 0x1_0000);
    // Re-enabling loads a full-period count and re-drives the scheduler,
    // so the timer ends up armed again rather than left cancelled.
    assert!(timer.0.lock().unwrap().armed_at.is_some());
}

#[test]
fn hpet_hooks_never_panic_regardless_of_registration() {
    // Whether or not another test in this binary currently has a device
    // registered, these calls must be safe: a missing registrant is a
    // documented no-op (spec §4.5/§9), never a panic.
    let clock = SimulatedClock::new(PIT_FREQ);
    registry::hpet_pit_disable(&clock);
    registry::hpet_pit_enable(&clock);
}
