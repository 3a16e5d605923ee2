//! Quantified invariants from the testable-properties list that aren't
//! already exercised by one of the concrete scenario files.

use pit8254::clock::PIT_FREQ;
use pit8254::harness::{SharedIrq, SharedTimer, SimulatedClock};
use pit8254::{ChannelMode, Device, PitConfig};

fn fresh_device() -> (Device, SimulatedClock) {
    let clock = SimulatedClock::new(PIT_FREQ);
    let mut device = Device::new(PitConfig::default());
    device.set_collaborators(Box::new(SharedTimer::new()), Box::new(SharedIrq::new()), &clock);
    (device, clock)
}

#[test]
fn count_mode_and_gate_stay_in_range_after_many_operations() {
    let (mut device, clock) = fresh_device();
    let writes: &[(u16, u8)] = &[
        (3, 0x30),
        (0, 0x00),
        (0, 0x00),
        (3, 0x36),
        (0, 0xFF),
        (0, 0xFF),
        (3, 0x32),
        (0, 0x01),
        (1, 0x00),
    ];
    for &(offset, value) in writes {
        device.write_u8(offset, value, &clock);
        clock.advance(17);
    }

    for c in 0..3 {
        let count = device.get_initial_count(c).unwrap();
        assert!((1..=0x1_0000).contains(&count));
        let mode = device.get_mode(c).unwrap();
        assert!(matches!(
            mode,
            ChannelMode::InterruptOnTerminalCount
                | ChannelMode::HardwareRetriggerableOneShot
                | ChannelMode::RateGenerator
                | ChannelMode::SquareWaveGenerator
                | ChannelMode::SoftwareTriggeredStrobe
                | ChannelMode::HardwareTriggeredStrobe
        ));
        let _ = device.get_gate(c).unwrap(); // just confirm it's a valid channel index
    }
}

#[test]
fn writing_zero_as_the_count_reads_back_as_zero() {
    let (mut device, clock) = fresh_device();
    device.write_u8(3, 0x30, &clock); // channel 0, LSB-then-MSB, mode 0
    device.write_u8(0, 0x00, &clock);
    device.write_u8(0, 0x00, &clock);

    let lo = device.read_u8(0, &clock);
    let hi = device.read_u8(0, &clock);
    assert_eq!(lo, 0);
    assert_eq!(hi, 0);
    assert_eq!(device.get_initial_count(0).unwrap(), 0x1_0000);
}

#[test]
fn mode2_irq_pulses_high_for_one_tick_every_period() {
    let (mut device, clock) = fresh_device();
    device.write_u8(3, 0x34, &clock); // channel 0, LSB-then-MSB, mode 2
    device.write_u8(0, 10, &clock);
    device.write_u8(0, 0, &clock);

    // read_out's mode-2 formula is 1 iff `d % count == 0 && d != 0`: a
    // one-tick-wide pulse at every multiple of the loaded count, 0
    // everywhere else -- invariant 6 in spec §8.
    for d in 0..31 {
        clock.set(d);
        let expected = d != 0 && d % 10 == 0;
        assert_eq!(device.get_out(0, &clock).unwrap(), expected, "tick {d}");
    }
}
