/*
    pit8254

    Copyright (c) 2026 The pit8254 Authors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the "Software"),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    channel.rs

    Per-channel counting and latching state. The six counting modes are
    a closed enum rather than a raw integer, so the arithmetic below is
    one match arm per formula-table row instead of a switch against
    magic numbers -- an unmapped mode value cannot silently fall through
    to the wrong row.
*/

use crate::clock::{elapsed_pit_ticks, pit_ticks_to_host};

/// One of the six counting modes the 8253/8254 implements. BCD counting
/// is not modeled (spec non-goal); the `bcd` bit is accepted and stored
/// on `Channel` but never consulted by the arithmetic here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    InterruptOnTerminalCount,
    HardwareRetriggerableOneShot,
    RateGenerator,
    SquareWaveGenerator,
    SoftwareTriggeredStrobe,
    HardwareTriggeredStrobe,
}

impl From<u8> for ChannelMode {
    /// Masks to the low 3 bits of the control byte's mode field, then
    /// folds the two undefined encodings (6, 7) onto their aliases (2, 3)
    /// exactly as the real hardware does (spec §6).
    fn from(bits: u8) -> Self {
        match bits & 0x7 {
            0 => ChannelMode::InterruptOnTerminalCount,
            1 => ChannelMode::HardwareRetriggerableOneShot,
            2 | 6 => ChannelMode::RateGenerator,
            3 | 7 => ChannelMode::SquareWaveGenerator,
            4 => ChannelMode::SoftwareTriggeredStrobe,
            5 => ChannelMode::HardwareTriggeredStrobe,
            _ => unreachable!("masked with 0x7"),
        }
    }
}

impl From<ChannelMode> for u8 {
    fn from(mode: ChannelMode) -> u8 {
        match mode {
            ChannelMode::InterruptOnTerminalCount => 0,
            ChannelMode::HardwareRetriggerableOneShot => 1,
            ChannelMode::RateGenerator => 2,
            ChannelMode::SquareWaveGenerator => 3,
            ChannelMode::SoftwareTriggeredStrobe => 4,
            ChannelMode::HardwareTriggeredStrobe => 5,
        }
    }
}

/// Access-width selector (control byte bits 5:4, values 1..3; 0 is the
/// latch-count command and is never stored as an `RwMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RwMode {
    Lsb,
    Msb,
    LsbMsb,
}

impl From<u8> for RwMode {
    fn from(bits: u8) -> Self {
        match bits & 0x3 {
            1 => RwMode::Lsb,
            2 => RwMode::Msb,
            3 => RwMode::LsbMsb,
            other => panic!("RwMode::from: {other} is not a valid access-width selector"),
        }
    }
}

/// Sub-phase of a two-byte access, and of a latched count being drained
/// by successive reads. `Word0`/`Word1` only toggle under `RwMode::LsbMsb`;
/// `Lsb`/`Msb`-only channels stay pinned to their single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BytePhase {
    Lsb,
    Msb,
    Word0,
    Word1,
}

impl From<RwMode> for BytePhase {
    fn from(mode: RwMode) -> Self {
        match mode {
            RwMode::Lsb => BytePhase::Lsb,
            RwMode::Msb => BytePhase::Msb,
            RwMode::LsbMsb => BytePhase::Word0,
        }
    }
}

/// Per-channel state, exactly the fields of spec §3's `Channel`.
pub struct Channel {
    pub(crate) count: u32,
    pub(crate) count_load_time: i64,
    pub(crate) mode: ChannelMode,
    pub(crate) bcd: bool,
    pub(crate) gate: bool,
    pub(crate) rw_mode: RwMode,
    pub(crate) read_state: BytePhase,
    pub(crate) write_state: BytePhase,
    pub(crate) write_latch: u8,
    pub(crate) latched_count: u16,
    pub(crate) count_latched: Option<BytePhase>,
    pub(crate) status_latched: bool,
    pub(crate) status: u8,
    pub(crate) next_transition_time: i64,
}

/// `count == 0` means the full 65536-tick period (spec §3).
fn normalize_count(value: u32) -> u32 {
    if value == 0 {
        0x1_0000
    }
    else {
        value
    }
}

impl Channel {
    pub fn new(gate: bool) -> Self {
        Channel {
            count: 0x1_0000,
            count_load_time: 0,
            mode: ChannelMode::SquareWaveGenerator,
            bcd: false,
            gate,
            rw_mode: RwMode::LsbMsb,
            read_state: BytePhase::Word0,
            write_state: BytePhase::Word0,
            write_latch: 0,
            latched_count: 0,
            count_latched: None,
            status_latched: false,
            status: 0,
            next_transition_time: -1,
        }
    }

    fn elapsed(&self, now: i64, ticks_per_second: i64) -> u64 {
        elapsed_pit_ticks(now, self.count_load_time, ticks_per_second)
    }

    /// The live 16-bit counter value, per spec §4.1's formula table.
    /// `count` can itself be 65536; the truncation to 16 bits below is
    /// exactly where that value becomes the visible `0`.
    pub fn read_count(&self, now: i64, ticks_per_second: i64) -> u16 {
        let d = self.elapsed(now, ticks_per_second) as i128;
        let count = self.count as i128;
        match self.mode {
            ChannelMode::InterruptOnTerminalCount
            | ChannelMode::HardwareRetriggerableOneShot
            | ChannelMode::SoftwareTriggeredStrobe
            | ChannelMode::HardwareTriggeredStrobe => (count - d).rem_euclid(0x1_0000) as u16,
            ChannelMode::RateGenerator => {
                let dm = d.rem_euclid(count);
                (count - dm).rem_euclid(0x1_0000) as u16
            }
            ChannelMode::SquareWaveGenerator => {
                // Documented as possibly incorrect for odd counts (spec §9 / §4.1);
                // implemented to match the reference exactly rather than inventing
                // a long/short alternation the reference never performs.
                let dm = (2 * d).rem_euclid(count);
                (count - dm).rem_euclid(0x1_0000) as u16
            }
        }
    }

    /// The output-line level, per spec §4.1's second formula table.
    pub fn read_out(&self, now: i64, ticks_per_second: i64) -> bool {
        let d = self.elapsed(now, ticks_per_second);
        let count = self.count as u64;
        match self.mode {
            ChannelMode::InterruptOnTerminalCount => d >= count,
            ChannelMode::HardwareRetriggerableOneShot => d < count,
            ChannelMode::RateGenerator => d % count == 0 && d != 0,
            ChannelMode::SquareWaveGenerator => d % count < count.div_ceil(2),
            ChannelMode::SoftwareTriggeredStrobe | ChannelMode::HardwareTriggeredStrobe => {
                d == count
            }
        }
    }

    /// The next absolute host-clock tick at which `read_out` will change,
    /// or `-1` if no further transition is predicted (spec §4.1).
    pub fn next_transition(&self, now: i64, ticks_per_second: i64) -> i64 {
        let d = self.elapsed(now, ticks_per_second);
        let count = self.count as u64;
        let next_pit: Option<u64> = match self.mode {
            ChannelMode::InterruptOnTerminalCount | ChannelMode::HardwareRetriggerableOneShot => {
                if d < count {
                    Some(count)
                }
                else {
                    None
                }
            }
            ChannelMode::RateGenerator => {
                let base = (d / count) * count;
                if d == base && d != 0 {
                    Some(base + count)
                }
                else {
                    Some(base + count + 1)
                }
            }
            ChannelMode::SquareWaveGenerator => {
                let base = (d / count) * count;
                let half = count.div_ceil(2);
                if d - base < half {
                    Some(base + half)
                }
                else {
                    Some(base + count)
                }
            }
            ChannelMode::SoftwareTriggeredStrobe | ChannelMode::HardwareTriggeredStrobe => {
                if d < count {
                    Some(count)
                }
                else if d == count {
                    Some(count + 1)
                }
                else {
                    None
                }
            }
        };

        match next_pit {
            None => -1,
            Some(next_pit) => {
                let converted = pit_ticks_to_host(next_pit, self.count_load_time, ticks_per_second);
                converted.max(now + 1)
            }
        }
    }

    /// Loads a new count value, normalizing `0` to 65536, and records the
    /// load time. Does not, by itself, re-drive channel 0's scheduler --
    /// callers do that (spec §4.2).
    pub fn load_count(&mut self, value: u32, now: i64) {
        self.count = normalize_count(value);
        self.count_load_time = now;
    }

    /// Sets the access width, read/write sub-phases, mode, and BCD flag
    /// from a control-byte write. Does not touch `count` or
    /// `count_load_time` (spec §4.2).
    pub fn configure(&mut self, access: u8, mode_bits: u8, bcd: bool) {
        let rw_mode = RwMode::from(access);
        self.rw_mode = rw_mode;
        self.read_state = BytePhase::from(rw_mode);
        self.write_state = BytePhase::from(rw_mode);
        self.mode = ChannelMode::from(mode_bits);
        self.bcd = bcd;
    }

    /// Stepwise data-port write (spec §4.2). Returns `true` if this call
    /// loaded a new count (so the caller can re-drive the scheduler).
    pub fn write_data(&mut self, value: u8, now: i64) -> bool {
        match self.write_state {
            BytePhase::Lsb => {
                self.load_count(value as u32, now);
                true
            }
            BytePhase::Msb => {
                self.load_count((value as u32) << 8, now);
                true
            }
            BytePhase::Word0 => {
                self.write_latch = value;
                self.write_state = BytePhase::Word1;
                false
            }
            BytePhase::Word1 => {
                let full = self.write_latch as u32 | ((value as u32) << 8);
                self.load_count(full, now);
                self.write_state = BytePhase::Word0;
                true
            }
        }
    }

    /// Stepwise data-port read (spec §4.2), honoring the
    /// status-latched > count-latched > live precedence.
    pub fn read_data(&mut self, now: i64, ticks_per_second: i64) -> u8 {
        if self.status_latched {
            self.status_latched = false;
            return self.status;
        }
        if let Some(phase) = self.count_latched {
            return match phase {
                BytePhase::Lsb => {
                    self.count_latched = None;
                    (self.latched_count & 0xFF) as u8
                }
                BytePhase::Msb => {
                    self.count_latched = None;
                    (self.latched_count >> 8) as u8
                }
                BytePhase::Word0 => {
                    self.count_latched = Some(BytePhase::Msb);
                    (self.latched_count & 0xFF) as u8
                }
                BytePhase::Word1 => unreachable!("count_latched never advances into Word1"),
            };
        }

        let count = self.read_count(now, ticks_per_second);
        match self.read_state {
            BytePhase::Lsb => (count & 0xFF) as u8,
            BytePhase::Msb => (count >> 8) as u8,
            BytePhase::Word0 => {
                self.read_state = BytePhase::Word1;
                (count & 0xFF) as u8
            }
            BytePhase::Word1 => {
                self.read_state = BytePhase::Word0;
                (count >> 8) as u8
            }
        }
    }

    /// Snapshots the live count for a subsequent latched read. A no-op
    /// if a latch is already outstanding (spec §4.2).
    pub fn latch_count(&mut self, now: i64, ticks_per_second: i64) {
        if self.count_latched.is_none() {
            self.latched_count = self.read_count(now, ticks_per_second);
            self.count_latched = Some(BytePhase::from(self.rw_mode));
        }
    }

    /// Snapshots the status byte (spec §6's layout) for the next read,
    /// unless one is already outstanding.
    pub fn latch_status(&mut self, now: i64, ticks_per_second: i64) {
        if !self.status_latched {
            let out = self.read_out(now, ticks_per_second) as u8;
            let rw_bits = match self.rw_mode {
                RwMode::Lsb => 1,
                RwMode::Msb => 2,
                RwMode::LsbMsb => 3,
            };
            self.status = (out << 7) | (rw_bits << 4) | (u8::from(self.mode) << 1) | (self.bcd as u8);
            self.status_latched = true;
        }
    }

    /// Handles a gate-input transition (spec §4.3). Returns `true` if the
    /// edge should re-drive the scheduler (a rising edge on modes that
    /// restart counting).
    pub fn set_gate(&mut self, level: bool, now: i64) -> bool {
        let rising_edge = !self.gate && level;
        let restarts = matches!(
            self.mode,
            ChannelMode::HardwareRetriggerableOneShot
                | ChannelMode::RateGenerator
                | ChannelMode::SquareWaveGenerator
                | ChannelMode::HardwareTriggeredStrobe
        );
        let rearm = rising_edge && restarts;
        if rearm {
            self.count_load_time = now;
        }
        self.gate = level;
        rearm
    }

    pub(crate) fn to_snapshot(&self) -> crate::snapshot::ChannelSnapshot {
        crate::snapshot::ChannelSnapshot {
            count: self.count,
            latched_count: self.latched_count,
            count_latched: self.count_latched,
            status_latched: self.status_latched,
            status: self.status,
            read_state: self.read_state,
            write_state: self.write_state,
            write_latch: self.write_latch,
            rw_mode: self.rw_mode,
            mode: self.mode,
            bcd: self.bcd,
            gate: self.gate,
            count_load_time: self.count_load_time,
            next_transition_time: self.next_transition_time,
        }
    }

    pub(crate) fn restore(&mut self, snap: &crate::snapshot::ChannelSnapshot) {
        self.count = snap.count;
        self.latched_count = snap.latched_count;
        self.count_latched = snap.count_latched;
        self.status_latched = snap.status_latched;
        self.status = snap.status;
        self.read_state = snap.read_state;
        self.write_state = snap.write_state;
        self.write_latch = snap.write_latch;
        self.rw_mode = snap.rw_mode;
        self.mode = snap.mode;
        self.bcd = snap.bcd;
        self.gate = snap.gate;
        self.count_load_time = snap.count_load_time;
        self.next_transition_time = snap.next_transition_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A host clock running at exactly PIT_FREQ makes elapsed_pit_ticks/
    // pit_ticks_to_host an identity, so `at(t)` below means "t PIT ticks
    // after load" with no rounding slop to reason about.
    const TPS: i64 = crate::clock::PIT_FREQ;

    fn channel_with(mode: ChannelMode, count: u32) -> Channel {
        let mut c = Channel::new(true);
        c.mode = mode;
        c.count = count;
        c.count_load_time = 0;
        c
    }

    fn at(pit_ticks: u64) -> i64 {
        pit_ticks_to_host(pit_ticks, 0, TPS)
    }

    #[test]
    fn mode_from_u8_folds_aliases() {
        assert_eq!(ChannelMode::from(6), ChannelMode::RateGenerator);
        assert_eq!(ChannelMode::from(7), ChannelMode::SquareWaveGenerator);
        assert_eq!(ChannelMode::from(2), ChannelMode::RateGenerator);
    }

    #[test]
    fn zero_count_normalizes_to_65536() {
        let mut c = Channel::new(true);
        c.load_count(0, 0);
        assert_eq!(c.count, 0x1_0000);
        assert_eq!(c.read_count(0, TPS), 0);
    }

    #[test]
    fn mode0_counts_down_and_raises_output_at_terminal_count() {
        let c = channel_with(ChannelMode::InterruptOnTerminalCount, 0x1234);
        assert_eq!(c.read_count(0, TPS), 0x1234);
        assert!(!c.read_out(0, TPS));
        let terminal = at(0x1234);
        assert!(c.read_out(terminal, TPS));
    }

    #[test]
    fn mode2_rate_generator_pulses_with_period_count() {
        let c = channel_with(ChannelMode::RateGenerator, 4);
        let samples: Vec<bool> = (0..8)
            .map(|t| c.read_out(at(t), TPS))
            .collect();
        assert_eq!(
            samples,
            vec![false, false, false, false, true, false, false, false]
        );
    }

    #[test]
    fn mode3_square_wave_count_four_matches_scenario_s4() {
        let c = channel_with(ChannelMode::SquareWaveGenerator, 4);
        let samples: Vec<bool> = (0..8)
            .map(|t| c.read_out(at(t), TPS))
            .collect();
        assert_eq!(
            samples,
            vec![true, true, false, false, true, true, false, false]
        );
    }

    #[test]
    fn mode4_5_strobe_for_exactly_one_tick() {
        for mode in [
            ChannelMode::SoftwareTriggeredStrobe,
            ChannelMode::HardwareTriggeredStrobe,
        ] {
            let c = channel_with(mode, 10);
            assert!(!c.read_out(at(9), TPS));
            assert!(c.read_out(at(10), TPS));
            assert!(!c.read_out(at(11), TPS));
        }
    }

    #[test]
    fn latch_then_latch_again_is_a_no_op() {
        let mut c = channel_with(ChannelMode::InterruptOnTerminalCount, 100);
        c.rw_mode = RwMode::LsbMsb;
        c.latch_count(0, TPS);
        let first = c.latched_count;
        // advance time, then latch again -- must be ignored.
        c.latch_count(at(50), TPS);
        assert_eq!(c.latched_count, first);
    }

    #[test]
    fn word_mode_latch_read_then_falls_back_to_live() {
        let mut c = channel_with(ChannelMode::InterruptOnTerminalCount, 0x1234);
        c.rw_mode = RwMode::LsbMsb;
        c.read_state = BytePhase::Word0;
        c.latch_count(0, TPS);
        let lo = c.read_data(0, TPS);
        let hi = c.read_data(0, TPS);
        assert_eq!(lo, 0x34);
        assert_eq!(hi, 0x12);
        assert!(c.count_latched.is_none());
        // Next read observes the live counter again.
        let _ = c.read_data(0, TPS);
    }

    #[test]
    fn status_latch_takes_priority_over_count_latch() {
        let mut c = channel_with(ChannelMode::InterruptOnTerminalCount, 10);
        c.rw_mode = RwMode::LsbMsb;
        c.latch_count(0, TPS);
        c.latch_status(0, TPS);
        let byte = c.read_data(0, TPS);
        assert_eq!(byte, c.status);
        // Count latch is still outstanding after the status read drains.
        assert!(c.count_latched.is_some());
    }
}
