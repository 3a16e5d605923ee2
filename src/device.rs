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

    device.rs

    Implements the 8253/8254 Programmable Interval Timer: the four-port
    I/O decoder, the channel-0 IRQ scheduler, and reset/HPET legacy
    hooks. The per-channel counting arithmetic lives in `channel`; this
    module is the glue that turns port-I/O bytes into calls on it.
*/

use std::sync::{Arc, Mutex, Weak};

use modular_bitfield::prelude::*;

use crate::channel::{Channel, ChannelMode};
use crate::clock::PitClock;
use crate::config::PitConfig;
use crate::error::PitError;
use crate::registry::{self, DeviceClass, HpetHooks};
use crate::snapshot::{ChannelSnapshot, PitSnapshot, SNAPSHOT_VERSION};
use crate::timer::{IrqLine, OneShotTimer};

const READ_BACK_SELECT: u8 = 3;
const READ_BACK_NO_LATCH_COUNT: u8 = 0x20;
const READ_BACK_NO_LATCH_STATUS: u8 = 0x10;

/// Access-width field of the control byte, before it's known whether
/// this write is a per-channel reconfiguration or (when `channel == 3`)
/// a read-back command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BitfieldSpecifier)]
#[bits = 2]
enum RwField {
    LatchCommand,
    Lsb,
    Msb,
    LsbMsb,
}

impl From<RwField> for u8 {
    fn from(field: RwField) -> u8 {
        match field {
            RwField::LatchCommand => 0,
            RwField::Lsb => 1,
            RwField::Msb => 2,
            RwField::LsbMsb => 3,
        }
    }
}

/// Bit layout of an offset-3 write, per spec §6: bit 0 BCD, bits 3:1
/// mode, bits 5:4 access width, bits 7:6 channel select (3 = read-back).
#[bitfield]
struct ControlByte {
    bcd: bool,
    channel_mode: B3,
    rw_field: RwField,
    channel: B2,
}

fn channel_selector(c: usize) -> u8 {
    2 << c
}

/// The PIT device: three channels, a configured base port and IRQ
/// number, and channel 0's owned timer/IRQ collaborators.
pub struct Device {
    channels: [Channel; 3],
    iobase: u16,
    irq: u8,
    pit_type: crate::config::PitType,
    timer: Option<Box<dyn OneShotTimer + Send>>,
    irq_line: Option<Box<dyn IrqLine + Send>>,
    registered: bool,
}

impl Device {
    /// Builds a device from `config`. Channel 0 is left without a timer
    /// or IRQ line until `set_collaborators` is called; reads and writes
    /// are well-defined either way (the scheduler simply has nothing to
    /// arm yet), matching spec §7's "missing handle silently suppresses
    /// scheduling" rule.
    pub fn new(config: PitConfig) -> Self {
        log::debug!(
            "PIT: creating device at iobase {:#06x}, irq {}",
            config.iobase,
            config.irq
        );
        Device {
            channels: [Channel::new(true), Channel::new(true), Channel::new(false)],
            iobase: config.iobase,
            irq: config.irq,
            pit_type: config.pit_type,
            timer: None,
            irq_line: None,
            registered: false,
        }
    }

    /// Constructs a device already wrapped for the HPET registry, and
    /// registers it under `DeviceClass::Pit`. The registration is torn
    /// down automatically when the last `Arc` drops and `Device` itself
    /// is dropped.
    pub fn new_shared(config: PitConfig) -> Arc<Mutex<Self>> {
        let mut inner = Self::new(config);
        inner.registered = true;
        let device = Arc::new(Mutex::new(inner));
        let weak: Weak<Mutex<dyn HpetHooks>> = Arc::downgrade(&device);
        registry::register(DeviceClass::Pit, weak);
        device
    }

    /// Gives channel 0 its timer and IRQ line, then immediately re-drives
    /// the scheduler so the initial state is reflected.
    pub fn set_collaborators(
        &mut self,
        timer: Box<dyn OneShotTimer + Send>,
        irq_line: Box<dyn IrqLine + Send>,
        clock: &dyn PitClock,
    ) {
        self.timer = Some(timer);
        self.irq_line = Some(irq_line);
        self.reschedule(clock);
    }

    pub fn iobase(&self) -> u16 {
        self.iobase
    }

    pub fn irq(&self) -> u8 {
        self.irq
    }

    /// Re-drives channel 0's scheduler at the host's live clock, spec
    /// §4.4's four-step sequence. A no-op on the IRQ level/timer arming
    /// if `set_collaborators` was never called; `next_transition_time`
    /// is still recorded.
    fn reschedule(&mut self, clock: &dyn PitClock) {
        self.reschedule_at(clock.now(), clock.ticks_per_second());
    }

    /// The four-step re-drive, evaluated at an explicit `now` rather
    /// than the live clock. `reschedule` and `on_timer_fire` are the
    /// only two ways into this: the former for a register access, the
    /// latter for the timer callback, which must use the instant it was
    /// armed for, not whatever the host clock reads when it happens to
    /// fire (spec §4.4).
    fn reschedule_at(&mut self, now: i64, tps: i64) {
        let channel = &mut self.channels[0];
        let expire = channel.next_transition(now, tps);
        let out = channel.read_out(now, tps);
        if let Some(irq_line) = self.irq_line.as_deref_mut() {
            irq_line.set_level(out);
        }
        if let Some(timer) = self.timer.as_deref_mut() {
            if expire == -1 {
                timer.cancel();
            }
            else {
                timer.arm(expire);
            }
        }
        channel.next_transition_time = expire;
    }

    /// Called by the owning timer's callback when channel 0's armed
    /// instant is reached. `now` here is deliberately the scheduled
    /// instant, `next_transition_time`, not the host's live clock (spec
    /// §4.4) -- by the time this callback runs the host clock may have
    /// already ticked past it.
    pub fn on_timer_fire(&mut self, clock: &dyn PitClock) {
        let now = self.channels[0].next_transition_time;
        self.reschedule_at(now, clock.ticks_per_second());
    }

    /// Port-I/O read, offsets 0..=3 relative to `iobase`. Offset 3 (the
    /// control port) is write-only; spec doesn't define a read value for
    /// it, so real hardware and this core both return `0xFF`.
    pub fn read_u8(&mut self, offset: u16, clock: &dyn PitClock) -> u8 {
        let now = clock.now();
        let tps = clock.ticks_per_second();
        match offset {
            0..=2 => self.channels[offset as usize].read_data(now, tps),
            _ => 0xFF,
        }
    }

    /// Port-I/O write, offsets 0..=3 relative to `iobase`.
    pub fn write_u8(&mut self, offset: u16, value: u8, clock: &dyn PitClock) {
        let now = clock.now();
        match offset {
            0..=2 => self.data_write(offset as usize, value, clock),
            3 => self.control_write(value, clock),
            _ => log::trace!("PIT: write to unmapped offset {offset} ignored (now={now})"),
        }
    }

    fn data_write(&mut self, index: usize, value: u8, clock: &dyn PitClock) {
        let now = clock.now();
        let loaded = self.channels[index].write_data(value, now);
        log::trace!("PIT: channel {index} data write {value:#04x}, loaded={loaded}");
        if loaded && index == 0 {
            self.reschedule(clock);
        }
    }

    fn control_write(&mut self, value: u8, clock: &dyn PitClock) {
        let now = clock.now();
        let tps = clock.ticks_per_second();
        let control = ControlByte::from_bytes([value]);
        let channel_sel = control.channel();
        let access: u8 = control.rw_field().into();
        let mode_bits = control.channel_mode();
        let bcd = control.bcd();

        if channel_sel == READ_BACK_SELECT {
            if !self.pit_type.has_read_back() {
                log::warn!("PIT: read-back command {value:#04x} issued on a device with no read-back support");
                return;
            }
            self.read_back(value, now, tps);
            return;
        }

        let index = channel_sel as usize;
        if access == 0 {
            log::trace!("PIT: latch count command for channel {index}");
            self.channels[index].latch_count(now, tps);
            return;
        }

        log::debug!(
            "PIT: channel {index} reconfigured: access={access}, mode={mode_bits}, bcd={bcd}"
        );
        self.channels[index].configure(access, mode_bits, bcd);
        // Deliberately does not re-drive the scheduler here (spec §4.4/§9):
        // a mode/rw-mode write never rearms channel 0.
    }

    fn read_back(&mut self, value: u8, now: i64, tps: i64) {
        let latch_count = value & READ_BACK_NO_LATCH_COUNT == 0;
        let latch_status = value & READ_BACK_NO_LATCH_STATUS == 0;
        for c in 0..3 {
            if value & channel_selector(c) == 0 {
                continue;
            }
            if latch_count {
                self.channels[c].latch_count(now, tps);
            }
            if latch_status {
                self.channels[c].latch_status(now, tps);
            }
        }
        log::trace!("PIT: read-back command {value:#04x} (latch_count={latch_count}, latch_status={latch_status})");
    }

    /// Forwards a gate-input transition to `channel`, re-driving the
    /// scheduler if it's channel 0 and the edge restarts counting.
    pub fn set_gate(&mut self, channel: usize, level: bool, clock: &dyn PitClock) {
        let now = clock.now();
        let rearm = self.channels[channel].set_gate(level, now);
        log::trace!("PIT: channel {channel} gate set to {level} (rearm={rearm})");
        if rearm && channel == 0 {
            self.reschedule(clock);
        }
    }

    /// Resets every channel to mode 3, the legacy gate wiring, and a
    /// full-period count, then re-drives channel 0's scheduler (spec
    /// §4.5).
    pub fn reset(&mut self, clock: &dyn PitClock) {
        log::debug!("PIT: reset");
        let now = clock.now();
        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel.mode = ChannelMode::SquareWaveGenerator;
            channel.gate = index != 2;
            channel.load_count(0, now);
        }
        self.reschedule(clock);
    }

    fn check_index(index: usize) -> Result<(), PitError> {
        if index > 2 {
            return Err(PitError::BadChannel { index });
        }
        Ok(())
    }

    pub fn get_out(&self, channel: usize, clock: &dyn PitClock) -> Result<bool, PitError> {
        Self::check_index(channel)?;
        Ok(self.channels[channel].read_out(clock.now(), clock.ticks_per_second()))
    }

    pub fn get_gate(&self, channel: usize) -> Result<bool, PitError> {
        Self::check_index(channel)?;
        Ok(self.channels[channel].gate)
    }

    pub fn get_initial_count(&self, channel: usize) -> Result<u32, PitError> {
        Self::check_index(channel)?;
        Ok(self.channels[channel].count)
    }

    pub fn get_mode(&self, channel: usize) -> Result<ChannelMode, PitError> {
        Self::check_index(channel)?;
        Ok(self.channels[channel].mode)
    }

    pub fn to_snapshot(&self) -> PitSnapshot {
        let channels: [ChannelSnapshot; 3] = [
            self.channels[0].to_snapshot(),
            self.channels[1].to_snapshot(),
            self.channels[2].to_snapshot(),
        ];
        PitSnapshot {
            version: SNAPSHOT_VERSION,
            channels,
            channel0_timer_armed_at: self.channels[0].next_transition_time,
        }
    }

    pub fn restore(&mut self, snapshot: &PitSnapshot, clock: &dyn PitClock) -> Result<(), PitError> {
        snapshot.check_version()?;
        for (channel, snap) in self.channels.iter_mut().zip(snapshot.channels.iter()) {
            channel.restore(snap);
        }
        log::debug!("PIT: restored from snapshot version {}", snapshot.version);
        self.reschedule(clock);
        Ok(())
    }
}

impl Drop for Device {
    /// Clears this device's registry entry, if `new_shared` registered
    /// one. Cheap and safe to call even when construction went through
    /// the plain `new` path (the entry simply never existed).
    fn drop(&mut self) {
        if self.registered {
            registry::unregister(DeviceClass::Pit);
        }
    }
}

impl HpetHooks for Device {
    /// Cancels channel 0's one-shot timer without altering any other
    /// state (spec §4.5). Channel 0's IRQ line is left wherever it was.
    fn hpet_pit_disable(&mut self, _clock: &dyn PitClock) {
        log::debug!("PIT: HPET disable (channel 0 timer cancelled)");
        if let Some(timer) = self.timer.as_deref_mut() {
            timer.cancel();
        }
    }

    /// Resets channel 0 to mode 3, gate 1, and a full-period count, then
    /// re-drives the scheduler (spec §4.5).
    fn hpet_pit_enable(&mut self, clock: &dyn PitClock) {
        log::debug!("PIT: HPET enable (channel 0 reset to mode 3)");
        let now = clock.now();
        self.channels[0].mode = ChannelMode::SquareWaveGenerator;
        self.channels[0].gate = true;
        self.channels[0].load_count(0, now);
        self.reschedule(clock);
    }
}
