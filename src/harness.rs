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

    harness.rs

    Stand-ins for the clock, one-shot timer, and IRQ line collaborators,
    used by this crate's own tests and available to any front end that
    wants to drive `Device` without a real virtual machine around it.
*/

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use crate::clock::PitClock;
use crate::timer::{IrqLine, OneShotTimer};

/// A clock whose `now()` is whatever was last set, advanced by hand.
#[derive(Debug)]
pub struct SimulatedClock {
    now: Cell<i64>,
    ticks_per_second: i64,
}

impl SimulatedClock {
    pub fn new(ticks_per_second: i64) -> Self {
        Self {
            now: Cell::new(0),
            ticks_per_second,
        }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }

    pub fn advance(&self, by: i64) {
        self.now.set(self.now.get() + by);
    }
}

impl PitClock for SimulatedClock {
    fn now(&self) -> i64 {
        self.now.get()
    }

    fn ticks_per_second(&self) -> i64 {
        self.ticks_per_second
    }
}

/// Records every `arm`/`cancel` call in order, for assertions.
#[derive(Debug, Default)]
pub struct RecordingTimer {
    pub armed_at: Option<i64>,
    pub history: Vec<TimerEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Armed(i64),
    Cancelled,
}

impl OneShotTimer for RecordingTimer {
    fn arm(&mut self, at: i64) {
        self.armed_at = Some(at);
        self.history.push(TimerEvent::Armed(at));
    }

    fn cancel(&mut self) {
        self.armed_at = None;
        self.history.push(TimerEvent::Cancelled);
    }
}

/// Records every level the IRQ line was set to, in order.
#[derive(Debug, Default)]
pub struct RecordingIrq {
    pub level: bool,
    pub history: Vec<bool>,
}

impl IrqLine for RecordingIrq {
    fn set_level(&mut self, level: bool) {
        self.level = level;
        self.history.push(level);
    }
}

/// A clonable handle onto a `RecordingTimer`, so a test can hand one
/// half to `Device::set_collaborators` (which takes ownership) while
/// keeping the other half to assert against afterward.
#[derive(Debug, Clone, Default)]
pub struct SharedTimer(pub Arc<Mutex<RecordingTimer>>);

impl SharedTimer {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(RecordingTimer::default())))
    }
}

impl OneShotTimer for SharedTimer {
    fn arm(&mut self, at: i64) {
        self.0.lock().unwrap().arm(at);
    }

    fn cancel(&mut self) {
        self.0.lock().unwrap().cancel();
    }
}

/// The `IrqLine` counterpart to `SharedTimer`.
#[derive(Debug, Clone, Default)]
pub struct SharedIrq(pub Arc<Mutex<RecordingIrq>>);

impl SharedIrq {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(RecordingIrq::default())))
    }
}

impl IrqLine for SharedIrq {
    fn set_level(&mut self, level: bool) {
        self.0.lock().unwrap().set_level(level);
    }
}
