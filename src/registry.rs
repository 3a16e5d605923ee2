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

    registry.rs

    A process-lifetime lookup table so the legacy HPET "disable the PIT's
    own counting and drive its output from HPET instead" hook can reach a
    live device without the caller having to thread a reference through
    unrelated code paths. Only one PIT is ever registered per class in
    practice; the table is keyed by class anyway so a future second
    instance class doesn't need a second table.
*/

use std::collections::HashMap;
use std::sync::{Mutex, Weak};

use lazy_static::lazy_static;

use crate::clock::PitClock;

/// The two operations the legacy HPET routing hook needs from a
/// registered device. Kept separate from `Device` itself so this module
/// doesn't need to know anything about channels, ports, or snapshots.
/// Both take a borrowed clock, never a stored one, matching the
/// single-threaded cooperative model the rest of the core assumes.
pub trait HpetHooks: Send {
    fn hpet_pit_disable(&mut self, clock: &dyn PitClock);
    fn hpet_pit_enable(&mut self, clock: &dyn PitClock);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Pit,
}

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<DeviceClass, Weak<Mutex<dyn HpetHooks>>>> =
        Mutex::new(HashMap::new());
}

/// Registers a handle under `class`, replacing any previous registrant.
pub fn register(class: DeviceClass, handle: Weak<Mutex<dyn HpetHooks>>) {
    REGISTRY.lock().unwrap().insert(class, handle);
}

/// Removes whatever is currently registered under `class`, if anything.
pub fn unregister(class: DeviceClass) {
    REGISTRY.lock().unwrap().remove(&class);
}

fn with_registered(class: DeviceClass, f: impl FnOnce(&mut dyn HpetHooks)) {
    let handle = {
        let table = REGISTRY.lock().unwrap();
        table.get(&class).cloned()
    };
    if let Some(weak) = handle {
        if let Some(strong) = weak.upgrade() {
            f(&mut *strong.lock().unwrap());
        }
    }
}

/// Tells the registered PIT, if any, that HPET has taken over legacy
/// channel-0 IRQ routing. A no-op, never a panic, if nothing is
/// registered (spec §4.5 / §9).
pub fn hpet_pit_disable(clock: &dyn PitClock) {
    with_registered(DeviceClass::Pit, |h| h.hpet_pit_disable(clock));
}

/// Tells the registered PIT, if any, to resume driving channel 0's IRQ
/// itself. A no-op if nothing is registered.
pub fn hpet_pit_enable(clock: &dyn PitClock) {
    with_registered(DeviceClass::Pit, |h| h.hpet_pit_enable(clock));
}
