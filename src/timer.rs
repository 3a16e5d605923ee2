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

    timer.rs

    The one-shot timer and IRQ line the PIT core drives. Channel 0 owns
    one of each; channels 1 and 2 own neither (spec §3).
*/

/// A rearmable one-shot timer. Arming replaces any previous arming;
/// cancelling an already-cancelled timer is a no-op. The callback side
/// of this (re-invoking the scheduler) is the owner's responsibility,
/// not the trait's -- the core only ever calls `arm`/`cancel`.
pub trait OneShotTimer {
    /// Arms the timer to fire at the given absolute host-clock tick.
    fn arm(&mut self, at: i64);
    /// Cancels any pending arming. Idempotent.
    fn cancel(&mut self);
}

/// The channel-0 output, wired to the interrupt controller.
pub trait IrqLine {
    fn set_level(&mut self, level: bool);
}
