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

    lib.rs

    Emulation core for the Intel 8253/8254 Programmable Interval Timer:
    the register-level behavior of its three channels as observed
    through a four-port I/O window, plus channel 0's interrupt
    scheduling. The host clock, one-shot timer, interrupt controller,
    and port-I/O dispatch are all borrowed collaborators -- see `clock`
    and `timer` for the seams.
*/

pub mod channel;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod harness;
pub mod registry;
pub mod snapshot;
pub mod timer;

pub use channel::{Channel, ChannelMode};
pub use clock::{PitClock, PIT_FREQ};
pub use config::{PitConfig, PitType};
pub use device::Device;
pub use error::PitError;
pub use snapshot::{ChannelSnapshot, PitSnapshot};
pub use timer::{IrqLine, OneShotTimer};
