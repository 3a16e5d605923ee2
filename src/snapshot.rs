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

    snapshot.rs

    The persisted fields enumerated in spec §6. The wire format itself is
    out of scope; what's implemented here is the field list plus the
    version gate a loader would consult before attempting to restore.
*/

use serde_derive::{Deserialize, Serialize};

use crate::channel::{BytePhase, ChannelMode, RwMode};
use crate::error::PitError;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub count: u32,
    pub latched_count: u16,
    pub count_latched: Option<BytePhase>,
    pub status_latched: bool,
    pub status: u8,
    pub read_state: BytePhase,
    pub write_state: BytePhase,
    pub write_latch: u8,
    pub rw_mode: RwMode,
    pub mode: ChannelMode,
    pub bcd: bool,
    pub gate: bool,
    pub count_load_time: i64,
    pub next_transition_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitSnapshot {
    pub version: u32,
    pub channels: [ChannelSnapshot; 3],
    /// Channel 0's scheduled one-shot fire time, or `-1` if none is armed.
    pub channel0_timer_armed_at: i64,
}

impl PitSnapshot {
    pub fn check_version(&self) -> Result<(), PitError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(PitError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

// `ChannelMode`, `RwMode`, and `BytePhase` need (de)serialization for
// `ChannelSnapshot` to derive it; plain field-less variant enums serialize
// as strings under serde's default, which is what we want here.
impl serde::Serialize for ChannelMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> serde::Deserialize<'de> for ChannelMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(ChannelMode::from(bits))
    }
}
