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

    config.rs

    Construction-time parameters a front end would otherwise read out of
    a machine configuration file. The registration mechanism that turns
    these into live port-I/O handlers is out of scope (spec §1); this is
    only the parameter surface.
*/

use serde_derive::Deserialize;

/// Distinguishes the 8253 (no read-back command) from the 8254 (has
/// one). Most PC-compatible machines wire up an 8254.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PitType {
    Model8253,
    Model8254,
}

impl PitType {
    pub fn has_read_back(&self) -> bool {
        matches!(self, PitType::Model8254)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PitConfig {
    pub iobase: u16,
    pub irq: u8,
    pub pit_type: PitType,
}

impl Default for PitConfig {
    fn default() -> Self {
        PitConfig {
            iobase: 0x40,
            irq: 0,
            pit_type: PitType::Model8254,
        }
    }
}

impl PitConfig {
    /// Parses a `[pit]`-style TOML table into a `PitConfig`, the way a
    /// front end would read one out of a machine configuration file.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_legacy_pc_wiring() {
        let config = PitConfig::default();
        assert_eq!(config.iobase, 0x40);
        assert_eq!(config.irq, 0);
        assert_eq!(config.pit_type, PitType::Model8254);
    }

    #[test]
    fn parses_from_toml() {
        let config = PitConfig::from_toml_str(
            r#"
            iobase = 64
            irq = 0
            pit_type = "Model8254"
            "#,
        )
        .unwrap();
        assert_eq!(config, PitConfig::default());
    }
}
