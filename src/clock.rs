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

    clock.rs

    The host clock adapter. The PIT core never owns a clock; it borrows
    one through this trait so the arithmetic in `channel` stays testable
    without a real monotonic time source.
*/

/// Supplies monotonic host-timer ticks and the tick rate they run at.
///
/// `now()` must be non-decreasing across calls from the same execution
/// context. `ticks_per_second()` may change only between, never during,
/// a register access (the core reads it once per computation).
pub trait PitClock {
    fn now(&self) -> i64;
    fn ticks_per_second(&self) -> i64;
}

/// The PIT's internal counting rate: the 8254's input frequency, the
/// 14.31818 MHz PC crystal divided by 12. This constant is load-bearing
/// for every formula in `channel` and must not be approximated.
pub const PIT_FREQ: i64 = 1_193_182;

/// `elapsed = (now - load) * PIT_FREQ / ticks_per_second()`, computed
/// with a widening multiply so the intermediate product cannot overflow
/// a 64-bit accumulator even when both operands are large `i64`s.
/// `now >= load_time` is a standing invariant (spec §3); it is not
/// re-checked here.
pub(crate) fn elapsed_pit_ticks(now: i64, load_time: i64, ticks_per_second: i64) -> u64 {
    let delta = (now - load_time) as u128;
    let scaled = delta * PIT_FREQ as u128 / ticks_per_second as u128;
    scaled as u64
}

/// Converts a PIT-unit tick count back into host-clock ticks, relative
/// to `load_time`. Uses the same floor-division muldiv as `elapsed_pit_ticks`;
/// callers are responsible for clamping the result strictly past `now`
/// (spec §4.1 calls this out as a rounding fixup, not part of the formula).
pub(crate) fn pit_ticks_to_host(pit_ticks: u64, load_time: i64, ticks_per_second: i64) -> i64 {
    let scaled = pit_ticks as u128 * ticks_per_second as u128 / PIT_FREQ as u128;
    load_time + scaled as i64
}
