//! One-wire pulse encoder.
//!
//! Turns wire bytes into the high/low pulse pairs an RMT-style peripheral
//! plays back. Every frame is `reset, data..., reset`: the leading reset idles
//! the line before the first bit, the trailing one latches the chain.

use core::iter;

use crate::protocol::LedProtocol;

/// Largest duration a single pulse phase can hold (15-bit peripheral counter).
pub const MAX_TICKS: u32 = 0x7FFF;

/// Pulse items per wire byte.
pub const ITEMS_PER_BYTE: usize = 8;

/// One signal event: `high` ticks at logic high followed by `low` ticks at
/// logic low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseItem {
    pub high: u16,
    pub low: u16,
}

impl PulseItem {
    pub const fn new(high: u16, low: u16) -> Self {
        Self { high, low }
    }

    /// An idle-low item of `ticks` length.
    pub const fn reset(ticks: u16) -> Self {
        Self {
            high: 0,
            low: ticks,
        }
    }

    pub const fn is_reset(&self) -> bool {
        self.high == 0
    }
}

/// Converts nanoseconds to peripheral ticks, rounding to nearest.
pub const fn ns_to_ticks(ns: u32, clock_hz: u32) -> u32 {
    let ticks = (ns as u64 * clock_hz as u64 + 500_000_000) / 1_000_000_000;
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Errors deriving tick counts from a measured clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// The peripheral reported a 0Hz counter clock.
    ZeroClock,
    /// A phase rounds to zero ticks or overflows the counter.
    TickOutOfRange {
        /// Nanosecond target that failed to convert.
        ns: u32,
        /// Resulting tick count.
        ticks: u32,
    },
}

impl core::fmt::Display for TimingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimingError::ZeroClock => write!(f, "counter clock is 0Hz"),
            TimingError::TickOutOfRange { ns, ticks } => write!(
                f,
                "{}ns converts to {} ticks, outside 1..={}",
                ns, ticks, MAX_TICKS
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimingError {}

/// Pulse items for each symbol, fixed for the lifetime of an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTimings {
    pub bit0: PulseItem,
    pub bit1: PulseItem,
    pub reset: PulseItem,
}

impl BitTimings {
    /// Derives tick counts for protocol `P` at `clock_hz`.
    pub fn new<P: LedProtocol>(clock_hz: u32) -> Result<Self, TimingError> {
        if clock_hz == 0 {
            return Err(TimingError::ZeroClock);
        }

        let ticks = |ns: u32| -> Result<u16, TimingError> {
            let ticks = ns_to_ticks(ns, clock_hz);
            if ticks == 0 || ticks > MAX_TICKS {
                return Err(TimingError::TickOutOfRange { ns, ticks });
            }
            // bounded by MAX_TICKS above
            Ok(ticks as u16)
        };

        Ok(Self {
            bit0: PulseItem::new(ticks(P::T0H_NS)?, ticks(P::T0L_NS)?),
            bit1: PulseItem::new(ticks(P::T1H_NS)?, ticks(P::T1L_NS)?),
            reset: PulseItem::reset(ticks(P::RESET_NS)?),
        })
    }
}

/// Whether the whole frame fit into the granted slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Framing {
    Complete,
    /// The slot budget ran out; `missing` items (always including the
    /// trailing reset) were dropped.
    Shortfall { missing: usize },
}

/// Result of [`PulseEncoder::encode_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Encoded {
    /// Number of slots written.
    pub len: usize,
    pub framing: Framing,
}

/// Encodes bytes MSB-first into reset-framed pulse trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEncoder {
    timings: BitTimings,
    clock_hz: u32,
}

impl PulseEncoder {
    /// Creates an encoder for protocol `P` driven by a `clock_hz` counter.
    pub fn new<P: LedProtocol>(clock_hz: u32) -> Result<Self, TimingError> {
        let timings = BitTimings::new::<P>(clock_hz)?;
        debug!(
            "{} @ {}Hz: bit0 {}/{} bit1 {}/{} reset {}",
            P::NAME,
            clock_hz,
            timings.bit0.high,
            timings.bit0.low,
            timings.bit1.high,
            timings.bit1.low,
            timings.reset.low
        );
        Ok(Self { timings, clock_hz })
    }

    pub fn timings(&self) -> BitTimings {
        self.timings
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Pulse items for `bytes`: a reset, 8 items per byte, then a reset.
    pub fn pulses<I>(&self, bytes: I) -> impl Iterator<Item = PulseItem> + use<I>
    where
        I: IntoIterator<Item = u8>,
    {
        let BitTimings { bit0, bit1, reset } = self.timings;

        let data = bytes.into_iter().flat_map(move |byte| {
            (0..ITEMS_PER_BYTE).map(move |bit| {
                if byte & (0x80 >> bit) != 0 {
                    bit1
                } else {
                    bit0
                }
            })
        });

        iter::once(reset).chain(data).chain(iter::once(reset))
    }

    /// Writes the frame for `bytes` into `slots`.
    ///
    /// Items that do not fit are counted, not written, and reported as a
    /// [`Framing::Shortfall`].
    pub fn encode_into<I>(&self, bytes: I, slots: &mut [PulseItem]) -> Encoded
    where
        I: IntoIterator<Item = u8>,
    {
        let mut len = 0;
        let mut missing = 0;

        for item in self.pulses(bytes) {
            match slots.get_mut(len) {
                Some(slot) => {
                    *slot = item;
                    len += 1;
                }
                None => missing += 1,
            }
        }

        let framing = if missing == 0 {
            Framing::Complete
        } else {
            Framing::Shortfall { missing }
        };

        Encoded { len, framing }
    }
}

/// Slots needed for a frame of `byte_count` wire bytes.
pub const fn frame_len(byte_count: usize) -> usize {
    byte_count * ITEMS_PER_BYTE + 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Apa104, Ws2812};

    #[test]
    fn ns_to_ticks_rounds_to_nearest() {
        assert_eq!(ns_to_ticks(350, 40_000_000), 14);
        assert_eq!(ns_to_ticks(1360, 40_000_000), 54);
        // 12.5 ticks rounds up
        assert_eq!(ns_to_ticks(250, 50_000_000), 13);
    }

    #[test]
    fn apa104_timings_at_40mhz() {
        let timings = BitTimings::new::<Apa104>(40_000_000).unwrap();
        assert_eq!(timings.bit0, PulseItem::new(14, 54));
        assert_eq!(timings.bit1, PulseItem::new(54, 14));
        assert_eq!(timings.reset, PulseItem::reset(2000));
    }

    #[test]
    fn zero_clock_is_rejected() {
        assert_eq!(
            BitTimings::new::<Apa104>(0),
            Err(TimingError::ZeroClock)
        );
    }

    #[test]
    fn reset_overflowing_counter_is_rejected() {
        // 280us at 160MHz is 44800 ticks
        let result = BitTimings::new::<Ws2812>(160_000_000);
        assert_eq!(
            result,
            Err(TimingError::TickOutOfRange {
                ns: 280_000,
                ticks: 44_800
            })
        );
    }

    #[test]
    fn slow_clock_rounding_to_zero_is_rejected() {
        // 350ns at 1MHz is 0.35 ticks
        assert!(matches!(
            BitTimings::new::<Apa104>(1_000_000),
            Err(TimingError::TickOutOfRange { ns: 350, ticks: 0 })
        ));
    }

    #[test]
    fn frame_len_counts_both_resets() {
        assert_eq!(frame_len(0), 2);
        assert_eq!(frame_len(3), 26);
    }
}
