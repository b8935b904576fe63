//! Binary and BCD renderings of numbers and the current time.
//!
//! Bits are laid out least significant bit at the lowest pixel index. The
//! time display is read from the far end of the strip towards pixel 0.

use time::OffsetDateTime;

use crate::strip::{LedStrip, StripError};
use crate::types::{OFF, RgbColor};

/// Largest value [`int_to_bcd`] can pack into 32 bits.
pub const BCD_MAX: u32 = 99_999_999;

/// Width of the epoch seconds display.
pub const EPOCH_BITS: usize = 32;

/// Shortest strip that fits the date row of [`render_time`].
pub const TIME_MIN_LEDS: usize = 46;

const NOFF: u8 = 1;
const SOFT: u8 = 40;
const HARD: u8 = 100;

/// Pixels not used by the time layout.
pub const UNUSED: RgbColor = RgbColor::new(NOFF, NOFF, NOFF);
pub const UNDERSCORE: RgbColor = RgbColor::new(SOFT, SOFT, 0);
pub const DASH: RgbColor = RgbColor::new(0, 0, SOFT);
pub const COLON: RgbColor = RgbColor::new(NOFF, SOFT, SOFT);
pub const SLASH: RgbColor = RgbColor::new(SOFT, NOFF, SOFT);
pub const TIME_BIT: RgbColor = RgbColor::new(NOFF, HARD, NOFF);
pub const DATE_BIT: RgbColor = RgbColor::new(HARD, NOFF, NOFF);

/// Color of set bits in the epoch seconds display.
pub const EPOCH_BIT: RgbColor = RgbColor::new(0, HARD, 0);

/// Bit weight legend at pixels 3, 2, 1, 0 of the time row.
pub const BITNESS: [RgbColor; 4] = [
    RgbColor::new(0, NOFF, 0),
    RgbColor::new(0, SOFT / 6, 0),
    RgbColor::new(0, SOFT / 2, 0),
    RgbColor::new(0, SOFT, 0),
];

/// Packs the decimal digits of `value` into nibbles.
///
/// Returns `None` above [`BCD_MAX`].
pub fn int_to_bcd(value: u32) -> Option<u32> {
    if value > BCD_MAX {
        error!("{} exceeds BCD max of {}", value, BCD_MAX);
        return None;
    }

    let mut rest = value;
    let mut bcd = 0;
    for nibble in 0..8 {
        bcd |= (rest % 10) << (nibble * 4);
        rest /= 10;
    }
    Some(bcd)
}

/// Shows `bit_count` bits of `value`, starting at bit `value_start`, on pixels
/// `led_start..led_start + bit_count`. Set bits get `color`, clear bits are off.
pub fn show_integer<S: LedStrip + ?Sized>(
    strip: &mut S,
    bit_count: usize,
    value: u64,
    led_start: usize,
    value_start: usize,
    color: RgbColor,
) -> Result<(), StripError> {
    for bit in 0..bit_count {
        let set = u32::try_from(value_start + bit)
            .ok()
            .and_then(|shift| value.checked_shr(shift))
            .is_some_and(|shifted| shifted & 1 == 1);
        strip.set_pixel(led_start + bit, if set { color } else { OFF })?;
    }
    Ok(())
}

/// Shows the low [`EPOCH_BITS`] bits of `seconds` from `led_start`, cut short
/// at the end of the strip.
pub fn show_epoch<S: LedStrip + ?Sized>(
    strip: &mut S,
    led_start: usize,
    seconds: u64,
) -> Result<(), StripError> {
    let bits = EPOCH_BITS.min(strip.len().saturating_sub(led_start));
    show_integer(strip, bits, seconds, led_start, 0, EPOCH_BIT)
}

/// Writes fields from the far end of a strip towards pixel 0.
struct Cursor<'a, S: LedStrip + ?Sized> {
    strip: &'a mut S,
    index: usize,
}

impl<'a, S: LedStrip + ?Sized> Cursor<'a, S> {
    fn new(strip: &'a mut S) -> Self {
        let index = strip.len().saturating_sub(1);
        Self { strip, index }
    }

    fn mark(&mut self, color: RgbColor) -> Result<(), StripError> {
        self.strip.set_pixel(self.index, color)?;
        self.index = self.index.saturating_sub(1);
        Ok(())
    }

    fn marks(&mut self, count: usize, color: RgbColor) -> Result<(), StripError> {
        for _ in 0..count {
            self.mark(color)?;
        }
        Ok(())
    }

    fn field(
        &mut self,
        bits: usize,
        value: u32,
        value_start: usize,
        color: RgbColor,
    ) -> Result<(), StripError> {
        self.index = self.index.saturating_sub(bits);
        show_integer(
            &mut *self.strip,
            bits,
            u64::from(value),
            self.index + 1,
            value_start,
            color,
        )
    }

    /// A BCD field written as its high digit bits, a dash, then the low digit.
    fn digits(&mut self, high_bits: usize, bcd: u32, color: RgbColor) -> Result<(), StripError> {
        self.field(high_bits, bcd, 4, color)?;
        self.mark(DASH)?;
        self.field(4, bcd, 0, color)
    }
}

/// Renders `now` in BCD.
///
/// `upper` gets `__hh-hhhh::mmm-mmmm::sss-ssss__` plus the bit weight legend
/// at pixels 3..=0. `lower` gets
/// `__m-mmmm//dd-dddd//yy-yyyy-yyyy-yyyy_d__www__` with the DST flag and the
/// one-based weekday. Every other pixel is dimly lit. Both strips must have
/// at least [`TIME_MIN_LEDS`] pixels.
pub fn render_time<S: LedStrip + ?Sized>(
    upper: &mut S,
    lower: &mut S,
    now: OffsetDateTime,
    dst: bool,
) -> Result<(), StripError> {
    for strip in [&mut *upper, &mut *lower] {
        let len = strip.len();
        if len < TIME_MIN_LEDS {
            error!("time display needs {} leds, strip has {}", TIME_MIN_LEDS, len);
            return Err(StripError::IndexOutOfRange {
                index: TIME_MIN_LEDS - 1,
                len,
            });
        }
        for index in 0..len {
            strip.set_pixel(index, UNUSED)?;
        }
    }

    info!(
        "time {}:{}:{} {}/{}/{}",
        now.hour(),
        now.minute(),
        now.second(),
        u8::from(now.month()),
        now.day(),
        now.year()
    );

    let bcd = |value: u32| int_to_bcd(value).unwrap_or(0);

    let mut row = Cursor::new(&mut *upper);
    row.marks(2, UNDERSCORE)?;
    row.digits(2, bcd(u32::from(now.hour())), TIME_BIT)?;
    row.marks(2, COLON)?;
    row.digits(3, bcd(u32::from(now.minute())), TIME_BIT)?;
    row.marks(2, COLON)?;
    row.digits(3, bcd(u32::from(now.second())), TIME_BIT)?;
    row.marks(2, UNDERSCORE)?;

    for (index, color) in BITNESS.into_iter().enumerate() {
        upper.set_pixel(index, color)?;
    }

    let year = bcd(u32::try_from(now.year()).unwrap_or(0));

    let mut row = Cursor::new(&mut *lower);
    row.marks(2, UNDERSCORE)?;
    row.digits(1, bcd(u32::from(u8::from(now.month()))), DATE_BIT)?;
    row.marks(2, SLASH)?;
    row.digits(2, bcd(u32::from(now.day())), DATE_BIT)?;
    row.marks(2, SLASH)?;
    row.field(2, year, 12, DATE_BIT)?;
    row.mark(DASH)?;
    row.field(4, year, 8, DATE_BIT)?;
    row.mark(DASH)?;
    row.digits(4, year, DATE_BIT)?;
    row.mark(UNDERSCORE)?;
    row.field(1, u32::from(dst), 0, DATE_BIT)?;
    row.marks(2, UNDERSCORE)?;
    row.field(
        3,
        u32::from(now.weekday().number_days_from_sunday()) + 1,
        0,
        DATE_BIT,
    )?;
    row.marks(2, UNDERSCORE)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcd_packs_digits() {
        assert_eq!(int_to_bcd(0), Some(0));
        assert_eq!(int_to_bcd(59), Some(0x59));
        assert_eq!(int_to_bcd(2026), Some(0x2026));
        assert_eq!(int_to_bcd(BCD_MAX), Some(0x9999_9999));
    }

    #[test]
    fn bcd_rejects_nine_digits() {
        assert_eq!(int_to_bcd(BCD_MAX + 1), None);
    }
}
