//! Hue sweeps across a pixel range.

use crate::colors::hsv_to_rgb;
use crate::strip::{LedStrip, StripError};
use crate::types::HsvColor;

/// Maps the hue range `angle_start..angle_start + angle_size` onto pixels
/// `led0..=led_n` at full saturation and `brightness` value (0-100).
///
/// When `led0 > led_n` the range wraps past the end of the strip. It is split
/// into a head `led0..=last` and a tail `0..=led_n`; the head gets
/// `angle_size * head_len / total_len` degrees and the tail gets the rest, so
/// the full span is always covered.
///
/// The buffer is only staged; the caller refreshes.
pub fn write_rainbow<S: LedStrip + ?Sized>(
    strip: &mut S,
    brightness: u8,
    led0: usize,
    led_n: usize,
    angle_start: u16,
    angle_size: u16,
) -> Result<(), StripError> {
    let len = strip.len();
    if led0 >= len || led_n >= len {
        let index = led0.max(led_n);
        error!("rainbow range {}..={} outside {} leds", led0, led_n, len);
        return Err(StripError::IndexOutOfRange { index, len });
    }

    if led0 > led_n {
        let head_len = len - led0;
        let total_len = head_len + led_n + 1;
        let head_angle = (u32::from(angle_size) * head_len as u32 / total_len as u32) as u16;
        let tail_angle = angle_size - head_angle;
        let tail_start = ((u32::from(angle_start) + u32::from(head_angle)) % 360) as u16;

        write_rainbow(strip, brightness, led0, len - 1, angle_start, head_angle)?;
        return write_rainbow(strip, brightness, 0, led_n, tail_start, tail_angle);
    }

    let count = (led_n - led0 + 1) as u32;
    for (offset, index) in (led0..=led_n).enumerate() {
        let hue = (u32::from(angle_start) + u32::from(angle_size) * offset as u32 / count) % 360;
        strip.set_pixel(index, hsv_to_rgb(HsvColor::new(hue as u16, 100, brightness)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OFF, RgbColor};

    struct Buffer {
        pixels: [RgbColor; 10],
    }

    impl LedStrip for Buffer {
        fn len(&self) -> usize {
            self.pixels.len()
        }

        fn set_pixel(&mut self, index: usize, color: RgbColor) -> Result<(), StripError> {
            let len = self.pixels.len();
            let pixel = self
                .pixels
                .get_mut(index)
                .ok_or(StripError::IndexOutOfRange { index, len })?;
            *pixel = color;
            Ok(())
        }

        fn pixel(&self, index: usize) -> Option<RgbColor> {
            self.pixels.get(index).copied()
        }

        fn refresh(&mut self) -> Result<(), StripError> {
            Ok(())
        }
    }

    #[test]
    fn untouched_pixels_stay_off() {
        let mut strip = Buffer { pixels: [OFF; 10] };
        write_rainbow(&mut strip, 50, 2, 4, 0, 90).unwrap();

        assert_eq!(strip.pixels[1], OFF);
        assert_ne!(strip.pixels[2], OFF);
        assert_ne!(strip.pixels[4], OFF);
        assert_eq!(strip.pixels[5], OFF);
    }

    #[test]
    fn out_of_range_end_is_rejected() {
        let mut strip = Buffer { pixels: [OFF; 10] };
        assert_eq!(
            write_rainbow(&mut strip, 50, 0, 10, 0, 90),
            Err(StripError::IndexOutOfRange { index: 10, len: 10 })
        );
    }
}
