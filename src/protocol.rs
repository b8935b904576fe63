//! One-wire LED chip protocols.
//!
//! Each chip family is a zero-sized type implementing [`LedProtocol`]. A strip
//! picks its protocol by type at construction; the encoder reads the
//! nanosecond timing constants once and the strip uses [`LedProtocol::wire_bytes`]
//! to lay out each pixel.

use crate::types::RgbColor;

/// Timing and byte layout of a one-wire LED chip.
pub trait LedProtocol {
    /// Name used in log output.
    const NAME: &'static str;

    /// High time of a logical 0.
    const T0H_NS: u32;
    /// Low time of a logical 0.
    const T0L_NS: u32;
    /// High time of a logical 1.
    const T1H_NS: u32;
    /// Low time of a logical 1.
    const T1L_NS: u32;
    /// Idle-low time that latches a frame.
    const RESET_NS: u32;
    /// Allowed deviation of a high phase.
    const TH_ERROR_NS: u32;
    /// Allowed deviation of a low phase.
    const TL_ERROR_NS: u32;

    /// Bytes sent on the wire for one pixel, in transmission order.
    fn wire_bytes(color: RgbColor) -> [u8; 3];

    /// Longest a single bit can take within tolerance.
    fn worst_case_bit_ns() -> u32 {
        Self::T0H_NS + Self::TH_ERROR_NS + Self::T0L_NS + Self::TL_ERROR_NS
    }
}

/// APA104 (and the pin-compatible SK6812 family).
///
/// Wire bytes are gamma corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Apa104;

impl LedProtocol for Apa104 {
    const NAME: &'static str = "apa104";

    const T0H_NS: u32 = 350;
    const T0L_NS: u32 = 1360;
    const T1H_NS: u32 = 1360;
    const T1L_NS: u32 = 350;
    const RESET_NS: u32 = 50_000;
    const TH_ERROR_NS: u32 = 150;
    const TL_ERROR_NS: u32 = 150;

    fn wire_bytes(color: RgbColor) -> [u8; 3] {
        [
            gamma(color.green),
            gamma(color.red),
            gamma(color.blue),
        ]
    }
}

/// WS2812 / WS2812B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ws2812;

impl LedProtocol for Ws2812 {
    const NAME: &'static str = "ws2812";

    const T0H_NS: u32 = 350;
    const T0L_NS: u32 = 1000;
    const T1H_NS: u32 = 1000;
    const T1L_NS: u32 = 350;
    const RESET_NS: u32 = 280_000;
    const TH_ERROR_NS: u32 = 150;
    const TL_ERROR_NS: u32 = 150;

    fn wire_bytes(color: RgbColor) -> [u8; 3] {
        [color.green, color.red, color.blue]
    }
}

/// Perceptual correction for APA104 output (see rgb-123.com, "WS2812 color
/// output").
pub fn gamma(component: u8) -> u8 {
    GAMMA_LUT[usize::from(component)]
}

#[rustfmt::skip]
const GAMMA_LUT: [u8; 256] = [
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   1,   1,   1,   1,   1,   1,   1,   2,   2,   2,
      2,   2,   2,   3,   3,   3,   3,   3,   4,   4,   4,   4,   5,   5,   5,   5,
      6,   6,   6,   7,   7,   7,   8,   8,   8,   9,   9,   9,  10,  10,  11,  11,
     11,  12,  12,  13,  13,  13,  14,  14,  15,  15,  16,  16,  17,  17,  18,  18,
     19,  19,  20,  21,  21,  22,  22,  23,  23,  24,  25,  25,  26,  27,  27,  28,
     29,  29,  30,  31,  31,  32,  33,  34,  34,  35,  36,  37,  37,  38,  39,  40,
     40,  41,  42,  43,  44,  45,  46,  46,  47,  48,  49,  50,  51,  52,  53,  54,
     55,  56,  57,  58,  59,  60,  61,  62,  63,  64,  65,  66,  67,  68,  69,  70,
     71,  72,  73,  74,  76,  77,  78,  79,  80,  81,  83,  84,  85,  86,  88,  89,
     90,  91,  93,  94,  95,  96,  98,  99, 100, 102, 103, 104, 106, 107, 109, 110,
    111, 113, 114, 116, 117, 119, 120, 121, 123, 124, 126, 128, 129, 131, 132, 134,
    135, 137, 138, 140, 142, 143, 145, 146, 148, 150, 151, 153, 155, 157, 158, 160,
    162, 163, 165, 167, 169, 170, 172, 174, 176, 178, 179, 181, 183, 185, 187, 189,
    191, 193, 194, 196, 198, 200, 202, 204, 206, 208, 210, 212, 214, 216, 218, 220,
    222, 224, 227, 229, 231, 233, 235, 237, 239, 241, 244, 246, 248, 250, 252, 255,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apa104_worst_case_bit() {
        assert_eq!(Apa104::worst_case_bit_ns(), 2010);
    }

    #[test]
    fn byte_order_is_grb() {
        let color = RgbColor::new(1, 2, 3);
        assert_eq!(Ws2812::wire_bytes(color), [2, 1, 3]);
    }

    #[test]
    fn gamma_endpoints() {
        assert_eq!(gamma(0), 0);
        assert_eq!(gamma(255), 255);
        assert_eq!(gamma(100), 31);
        assert_eq!(Apa104::wire_bytes(RgbColor::new(255, 0, 0)), [0, 255, 0]);
    }
}
