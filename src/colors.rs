//! Color space conversion engine.
//!
//! Converts CIE 1931 xyY, correlated color temperature and HSV into device
//! RGB, and device RGB back into HSV. All math is done in `f32` (or integers
//! where the reference behavior is integral) and every narrowing to a
//! [`ColorComponent`] clamps first and then truncates; nothing rounds.
//!
//! Gamma is not applied here. Companding is a property of the LED chip and is
//! handled by the strip protocol.

use palette::convert::FromColorUnclamped;
use palette::white_point::E;
use palette::{Xyz, Yxy};

use crate::types::{CctColor, CieColor, ColorComponent, COMPONENT_MAX, HsvColor, OFF, RgbColor};

/// XYZ to linear CIE RGB (illuminant E), from Bruce Lindbloom's tables.
const CIE_RGB_FROM_XYZ: [[f32; 3]; 3] = [
    [2.370_674_3, -0.900_040_5, -0.470_633_8],
    [-0.513_885, 1.425_303_6, 0.088_581_4],
    [0.005_298_2, -0.014_694_9, 1.009_396_8],
];

/// Lower bound of the temperature range the CCT polynomials are fitted for.
pub const CCT_MIN_KELVIN: u16 = 4000;

/// Upper bound of the temperature range the CCT polynomials are fitted for.
pub const CCT_MAX_KELVIN: u16 = 25000;

/// Converts HSV to device RGB using the six-sector hexagon.
///
/// Hue is taken mod 360. Saturation or value above 100 is logged as an error
/// but the arithmetic still runs; the resulting channels are clamped.
pub fn hsv_to_rgb(hsv: HsvColor) -> RgbColor {
    let HsvColor {
        hue,
        saturation,
        value,
    } = hsv;

    if saturation > 100 || value > 100 {
        error!(
            "hsv out of range: h={} s={} v={}",
            hue, saturation, value
        );
    }

    let hue = i32::from(hue) % 360;
    // v * 2.55 and max * (100 - s) / 100, truncated
    let rgb_max = i32::from(value) * 255 / 100;
    let rgb_min = rgb_max * (100 - i32::from(saturation)) / 100;

    let sector = hue / 60;
    let diff = hue % 60;
    let rgb_adj = (rgb_max - rgb_min) * diff / 60;

    let (r, g, b) = match sector {
        0 => (rgb_max, rgb_min + rgb_adj, rgb_min),
        1 => (rgb_max - rgb_adj, rgb_max, rgb_min),
        2 => (rgb_min, rgb_max, rgb_min + rgb_adj),
        3 => (rgb_min, rgb_max - rgb_adj, rgb_max),
        4 => (rgb_min + rgb_adj, rgb_min, rgb_max),
        _ => (rgb_max, rgb_min, rgb_max - rgb_adj),
    };

    RgbColor::new(clamp_component(r), clamp_component(g), clamp_component(b))
}

/// Converts device RGB to HSV.
///
/// Greys (all channels equal) produce hue 0 and saturation 0. When two
/// channels tie for the maximum, red is preferred over green and green over
/// blue, so e.g. pure yellow reports a red-sector hue.
pub fn rgb_to_hsv(rgb: RgbColor) -> HsvColor {
    let max = f32::from(COMPONENT_MAX);
    let r = f32::from(rgb.red) / max;
    let g = f32::from(rgb.green) / max;
    let b = f32::from(rgb.blue) / max;

    let cmax = r.max(g.max(b));
    let cmin = r.min(g.min(b));
    let delta = cmax - cmin;

    let sector = if delta == 0.0 {
        0.0
    } else if cmax == r {
        ((g - b) / delta) % 6.0
    } else if cmax == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    let mut degrees = sector * 60.0;
    if degrees < 0.0 {
        degrees += 360.0;
    }
    if degrees >= 360.0 {
        degrees -= 360.0;
    }

    let saturation = if cmax == 0.0 { 0.0 } else { delta / cmax };

    HsvColor {
        hue: degrees as u16,
        saturation: (saturation * 100.0) as u8,
        value: (cmax * 100.0) as u8,
    }
}

/// Converts CIE 1931 xyY to device RGB.
///
/// `x` and `y` are clamped into [0, 1] with a logged warning. A `y` of zero
/// has no XYZ representation; it is logged and produces black.
pub fn cie_to_rgb(cie: CieColor) -> RgbColor {
    let x = clamp_chromaticity("x", cie.x);
    let y = clamp_chromaticity("y", cie.y);

    if y == 0.0 {
        warn!("cie y is zero, chromaticity undefined; emitting black");
        return OFF;
    }

    let luma = f32::from(cie.luminosity) / f32::from(COMPONENT_MAX);
    // unclamped: channels above the white point saturate in narrow_unit
    let xyz = Xyz::<E, f32>::from_color_unclamped(Yxy::<E, f32>::new(x, y, luma));

    let linear = CIE_RGB_FROM_XYZ.map(|row| row[0] * xyz.x + row[1] * xyz.y + row[2] * xyz.z);

    RgbColor::new(
        narrow_unit(linear[0]),
        narrow_unit(linear[1]),
        narrow_unit(linear[2]),
    )
}

/// Converts a correlated color temperature to device RGB.
///
/// Approximates the Planckian locus chromaticity with the two polynomial
/// regimes split at 7000K, then converts through [`cie_to_rgb`].
pub fn cct_to_rgb(cct: CctColor) -> RgbColor {
    if cct.kelvin == 0 {
        warn!("cct of 0K has no chromaticity; emitting black");
        return OFF;
    }
    if !(CCT_MIN_KELVIN..=CCT_MAX_KELVIN).contains(&cct.kelvin) {
        warn!(
            "cct {}K outside fitted range {}-{}K, extrapolating",
            cct.kelvin, CCT_MIN_KELVIN, CCT_MAX_KELVIN
        );
    }

    let (x, y) = planckian_chromaticity(cct.kelvin);
    cie_to_rgb(CieColor::new(x, y, cct.luminosity))
}

/// Approximate chromaticity of a black body at `kelvin`.
pub fn planckian_chromaticity(kelvin: u16) -> (f32, f32) {
    let t = f32::from(kelvin);
    let t2 = t * t;
    let t3 = t2 * t;

    let x = if kelvin < 7000 {
        -4.6070e9 / t3 + 2.9678e6 / t2 + 0.09911e3 / t + 0.244_063
    } else {
        -2.0064e9 / t3 + 1.9018e6 / t2 + 0.24748e3 / t + 0.237_040
    };
    let y = -3.000 * x * x + 2.870 * x - 0.275;

    (x, y)
}

fn clamp_chromaticity(axis: &'static str, value: f32) -> f32 {
    if value.is_nan() {
        warn!("cie {} is NaN, using 0", axis);
        0.0
    } else if value < 0.0 {
        warn!("cie {} {} below 0, clamping", axis, value);
        0.0
    } else if value > 1.0 {
        warn!("cie {} {} above 1, clamping", axis, value);
        1.0
    } else {
        value
    }
}

fn narrow_unit(value: f32) -> ColorComponent {
    (value.clamp(0.0, 1.0) * f32::from(COMPONENT_MAX)) as ColorComponent
}

fn clamp_component(value: i32) -> ColorComponent {
    value.clamp(0, i32::from(COMPONENT_MAX)) as ColorComponent
}

/// A color in any supported space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpec {
    Cie(CieColor),
    Cct(CctColor),
    Hsv(HsvColor),
    Rgb(RgbColor),
}

impl ColorSpec {
    /// Converts to device RGB.
    pub fn to_rgb(self) -> RgbColor {
        match self {
            ColorSpec::Cie(cie) => cie_to_rgb(cie),
            ColorSpec::Cct(cct) => cct_to_rgb(cct),
            ColorSpec::Hsv(hsv) => hsv_to_rgb(hsv),
            ColorSpec::Rgb(rgb) => rgb,
        }
    }

    /// Builds a color from preset table indices.
    ///
    /// The meaning of the indices depends on the space:
    /// * CIE: chroma, luminosity level
    /// * CCT: temperature, luminosity level
    /// * HSV: hue, saturation level, value level
    /// * RGB: named color
    ///
    /// Returns `None` when an index is outside its table.
    pub fn from_preset(space: ColorSpace, a: usize, b: usize, c: usize) -> Option<Self> {
        let color = match space {
            ColorSpace::Cie1931 => {
                let (_, chroma) = presets::CIE_CHROMAS.get(a)?;
                let (_, level) = presets::LEVELS.get(b)?;
                ColorSpec::Cie(chroma.with_luminosity(*level))
            }
            ColorSpace::Cct => {
                let (_, kelvin) = presets::CCT_TEMPERATURES.get(a)?;
                let (_, level) = presets::LEVELS.get(b)?;
                ColorSpec::Cct(CctColor::new(*kelvin, *level))
            }
            ColorSpace::Hsv => {
                let (_, hue) = presets::HSV_HUES.get(a)?;
                let (_, saturation) = presets::LEVELS.get(b)?;
                let (_, value) = presets::LEVELS.get(c)?;
                // Levels are on [0, 255]; HSV wants percentages.
                ColorSpec::Hsv(HsvColor::new(
                    *hue,
                    percent_of_max(*saturation),
                    percent_of_max(*value),
                ))
            }
            ColorSpace::Rgb => {
                let (_, rgb) = presets::RGB_COLORS.get(a)?;
                ColorSpec::Rgb(*rgb)
            }
        };
        Some(color)
    }
}

fn percent_of_max(level: ColorComponent) -> u8 {
    (u16::from(level) * 100 / u16::from(COMPONENT_MAX)) as u8
}

/// Supported input color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorSpace {
    Cie1931,
    Cct,
    Hsv,
    Rgb,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 4] = [
        ColorSpace::Cie1931,
        ColorSpace::Cct,
        ColorSpace::Hsv,
        ColorSpace::Rgb,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ColorSpace::Cie1931 => "CIE 1931",
            ColorSpace::Cct => "CCT",
            ColorSpace::Hsv => "HSV",
            ColorSpace::Rgb => "RGB",
        }
    }
}

/// Named presets for every color space.
pub mod presets {
    use crate::types::{CieColor, ColorComponent, COMPONENT_MAX, RgbColor};

    const fn percent(p: u16) -> ColorComponent {
        (p * COMPONENT_MAX as u16 / 100) as ColorComponent
    }

    /// Generic intensity levels, used for luminosity, saturation and value.
    pub const LEVELS: [(&str, ColorComponent); 7] = [
        ("zero", 0),
        ("one", 1),
        ("low", percent(15)),
        ("medium", percent(40)),
        ("high", percent(60)),
        ("ouch", percent(80)),
        ("max", COMPONENT_MAX),
    ];

    /// Index of the "medium" entry in [`LEVELS`].
    pub const LEVEL_MEDIUM: usize = 3;

    /// Spectral locus points read off LED color mixing charts, plus the
    /// equal-energy white point.
    pub const CIE_CHROMAS: [(&str, CieColor); 8] = [
        ("far_red_770", CieColor::new(0.734_701_1, 0.265_298_9, 0)),
        ("red_650", CieColor::new(0.725_992_3, 0.274_007_7, 0)),
        ("yellow_575", CieColor::new(0.478_774_8, 0.520_202_3, 0)),
        ("green_510", CieColor::new(0.013_870_246, 0.750_186_4, 0)),
        ("cyan_490", CieColor::new(0.045_390_735, 0.294_975_97, 0)),
        ("blue_477", CieColor::new(0.102_775_86, 0.102_863_74, 0)),
        ("far_magenta_380", CieColor::new(0.174_112_26, 0.004_963_727, 0)),
        ("achromat_E", CieColor::new(1.0 / 3.0, 1.0 / 3.0, 0)),
    ];

    pub const CCT_TEMPERATURES: [(&str, u16); 5] = [
        ("red_1000", 1000),
        ("warm_2500", 2500),
        ("cool_3800", 3800),
        ("day_5500", 5500),
        ("blue_10000", 10000),
    ];

    pub const HSV_HUES: [(&str, u16); 6] = [
        ("red", 0),
        ("green", 120),
        ("blue", 240),
        ("cyan", 180),
        ("magenta", 300),
        ("yellow", 60),
    ];

    const BASE: ColorComponent = 120;

    pub const RGB_COLORS: [(&str, RgbColor); 12] = [
        ("red", RgbColor::new(BASE, 0, 0)),
        ("green", RgbColor::new(0, BASE, 0)),
        ("blue", RgbColor::new(0, 0, BASE)),
        ("cyan", RgbColor::new(0, BASE / 2, BASE / 2)),
        ("magenta", RgbColor::new(BASE / 2, 0, BASE / 2)),
        ("yellow", RgbColor::new(BASE / 2, BASE / 2, 0)),
        ("white", RgbColor::new(BASE / 3, BASE / 3, BASE / 3)),
        ("nearly_off", RgbColor::new(1, 1, 1)),
        ("off", RgbColor::new(0, 0, 0)),
        (
            "whyamionfirewhite",
            RgbColor::new(COMPONENT_MAX, COMPONENT_MAX, COMPONENT_MAX),
        ),
        ("auiiieeyellow", RgbColor::new(COMPONENT_MAX, COMPONENT_MAX, 0)),
        ("whosebloodisthisred", RgbColor::new(COMPONENT_MAX, 0, 0)),
    ];
}
