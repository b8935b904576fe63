//! Core color types and the shared error taxonomy.

use palette::Srgb;

/// 8-bit normalized color intensity.
pub type ColorComponent = u8;

/// Largest value a [`ColorComponent`] can hold.
pub const COMPONENT_MAX: ColorComponent = ColorComponent::MAX;

/// Device color, 8 bits per channel.
///
/// This is the only color representation a strip accepts.
pub type RgbColor = Srgb<ColorComponent>;

/// All channels off.
pub const OFF: RgbColor = RgbColor::new(0, 0, 0);

/// CIE 1931 chromaticity coordinates plus luminosity.
///
/// `x` and `y` are expected on [0, 1]. Out-of-range values are clamped (with
/// a logged warning) by the conversion, never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CieColor {
    pub x: f32,
    pub y: f32,
    pub luminosity: ColorComponent,
}

impl CieColor {
    pub const fn new(x: f32, y: f32, luminosity: ColorComponent) -> Self {
        Self { x, y, luminosity }
    }

    /// Returns the same chromaticity at another luminosity.
    pub const fn with_luminosity(self, luminosity: ColorComponent) -> Self {
        Self { luminosity, ..self }
    }
}

/// Correlated color temperature plus luminosity.
///
/// The approximation is tuned for 4000K-25000K. Temperatures outside that
/// range are extrapolated with a logged warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CctColor {
    pub kelvin: u16,
    pub luminosity: ColorComponent,
}

impl CctColor {
    pub const fn new(kelvin: u16, luminosity: ColorComponent) -> Self {
        Self { kelvin, luminosity }
    }
}

/// Hue in degrees (taken mod 360), saturation and value on [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HsvColor {
    pub hue: u16,
    pub saturation: u8,
    pub value: u8,
}

impl HsvColor {
    pub const fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

/// Error classes shared by every fallible operation in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Bad pixel index, pattern id, slot or setting value.
    InvalidArgument,

    /// Peripheral setup failed. Fatal at boot.
    DeviceInitFailure,

    /// A refresh exceeded its bounded transmit time.
    TransmissionTimeout,

    /// The transmitter had no room for the trailing reset pulse.
    ///
    /// Only ever logged; the frame is still sent.
    ProtocolFramingShortfall,

    /// CIE/CCT input outside the nominal domain.
    ///
    /// Only ever logged; the conversion proceeds with clamped or
    /// extrapolated values.
    MathDomainWarning,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::DeviceInitFailure => "device init failure",
            ErrorKind::TransmissionTimeout => "transmission timeout",
            ErrorKind::ProtocolFramingShortfall => "protocol framing shortfall",
            ErrorKind::MathDomainWarning => "math domain warning",
        };
        f.write_str(name)
    }
}
