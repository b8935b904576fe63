#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`ColorSpec`**: A color in CIE 1931 xyY, CCT, HSV or device RGB, convertible with `to_rgb`
//! - **`LedProtocol`**: Timing constants and byte layout of an LED chip (`Apa104`, `Ws2812`)
//! - **`PulseEncoder`**: Turns wire bytes into reset-framed high/low pulse items
//! - **`PulseTransmitter`**: Trait to implement for your pulse peripheral (RMT or similar)
//! - **`Strip`**: One physical LED chain with its pixel buffer
//! - **`LedStrip`**: Trait the pattern engine draws through
//! - **`PatternEngine`**: Runs named patterns on all strips under a sleeping hardware lock
//! - **`WallClock`** / **`SettingsSource`**: Traits for the local time and the user settings
//!
//! Device colors are `Srgb<u8>`. Gamma correction, where a chip needs it, is
//! applied by the protocol when the pixel is encoded.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod clock;
pub mod clock_face;
pub mod colors;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod pattern;
pub mod protocol;
pub mod rainbow;
pub mod settings;
pub mod strip;
pub mod types;

pub use clock::WallClock;
pub use colors::{ColorSpace, ColorSpec, cct_to_rgb, cie_to_rgb, hsv_to_rgb, rgb_to_hsv};
pub use config::{ConfigError, EngineConfig, EngineConfigBuilder};
pub use encoder::{Encoded, Framing, PulseEncoder, PulseItem, TimingError};
pub use engine::{FadeState, PatternEngine, PatternError};
pub use pattern::{Pattern, StatusColor, StatusSlot};
pub use protocol::{Apa104, LedProtocol, Ws2812};
pub use rainbow::write_rainbow;
pub use settings::{Setting, Settings, SettingsError, SettingsSource};
pub use strip::{LedStrip, PulseTransmitter, Strip, StripConfig, StripError, TransmitterError};
pub use types::{CctColor, CieColor, ColorComponent, ErrorKind, HsvColor, OFF, RgbColor};
