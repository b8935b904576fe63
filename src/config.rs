//! Pattern engine configuration.

use crate::types::RgbColor;

/// Default number of fade steps from the start color to black.
pub const DEFAULT_FADE_STEP_COUNT: u8 = 40;

/// Warm start color used when no start temperature is configured.
pub const DEFAULT_FADE_START_COLOR: RgbColor = RgbColor::new(150, 100, 80);

/// Fixed parameters of a [`PatternEngine`](crate::engine::PatternEngine).
///
/// Anything the user may change at runtime lives in
/// [`Settings`](crate::settings::Settings) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Steps a fade takes to reach black.
    pub fade_step_count: u8,
    /// Fade start color when `sleep_fade_start_temp` is 0.
    pub fade_start_color: RgbColor,
    /// Highest channel value of the showcase intensity ramps.
    pub showcase_max_intensity: u8,
    /// HSV value (0-100) of the showcase hue sweep.
    pub showcase_hue_value: u8,
    /// HSV value (0-100) of the rainbow pattern.
    pub rainbow_brightness: u8,
    /// Strip showing the status sub-display.
    pub status_strip: usize,
    /// Strip showing the epoch seconds pattern.
    pub epoch_strip: usize,
}

impl EngineConfig {
    /// Creates a new builder starting from the defaults.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_step_count: DEFAULT_FADE_STEP_COUNT,
            fade_start_color: DEFAULT_FADE_START_COLOR,
            showcase_max_intensity: 60,
            showcase_hue_value: 10,
            rainbow_brightness: 10,
            status_strip: 0,
            epoch_strip: 1,
        }
    }
}

/// Errors from [`EngineConfigBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A fade needs at least one step.
    ZeroFadeSteps,
    /// An HSV value above 100.
    ValueOutOfRange { value: u8 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroFadeSteps => write!(f, "fade step count must be at least 1"),
            ConfigError::ValueOutOfRange { value } => {
                write!(f, "hsv value {} exceeds 100", value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Builder for validated engine configurations.
#[derive(Debug)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Default is 40.
    pub fn fade_step_count(mut self, count: u8) -> Self {
        self.config.fade_step_count = count;
        self
    }

    /// Default is (150, 100, 80).
    pub fn fade_start_color(mut self, color: RgbColor) -> Self {
        self.config.fade_start_color = color;
        self
    }

    pub fn showcase_max_intensity(mut self, intensity: u8) -> Self {
        self.config.showcase_max_intensity = intensity;
        self
    }

    pub fn showcase_hue_value(mut self, value: u8) -> Self {
        self.config.showcase_hue_value = value;
        self
    }

    pub fn rainbow_brightness(mut self, brightness: u8) -> Self {
        self.config.rainbow_brightness = brightness;
        self
    }

    /// Patterns drawing on a strip index the engine does not have fail with
    /// an invalid argument.
    pub fn status_strip(mut self, index: usize) -> Self {
        self.config.status_strip = index;
        self
    }

    pub fn epoch_strip(mut self, index: usize) -> Self {
        self.config.epoch_strip = index;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// * `ZeroFadeSteps` - Fade step count is 0
    /// * `ValueOutOfRange` - Showcase or rainbow HSV value above 100
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config = self.config;

        if config.fade_step_count == 0 {
            return Err(ConfigError::ZeroFadeSteps);
        }

        for value in [config.showcase_hue_value, config.rainbow_brightness] {
            if value > 100 {
                return Err(ConfigError::ValueOutOfRange { value });
            }
        }

        Ok(config)
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_from_defaults() {
        assert_eq!(EngineConfig::builder().build(), Ok(EngineConfig::default()));
    }

    #[test]
    fn zero_fade_steps_rejected() {
        assert_eq!(
            EngineConfig::builder().fade_step_count(0).build(),
            Err(ConfigError::ZeroFadeSteps)
        );
    }

    #[test]
    fn hsv_values_above_100_rejected() {
        assert_eq!(
            EngineConfig::builder().rainbow_brightness(101).build(),
            Err(ConfigError::ValueOutOfRange { value: 101 })
        );
        assert_eq!(
            EngineConfig::builder().showcase_hue_value(150).build(),
            Err(ConfigError::ValueOutOfRange { value: 150 })
        );
    }
}
