//! Named, range-validated settings consulted at dispatch time.
//!
//! Each [`Setting`] has a default and a fixed list of allowed values. The
//! in-memory [`Settings`] registry rejects anything outside that list, so the
//! pattern engine can trust what it reads through [`SettingsSource`].

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::pattern::Pattern;
use crate::types::ErrorKind;

/// A named setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    AlarmHour,
    AlarmMinute,
    AlarmEnabled,
    AlarmLedPattern,
    AlarmSnoozeIntervalMin,
    SleepDelayMin,
    SleepFadeTimeMin,
    /// Start temperature of the sleep fade in kelvin; 0 selects the built-in
    /// warm color.
    SleepFadeStartTemp,
    SleepFadeStartLuminosity,
    /// Per-pixel delay of the fill that shows each fade step.
    SleepFadeFillTimeMs,
    /// Per-pixel delay of the progressive fill patterns.
    FillTimeMs,
}

const ALARM_PATTERNS: [u32; 2] = [
    Pattern::FillWhite.index() as u32,
    Pattern::SuddenWhite.index() as u32,
];

const FILL_TIMES_MS: [u32; 7] = [0, 50, 100, 150, 250, 500, 1000];

impl Setting {
    pub const ALL: [Setting; 11] = [
        Setting::AlarmHour,
        Setting::AlarmMinute,
        Setting::AlarmEnabled,
        Setting::AlarmLedPattern,
        Setting::AlarmSnoozeIntervalMin,
        Setting::SleepDelayMin,
        Setting::SleepFadeTimeMin,
        Setting::SleepFadeStartTemp,
        Setting::SleepFadeStartLuminosity,
        Setting::SleepFadeFillTimeMs,
        Setting::FillTimeMs,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub const fn name(self) -> &'static str {
        match self {
            Setting::AlarmHour => "alarm_hour",
            Setting::AlarmMinute => "alarm_minute",
            Setting::AlarmEnabled => "alarm_enabled",
            Setting::AlarmLedPattern => "alarm_led_pattern",
            Setting::AlarmSnoozeIntervalMin => "alarm_snooze_interval_min",
            Setting::SleepDelayMin => "sleep_delay_min",
            Setting::SleepFadeTimeMin => "sleep_fade_time_min",
            Setting::SleepFadeStartTemp => "sleep_fade_start_temp",
            Setting::SleepFadeStartLuminosity => "sleep_fade_start_luminosity",
            Setting::SleepFadeFillTimeMs => "sleep_fade_fill_time_ms",
            Setting::FillTimeMs => "fill_time_ms",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|setting| setting.name() == name)
    }

    pub const fn default_value(self) -> u32 {
        match self {
            Setting::AlarmHour => 7,
            Setting::AlarmMinute => 30,
            Setting::AlarmEnabled => 1,
            Setting::AlarmLedPattern => Pattern::FillWhite.index() as u32,
            Setting::AlarmSnoozeIntervalMin => 10,
            Setting::SleepDelayMin => 30,
            Setting::SleepFadeTimeMin => 15,
            Setting::SleepFadeStartTemp => 0,
            Setting::SleepFadeStartLuminosity => 100,
            Setting::SleepFadeFillTimeMs => 150,
            Setting::FillTimeMs => 150,
        }
    }

    /// Every value [`Settings::set`] accepts for this setting.
    pub const fn allowed_values(self) -> &'static [u32] {
        match self {
            Setting::AlarmHour => &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            Setting::AlarmMinute => &[0, 15, 30, 45],
            Setting::AlarmEnabled => &[0, 1],
            Setting::AlarmLedPattern => &ALARM_PATTERNS,
            // includes the default
            Setting::AlarmSnoozeIntervalMin => &[1, 3, 5, 7, 9, 10, 11, 13, 15],
            Setting::SleepDelayMin => &[1, 3, 5, 8, 10, 15, 20, 30, 45, 60],
            Setting::SleepFadeTimeMin => &[1, 3, 5, 8, 10, 15, 30],
            // below 2000K the locus approximation leaves the gamut
            Setting::SleepFadeStartTemp => &[0, 2000, 2500, 3000, 3500, 4000],
            Setting::SleepFadeStartLuminosity => &[25, 50, 75, 100, 150, 200, 255],
            Setting::SleepFadeFillTimeMs => &FILL_TIMES_MS,
            Setting::FillTimeMs => &FILL_TIMES_MS,
        }
    }

    pub fn allows(self, value: u32) -> bool {
        self.allowed_values().contains(&value)
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Errors from updating a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// No setting has this name.
    UnknownSetting,
    /// The value is not in the setting's allowed list.
    InvalidValue { setting: Setting, value: u32 },
}

impl SettingsError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingsError::UnknownSetting => write!(f, "unknown setting"),
            SettingsError::InvalidValue { setting, value } => {
                write!(f, "invalid {} value ({})", setting.name(), value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SettingsError {}

/// Trait for synchronous settings lookup.
pub trait SettingsSource {
    /// Current value of `setting`.
    fn get(&self, setting: Setting) -> u32;
}

impl<S: SettingsSource + ?Sized> SettingsSource for &S {
    fn get(&self, setting: Setting) -> u32 {
        (**self).get(setting)
    }
}

/// Registry shared with whatever edits settings at runtime.
impl<M: RawMutex> SettingsSource for Mutex<M, RefCell<Settings>> {
    fn get(&self, setting: Setting) -> u32 {
        self.lock(|settings| settings.borrow().get(setting))
    }
}

/// In-memory settings registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    values: [u32; Setting::COUNT],
}

impl Settings {
    /// A registry holding every default.
    pub fn new() -> Self {
        Self {
            values: Setting::ALL.map(Setting::default_value),
        }
    }

    pub fn get(&self, setting: Setting) -> u32 {
        self.values[setting.slot()]
    }

    /// Updates `setting` if `value` is allowed.
    pub fn set(&mut self, setting: Setting, value: u32) -> Result<(), SettingsError> {
        if !setting.allows(value) {
            error!("invalid {} value ({}) provided", setting.name(), value);
            return Err(SettingsError::InvalidValue { setting, value });
        }
        self.values[setting.slot()] = value;
        Ok(())
    }

    /// Looks up a setting by name.
    pub fn get_by_name(&self, name: &str) -> Result<u32, SettingsError> {
        let setting = Setting::from_name(name).ok_or(SettingsError::UnknownSetting)?;
        Ok(self.get(setting))
    }

    /// Updates a setting by name.
    pub fn set_by_name(&mut self, name: &str, value: u32) -> Result<(), SettingsError> {
        let setting = Setting::from_name(name).ok_or_else(|| {
            error!("setting {} not found", name);
            SettingsError::UnknownSetting
        })?;
        self.set(setting, value)
    }

    /// Every setting with its current value.
    pub fn iter(&self) -> impl Iterator<Item = (Setting, u32)> + '_ {
        Setting::ALL.into_iter().map(|setting| (setting, self.get(setting)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsSource for Settings {
    fn get(&self, setting: Setting) -> u32 {
        Settings::get(self, setting)
    }
}
