//! Pattern identifiers and the status sub-display model.

use crate::types::RgbColor;

/// A named lighting pattern.
///
/// Indices are stable and match the order of [`Pattern::ALL`]; external
/// selection UIs and stored settings refer to patterns by index or by
/// [`name`](Pattern::name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    SuddenRed,
    SuddenGreen,
    SuddenBlue,
    SuddenCyan,
    SuddenMagenta,
    SuddenYellow,
    SuddenBlack,
    SuddenWhite,
    FillRed,
    FillGreen,
    FillBlue,
    FillCyan,
    FillMagenta,
    FillYellow,
    FillBlack,
    FillWhite,
    FillWhyAmIOnFireWhite,
    FillAuiiieeYellow,
    FillWhoseBloodIsThisRed,
    CurrentTime,
    ColorShowcase,
    BrightnessGradient,
    StatusIndicators,
    LocalTimeInUnixEpochSeconds,
    FadeStart,
    FadeStep,
    ColorPresetGrid,
    Rainbow,
}

impl Pattern {
    pub const ALL: [Pattern; 28] = [
        Pattern::SuddenRed,
        Pattern::SuddenGreen,
        Pattern::SuddenBlue,
        Pattern::SuddenCyan,
        Pattern::SuddenMagenta,
        Pattern::SuddenYellow,
        Pattern::SuddenBlack,
        Pattern::SuddenWhite,
        Pattern::FillRed,
        Pattern::FillGreen,
        Pattern::FillBlue,
        Pattern::FillCyan,
        Pattern::FillMagenta,
        Pattern::FillYellow,
        Pattern::FillBlack,
        Pattern::FillWhite,
        Pattern::FillWhyAmIOnFireWhite,
        Pattern::FillAuiiieeYellow,
        Pattern::FillWhoseBloodIsThisRed,
        Pattern::CurrentTime,
        Pattern::ColorShowcase,
        Pattern::BrightnessGradient,
        Pattern::StatusIndicators,
        Pattern::LocalTimeInUnixEpochSeconds,
        Pattern::FadeStart,
        Pattern::FadeStep,
        Pattern::ColorPresetGrid,
        Pattern::Rainbow,
    ];

    /// Number of defined patterns.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index of this pattern.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Pattern::SuddenRed => "sudden_red",
            Pattern::SuddenGreen => "sudden_green",
            Pattern::SuddenBlue => "sudden_blue",
            Pattern::SuddenCyan => "sudden_cyan",
            Pattern::SuddenMagenta => "sudden_magenta",
            Pattern::SuddenYellow => "sudden_yellow",
            Pattern::SuddenBlack => "sudden_black",
            Pattern::SuddenWhite => "sudden_white",
            Pattern::FillRed => "fill_red",
            Pattern::FillGreen => "fill_green",
            Pattern::FillBlue => "fill_blue",
            Pattern::FillCyan => "fill_cyan",
            Pattern::FillMagenta => "fill_magenta",
            Pattern::FillYellow => "fill_yellow",
            Pattern::FillBlack => "fill_black",
            Pattern::FillWhite => "fill_white",
            Pattern::FillWhyAmIOnFireWhite => "fill_whyamionfirewhite",
            Pattern::FillAuiiieeYellow => "fill_auiiieeyellow",
            Pattern::FillWhoseBloodIsThisRed => "fill_whosebloodisthisred",
            Pattern::CurrentTime => "current_time",
            Pattern::ColorShowcase => "color_showcase",
            Pattern::BrightnessGradient => "brightness_gradient",
            Pattern::StatusIndicators => "status_indicators",
            Pattern::LocalTimeInUnixEpochSeconds => "local_time_in_unix_epoch_seconds",
            Pattern::FadeStart => "fade_start",
            Pattern::FadeStep => "fade_step",
            Pattern::ColorPresetGrid => "color_preset_grid",
            Pattern::Rainbow => "rainbow",
        }
    }

    /// Looks a pattern up by its [`name`](Pattern::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pattern| pattern.name() == name)
    }

    /// The single color written by the instant and progressive fills.
    pub const fn fill_color(self) -> Option<RgbColor> {
        const SOFT: u8 = 75;
        const HARD: u8 = 255;

        let color = match self {
            Pattern::SuddenRed | Pattern::FillRed => RgbColor::new(SOFT, 0, 0),
            Pattern::SuddenGreen | Pattern::FillGreen => RgbColor::new(0, SOFT, 0),
            Pattern::SuddenBlue | Pattern::FillBlue => RgbColor::new(0, 0, SOFT),
            Pattern::SuddenCyan | Pattern::FillCyan => RgbColor::new(0, SOFT, SOFT),
            Pattern::SuddenMagenta | Pattern::FillMagenta => RgbColor::new(SOFT, 0, SOFT),
            Pattern::SuddenYellow | Pattern::FillYellow => RgbColor::new(SOFT, SOFT, 0),
            Pattern::SuddenBlack | Pattern::FillBlack => RgbColor::new(0, 0, 0),
            Pattern::SuddenWhite | Pattern::FillWhite => RgbColor::new(SOFT, SOFT, SOFT),
            Pattern::FillWhyAmIOnFireWhite => RgbColor::new(HARD, HARD, HARD),
            Pattern::FillAuiiieeYellow => RgbColor::new(HARD, HARD, 0),
            Pattern::FillWhoseBloodIsThisRed => RgbColor::new(HARD, 0, 0),
            Pattern::CurrentTime
            | Pattern::ColorShowcase
            | Pattern::BrightnessGradient
            | Pattern::StatusIndicators
            | Pattern::LocalTimeInUnixEpochSeconds
            | Pattern::FadeStart
            | Pattern::FadeStep
            | Pattern::ColorPresetGrid
            | Pattern::Rainbow => return None,
        };
        Some(color)
    }

    /// True for the patterns that fill pixel by pixel.
    pub const fn is_progressive(self) -> bool {
        matches!(
            self,
            Pattern::FillRed
                | Pattern::FillGreen
                | Pattern::FillBlue
                | Pattern::FillCyan
                | Pattern::FillMagenta
                | Pattern::FillYellow
                | Pattern::FillBlack
                | Pattern::FillWhite
                | Pattern::FillWhyAmIOnFireWhite
                | Pattern::FillAuiiieeYellow
                | Pattern::FillWhoseBloodIsThisRed
        )
    }
}

impl TryFrom<usize> for Pattern {
    type Error = usize;

    /// Returns the out-of-range index on failure.
    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(index).copied().ok_or(index)
    }
}

impl core::fmt::Display for Pattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A slot of the status sub-display, one pixel each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusSlot {
    FullSystem,
    Led,
    Nvs,
    Netif,
    Wifi,
    Mdns,
    Sntp,
    Alarm,
}

impl StatusSlot {
    pub const ALL: [StatusSlot; 8] = [
        StatusSlot::FullSystem,
        StatusSlot::Led,
        StatusSlot::Nvs,
        StatusSlot::Netif,
        StatusSlot::Wifi,
        StatusSlot::Mdns,
        StatusSlot::Sntp,
        StatusSlot::Alarm,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Pixel index of this slot.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for StatusSlot {
    type Error = usize;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(index).copied().ok_or(index)
    }
}

/// Colors a status slot can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusColor {
    Off,
    On,
    Busy,
    Acquiring,
    Error,
    Success,
}

impl StatusColor {
    pub const fn rgb(self) -> RgbColor {
        match self {
            StatusColor::Off => RgbColor::new(0, 0, 0),
            StatusColor::On => RgbColor::new(100, 100, 100),
            StatusColor::Busy => RgbColor::new(100, 100, 0),
            StatusColor::Acquiring => RgbColor::new(0, 0, 100),
            StatusColor::Error => RgbColor::new(100, 0, 0),
            StatusColor::Success => RgbColor::new(0, 100, 0),
        }
    }
}

/// Contents of the status sub-display: one color per slot plus the always-on
/// end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBoard {
    slots: [StatusColor; StatusSlot::COUNT],
}

impl StatusBoard {
    /// Pixels used by the slots and the end marker.
    pub const WIDTH: usize = StatusSlot::COUNT + 1;

    /// Every slot off.
    pub const fn new() -> Self {
        Self {
            slots: [StatusColor::Off; StatusSlot::COUNT],
        }
    }

    pub fn set(&mut self, slot: StatusSlot, color: StatusColor) {
        self.slots[slot.index()] = color;
    }

    pub fn get(&self, slot: StatusSlot) -> StatusColor {
        self.slots[slot.index()]
    }

    /// Color of pixel `index` of the sub-display.
    ///
    /// The pixel after the last slot is the end marker.
    pub fn pixel(&self, index: usize) -> RgbColor {
        match self.slots.get(index) {
            Some(color) => color.rgb(),
            None if index == StatusSlot::COUNT => StatusColor::On.rgb(),
            None => StatusColor::Off.rgb(),
        }
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
