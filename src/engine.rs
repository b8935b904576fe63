//! Pattern execution engine.
//!
//! [`PatternEngine`] keeps its state under two locks:
//!
//! * The hardware lock (any [`lock_api::RawMutex`]) owns every strip and the
//!   delay provider. Each dispatch holds it for the whole pattern body,
//!   including every refresh and inter-pixel delay, so two patterns never
//!   interleave their pixel writes. It must be a lock whose contenders sleep;
//!   a pattern may hold it for seconds.
//! * The display lock (an embassy [`RawMutex`]) guards the fade progress and
//!   the status sub-display. It is only taken for copies in and out, never
//!   across strip or delay calls.
//!
//! Both are released when the body returns, whether it succeeded or not.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use crate::clock::WallClock;
use crate::clock_face::{render_time, show_epoch};
use crate::colors::{cct_to_rgb, cie_to_rgb, hsv_to_rgb, presets};
use crate::config::EngineConfig;
use crate::pattern::{Pattern, StatusBoard, StatusColor, StatusSlot};
use crate::rainbow::write_rainbow;
use crate::settings::{Setting, SettingsSource};
use crate::strip::{LedStrip, StripError};
use crate::types::{CctColor, COMPONENT_MAX, ErrorKind, HsvColor, OFF, RgbColor};

/// Progress of a fade to black.
///
/// Survives between dispatches until the next `FadeStart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeState {
    /// Color currently shown.
    pub current: RgbColor,
    /// Amount subtracted from each channel per step.
    pub interval: RgbColor,
    /// Steps left before the fade is forced to black.
    pub steps_remaining: u8,
}

impl FadeState {
    /// A fade with no budget; the first step goes straight to black.
    pub const fn idle(color: RgbColor) -> Self {
        Self {
            current: color,
            interval: OFF,
            steps_remaining: 0,
        }
    }

    /// A fade from `start` to black in `step_count` steps.
    ///
    /// Each interval is rounded up so the last step always lands on zero.
    pub fn start(start: RgbColor, step_count: u8) -> Self {
        let count = step_count.max(1);
        let interval = |channel: u8| channel / count + 1;

        Self {
            current: start,
            interval: RgbColor::new(
                interval(start.red),
                interval(start.green),
                interval(start.blue),
            ),
            steps_remaining: count,
        }
    }

    /// Advances one step and returns the new color.
    ///
    /// All channels drop by their interval, or all snap to zero if any of them
    /// would underflow.
    pub fn step(&mut self) -> RgbColor {
        if self.steps_remaining == 0 {
            self.current = OFF;
            return self.current;
        }
        self.steps_remaining -= 1;

        let next = (
            self.current.red.checked_sub(self.interval.red),
            self.current.green.checked_sub(self.interval.green),
            self.current.blue.checked_sub(self.interval.blue),
        );
        self.current = match next {
            (Some(red), Some(green), Some(blue)) if self.steps_remaining > 0 => {
                RgbColor::new(red, green, blue)
            }
            _ => OFF,
        };
        self.current
    }

    pub fn is_done(&self) -> bool {
        self.current == OFF
    }
}

/// Errors that can occur during pattern dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatternError {
    /// No pattern has this index.
    UnknownPattern { index: usize },
    /// The pattern draws on a strip the engine does not have.
    MissingStrip { index: usize },
    /// No status slot has this index (the end marker is not settable).
    InvalidSlot { index: usize },
    /// A strip operation failed.
    Strip(StripError),
}

impl PatternError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatternError::UnknownPattern { .. }
            | PatternError::MissingStrip { .. }
            | PatternError::InvalidSlot { .. } => ErrorKind::InvalidArgument,
            PatternError::Strip(e) => e.kind(),
        }
    }
}

impl From<StripError> for PatternError {
    fn from(e: StripError) -> Self {
        PatternError::Strip(e)
    }
}

impl core::fmt::Display for PatternError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PatternError::UnknownPattern { index } => write!(f, "unknown pattern id {}", index),
            PatternError::MissingStrip { index } => write!(f, "no strip {}", index),
            PatternError::InvalidSlot { index } => {
                write!(f, "invalid status slot {} (max {})", index, StatusSlot::COUNT - 1)
            }
            PatternError::Strip(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PatternError {}

/// Strips and delay, held for a whole pattern.
struct Hardware<S, D, const STRIPS: usize> {
    strips: [S; STRIPS],
    delay: D,
}

/// Pattern state that outlives a dispatch.
#[derive(Clone, Copy)]
struct DisplayState {
    fade: FadeState,
    status: StatusBoard,
    display_is_status: bool,
}

/// Runs named patterns on a fixed set of strips.
///
/// # Type Parameters
/// * `M` - Raw mutex guarding the fade and status state (short sections only)
/// * `L` - Sleeping raw mutex guarding the strips for a whole pattern
/// * `S` - Strip implementation
/// * `D` - Blocking delay provider
/// * `C` - Wall clock
/// * `G` - Settings source
/// * `STRIPS` - Number of strips
pub struct PatternEngine<M, L, S, D, C, G, const STRIPS: usize>
where
    M: RawMutex,
    L: lock_api::RawMutex,
    S: LedStrip,
    D: DelayNs,
    C: WallClock,
    G: SettingsSource,
{
    hardware: lock_api::Mutex<L, Hardware<S, D, STRIPS>>,
    display: Mutex<M, Cell<DisplayState>>,
    clock: C,
    settings: G,
    config: EngineConfig,
}

impl<M, L, S, D, C, G, const STRIPS: usize> PatternEngine<M, L, S, D, C, G, STRIPS>
where
    M: RawMutex,
    L: lock_api::RawMutex,
    S: LedStrip,
    D: DelayNs,
    C: WallClock,
    G: SettingsSource,
{
    /// Creates an engine. Nothing is transmitted until the first dispatch.
    pub fn new(strips: [S; STRIPS], delay: D, clock: C, settings: G, config: EngineConfig) -> Self {
        Self {
            hardware: lock_api::Mutex::new(Hardware { strips, delay }),
            display: Mutex::new(Cell::new(DisplayState {
                fade: FadeState::idle(config.fade_start_color),
                status: StatusBoard::new(),
                display_is_status: false,
            })),
            clock,
            settings,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn display(&self) -> DisplayState {
        self.display.lock(Cell::get)
    }

    fn update_display<R>(&self, f: impl FnOnce(&mut DisplayState) -> R) -> R {
        self.display.lock(|cell| {
            let mut display = cell.get();
            let result = f(&mut display);
            cell.set(display);
            result
        })
    }

    /// Runs pattern `id` to completion.
    ///
    /// Blocks until the hardware lock is free, then until every refresh and
    /// delay of the pattern is done.
    ///
    /// # Errors
    /// * `UnknownPattern` - `id` is not a pattern index
    /// * `MissingStrip` - the pattern needs more strips than the engine has
    /// * `Strip` - a strip failed mid-pattern; the pattern is abandoned
    pub fn run_pattern_sync(&self, id: usize) -> Result<(), PatternError> {
        self.dispatch(Pattern::try_from(id).map_err(|index| PatternError::UnknownPattern { index }))
    }

    /// Runs `pattern` to completion. See [`run_pattern_sync`](Self::run_pattern_sync).
    pub fn run(&self, pattern: Pattern) -> Result<(), PatternError> {
        self.dispatch(Ok(pattern))
    }

    fn dispatch(&self, pattern: Result<Pattern, PatternError>) -> Result<(), PatternError> {
        let mut hardware = self.hardware.lock();

        let result = match pattern {
            Ok(pattern) => {
                info!("running pattern {}", pattern.name());
                let result = self.execute(&mut hardware, pattern);
                match &result {
                    Ok(()) => debug!("pattern {} complete", pattern.name()),
                    Err(e) => error!("pattern {} failed: {}", pattern.name(), e),
                }
                result
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        };

        let is_status = pattern == Ok(Pattern::StatusIndicators);
        self.update_display(|display| display.display_is_status = is_status);
        result
    }

    fn execute(
        &self,
        hardware: &mut Hardware<S, D, STRIPS>,
        pattern: Pattern,
    ) -> Result<(), PatternError> {
        let Hardware { strips, delay } = hardware;

        match pattern {
            Pattern::SuddenRed
            | Pattern::SuddenGreen
            | Pattern::SuddenBlue
            | Pattern::SuddenCyan
            | Pattern::SuddenMagenta
            | Pattern::SuddenYellow
            | Pattern::SuddenBlack
            | Pattern::SuddenWhite
            | Pattern::FillRed
            | Pattern::FillGreen
            | Pattern::FillBlue
            | Pattern::FillCyan
            | Pattern::FillMagenta
            | Pattern::FillYellow
            | Pattern::FillBlack
            | Pattern::FillWhite
            | Pattern::FillWhyAmIOnFireWhite
            | Pattern::FillAuiiieeYellow
            | Pattern::FillWhoseBloodIsThisRed => {
                let color = pattern.fill_color().ok_or(PatternError::UnknownPattern {
                    index: pattern.index(),
                })?;
                if pattern.is_progressive() {
                    let per_pixel_ms = self.settings.get(Setting::FillTimeMs);
                    fill_progressive(strips, delay, per_pixel_ms, color)
                } else {
                    fill_all(strips, color)
                }
            }
            Pattern::CurrentTime => {
                let [upper, lower, ..] = strips.as_mut_slice() else {
                    return Err(PatternError::MissingStrip { index: 1 });
                };
                render_time(upper, lower, self.clock.now(), self.clock.is_dst())?;
                upper.refresh()?;
                lower.refresh()?;
                Ok(())
            }
            Pattern::ColorShowcase => self.color_showcase(strips),
            Pattern::BrightnessGradient => brightness_gradient(strips, 0, COMPONENT_MAX),
            Pattern::StatusIndicators => self.repaint_status(strips, self.display().status),
            Pattern::LocalTimeInUnixEpochSeconds => {
                let index = self.config.epoch_strip;
                let strip = strips
                    .get_mut(index)
                    .ok_or(PatternError::MissingStrip { index })?;
                let now = self.clock.now();
                let local = now.unix_timestamp() + i64::from(now.offset().whole_seconds());
                show_epoch(strip, 0, u64::try_from(local).unwrap_or(0))?;
                strip.refresh()?;
                Ok(())
            }
            Pattern::FadeStart => {
                let start = self.fade_start_color();
                let fade = FadeState::start(start, self.config.fade_step_count);
                self.update_display(|display| display.fade = fade);
                let per_pixel_ms = self.settings.get(Setting::SleepFadeFillTimeMs);
                fill_progressive(strips, delay, per_pixel_ms, start)
            }
            Pattern::FadeStep => {
                let (color, left) = self.update_display(|display| {
                    (display.fade.step(), display.fade.steps_remaining)
                });
                debug!(
                    "fade step: {} {} {}, {} left",
                    color.red, color.green, color.blue, left
                );
                let per_pixel_ms = self.settings.get(Setting::SleepFadeFillTimeMs);
                fill_progressive(strips, delay, per_pixel_ms, color)
            }
            Pattern::ColorPresetGrid => color_preset_grid(strips),
            Pattern::Rainbow => {
                for strip in strips.iter_mut().filter(|strip| !strip.is_empty()) {
                    let last = strip.len() - 1;
                    write_rainbow(strip, self.config.rainbow_brightness, 0, last, 0, 360)?;
                    strip.refresh()?;
                }
                Ok(())
            }
        }
    }

    /// Fade start color from the settings.
    fn fade_start_color(&self) -> RgbColor {
        let kelvin = self.settings.get(Setting::SleepFadeStartTemp);
        if kelvin == 0 {
            return self.config.fade_start_color;
        }

        let luminosity = self.settings.get(Setting::SleepFadeStartLuminosity);
        cct_to_rgb(CctColor::new(
            u16::try_from(kelvin).unwrap_or(u16::MAX),
            u8::try_from(luminosity).unwrap_or(COMPONENT_MAX),
        ))
    }

    /// Intensity ramps of the six primaries on the first strip and a hue sweep
    /// on the second.
    fn color_showcase(&self, strips: &mut [S; STRIPS]) -> Result<(), PatternError> {
        const LEDS_PER_SET: usize = 6;
        let ramp = |intensity: u8| -> [RgbColor; LEDS_PER_SET] {
            [
                RgbColor::new(intensity, 0, 0),
                RgbColor::new(0, intensity, 0),
                RgbColor::new(0, 0, intensity),
                RgbColor::new(0, intensity, intensity),
                RgbColor::new(intensity, 0, intensity),
                RgbColor::new(intensity, intensity, 0),
            ]
        };

        if let Some(strip) = strips.get_mut(0) {
            let sets = strip.len() / LEDS_PER_SET;
            if sets > 0 {
                let step = usize::from(self.config.showcase_max_intensity) / sets;
                for set in 0..sets {
                    let intensity = u8::try_from(step * set + 1).unwrap_or(COMPONENT_MAX);
                    for (offset, color) in ramp(intensity).into_iter().enumerate() {
                        strip.set_pixel(set * LEDS_PER_SET + offset, color)?;
                    }
                }
            }
            strip.refresh()?;
        }

        if let Some(strip) = strips.get_mut(1) {
            let len = strip.len();
            if len > 0 {
                let hue_chunk = 359 / len;
                for index in 0..len {
                    let hue = (hue_chunk * index) as u16;
                    let color = hsv_to_rgb(HsvColor::new(hue, 100, self.config.showcase_hue_value));
                    strip.set_pixel(index, color)?;
                }
            }
            strip.refresh()?;
        }

        Ok(())
    }

    fn repaint_status(
        &self,
        strips: &mut [S; STRIPS],
        board: StatusBoard,
    ) -> Result<(), PatternError> {
        let index = self.config.status_strip;
        let strip = strips
            .get_mut(index)
            .ok_or(PatternError::MissingStrip { index })?;

        for pixel in 0..strip.len() {
            strip.set_pixel(pixel, board.pixel(pixel))?;
        }
        strip.refresh()?;

        let seconds = u64::try_from(self.clock.now().unix_timestamp()).unwrap_or(0);
        show_epoch(strip, StatusBoard::WIDTH, seconds)?;
        strip.refresh()?;
        Ok(())
    }

    /// Updates one status slot, repainting only if the status display is the
    /// pattern currently shown.
    ///
    /// Waits for a running pattern to finish first.
    pub fn set_status_indicator(
        &self,
        slot: StatusSlot,
        color: StatusColor,
    ) -> Result<(), PatternError> {
        let mut hardware = self.hardware.lock();

        let display = self.update_display(|display| {
            display.status.set(slot, color);
            *display
        });
        if display.display_is_status {
            self.repaint_status(&mut hardware.strips, display.status)
        } else {
            Ok(())
        }
    }

    /// [`set_status_indicator`](Self::set_status_indicator) by slot index.
    pub fn set_status_indicator_index(
        &self,
        index: usize,
        color: StatusColor,
    ) -> Result<(), PatternError> {
        let slot = StatusSlot::try_from(index).map_err(|index| {
            error!("invalid status slot {}", index);
            PatternError::InvalidSlot { index }
        })?;
        self.set_status_indicator(slot, color)
    }

    /// Color of a status slot. Never waits for a running pattern.
    pub fn status_indicator(&self, slot: StatusSlot) -> StatusColor {
        self.display().status.get(slot)
    }

    /// Whether the last dispatched pattern was [`Pattern::StatusIndicators`].
    pub fn display_is_status(&self) -> bool {
        self.display().display_is_status
    }

    pub fn fade_state(&self) -> FadeState {
        self.display().fade
    }

    /// Turns every strip off.
    pub fn clear_all(&self) -> Result<(), PatternError> {
        let mut hardware = self.hardware.lock();
        for strip in hardware.strips.iter_mut() {
            strip.clear()?;
        }
        Ok(())
    }

    /// Runs `f` on the strips while holding the hardware lock.
    ///
    /// `f` may read [`status_indicator`](Self::status_indicator),
    /// [`display_is_status`](Self::display_is_status) and
    /// [`fade_state`](Self::fade_state). Dispatching, clearing, setting a
    /// status slot or nesting `with_strips` from inside `f` deadlocks.
    pub fn with_strips<R>(&self, f: impl FnOnce(&mut [S; STRIPS]) -> R) -> R {
        f(&mut self.hardware.lock().strips)
    }

    /// Tears the engine down, handing back the strips and the delay provider.
    pub fn into_parts(self) -> ([S; STRIPS], D) {
        let hardware = self.hardware.into_inner();
        (hardware.strips, hardware.delay)
    }
}

/// One color on every pixel, one refresh per strip.
fn fill_all<S: LedStrip>(strips: &mut [S], color: RgbColor) -> Result<(), PatternError> {
    for strip in strips.iter_mut() {
        for index in 0..strip.len() {
            strip.set_pixel(index, color)?;
        }
        strip.refresh()?;
    }
    Ok(())
}

/// One color pixel by pixel, all strips in lockstep, pausing `per_pixel_ms`
/// after each pixel.
fn fill_progressive<S: LedStrip, D: DelayNs>(
    strips: &mut [S],
    delay: &mut D,
    per_pixel_ms: u32,
    color: RgbColor,
) -> Result<(), PatternError> {
    let len = strips.iter().map(|strip| strip.len()).max().unwrap_or(0);

    for index in 0..len {
        for strip in strips.iter_mut().filter(|strip| index < strip.len()) {
            strip.set_pixel(index, color)?;
            strip.refresh()?;
        }
        delay.delay_ms(per_pixel_ms);
    }
    Ok(())
}

/// A grey ramp from `min` towards `max` on every strip.
fn brightness_gradient<S: LedStrip>(strips: &mut [S], min: u8, max: u8) -> Result<(), PatternError> {
    for strip in strips.iter_mut() {
        let len = strip.len();
        if len > 0 {
            let step = usize::from(max.saturating_sub(min)) / len;
            for index in 0..len {
                let level = (usize::from(min) + index * step).min(usize::from(max)) as u8;
                strip.set_pixel(index, RgbColor::new(level, level, level))?;
            }
        }
        strip.refresh()?;
    }
    Ok(())
}

/// CIE chroma presets on the first strip and CCT presets on the second, each
/// at medium luminosity in equal-width blocks.
fn color_preset_grid<S: LedStrip>(strips: &mut [S]) -> Result<(), PatternError> {
    let (_, luminosity) = presets::LEVELS[presets::LEVEL_MEDIUM];

    let cie = presets::CIE_CHROMAS.map(|(_, chroma)| cie_to_rgb(chroma.with_luminosity(luminosity)));
    let cct = presets::CCT_TEMPERATURES
        .map(|(_, kelvin)| cct_to_rgb(CctColor::new(kelvin, luminosity)));

    let rows: [&[RgbColor]; 2] = [&cie, &cct];
    for (strip, colors) in strips.iter_mut().zip(rows) {
        let block = (strip.len() / colors.len()).max(1);
        for index in 0..strip.len() {
            let color = colors.get(index / block).copied().unwrap_or(OFF);
            strip.set_pixel(index, color)?;
        }
        strip.refresh()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_intervals_round_up() {
        let fade = FadeState::start(RgbColor::new(150, 100, 80), 40);
        assert_eq!(fade.interval, RgbColor::new(4, 3, 3));
        assert_eq!(fade.steps_remaining, 40);
    }

    #[test]
    fn fade_snaps_to_black_on_underflow() {
        let mut fade = FadeState::start(RgbColor::new(10, 100, 2), 4);
        // intervals 3, 26, 1
        assert_eq!(fade.step(), RgbColor::new(7, 74, 1));
        assert_eq!(fade.step(), RgbColor::new(4, 48, 0));
        assert_eq!(fade.step(), OFF);
        assert!(fade.is_done());
    }

    #[test]
    fn idle_fade_steps_to_black() {
        let mut fade = FadeState::idle(RgbColor::new(150, 100, 80));
        assert_eq!(fade.step(), OFF);
    }
}

