//! Shared test infrastructure for lightclock-led integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::sync::{Arc, Mutex};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::delay::DelayNs;
use lightclock_led::{
    EngineConfig, LedStrip, PatternEngine, PulseItem, PulseTransmitter, RgbColor, Settings,
    StripConfig, StripError, TransmitterError, WallClock, OFF,
};
use time::{Date, Month, OffsetDateTime};

// ============================================================================
// Mock Transmitter
// ============================================================================

/// Mock pulse peripheral that records every transmitted frame
pub struct MockTransmitter {
    pub clock_hz: u32,
    pub fail_configure: bool,
    pub time_out: bool,
    pub configured: Option<StripConfig>,
    pub frames: Vec<Vec<PulseItem>>,
    pub timeouts: Vec<Duration>,
    pub released: bool,
    slots: Vec<PulseItem>,
}

impl MockTransmitter {
    /// A 40MHz transmitter with room for `slot_capacity` pulse items
    pub fn new(slot_capacity: usize) -> Self {
        Self::with_clock(40_000_000, slot_capacity)
    }

    pub fn with_clock(clock_hz: u32, slot_capacity: usize) -> Self {
        Self {
            clock_hz,
            fail_configure: false,
            time_out: false,
            configured: None,
            frames: Vec::new(),
            timeouts: Vec::new(),
            released: false,
            slots: vec![PulseItem::default(); slot_capacity],
        }
    }

    pub fn last_frame(&self) -> &[PulseItem] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl PulseTransmitter for MockTransmitter {
    fn configure(&mut self, config: &StripConfig) -> Result<u32, TransmitterError> {
        if self.fail_configure {
            return Err(TransmitterError::Config);
        }
        self.configured = Some(*config);
        Ok(self.clock_hz)
    }

    fn slots(&mut self) -> &mut [PulseItem] {
        &mut self.slots
    }

    fn transmit(&mut self, len: usize, timeout: Duration) -> Result<(), TransmitterError> {
        self.timeouts.push(timeout);
        if self.time_out {
            return Err(TransmitterError::Timeout);
        }
        self.frames.push(self.slots[..len].to_vec());
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

// ============================================================================
// Mock Delay
// ============================================================================

/// Delay that only counts, optionally yielding the thread
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ms: u64,
    pub calls: usize,
    pub yield_on_delay: bool,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yielding() -> Self {
        Self {
            yield_on_delay: true,
            ..Self::default()
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ns) / 1_000_000;
        if self.yield_on_delay {
            std::thread::yield_now();
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
        if self.yield_on_delay {
            std::thread::yield_now();
        }
    }
}

// ============================================================================
// Mock Clock
// ============================================================================

/// Clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: OffsetDateTime,
    pub dst: bool,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self { now, dst: false }
    }
}

impl WallClock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn is_dst(&self) -> bool {
        self.dst
    }
}

/// 2026-10-18 (a Sunday) at the given UTC time
pub fn utc(hour: u8, minute: u8, second: u8) -> OffsetDateTime {
    Date::from_calendar_date(2026, Month::October, 18)
        .unwrap()
        .with_hms(hour, minute, second)
        .unwrap()
        .assume_utc()
}

// ============================================================================
// Recording Strip
// ============================================================================

/// One `set_pixel` call as seen by a [`RecordingStrip`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelWrite {
    pub strip: usize,
    pub index: usize,
    pub color: RgbColor,
}

/// Write log shared between strips (and threads)
pub type WriteLog = Arc<Mutex<Vec<PixelWrite>>>;

/// In-memory strip that counts refreshes and can log every write
pub struct RecordingStrip {
    pub id: usize,
    pub pixels: Vec<RgbColor>,
    pub refreshes: usize,
    pub fail_refresh: Option<StripError>,
    log: Option<WriteLog>,
}

impl RecordingStrip {
    pub fn new(id: usize, len: usize) -> Self {
        Self {
            id,
            pixels: vec![OFF; len],
            refreshes: 0,
            fail_refresh: None,
            log: None,
        }
    }

    pub fn logging(id: usize, len: usize, log: WriteLog) -> Self {
        Self {
            log: Some(log),
            ..Self::new(id, len)
        }
    }
}

impl LedStrip for RecordingStrip {
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

        if let Some(log) = &self.log {
            log.lock().unwrap().push(PixelWrite {
                strip: self.id,
                index,
                color,
            });
        }
        Ok(())
    }

    fn pixel(&self, index: usize) -> Option<RgbColor> {
        self.pixels.get(index).copied()
    }

    fn refresh(&mut self) -> Result<(), StripError> {
        if let Some(e) = self.fail_refresh {
            return Err(e);
        }
        self.refreshes += 1;
        Ok(())
    }
}

// ============================================================================
// Engine
// ============================================================================

pub type TestEngine = PatternEngine<
    CriticalSectionRawMutex,
    parking_lot::RawMutex,
    RecordingStrip,
    MockDelay,
    FixedClock,
    Settings,
    2,
>;

pub const LEDS: usize = 60;

/// Two 60-pixel strips, default settings and configuration
pub fn engine() -> TestEngine {
    engine_with(Settings::new(), FixedClock::new(utc(7, 35, 9)))
}

pub fn engine_with(settings: Settings, clock: FixedClock) -> TestEngine {
    PatternEngine::new(
        [RecordingStrip::new(0, LEDS), RecordingStrip::new(1, LEDS)],
        MockDelay::new(),
        clock,
        settings,
        EngineConfig::default(),
    )
}
