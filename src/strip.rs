//! Strip driver for one physical LED chain.
//!
//! A [`Strip`] owns its pixel buffer, the pulse encoder derived from the
//! transmitter's measured clock, and the transmitter itself. Pixels are staged
//! with [`LedStrip::set_pixel`] and only reach the LEDs on
//! [`LedStrip::refresh`].

use core::marker::PhantomData;
use core::time::Duration;

use heapless::Vec;

use crate::encoder::{Framing, PulseEncoder, PulseItem, TimingError};
use crate::protocol::LedProtocol;
use crate::types::{ErrorKind, OFF, RgbColor};

/// Floor for the transmit timeout of a single refresh.
pub const MIN_TRANSMIT_TIMEOUT: Duration = Duration::from_millis(100);

/// Boot-time configuration of one strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripConfig {
    /// Transmitter channel.
    pub channel: u8,
    /// Data pin.
    pub gpio: u8,
    pub led_count: usize,
    /// Divider from the peripheral source clock to the counter clock.
    pub clock_divisor: u8,
    /// Core the transmitter driver must be installed on, if any.
    ///
    /// Pulse generation is sensitive to interrupt latency from other work on
    /// the same core (radio stacks in particular).
    pub pinned_core: Option<u8>,
}

impl StripConfig {
    /// A config with an 80MHz/2 counter clock and no core pinning.
    pub const fn new(channel: u8, gpio: u8, led_count: usize) -> Self {
        Self {
            channel,
            gpio,
            led_count,
            clock_divisor: 2,
            pinned_core: None,
        }
    }

    pub const fn with_clock_divisor(mut self, clock_divisor: u8) -> Self {
        self.clock_divisor = clock_divisor;
        self
    }

    pub const fn pinned_to(mut self, core: u8) -> Self {
        self.pinned_core = Some(core);
        self
    }
}

/// Errors reported by a [`PulseTransmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitterError {
    /// The peripheral rejected the configuration or the driver install failed.
    Config,
    /// The transmission did not finish within the timeout.
    Timeout,
}

impl core::fmt::Display for TransmitterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransmitterError::Config => write!(f, "transmitter configuration failed"),
            TransmitterError::Timeout => write!(f, "transmission timed out"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransmitterError {}

/// Trait for abstracting the pulse generation peripheral (RMT or similar).
pub trait PulseTransmitter {
    /// Configures the channel and installs the driver.
    ///
    /// Returns the counter clock frequency in Hz, as measured by the
    /// peripheral after applying the divisor.
    fn configure(&mut self, config: &StripConfig) -> Result<u32, TransmitterError>;

    /// Slot buffer for the next frame. Its length is the slot budget.
    fn slots(&mut self) -> &mut [PulseItem];

    /// Sends the first `len` slots, blocking until done or until `timeout`
    /// elapses. An in-flight transmission is never cancelled.
    fn transmit(&mut self, len: usize, timeout: Duration) -> Result<(), TransmitterError>;

    /// Uninstalls the driver.
    fn release(&mut self);
}

/// Errors that can occur during strip operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StripError {
    /// Pixel index past the end of the strip.
    IndexOutOfRange { index: usize, len: usize },
    /// Configured LED count exceeds the pixel buffer capacity.
    CapacityExceeded { requested: usize, capacity: usize },
    /// The transmitter could not be set up.
    Configure(TransmitterError),
    /// The measured clock cannot represent the protocol timings.
    Timing(TimingError),
    /// A refresh did not complete in time.
    Timeout { timeout_ms: u32 },
    /// The transmitter failed mid-refresh.
    Transmit(TransmitterError),
}

impl StripError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StripError::IndexOutOfRange { .. } => ErrorKind::InvalidArgument,
            StripError::CapacityExceeded { .. }
            | StripError::Configure(_)
            | StripError::Timing(_)
            | StripError::Transmit(TransmitterError::Config) => ErrorKind::DeviceInitFailure,
            StripError::Timeout { .. } | StripError::Transmit(TransmitterError::Timeout) => {
                ErrorKind::TransmissionTimeout
            }
        }
    }
}

impl core::fmt::Display for StripError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StripError::IndexOutOfRange { index, len } => {
                write!(f, "pixel index {} out of range for {} leds", index, len)
            }
            StripError::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "{} leds requested but buffer holds {}",
                requested, capacity
            ),
            StripError::Configure(e) => write!(f, "strip init failed: {}", e),
            StripError::Timing(e) => write!(f, "strip init failed: {}", e),
            StripError::Timeout { timeout_ms } => {
                write!(f, "refresh exceeded {}ms", timeout_ms)
            }
            StripError::Transmit(e) => write!(f, "refresh failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StripError {}

/// Trait for a chain of individually addressable pixels.
///
/// The pattern engine only talks to strips through this trait.
pub trait LedStrip {
    /// Number of LEDs in the chain.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stages `color` for pixel `index`. Nothing is sent until [`refresh`](Self::refresh).
    fn set_pixel(&mut self, index: usize, color: RgbColor) -> Result<(), StripError>;

    /// Staged color of pixel `index`.
    fn pixel(&self, index: usize) -> Option<RgbColor>;

    /// Transmits the whole pixel buffer.
    fn refresh(&mut self) -> Result<(), StripError>;

    /// Turns every pixel off and refreshes.
    fn clear(&mut self) -> Result<(), StripError> {
        for index in 0..self.len() {
            self.set_pixel(index, OFF)?;
        }
        self.refresh()
    }
}

/// Upper bound on the time a refresh of `led_count` pixels may take.
pub fn transmit_timeout<P: LedProtocol>(led_count: usize) -> Duration {
    let worst_case_ms =
        u64::from(P::worst_case_bit_ns()) * led_count as u64 * 24 / 1_000_000;
    Duration::from_millis(worst_case_ms).max(MIN_TRANSMIT_TIMEOUT)
}

/// A physical LED chain speaking protocol `P` through transmitter `T`.
///
/// # Type Parameters
/// * `P` - Chip protocol
/// * `T` - Transmitter implementation
/// * `N` - Pixel buffer capacity
pub struct Strip<P: LedProtocol, T: PulseTransmitter, const N: usize> {
    transmitter: T,
    encoder: PulseEncoder,
    pixels: Vec<RgbColor, N>,
    config: StripConfig,
    timeout: Duration,
    framing_shortfalls: u32,
    _protocol: PhantomData<P>,
}

impl<P: LedProtocol, T: PulseTransmitter, const N: usize> Strip<P, T, N> {
    /// Configures `transmitter` and derives the pulse timings.
    ///
    /// All pixels start off. Nothing is transmitted.
    pub fn new(mut transmitter: T, config: StripConfig) -> Result<Self, StripError> {
        if config.led_count > N {
            error!(
                "strip {}: {} leds exceed capacity {}",
                config.channel, config.led_count, N
            );
            return Err(StripError::CapacityExceeded {
                requested: config.led_count,
                capacity: N,
            });
        }

        let clock_hz = transmitter.configure(&config).map_err(|e| {
            error!("strip {}: transmitter configure failed", config.channel);
            StripError::Configure(e)
        })?;

        let encoder = PulseEncoder::new::<P>(clock_hz).map_err(|e| {
            error!("strip {}: no usable timings at {}Hz", config.channel, clock_hz);
            StripError::Timing(e)
        })?;

        let mut pixels = Vec::new();
        pixels
            .resize(config.led_count, OFF)
            .map_err(|_| StripError::CapacityExceeded {
                requested: config.led_count,
                capacity: N,
            })?;

        let timeout = transmit_timeout::<P>(config.led_count);

        info!(
            "strip {} ({}) on gpio {}: {} leds, timeout {}ms",
            config.channel,
            P::NAME,
            config.gpio,
            config.led_count,
            timeout.as_millis() as u32
        );

        Ok(Self {
            transmitter,
            encoder,
            pixels,
            config,
            timeout,
            framing_shortfalls: 0,
            _protocol: PhantomData,
        })
    }

    pub fn config(&self) -> &StripConfig {
        &self.config
    }

    pub fn encoder(&self) -> &PulseEncoder {
        &self.encoder
    }

    /// Bound applied to each refresh.
    pub fn transmit_timeout(&self) -> Duration {
        self.timeout
    }

    /// Refreshes whose frame did not fit the transmitter's slots.
    pub fn framing_shortfalls(&self) -> u32 {
        self.framing_shortfalls
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    /// Uninstalls the transmitter driver and hands the peripheral back.
    pub fn release(mut self) -> T {
        debug!("strip {}: releasing transmitter", self.config.channel);
        self.transmitter.release();
        self.transmitter
    }
}

impl<P: LedProtocol, T: PulseTransmitter, const N: usize> LedStrip for Strip<P, T, N> {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: RgbColor) -> Result<(), StripError> {
        let len = self.pixels.len();
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel = color;
                Ok(())
            }
            None => {
                error!(
                    "strip {}: pixel index {} out of range ({} leds)",
                    self.config.channel, index, len
                );
                Err(StripError::IndexOutOfRange { index, len })
            }
        }
    }

    fn pixel(&self, index: usize) -> Option<RgbColor> {
        self.pixels.get(index).copied()
    }

    fn refresh(&mut self) -> Result<(), StripError> {
        let bytes = self.pixels.iter().flat_map(|color| P::wire_bytes(*color));
        let encoded = self.encoder.encode_into(bytes, self.transmitter.slots());

        if let Framing::Shortfall { missing } = encoded.framing {
            self.framing_shortfalls = self.framing_shortfalls.saturating_add(1);
            warn!(
                "strip {}: {}, {} pulse items dropped",
                self.config.channel,
                ErrorKind::ProtocolFramingShortfall,
                missing
            );
        }

        match self.transmitter.transmit(encoded.len, self.timeout) {
            Ok(()) => Ok(()),
            Err(TransmitterError::Timeout) => {
                let timeout_ms = self.timeout.as_millis() as u32;
                error!(
                    "strip {}: refresh exceeded {}ms",
                    self.config.channel, timeout_ms
                );
                Err(StripError::Timeout { timeout_ms })
            }
            Err(e) => {
                error!("strip {}: refresh failed", self.config.channel);
                Err(StripError::Transmit(e))
            }
        }
    }
}
