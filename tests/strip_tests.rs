//! Integration tests for the strip driver

mod common;

use std::time::Duration;

use common::MockTransmitter;
use lightclock_led::encoder::{BitTimings, frame_len};
use lightclock_led::{
    Apa104, ErrorKind, LedStrip, OFF, PulseItem, RgbColor, Strip, StripConfig, StripError,
    TimingError, TransmitterError, Ws2812,
};

const LEDS: usize = 8;

fn slots_for(leds: usize) -> usize {
    frame_len(leds * 3)
}

fn ws2812_strip() -> Strip<Ws2812, MockTransmitter, LEDS> {
    Strip::new(
        MockTransmitter::new(slots_for(LEDS)),
        StripConfig::new(0, 18, LEDS),
    )
    .unwrap()
}

/// Reads the wire bytes back out of a complete frame.
fn decode(frame: &[PulseItem], timings: BitTimings) -> Vec<u8> {
    assert!(frame.first().unwrap().is_reset());
    assert!(frame.last().unwrap().is_reset());

    frame[1..frame.len() - 1]
        .chunks(8)
        .map(|bits| {
            bits.iter().fold(0u8, |byte, item| {
                let bit = if *item == timings.bit1 {
                    1
                } else {
                    assert_eq!(*item, timings.bit0);
                    0
                };
                (byte << 1) | bit
            })
        })
        .collect()
}

#[test]
fn new_strip_is_dark_and_silent() {
    let strip = ws2812_strip();

    assert_eq!(strip.len(), LEDS);
    assert!((0..LEDS).all(|i| strip.pixel(i) == Some(OFF)));
    assert!(strip.transmitter().frames.is_empty());
    assert_eq!(
        strip.transmitter().configured,
        Some(StripConfig::new(0, 18, LEDS))
    );
}

#[test]
fn set_pixel_changes_only_that_pixel() {
    let mut strip = ws2812_strip();

    strip.set_pixel(5, RgbColor::new(0x12, 0x34, 0x56)).unwrap();
    strip.refresh().unwrap();

    let bytes = decode(
        strip.transmitter().last_frame(),
        strip.encoder().timings(),
    );
    assert_eq!(bytes.len(), LEDS * 3);
    for (index, pixel) in bytes.chunks(3).enumerate() {
        if index == 5 {
            assert_eq!(pixel, [0x34, 0x12, 0x56]);
        } else {
            assert_eq!(pixel, [0, 0, 0]);
        }
    }
}

#[test]
fn staged_pixels_wait_for_refresh() {
    let mut strip = ws2812_strip();

    strip.set_pixel(0, RgbColor::new(1, 2, 3)).unwrap();
    assert!(strip.transmitter().frames.is_empty());
    assert_eq!(strip.pixel(0), Some(RgbColor::new(1, 2, 3)));

    strip.refresh().unwrap();
    assert_eq!(strip.transmitter().frames.len(), 1);
    assert_eq!(strip.transmitter().last_frame().len(), slots_for(LEDS));
}

#[test]
fn out_of_range_index_is_rejected() {
    let mut strip = ws2812_strip();

    let err = strip.set_pixel(LEDS, RgbColor::new(9, 9, 9)).unwrap_err();

    assert_eq!(err, StripError::IndexOutOfRange { index: LEDS, len: LEDS });
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(strip.pixel(LEDS), None);
}

#[test]
fn refresh_uses_the_floor_timeout() {
    let mut strip = ws2812_strip();
    strip.refresh().unwrap();

    assert_eq!(strip.transmit_timeout(), Duration::from_millis(100));
    assert_eq!(strip.transmitter().timeouts, vec![Duration::from_millis(100)]);
}

#[test]
fn transmit_timeout_is_reported() {
    let mut transmitter = MockTransmitter::new(slots_for(LEDS));
    transmitter.time_out = true;
    let mut strip: Strip<Ws2812, _, LEDS> =
        Strip::new(transmitter, StripConfig::new(0, 18, LEDS)).unwrap();

    let err = strip.refresh().unwrap_err();

    assert_eq!(err, StripError::Timeout { timeout_ms: 100 });
    assert_eq!(err.kind(), ErrorKind::TransmissionTimeout);
}

#[test]
fn zero_clock_fails_init() {
    let result: Result<Strip<Apa104, _, LEDS>, _> = Strip::new(
        MockTransmitter::with_clock(0, slots_for(LEDS)),
        StripConfig::new(0, 18, LEDS),
    );

    let err = result.err().unwrap();
    assert_eq!(err, StripError::Timing(TimingError::ZeroClock));
    assert_eq!(err.kind(), ErrorKind::DeviceInitFailure);
}

#[test]
fn configure_failure_fails_init() {
    let mut transmitter = MockTransmitter::new(slots_for(LEDS));
    transmitter.fail_configure = true;

    let result: Result<Strip<Apa104, _, LEDS>, _> =
        Strip::new(transmitter, StripConfig::new(0, 18, LEDS));

    let err = result.err().unwrap();
    assert_eq!(err, StripError::Configure(TransmitterError::Config));
    assert_eq!(err.kind(), ErrorKind::DeviceInitFailure);
}

#[test]
fn led_count_beyond_capacity_fails_init() {
    let result: Result<Strip<Apa104, _, LEDS>, _> = Strip::new(
        MockTransmitter::new(slots_for(LEDS + 1)),
        StripConfig::new(0, 18, LEDS + 1),
    );

    assert_eq!(
        result.err(),
        Some(StripError::CapacityExceeded {
            requested: LEDS + 1,
            capacity: LEDS
        })
    );
}

#[test]
fn framing_shortfall_is_counted() {
    let mut strip: Strip<Ws2812, _, LEDS> = Strip::new(
        MockTransmitter::new(slots_for(LEDS) - 1),
        StripConfig::new(0, 18, LEDS),
    )
    .unwrap();

    strip.refresh().unwrap();
    strip.refresh().unwrap();

    assert_eq!(strip.framing_shortfalls(), 2);
    let frame = strip.transmitter().last_frame();
    assert_eq!(frame.len(), slots_for(LEDS) - 1);
    assert!(!frame.last().unwrap().is_reset());
}

#[test]
fn complete_frames_are_not_counted() {
    let mut strip = ws2812_strip();
    strip.refresh().unwrap();
    assert_eq!(strip.framing_shortfalls(), 0);
}

#[test]
fn clear_turns_everything_off() {
    let mut strip = ws2812_strip();
    for i in 0..LEDS {
        strip.set_pixel(i, RgbColor::new(10, 20, 30)).unwrap();
    }

    strip.clear().unwrap();

    assert!((0..LEDS).all(|i| strip.pixel(i) == Some(OFF)));
    let bytes = decode(
        strip.transmitter().last_frame(),
        strip.encoder().timings(),
    );
    assert!(bytes.iter().all(|b| *b == 0));
}

#[test]
fn release_hands_back_the_transmitter() {
    let strip = ws2812_strip();
    let transmitter = strip.release();
    assert!(transmitter.released);
}

#[test]
fn apa104_sends_gamma_corrected_grb() {
    let mut strip: Strip<Apa104, _, 1> =
        Strip::new(MockTransmitter::new(slots_for(1)), StripConfig::new(1, 19, 1)).unwrap();

    strip.set_pixel(0, RgbColor::new(100, 255, 0)).unwrap();
    strip.refresh().unwrap();

    let bytes = decode(
        strip.transmitter().last_frame(),
        strip.encoder().timings(),
    );
    assert_eq!(bytes, vec![255, 31, 0]);
}

#[test]
fn config_builders() {
    let config = StripConfig::new(2, 21, 30)
        .with_clock_divisor(4)
        .pinned_to(1);

    assert_eq!(config.clock_divisor, 4);
    assert_eq!(config.pinned_core, Some(1));
    assert_eq!(StripConfig::new(2, 21, 30).clock_divisor, 2);
}
