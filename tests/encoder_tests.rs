//! Integration tests for the pulse encoder

use lightclock_led::encoder::{BitTimings, frame_len};
use lightclock_led::{Apa104, Encoded, Framing, PulseEncoder, PulseItem, Ws2812};

fn apa104() -> PulseEncoder {
    PulseEncoder::new::<Apa104>(40_000_000).unwrap()
}

#[test]
fn frame_is_reset_data_reset() {
    let encoder = apa104();
    let BitTimings { bit0, bit1, reset } = encoder.timings();

    let frame: Vec<PulseItem> = encoder.pulses([0xFF, 0x00]).collect();

    assert_eq!(frame.len(), frame_len(2));
    assert_eq!(frame[0], reset);
    assert!(frame[1..9].iter().all(|item| *item == bit1));
    assert!(frame[9..17].iter().all(|item| *item == bit0));
    assert_eq!(frame[17], reset);
}

#[test]
fn bits_go_out_msb_first() {
    let encoder = apa104();
    let BitTimings { bit0, bit1, .. } = encoder.timings();

    let frame: Vec<PulseItem> = encoder.pulses([0b1010_0001]).collect();

    assert_eq!(
        &frame[1..9],
        &[bit1, bit0, bit1, bit0, bit0, bit0, bit0, bit1]
    );
}

#[test]
fn empty_input_is_two_resets() {
    let encoder = apa104();
    let reset = encoder.timings().reset;

    let frame: Vec<PulseItem> = encoder.pulses([0u8; 0]).collect();
    assert_eq!(frame, vec![reset, reset]);
}

#[test]
fn encode_into_fills_exact_budget() {
    let encoder = apa104();
    let mut slots = [PulseItem::default(); 18];

    let encoded = encoder.encode_into([0xFF, 0x00], &mut slots);

    assert_eq!(
        encoded,
        Encoded {
            len: 18,
            framing: Framing::Complete
        }
    );
    assert!(slots[17].is_reset());
}

#[test]
fn short_budget_drops_trailing_reset() {
    let encoder = apa104();
    let BitTimings { bit0, .. } = encoder.timings();
    let mut slots = [PulseItem::default(); 17];

    let encoded = encoder.encode_into([0xFF, 0x00], &mut slots);

    assert_eq!(encoded.len, 17);
    assert_eq!(encoded.framing, Framing::Shortfall { missing: 1 });
    assert_eq!(slots[16], bit0);
}

#[test]
fn short_budget_counts_every_missing_item() {
    let encoder = apa104();
    let mut slots = [PulseItem::default(); 10];

    let encoded = encoder.encode_into([0xFF, 0x00], &mut slots);

    assert_eq!(encoded.len, 10);
    assert_eq!(encoded.framing, Framing::Shortfall { missing: 8 });
}

#[test]
fn slots_past_the_frame_are_untouched() {
    let encoder = apa104();
    let marker = PulseItem::new(7, 7);
    let mut slots = [marker; 30];

    let encoded = encoder.encode_into([0x0F], &mut slots);

    assert_eq!(encoded.len, 10);
    assert!(slots[10..].iter().all(|item| *item == marker));
}

#[test]
fn ws2812_reset_at_40mhz() {
    let encoder = PulseEncoder::new::<Ws2812>(40_000_000).unwrap();
    let timings = encoder.timings();

    assert_eq!(timings.reset, PulseItem::reset(11_200));
    assert_eq!(timings.bit0, PulseItem::new(14, 40));
    assert_eq!(timings.bit1, PulseItem::new(40, 14));
    assert_eq!(encoder.clock_hz(), 40_000_000);
}

#[test]
fn timings_follow_the_measured_clock() {
    // 20MHz: 350ns is 7 ticks, 1360ns is 27.2 ticks
    let encoder = PulseEncoder::new::<Apa104>(20_000_000).unwrap();
    assert_eq!(encoder.timings().bit0, PulseItem::new(7, 27));
    assert_eq!(encoder.timings().reset, PulseItem::reset(1000));
}
