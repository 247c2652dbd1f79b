//! Unit tests for the PS/2 transport and scancode decoder.
//!
//! The port is a scripted in-memory queue and the clock advances 1 ms per
//! read, so every timeout path terminates deterministically.

use core::time::Duration;

use super::decoder::{RawScan, ScanDecoder, Step};
use super::frame::flags;
use super::{command, Ps2Keyboard, Ps2Port, ACK};
use crate::error::Error;
use crate::hid::keycode::{self, Keycode};
use crate::led::LedState;
use crate::scancode::{KeyName, SCANCODE_TABLE_LEN, SET2_KEYCODES, SET2_NAMES};
use crate::testing::{FakePort, StepClock};

const TIMEOUT: Duration = Duration::from_millis(10);

fn keyboard(port: &FakePort) -> Ps2Keyboard<FakePort, StepClock, Keycode> {
    Ps2Keyboard::new(port.clone(), StepClock::new(1_000), &SET2_KEYCODES)
}

// ═══════════════════════════════════════════════════════════════════════════
// Decoder state machine
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn decoder_plain_payload_completes() {
    let mut d = ScanDecoder::new();
    assert_eq!(
        d.feed(0x1C),
        Step::Complete(RawScan {
            code: 0x1C,
            extended: false,
            release: false
        })
    );
    assert!(!d.is_pending());
}

#[test]
fn decoder_prefixes_accumulate_in_any_order() {
    let mut d = ScanDecoder::new();
    assert_eq!(d.feed(0xE0), Step::Pending);
    assert_eq!(d.feed(0xF0), Step::Pending);
    assert_eq!(
        d.feed(0x75),
        Step::Complete(RawScan {
            code: 0x75,
            extended: true,
            release: true
        })
    );

    assert_eq!(d.feed(0xF0), Step::Pending);
    assert_eq!(d.feed(0xE0), Step::Pending);
    assert_eq!(
        d.feed(0x75),
        Step::Complete(RawScan {
            code: 0x75,
            extended: true,
            release: true
        })
    );
}

#[test]
fn decoder_unknown_byte_keeps_pending_prefix() {
    let mut d = ScanDecoder::new();
    assert_eq!(d.feed(0xF0), Step::Pending);
    assert_eq!(d.feed(0x90), Step::Discarded);
    assert!(d.is_pending());
    assert_eq!(
        d.feed(0x1C),
        Step::Complete(RawScan {
            code: 0x1C,
            extended: false,
            release: true
        })
    );
}

#[test]
fn decoder_payload_boundary() {
    let mut d = ScanDecoder::new();
    assert!(matches!(d.feed(0x8F), Step::Complete(_)));
    assert_eq!(d.feed(0x90), Step::Discarded);
    assert_eq!(d.feed(ACK), Step::Discarded);
    assert_eq!(d.feed(0xFF), Step::Discarded);
}

// ═══════════════════════════════════════════════════════════════════════════
// decode_scancode
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn every_plain_payload_is_a_press() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    for code in 0..SCANCODE_TABLE_LEN as u8 {
        port.push(&[code]);
        let ev = kbd.decode_scancode(TIMEOUT).expect("event");
        assert_eq!(ev.code, code);
        assert!(!ev.extended);
        assert!(!ev.release);
        assert_eq!(ev.key, SET2_KEYCODES.lookup(code, false));
    }
}

#[test]
fn every_release_prefixed_payload_is_a_release() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    for code in 0..SCANCODE_TABLE_LEN as u8 {
        port.push(&[0xF0, code]);
        let ev = kbd.decode_scancode(TIMEOUT).expect("event");
        assert!(ev.release);
        assert!(!ev.extended);
        assert_eq!(ev.key, SET2_KEYCODES.lookup(code, false));
    }
}

#[test]
fn every_extended_payload_uses_sparse_table() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    for code in 0..SCANCODE_TABLE_LEN as u8 {
        port.push(&[0xE0, code]);
        let ev = kbd.decode_scancode(TIMEOUT).expect("event");
        assert!(ev.extended);
        assert!(!ev.release);
        assert_eq!(ev.key, SET2_KEYCODES.lookup(code, true));
    }
}

#[test]
fn extended_up_arrow() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0xE0, 0x75]);

    let ev = kbd.decode_scancode(TIMEOUT).expect("event");
    assert_eq!(ev.key, Some(keycode::UP_ARROW));
    assert!(ev.extended);
    assert!(!ev.release);

    // Exactly one event.
    assert_eq!(kbd.decode_scancode(TIMEOUT), None);
}

#[test]
fn release_of_a() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0xF0, 0x1C]);

    let ev = kbd.decode_scancode(TIMEOUT).expect("event");
    assert_eq!(ev.key, Some(keycode::A));
    assert!(ev.release);
    assert_eq!(kbd.decode_scancode(TIMEOUT), None);
}

#[test]
fn repeated_press_is_not_coalesced() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0x1C, 0x1C]);

    let first = kbd.decode_scancode(TIMEOUT).expect("first");
    let second = kbd.decode_scancode(TIMEOUT).expect("second");
    assert_eq!(first, second);
    assert_eq!(first.key, Some(keycode::A));
    assert!(!first.release);
    assert_eq!(port.pending(), 0);
}

#[test]
fn out_of_range_byte_is_skipped() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0x90, 0x1C]);

    let ev = kbd.decode_scancode(TIMEOUT).expect("event");
    assert_eq!(ev.code, 0x1C);
    assert_eq!(ev.key, Some(keycode::A));
}

#[test]
fn out_of_range_byte_keeps_prefix() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0xE0, 0x90, 0x75]);

    let ev = kbd.decode_scancode(TIMEOUT).expect("event");
    assert!(ev.extended);
    assert_eq!(ev.key, Some(keycode::UP_ARROW));
}

#[test]
fn lone_unknown_byte_yields_nothing() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0x90]);
    assert_eq!(kbd.decode_scancode(TIMEOUT), None);
    assert_eq!(port.pending(), 0);
}

#[test]
fn unmapped_payload_still_produces_event() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0x00]);

    let ev = kbd.decode_scancode(TIMEOUT).expect("event");
    assert_eq!(ev.key, None);
    assert_eq!(port.pending(), 0);
}

#[test]
fn timeout_mid_sequence_drops_prefix() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0xE0]);
    assert_eq!(kbd.decode_scancode(TIMEOUT), None);

    port.push(&[0x75]);
    let ev = kbd.decode_scancode(TIMEOUT).expect("event");
    assert!(!ev.extended);
    assert_eq!(ev.key, Some(keycode::KEYPAD_EIGHT));
}

#[test]
fn named_table_decodes_names() {
    let port = FakePort::default();
    let mut kbd = Ps2Keyboard::new(port.clone(), StepClock::new(1_000), &SET2_NAMES);
    port.push(&[0x1C, 0xE0, 0x6B]);

    assert_eq!(kbd.decode_scancode(TIMEOUT).and_then(|e| e.key), Some(KeyName("a")));
    assert_eq!(kbd.decode_scancode(TIMEOUT).and_then(|e| e.key), Some(KeyName("LEFT")));
}

// ═══════════════════════════════════════════════════════════════════════════
// read_byte / flush
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn read_byte_returns_queued_byte() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0xAA]);
    assert_eq!(kbd.read_byte(TIMEOUT), Some(0xAA));
}

#[test]
fn read_byte_is_bounded_by_timeout() {
    let port = FakePort::default();
    let clock = StepClock::new(1_000);
    let mut kbd = Ps2Keyboard::new(port, clock.clone(), &SET2_KEYCODES);

    let before = clock.elapsed();
    assert_eq!(kbd.read_byte(TIMEOUT), None);
    let waited = clock.elapsed() - before;
    assert!(waited > 10_000, "gave up early after {waited} us");
    assert!(waited <= 13_000, "overran timeout: {waited} us");
}

#[test]
fn construction_flushes_stale_bytes() {
    let port = FakePort::with_bytes(&[0xAA, 0x1C, 0xF0]);
    let mut kbd = keyboard(&port);
    assert_eq!(port.pending(), 0);
    assert_eq!(kbd.decode_scancode(TIMEOUT), None);
}

#[test]
fn flush_can_be_repeated() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.push(&[0xE0, 0xF0]);
    kbd.flush();
    assert_eq!(port.pending(), 0);
    kbd.flush();
    assert_eq!(port.pending(), 0);
}

/// Port whose driver keeps appending while the queue is being drained.
struct RefillingPort {
    rx: std::collections::VecDeque<u8>,
    refills: usize,
}

impl Ps2Port for RefillingPort {
    fn len(&self) -> usize {
        self.rx.len()
    }

    fn pop_front(&mut self) -> Option<u8> {
        let byte = self.rx.pop_front();
        if self.refills > 0 {
            self.refills -= 1;
            self.rx.push_back(0x1C);
        }
        byte
    }

    fn send_command(&mut self, _byte: u8) -> Result<u8, Error> {
        Ok(ACK)
    }

    fn clear_errors(&mut self) -> u8 {
        0
    }
}

#[test]
fn flush_drains_bytes_arriving_mid_drain() {
    let port = RefillingPort {
        rx: [0xF0, 0x1C].into_iter().collect(),
        refills: 5,
    };
    let mut kbd = Ps2Keyboard::new(port, StepClock::new(1_000), &SET2_KEYCODES);
    assert_eq!(kbd.read_byte(TIMEOUT), None);
}

// ═══════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn send_command_returns_response() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    assert_eq!(kbd.send_command(0xEE), Some(ACK));
    port.0.borrow_mut().responses.push_back(Ok(0xFE));
    assert_eq!(kbd.send_command(0xEE), Some(0xFE));
    assert_eq!(port.sent(), [0xEE, 0xEE]);
}

#[test]
fn send_command_link_fault_is_cleared_not_propagated() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    {
        let mut state = port.0.borrow_mut();
        state.responses.push_back(Err(Error::LinkFault(flags::PARITY)));
        state.error_flags = flags::PARITY;
    }

    assert_eq!(kbd.send_command(command::SET_LEDS), None);
    let state = port.0.borrow();
    assert_eq!(state.clears, 1);
    assert_eq!(state.error_flags, 0);
}

#[test]
fn set_leds_sends_command_and_mask() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    kbd.set_leds(LedState::new(false, true, true));
    assert_eq!(port.sent(), [command::SET_LEDS, 0b110]);
    assert_eq!(kbd.cached_leds(), Some(0b110));
}

#[test]
fn set_leds_is_idempotent() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    kbd.set_leds(LedState::new(true, false, false));
    kbd.set_leds(LedState::new(true, false, false));
    assert_eq!(port.sent(), [command::SET_LEDS, 0b001]);

    kbd.set_leds(LedState::OFF);
    assert_eq!(port.sent(), [command::SET_LEDS, 0b001, command::SET_LEDS, 0b000]);
}

#[test]
fn first_set_leds_always_sends() {
    // The cache starts unknown, so even "all off" goes out once.
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    assert_eq!(kbd.cached_leds(), None);
    kbd.clear_leds();
    assert_eq!(port.sent(), [command::SET_LEDS, 0]);
}

#[test]
fn set_leds_caches_even_when_not_acknowledged() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.0
        .borrow_mut()
        .responses
        .push_back(Err(Error::LinkFault(flags::NO_RESPONSE)));

    kbd.fill_leds();
    // Mask byte withheld after the failed 0xED.
    assert_eq!(port.sent(), [command::SET_LEDS]);
    assert_eq!(kbd.cached_leds(), Some(0b111));

    kbd.fill_leds();
    assert_eq!(port.sent(), [command::SET_LEDS]);
}

#[test]
fn set_leds_skips_mask_on_nak() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.0.borrow_mut().responses.push_back(Ok(0xFE));
    kbd.set_leds(LedState::new(false, false, true));
    assert_eq!(port.sent(), [command::SET_LEDS]);
}

#[test]
fn scancode_set_query() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    port.0
        .borrow_mut()
        .replies
        .push_back((command::GET_SCANCODE_SET, 0x02));

    assert_eq!(kbd.get_scancode_set_id(TIMEOUT), Some(0x02));
    assert_eq!(port.sent(), [command::SCANCODE_SET, command::GET_SCANCODE_SET]);
}

#[test]
fn scancode_set_query_without_answer() {
    let port = FakePort::default();
    let mut kbd = keyboard(&port);
    assert_eq!(kbd.get_scancode_set_id(TIMEOUT), None);
}
