//! Scancode set 2 → HID keycode (US 101/102-key).

use super::{ScancodeTable, SCANCODE_TABLE_LEN};
use crate::hid::keycode::*;

const __: Option<Keycode> = None;

const fn k(key: Keycode) -> Option<Keycode> {
    Some(key)
}

#[rustfmt::skip]
const CODES: [Option<Keycode>; SCANCODE_TABLE_LEN] = [
    // 00-0F
    __, k(F9), __, k(F5), k(F3), k(F1), k(F2), k(F12), __, k(F10), k(F8), k(F6), k(F4), k(TAB), k(GRAVE_ACCENT), __,
    // 10-1F
    __, k(LEFT_ALT), k(LEFT_SHIFT), __, k(LEFT_CONTROL), k(Q), k(ONE), __, __, __, k(Z), k(S), k(A), k(W), k(TWO), __,
    // 20-2F
    __, k(C), k(X), k(D), k(E), k(FOUR), k(THREE), __, __, k(SPACE), k(V), k(F), k(T), k(R), k(FIVE), __,
    // 30-3F
    __, k(N), k(B), k(H), k(G), k(Y), k(SIX), __, __, __, k(M), k(J), k(U), k(SEVEN), k(EIGHT), __,
    // 40-4F
    __, k(COMMA), k(K), k(I), k(O), k(ZERO), k(NINE), __, __, k(PERIOD), k(FORWARD_SLASH), k(L), k(SEMICOLON), k(P), k(MINUS), __,
    // 50-5F
    __, __, k(QUOTE), __, k(LEFT_BRACKET), k(EQUALS), __, __, k(CAPS_LOCK), k(RIGHT_SHIFT), k(ENTER), k(RIGHT_BRACKET), __, k(BACKSLASH), __, __,
    // 60-6F
    __, __, __, __, __, __, k(BACKSPACE), __, __, k(KEYPAD_ONE), __, k(KEYPAD_FOUR), k(KEYPAD_SEVEN), __, __, __,
    // 70-7F
    k(KEYPAD_ZERO), k(KEYPAD_PERIOD), k(KEYPAD_TWO), k(KEYPAD_FIVE), k(KEYPAD_SIX), k(KEYPAD_EIGHT), k(ESCAPE), __,
    k(F11), k(KEYPAD_PLUS), k(KEYPAD_THREE), k(KEYPAD_MINUS), k(KEYPAD_ASTERISK), k(KEYPAD_NINE), __, __,
    // 80-8F
    __, __, __, k(F7), __, __, __, __, __, __, __, __, __, __, __, __,
];

const EXTENDED: &[(u8, Keycode)] = &[
    (0x11, RIGHT_ALT),
    (0x14, RIGHT_CONTROL),
    (0x1F, LEFT_GUI),
    (0x27, RIGHT_GUI),
    (0x2F, APPLICATION),
    (0x4A, KEYPAD_FORWARD_SLASH),
    (0x5A, KEYPAD_ENTER),
    (0x6B, LEFT_ARROW),
    (0x74, RIGHT_ARROW),
    (0x75, UP_ARROW),
    (0x72, DOWN_ARROW),
    (0x69, END),
    (0x6C, HOME),
    (0x70, INSERT),
    (0x71, DELETE),
    (0x7A, PAGE_DOWN),
    (0x7D, PAGE_UP),
    (0x7E, SCROLL_LOCK),
    (0x77, KEYPAD_NUMLOCK),
];

/// Layout-free table: the decoder yields host keycodes directly.
pub static SET2_KEYCODES: ScancodeTable<Keycode> = ScancodeTable::new(CODES, EXTENDED);
