//! Main control loop: PS/2 key events in, HID reports out, LEDs back.
//!
//! ```text
//! wire bytes → Ps2Keyboard (decode + table) → KeyId::chord → KeyboardOutput → host
//!                      ↑                                          │
//!                      └──────────── set_leds ◄── led_state ◄─────┘
//! ```
//!
//! Backends are probed once at boot.  Wired wins over wireless for both
//! key delivery and LED feedback; with neither present the loop keeps
//! decoding so the keyboard still gets its self-test and traces.

use core::time::Duration;

use crate::config;
use crate::error::Error;
use crate::hid::{HidLink, KeyId, KeyboardOutput, Transport};
use crate::ps2::{Clock, Ps2Keyboard, Ps2Port, ScanEvent};

pub struct Dispatcher<P, C, K: 'static, W, B> {
    keyboard: Ps2Keyboard<P, C, K>,
    wired: Option<KeyboardOutput<W>>,
    wireless: Option<KeyboardOutput<B>>,
    timeout: Duration,
}

impl<P, C, K, W, B> Dispatcher<P, C, K, W, B>
where
    P: Ps2Port,
    C: Clock,
    K: KeyId,
    W: HidLink,
    B: HidLink,
{
    /// Run the boot sequence and return a dispatcher ready to loop.
    ///
    /// Reports the scancode set, lights all LEDs while the backends come
    /// up (for at least `self_test_hold`), then clears them.  `probe_*`
    /// return `None` when that backend is absent on this build/board.
    pub fn boot(
        mut keyboard: Ps2Keyboard<P, C, K>,
        probe_wired: impl FnOnce() -> Option<W>,
        probe_wireless: impl FnOnce() -> Option<B>,
        self_test_hold: Duration,
    ) -> Self {
        if let Some(id) = keyboard.get_scancode_set_id(config::PS2_READ_TIMEOUT) {
            info!("keyboard is reporting scancode set: {:x}", id);
        }

        let started = keyboard.clock().now_micros();
        keyboard.fill_leds();

        let wired = probe_wired().map(KeyboardOutput::new);
        let wireless = probe_wireless().map(KeyboardOutput::new);
        match (wired.is_some(), wireless.is_some()) {
            (true, true) => info!("HID backends: USB (preferred), BLE"),
            (true, false) => info!("HID backends: USB"),
            (false, true) => info!("HID backends: BLE"),
            (false, false) => warn!("keys will not reach a host: {}", Error::BackendUnavailable),
        }

        let elapsed = keyboard.clock().now_micros().saturating_sub(started);
        let remaining = self_test_hold.saturating_sub(Duration::from_micros(elapsed));
        keyboard.clock().spin_for(remaining);
        keyboard.clear_leds();

        Self::new(keyboard, wired, wireless)
    }

    /// Assemble a dispatcher from already-constructed parts.
    pub fn new(
        keyboard: Ps2Keyboard<P, C, K>,
        wired: Option<KeyboardOutput<W>>,
        wireless: Option<KeyboardOutput<B>>,
    ) -> Self {
        Self {
            keyboard,
            wired,
            wireless,
            timeout: config::PS2_READ_TIMEOUT,
        }
    }

    /// Override the per-cycle PS/2 polling window.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn keyboard(&self) -> &Ps2Keyboard<P, C, K> {
        &self.keyboard
    }

    /// Backend that receives keys and supplies LEDs.
    pub fn active(&self) -> Option<Transport> {
        if self.wired.is_some() {
            Some(Transport::Wired)
        } else if self.wireless.is_some() {
            Some(Transport::Wireless)
        } else {
            None
        }
    }

    /// One loop iteration.  Returns the decoded event, if any.
    pub fn step(&mut self) -> Option<ScanEvent<K>> {
        if let Some(output) = self.wired.as_mut() {
            output.poll();
        }
        if let Some(output) = self.wireless.as_mut() {
            output.poll();
        }

        let event = self.keyboard.decode_scancode(self.timeout);
        if let Some(event) = &event {
            debug!(
                "key code:{:x} ext:{} release:{}",
                event.code, event.extended, event.release
            );
            self.forward(event);
        }

        let leds = if let Some(output) = self.wired.as_ref() {
            Some(output.led_state())
        } else {
            self.wireless.as_ref().map(KeyboardOutput::led_state)
        };
        if let Some(leds) = leds {
            self.keyboard.set_leds(leds);
        }

        event
    }

    /// Loop forever.
    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    fn forward(&mut self, event: &ScanEvent<K>) {
        // Unknown codes carry no key: consumed, nothing sent.
        let Some(chord) = event.key.and_then(KeyId::chord) else {
            return;
        };
        if let Some(output) = self.wired.as_mut() {
            output.apply(&chord, event.release);
        } else if let Some(output) = self.wireless.as_mut() {
            output.apply(&chord, event.release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::keycode::{self, Keycode};
    use crate::hid::KeyboardReport;
    use crate::ps2::command;
    use crate::scancode::{KeyName, SET2_KEYCODES, SET2_NAMES};
    use crate::testing::{FakeLink, FakePort, StepClock};

    type TestDispatcher<K> = Dispatcher<FakePort, StepClock, K, FakeLink, FakeLink>;

    fn dispatcher(
        port: &FakePort,
        wired: Option<&FakeLink>,
        wireless: Option<&FakeLink>,
    ) -> TestDispatcher<Keycode> {
        let keyboard = Ps2Keyboard::new(port.clone(), StepClock::new(1_000), &SET2_KEYCODES);
        Dispatcher::new(
            keyboard,
            wired.cloned().map(KeyboardOutput::new),
            wireless.cloned().map(KeyboardOutput::new),
        )
    }

    #[test]
    fn boot_reports_set_and_cycles_leds() {
        let port = FakePort::default();
        port.0.borrow_mut().replies.push_back((command::GET_SCANCODE_SET, 0x02));
        let wired = FakeLink::new(Transport::Wired, true);
        let keyboard = Ps2Keyboard::new(port.clone(), StepClock::new(1_000), &SET2_KEYCODES);

        let hold = Duration::from_millis(500);
        let d: TestDispatcher<Keycode> =
            Dispatcher::boot(keyboard, || Some(wired.clone()), || None, hold);

        assert_eq!(port.sent(), [0xF0, 0x00, 0xED, 0x07, 0xED, 0x00]);
        assert_eq!(d.keyboard().cached_leds(), Some(0));
        assert!(d.keyboard().clock().elapsed() >= 500_000);
        assert_eq!(d.active(), Some(Transport::Wired));
        assert_eq!(wired.reports(), [KeyboardReport::empty()]);
        // The set id reply was consumed, not left for the key decoder.
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn boot_without_backends_still_runs() {
        let port = FakePort::default();
        let keyboard = Ps2Keyboard::new(port.clone(), StepClock::new(1_000), &SET2_KEYCODES);
        let mut d: TestDispatcher<Keycode> =
            Dispatcher::boot(keyboard, || None, || None, Duration::ZERO);
        assert_eq!(d.active(), None);

        port.push(&[0x1C]);
        let event = d.step().unwrap();
        assert_eq!(event.key, Some(keycode::A));
        // No backend means no LED source either.
        assert_eq!(port.sent(), [0xF0, 0x00, 0xED, 0x07, 0xED, 0x00]);
    }

    #[test]
    fn wired_is_preferred() {
        let port = FakePort::with_bytes(&[]);
        let wired = FakeLink::new(Transport::Wired, true);
        let wireless = FakeLink::new(Transport::Wireless, true);
        let mut d = dispatcher(&port, Some(&wired), Some(&wireless));
        wired.clear_reports();
        wireless.clear_reports();

        port.push(&[0x1C, 0xF0, 0x1C]);
        d.step();
        d.step();

        let reports = wired.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].keycodes[0], keycode::A.usage());
        assert!(reports[1].is_empty());
        assert_eq!(wireless.report_count(), 0);
    }

    #[test]
    fn wireless_used_without_wired() {
        let port = FakePort::default();
        let wireless = FakeLink::new(Transport::Wireless, true);
        let mut d = dispatcher(&port, None, Some(&wireless));
        wireless.clear_reports();
        assert_eq!(d.active(), Some(Transport::Wireless));

        port.push(&[0xE0, 0x75]);
        let event = d.step().unwrap();
        assert!(event.extended);
        assert_eq!(wireless.reports()[0].keycodes[0], keycode::UP_ARROW.usage());
    }

    #[test]
    fn keys_are_dropped_while_link_is_down() {
        let port = FakePort::default();
        let wireless = FakeLink::new(Transport::Wireless, false);
        let mut d = dispatcher(&port, None, Some(&wireless));

        port.push(&[0x1C]);
        assert!(d.step().is_some());
        assert_eq!(wireless.report_count(), 0);

        wireless.set_usable(true);
        port.push(&[0xF0, 0x1C]);
        d.step();
        // Release-all on reconnect, then the release itself.
        assert_eq!(wireless.report_count(), 2);
    }

    #[test]
    fn unknown_code_is_consumed_without_report() {
        let port = FakePort::default();
        let wired = FakeLink::new(Transport::Wired, true);
        let mut d = dispatcher(&port, Some(&wired), None);
        wired.clear_reports();

        port.push(&[0x00]);
        let event = d.step().unwrap();
        assert_eq!(event.key, None);
        assert_eq!(event.code, 0x00);
        assert_eq!(wired.report_count(), 0);
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn host_leds_reach_the_keyboard_once() {
        let port = FakePort::default();
        let wired = FakeLink::new(Transport::Wired, true);
        let mut d = dispatcher(&port, Some(&wired), None);

        wired.set_led_output(0x02);
        d.step();
        d.step();
        assert_eq!(port.sent(), [command::SET_LEDS, 0x04]);

        wired.set_led_output(0x03);
        d.step();
        assert_eq!(port.sent(), [command::SET_LEDS, 0x04, command::SET_LEDS, 0x06]);
    }

    #[test]
    fn leds_go_dark_when_link_drops() {
        let port = FakePort::default();
        let wireless = FakeLink::new(Transport::Wireless, true);
        let mut d = dispatcher(&port, None, Some(&wireless));

        wireless.set_led_output(0x01);
        d.step();
        wireless.set_usable(false);
        d.step();
        assert_eq!(port.sent(), [command::SET_LEDS, 0x02, command::SET_LEDS, 0x00]);
    }

    #[test]
    fn named_table_sends_shifted_chords() {
        let port = FakePort::default();
        let wired = FakeLink::new(Transport::Wired, true);
        let keyboard = Ps2Keyboard::new(port.clone(), StepClock::new(1_000), &SET2_NAMES);
        let mut d: TestDispatcher<KeyName> =
            Dispatcher::new(keyboard, Some(KeyboardOutput::new(wired.clone())), None);
        wired.clear_reports();

        // Keypad plus.
        port.push(&[0x79, 0xF0, 0x79]);
        d.step();
        d.step();
        let reports = wired.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].modifier, 0x02);
        assert_eq!(reports[0].keycodes[0], keycode::EQUALS.usage());
        assert!(reports[1].is_empty());
    }

    #[test]
    fn held_shift_survives_shifted_keypad_key() {
        let port = FakePort::default();
        let wired = FakeLink::new(Transport::Wired, true);
        let keyboard = Ps2Keyboard::new(port.clone(), StepClock::new(1_000), &SET2_NAMES);
        let mut d: TestDispatcher<KeyName> =
            Dispatcher::new(keyboard, Some(KeyboardOutput::new(wired.clone())), None);
        wired.clear_reports();

        // Shift down, keypad star down and up, then 'a' with Shift still held.
        port.push(&[0x12, 0x7C, 0xF0, 0x7C, 0x1C]);
        for _ in 0..4 {
            d.step();
        }
        let reports = wired.reports();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[1].keycodes[0], keycode::EIGHT.usage());
        assert_eq!(reports[2].modifier, 0x02);
        assert!(!reports[2].keycodes.contains(&keycode::EIGHT.usage()));
        assert_eq!(reports[3].modifier, 0x02);
        assert_eq!(reports[3].keycodes[0], keycode::A.usage());

        port.push(&[0xF0, 0x12]);
        d.step();
        assert_eq!(wired.reports()[4].modifier, 0x00);
    }
}
