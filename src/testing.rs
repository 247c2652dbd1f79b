//! In-memory stand-ins for the hardware seams, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::error::Error;
use crate::hid::{HidLink, KeyboardReport, Transport};
use crate::ps2::{Clock, Ps2Port, ACK};

/// Scripted receive queue plus a log of commands sent.
#[derive(Default)]
pub struct PortState {
    pub rx: VecDeque<u8>,
    pub sent: Vec<u8>,
    /// Responses handed out for commands, in order; ACK once exhausted.
    pub responses: VecDeque<Result<u8, Error>>,
    /// Bytes pushed into `rx` after a command, e.g. a scancode set id.
    pub replies: VecDeque<(u8, u8)>,
    pub error_flags: u8,
    pub clears: usize,
}

#[derive(Clone, Default)]
pub struct FakePort(pub Rc<RefCell<PortState>>);

impl FakePort {
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let port = Self::default();
        port.push(bytes);
        port
    }

    pub fn push(&self, bytes: &[u8]) {
        self.0.borrow_mut().rx.extend(bytes.iter().copied());
    }

    pub fn sent(&self) -> Vec<u8> {
        self.0.borrow().sent.clone()
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().rx.len()
    }
}

impl Ps2Port for FakePort {
    fn len(&self) -> usize {
        self.0.borrow().rx.len()
    }

    fn pop_front(&mut self) -> Option<u8> {
        self.0.borrow_mut().rx.pop_front()
    }

    fn send_command(&mut self, byte: u8) -> Result<u8, Error> {
        let mut state = self.0.borrow_mut();
        state.sent.push(byte);
        if state.replies.front().map(|&(cmd, _)| cmd) == Some(byte) {
            if let Some((_, reply)) = state.replies.pop_front() {
                state.rx.push_back(reply);
            }
        }
        state.responses.pop_front().unwrap_or(Ok(ACK))
    }

    fn clear_errors(&mut self) -> u8 {
        let mut state = self.0.borrow_mut();
        state.clears += 1;
        core::mem::take(&mut state.error_flags)
    }
}

/// Clock that advances a fixed step every time it is read.
#[derive(Clone)]
pub struct StepClock {
    now: Rc<Cell<u64>>,
    step: u64,
}

impl StepClock {
    pub fn new(step_micros: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            step: step_micros,
        }
    }

    pub fn elapsed(&self) -> u64 {
        self.now.get()
    }
}

impl Clock for StepClock {
    fn now_micros(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + self.step);
        t
    }
}

#[derive(Default)]
pub struct LinkState {
    pub usable: bool,
    pub reports: Vec<KeyboardReport>,
    pub led_output: u8,
    pub advertise_requests: usize,
    pub fail_sends: bool,
}

/// Link that records every report it is given.
#[derive(Clone)]
pub struct FakeLink {
    pub transport: Transport,
    pub state: Rc<RefCell<LinkState>>,
}

impl FakeLink {
    pub fn new(transport: Transport, usable: bool) -> Self {
        Self {
            transport,
            state: Rc::new(RefCell::new(LinkState {
                usable,
                ..Default::default()
            })),
        }
    }

    pub fn set_usable(&self, usable: bool) {
        self.state.borrow_mut().usable = usable;
    }

    pub fn set_led_output(&self, bits: u8) {
        self.state.borrow_mut().led_output = bits;
    }

    pub fn reports(&self) -> Vec<KeyboardReport> {
        self.state.borrow().reports.clone()
    }

    pub fn report_count(&self) -> usize {
        self.state.borrow().reports.len()
    }

    pub fn clear_reports(&self) {
        self.state.borrow_mut().reports.clear();
    }
}

impl HidLink for FakeLink {
    fn transport(&self) -> Transport {
        self.transport
    }

    fn is_usable(&self) -> bool {
        self.state.borrow().usable
    }

    fn send_report(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_sends {
            return Err(Error::QueueFull);
        }
        state.reports.push(*report);
        Ok(())
    }

    fn led_output(&self) -> u8 {
        self.state.borrow().led_output
    }

    fn start_advertising(&mut self) {
        self.state.borrow_mut().advertise_requests += 1;
    }
}
