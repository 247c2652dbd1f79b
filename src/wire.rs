//! PS/2 wire driver - the hardware side of [`Ps2Port`] and [`Clock`].
//!
//! A dedicated task on a high-priority interrupt executor follows the
//! CLOCK line edge by edge:
//!
//! ```text
//! CLOCK ↓ ──► sample DATA ──► FrameReceiver ──► RX queue ──► WirePort::pop_front
//!                                  │
//!                                  └─ fault ──► ERRORS flags ──► WirePort::clear_errors
//! ```
//!
//! Host commands travel the other way: `WirePort::send_command` posts the
//! byte to the task and busy-waits (bounded) for the device's reply.  The
//! dispatch loop runs in thread mode, so the task preempts it and the
//! wait makes progress.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU8, Ordering};

use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Flex, OutputDrive, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Instant, Timer};
use heapless::Deque;

use ps2hid::config;
use ps2hid::ps2::frame::{flags, host_frame_bits, FrameReceiver};
use ps2hid::ps2::{Clock, Ps2Port};
use ps2hid::Error;

type RxQueue = Deque<u8, { config::PS2_RX_QUEUE_DEPTH }>;

static RX: Mutex<CriticalSectionRawMutex, RefCell<RxQueue>> = Mutex::new(RefCell::new(Deque::new()));
static ERRORS: AtomicU8 = AtomicU8::new(0);
static TX_REQUEST: Signal<CriticalSectionRawMutex, u8> = Signal::new();
static TX_RESULT: Signal<CriticalSectionRawMutex, Result<u8, Error>> = Signal::new();

fn raise(flag: u8) {
    ERRORS.fetch_or(flag, Ordering::AcqRel);
}

fn ticks(duration: core::time::Duration) -> embassy_time::Duration {
    embassy_time::Duration::from_micros(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
}

/// Handle onto the wire task's queues.  Zero-sized; the state is static.
pub struct WirePort;

impl Ps2Port for WirePort {
    fn len(&self) -> usize {
        RX.lock(|rx| rx.borrow().len())
    }

    fn pop_front(&mut self) -> Option<u8> {
        RX.lock(|rx| rx.borrow_mut().pop_front())
    }

    fn send_command(&mut self, byte: u8) -> Result<u8, Error> {
        TX_RESULT.reset();
        TX_REQUEST.signal(byte);

        let start = Instant::now();
        let limit = ticks(config::PS2_COMMAND_TIMEOUT);
        loop {
            if let Some(result) = TX_RESULT.try_take() {
                return result;
            }
            if start.elapsed() > limit {
                raise(flags::NO_RESPONSE);
                return Err(Error::Timeout);
            }
        }
    }

    fn clear_errors(&mut self) -> u8 {
        ERRORS.swap(0, Ordering::AcqRel)
    }
}

/// `embassy-time` backed microsecond clock.
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Configure both lines as open-drain with pull-ups, released (high).
pub fn open_drain(pin: &mut Flex<'static>) {
    pin.set_high();
    pin.set_as_input_output(Pull::Up, OutputDrive::Standard0Disconnect1);
}

/// Wire task - must be spawned on the high-priority executor.
pub async fn run(mut clock: Flex<'static>, mut data: Flex<'static>) -> ! {
    info!("PS/2 wire task started");

    let mut frame = FrameReceiver::new();
    let mut last_edge = Instant::now();
    // Reply to a host command is routed to the waiting sender, not the queue.
    let mut reply_deadline: Option<Instant> = None;

    loop {
        match select(clock.wait_for_falling_edge(), TX_REQUEST.wait()).await {
            Either::First(()) => {
                let bit = data.is_high();
                let now = Instant::now();
                if frame.in_progress() && now - last_edge > ticks(config::PS2_BIT_TIMEOUT) {
                    debug!("PS/2 frame timed out, resyncing");
                    frame.reset();
                }
                last_edge = now;

                match frame.push_bit(bit) {
                    None => {}
                    Some(Ok(byte)) => match reply_deadline.take() {
                        Some(deadline) if now <= deadline => TX_RESULT.signal(Ok(byte)),
                        _ => enqueue(byte),
                    },
                    Some(Err(e)) => {
                        warn!("PS/2 frame error: {}", e);
                        raise(e.flag());
                    }
                }
            }
            Either::Second(command) => {
                frame.reset();
                match transmit(&mut clock, &mut data, command).await {
                    Ok(()) => {
                        reply_deadline = Some(Instant::now() + ticks(config::PS2_COMMAND_TIMEOUT));
                    }
                    Err(e) => {
                        reply_deadline = None;
                        TX_RESULT.signal(Err(e));
                    }
                }
                last_edge = Instant::now();
            }
        }
    }
}

fn enqueue(byte: u8) {
    let overrun = RX.lock(|rx| rx.borrow_mut().push_back(byte).is_err());
    if overrun {
        raise(flags::OVERRUN);
    }
}

/// Clock one byte out to the device: inhibit, request-to-send, ten
/// device-clocked bits, then the device's line-control ACK.
async fn transmit(clock: &mut Flex<'static>, data: &mut Flex<'static>, byte: u8) -> Result<(), Error> {
    clock.set_low();
    Timer::after_micros(100).await;
    data.set_low();
    clock.set_high();

    let result = clock_out(clock, data, byte).await;
    data.set_high();
    if let Err(e) = result {
        raise(e);
        return Err(Error::LinkFault(ERRORS.load(Ordering::Acquire)));
    }
    Ok(())
}

async fn clock_out(clock: &mut Flex<'static>, data: &mut Flex<'static>, byte: u8) -> Result<(), u8> {
    let mut timeout = ticks(config::PS2_RTS_TIMEOUT);
    for bit in host_frame_bits(byte) {
        with_timeout(timeout, clock.wait_for_falling_edge())
            .await
            .map_err(|_| flags::NO_RESPONSE)?;
        if bit {
            data.set_high();
        } else {
            data.set_low();
        }
        timeout = ticks(config::PS2_BIT_TIMEOUT);
    }

    // Line control bit: the device pulls DATA low for one clock.
    with_timeout(timeout, clock.wait_for_falling_edge())
        .await
        .map_err(|_| flags::NO_RESPONSE)?;
    if data.is_high() {
        return Err(flags::NO_RESPONSE);
    }
    with_timeout(timeout, clock.wait_for_rising_edge())
        .await
        .map_err(|_| flags::NO_RESPONSE)?;
    Ok(())
}
