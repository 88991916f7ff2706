//! Trigger/echo exchange with the sensor.
//!
//! One measurement is a single trigger pulse followed by busy-wait loops on
//! the echo line, timed against a monotonic microsecond clock. Nothing is
//! retried here.

use core::fmt;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::{HcSr04Error, Result};

/// Width of the trigger pulse the sensor expects.
pub const TRIGGER_PULSE_MICROS: u32 = 10;

/// Echo wait used when the caller does not pick one. Longer than the ~23ms
/// round trip at the rated 4m range; the sensor itself gives up near 38ms
/// and drops the echo line.
pub const DEFAULT_TIMEOUT_MICROS: u32 = 35_000;

/// A monotonic clock with microsecond resolution.
///
/// Readings only need to be meaningful relative to each other. Wrapping is
/// handled with `wrapping_sub`.
pub trait MicrosClock {
    fn now_micros(&mut self) -> u64;
}

/// `CLOCK_MONOTONIC_RAW`, unaffected by NTP slewing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock
    }
}

impl MicrosClock for MonotonicClock {
    fn now_micros(&mut self) -> u64 {
        // Cannot fail for a valid clock id and a valid pointer.
        let ts = unsafe {
            let mut ts: libc::timespec = std::mem::zeroed();
            libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut ts);
            ts
        };
        (ts.tv_sec as u64) * 1_000_000 + (ts.tv_nsec as u64) / 1_000
    }
}

impl<C: MicrosClock + ?Sized> MicrosClock for &mut C {
    fn now_micros(&mut self) -> u64 {
        (**self).now_micros()
    }
}

/// Spins until `micros` have elapsed on `clock`.
///
/// `thread::sleep` overshoots by tens of microseconds on Linux, far more
/// than a 10us trigger pulse tolerates.
pub fn spin_for<C: MicrosClock + ?Sized>(clock: &mut C, micros: u32) {
    let start = clock.now_micros();
    while clock.now_micros().wrapping_sub(start) < u64::from(micros) {
        std::hint::spin_loop();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Triggering,
    AwaitingEchoStart,
    AwaitingEchoEnd,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Triggering => "triggering",
            Phase::AwaitingEchoStart => "awaiting echo start",
            Phase::AwaitingEchoEnd => "awaiting echo end",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Measures the echo pulse width for one trigger.
///
/// The timeout is a single deadline counted from the falling edge of the
/// trigger and shared by every echo wait, so a call never blocks for longer
/// than the timeout plus the trigger pulse.
#[derive(Debug)]
pub struct PulseTimer {
    timeout_micros: u32,
    phase: Phase,
}

impl PulseTimer {
    pub fn new(timeout_micros: u32) -> Result<Self> {
        if timeout_micros == 0 {
            return Err(HcSr04Error::invalid("timeout must be positive"));
        }
        Ok(Self {
            timeout_micros,
            phase: Phase::Idle,
        })
    }

    pub fn timeout_micros(&self) -> u32 {
        self.timeout_micros
    }

    /// Where the last call stopped. `Done` after a success, the waiting
    /// phase after a timeout.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the echo pulse width in microseconds.
    pub fn measure<T, E, C>(&mut self, trigger: &mut T, echo: &mut E, clock: &mut C) -> Result<u32>
    where
        T: OutputPin,
        E: InputPin,
        C: MicrosClock + ?Sized,
    {
        self.enter(Phase::Idle);

        self.enter(Phase::Triggering);
        if echo.is_high().map_err(|e| HcSr04Error::from_pin("echo", e))? {
            log::warn!("echo still high from a previous cycle, waiting for it to drop");
        }
        trigger
            .set_low()
            .map_err(|e| HcSr04Error::from_pin("trigger", e))?;
        trigger
            .set_high()
            .map_err(|e| HcSr04Error::from_pin("trigger", e))?;
        spin_for(clock, TRIGGER_PULSE_MICROS);
        trigger
            .set_low()
            .map_err(|e| HcSr04Error::from_pin("trigger", e))?;

        let start = clock.now_micros();

        // A rising edge, not just a high level: the tail of an earlier echo
        // must drain first.
        self.enter(Phase::AwaitingEchoStart);
        self.wait_for_level(echo, clock, false, start)?;
        let rise = self.wait_for_level(echo, clock, true, start)?;

        self.enter(Phase::AwaitingEchoEnd);
        let fall = self.wait_for_level(echo, clock, false, start)?;

        self.enter(Phase::Done);
        let width = fall.wrapping_sub(rise);
        // Bounded by the timeout, so it fits.
        let width = u32::try_from(width).unwrap_or(u32::MAX);
        log::debug!("echo pulse {}us", width);
        Ok(width)
    }

    fn wait_for_level<E, C>(&mut self, echo: &mut E, clock: &mut C, high: bool, start: u64) -> Result<u64>
    where
        E: InputPin,
        C: MicrosClock + ?Sized,
    {
        let timeout = u64::from(self.timeout_micros);
        loop {
            let now = clock.now_micros();
            let level = echo
                .is_high()
                .map_err(|e| HcSr04Error::from_pin("echo", e))?;
            if level == high {
                return Ok(now);
            }

            let waited = now.wrapping_sub(start);
            if waited >= timeout {
                log::debug!("echo timeout while {} after {}us", self.phase, waited);
                return Err(HcSr04Error::Timeout {
                    phase: self.phase,
                    waited_micros: u32::try_from(waited).unwrap_or(u32::MAX),
                });
            }
            core::hint::spin_loop();
        }
    }

    fn enter(&mut self, phase: Phase) {
        log::trace!("{} -> {}", self.phase, phase);
        self.phase = phase;
    }
}

/// One-shot form of [`PulseTimer::measure`].
pub fn measure_pulse_width<T, E, C>(
    trigger: &mut T,
    echo: &mut E,
    clock: &mut C,
    timeout_micros: u32,
) -> Result<u32>
where
    T: OutputPin,
    E: InputPin,
    C: MicrosClock + ?Sized,
{
    PulseTimer::new(timeout_micros)?.measure(trigger, echo, clock)
}
