//! Simulated HC-SR04 wired to fake pins and a fake clock.
//!
//! Time only moves when the clock is read, one microsecond per read, so a
//! busy-wait loop sees the echo edges at exact instants.

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};
use hcsr04_pulse::{HcSr04Error, LineConfigurator, LineId, MicrosClock, Result};

#[derive(Debug, Clone, Copy)]
pub enum Echo {
    Silent,
    StuckHigh,
    /// Rises `delay` us after the trigger falls and stays up for `width` us.
    /// A new trigger restarts the timeline.
    Pulse { delay: u64, width: u64 },
    /// Like `Pulse`, but every trigger's echo runs to completion even after
    /// the next trigger, so a long echo can still be high when a new
    /// measurement begins.
    Lingering { delay: u64, width: u64 },
    /// High over `[from, until)` of absolute sim time, whatever the trigger does.
    Window { from: u64, until: u64 },
}

#[derive(Debug)]
pub struct Sim {
    pub now: u64,
    pub echo: Echo,
    pub trigger_high: bool,
    pub trigger_rose: Option<u64>,
    pub trigger_fell: Option<u64>,
    pub trigger_pulses: u32,
    /// Echo spans `[rise, fall)` scheduled by `Lingering` triggers.
    pub echoes: Vec<(u64, u64)>,
}

impl Sim {
    fn echo_high(&self) -> bool {
        match self.echo {
            Echo::Silent => false,
            Echo::StuckHigh => true,
            Echo::Pulse { delay, width } => match self.trigger_fell {
                Some(fell) if !self.trigger_high => {
                    let start = fell + delay;
                    self.now >= start && self.now < start + width
                }
                _ => false,
            },
            Echo::Lingering { .. } => self
                .echoes
                .iter()
                .any(|&(rise, fall)| self.now >= rise && self.now < fall),
            Echo::Window { from, until } => self.now >= from && self.now < until,
        }
    }
}

pub type Shared = Rc<RefCell<Sim>>;

pub fn sim(echo: Echo) -> Shared {
    Rc::new(RefCell::new(Sim {
        now: 1_000,
        echo,
        trigger_high: false,
        trigger_rose: None,
        trigger_fell: None,
        trigger_pulses: 0,
        echoes: Vec::new(),
    }))
}

#[derive(Debug)]
pub struct SimClock(pub Shared);

impl MicrosClock for SimClock {
    fn now_micros(&mut self) -> u64 {
        let mut sim = self.0.borrow_mut();
        sim.now += 1;
        sim.now
    }
}

#[derive(Debug)]
pub struct SimTrigger(Shared);

impl ErrorType for SimTrigger {
    type Error = Infallible;
}

impl OutputPin for SimTrigger {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        let mut sim = self.0.borrow_mut();
        if sim.trigger_high {
            let now = sim.now;
            let echo = sim.echo;
            sim.trigger_fell = Some(now);
            if let Echo::Lingering { delay, width } = echo {
                sim.echoes.push((now + delay, now + delay + width));
            }
        }
        sim.trigger_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        let mut sim = self.0.borrow_mut();
        if !sim.trigger_high {
            sim.trigger_rose = Some(sim.now);
            sim.trigger_pulses += 1;
        }
        sim.trigger_high = true;
        Ok(())
    }
}

#[derive(Debug)]
pub struct SimEcho(Shared);

impl ErrorType for SimEcho {
    type Error = Infallible;
}

impl InputPin for SimEcho {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(self.0.borrow().echo_high())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(!self.0.borrow().echo_high())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Output,
    Input,
}

/// A controller with `lines` valid offsets.
#[derive(Debug)]
pub struct SimGpio {
    sim: Shared,
    lines: u32,
    pub configured: Vec<(LineId, Mode)>,
}

impl SimGpio {
    pub fn new(sim: &Shared, lines: u32) -> Self {
        Self {
            sim: sim.clone(),
            lines,
            configured: Vec::new(),
        }
    }

    fn check(&self, line: LineId) -> Result<()> {
        if line >= self.lines {
            return Err(HcSr04Error::InvalidConfiguration(format!("no line {line}")));
        }
        Ok(())
    }
}

impl LineConfigurator for SimGpio {
    type Output = SimTrigger;
    type Input = SimEcho;

    fn configure_output(&mut self, line: LineId) -> Result<SimTrigger> {
        self.check(line)?;
        self.configured.push((line, Mode::Output));
        Ok(SimTrigger(self.sim.clone()))
    }

    fn configure_input(&mut self, line: LineId) -> Result<SimEcho> {
        self.check(line)?;
        self.configured.push((line, Mode::Input));
        Ok(SimEcho(self.sim.clone()))
    }
}

#[derive(Debug)]
pub struct Broken;

impl digital::Error for Broken {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output line whose writes always fail.
#[derive(Debug)]
pub struct BrokenTrigger;

impl ErrorType for BrokenTrigger {
    type Error = Broken;
}

impl OutputPin for BrokenTrigger {
    fn set_low(&mut self) -> core::result::Result<(), Broken> {
        Err(Broken)
    }

    fn set_high(&mut self) -> core::result::Result<(), Broken> {
        Err(Broken)
    }
}
