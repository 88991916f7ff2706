//! Explicit line setup. Pins are configured once and owned by the handle
//! for its whole life.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::{HcSr04Error, Result};
use crate::pulse::{MicrosClock, PulseTimer};

/// Line offset on the GPIO controller.
pub type LineId = u32;

/// The GPIO facility that hands out configured lines.
pub trait LineConfigurator {
    type Output: OutputPin;
    type Input: InputPin;

    fn configure_output(&mut self, line: LineId) -> Result<Self::Output>;
    fn configure_input(&mut self, line: LineId) -> Result<Self::Input>;
}

impl<L: LineConfigurator + ?Sized> LineConfigurator for &mut L {
    type Output = L::Output;
    type Input = L::Input;

    fn configure_output(&mut self, line: LineId) -> Result<Self::Output> {
        (**self).configure_output(line)
    }

    fn configure_input(&mut self, line: LineId) -> Result<Self::Input> {
        (**self).configure_input(line)
    }
}

/// A trigger output and an echo input for one sensor.
#[derive(Debug)]
pub struct SensorHandle<T, E> {
    trigger_line: LineId,
    echo_line: LineId,
    trigger: T,
    echo: E,
}

impl<T: OutputPin, E: InputPin> SensorHandle<T, E> {
    /// Configures `trigger` as an output driven low and `echo` as an input.
    pub fn configure<L>(mut configurator: L, trigger: LineId, echo: LineId) -> Result<Self>
    where
        L: LineConfigurator<Output = T, Input = E>,
    {
        if trigger == echo {
            return Err(HcSr04Error::invalid(format!(
                "trigger and echo share line {trigger}"
            )));
        }

        let mut trigger_pin = configurator.configure_output(trigger)?;
        trigger_pin
            .set_low()
            .map_err(|e| HcSr04Error::from_pin("trigger", e))?;
        let echo_pin = configurator.configure_input(echo)?;

        log::debug!("configured trigger line {} and echo line {}", trigger, echo);
        Ok(Self {
            trigger_line: trigger,
            echo_line: echo,
            trigger: trigger_pin,
            echo: echo_pin,
        })
    }

    pub fn trigger_line(&self) -> LineId {
        self.trigger_line
    }

    pub fn echo_line(&self) -> LineId {
        self.echo_line
    }

    /// Runs one trigger/echo cycle on this handle's lines.
    pub fn measure_pulse_width<C>(&mut self, clock: &mut C, timeout_micros: u32) -> Result<u32>
    where
        C: MicrosClock + ?Sized,
    {
        PulseTimer::new(timeout_micros)?.measure(&mut self.trigger, &mut self.echo, clock)
    }

    pub(crate) fn measure_with<C>(&mut self, timer: &mut PulseTimer, clock: &mut C) -> Result<u32>
    where
        C: MicrosClock + ?Sized,
    {
        timer.measure(&mut self.trigger, &mut self.echo, clock)
    }

    /// Gives the pins back.
    pub fn release(self) -> (T, E) {
        (self.trigger, self.echo)
    }
}
