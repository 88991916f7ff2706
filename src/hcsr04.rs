use std::path::PathBuf;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::cdev::{CdevChip, CdevInput, CdevOutput, DEFAULT_CHIP_PATH};
use crate::error::{HcSr04Error, Result};
use crate::line::{LineId, SensorHandle};
use crate::pulse::{DEFAULT_TIMEOUT_MICROS, MicrosClock, MonotonicClock, PulseTimer};
use crate::units::{Distance, Unit};

#[derive(Debug, Clone, PartialEq)]
pub struct SensorOptions {
    /// Only used by [`HcSr04::open_with`].
    pub chip_path: PathBuf,
    /// Echo timeout. See [`crate::range_to_timeout`] to derive one from a range.
    pub timeout_micros: u32,
    /// minimum distance reading that will not be ignored
    pub min_distance: Option<Distance>,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self {
            chip_path: PathBuf::from(DEFAULT_CHIP_PATH),
            timeout_micros: DEFAULT_TIMEOUT_MICROS,
            min_distance: None,
        }
    }
}

pub struct HcSr04<T, E, C> {
    handle: SensorHandle<T, E>,
    clock: C,
    timer: PulseTimer,
    min_raw: Option<f64>,
}

impl HcSr04<CdevOutput, CdevInput, MonotonicClock> {
    /// Opens the default chip with the default timeout.
    pub fn open(trigger: LineId, echo: LineId) -> Result<Self> {
        Self::open_with(trigger, echo, SensorOptions::default())
    }

    pub fn open_with(trigger: LineId, echo: LineId, options: SensorOptions) -> Result<Self> {
        let chip = CdevChip::open(&options.chip_path)?;
        let handle = SensorHandle::configure(chip, trigger, echo)?;
        Self::new(handle, MonotonicClock::new(), options)
    }
}

impl<T: OutputPin, E: InputPin, C: MicrosClock> HcSr04<T, E, C> {
    pub fn new(handle: SensorHandle<T, E>, clock: C, options: SensorOptions) -> Result<Self> {
        let timer = PulseTimer::new(options.timeout_micros)?;
        let min_raw = options.min_distance.map(|d| d.to_raw());
        Ok(Self {
            handle,
            clock,
            timer,
            min_raw,
        })
    }

    pub fn handle(&self) -> &SensorHandle<T, E> {
        &self.handle
    }

    /// Raw echo width in microseconds.
    pub fn distance_raw(&mut self) -> Result<u32> {
        let micros = self.handle.measure_with(&mut self.timer, &mut self.clock)?;
        if let Some(min) = self.min_raw {
            if f64::from(micros) < min {
                log::debug!("dropping {}us reading below threshold", micros);
                return Err(HcSr04Error::BelowThreshold { micros });
            }
        }
        Ok(micros)
    }

    pub fn distance(&mut self, unit: Unit) -> Result<Distance> {
        let raw = self.distance_raw()?;
        Ok(Distance::from_raw(raw, unit))
    }

    pub fn distance_cm(&mut self) -> Result<f64> {
        Ok(self.distance(Unit::Cm)?.value())
    }

    pub fn distance_inch(&mut self) -> Result<f64> {
        Ok(self.distance(Unit::Inch)?.value())
    }

    pub fn into_handle(self) -> SensorHandle<T, E> {
        self.handle
    }
}
