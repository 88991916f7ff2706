//! Linux GPIO character device backend (`/dev/gpiochipN`).

use std::path::Path;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};
use gpio_cdev::{Chip, LineHandle, LineRequestFlags};

use crate::error::{HcSr04Error, Result};
use crate::line::{LineConfigurator, LineId};

/// Header GPIOs on the Raspberry Pi 5 (RP1).
pub const DEFAULT_CHIP_PATH: &str = "/dev/gpiochip4";

const TRIGGER_CONSUMER: &str = "hc-sr04-trigger";
const ECHO_CONSUMER: &str = "hc-sr04-echo";

#[derive(Debug)]
pub struct CdevPinError(pub gpio_cdev::Error);

impl digital::Error for CdevPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct CdevChip {
    chip: Chip,
}

impl CdevChip {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let chip = Chip::new(path).map_err(|e| {
            HcSr04Error::invalid(format!("cannot open {}: {}", path.display(), e))
        })?;
        Ok(Self { chip })
    }

    pub fn num_lines(&self) -> u32 {
        self.chip.num_lines()
    }

    fn request(&mut self, line: LineId, flags: LineRequestFlags, consumer: &str) -> Result<LineHandle> {
        if line >= self.chip.num_lines() {
            return Err(HcSr04Error::invalid(format!(
                "line {} out of range, {} has {} lines",
                line,
                self.chip.path().display(),
                self.chip.num_lines()
            )));
        }
        let handle = self
            .chip
            .get_line(line)
            .and_then(|l| l.request(flags, 0, consumer))
            .map_err(|e| HcSr04Error::invalid(format!("cannot request line {line}: {e}")))?;
        Ok(handle)
    }
}

impl LineConfigurator for CdevChip {
    type Output = CdevOutput;
    type Input = CdevInput;

    fn configure_output(&mut self, line: LineId) -> Result<CdevOutput> {
        let handle = self.request(line, LineRequestFlags::OUTPUT, TRIGGER_CONSUMER)?;
        Ok(CdevOutput(handle))
    }

    fn configure_input(&mut self, line: LineId) -> Result<CdevInput> {
        let handle = self.request(line, LineRequestFlags::INPUT, ECHO_CONSUMER)?;
        Ok(CdevInput(handle))
    }
}

pub struct CdevOutput(LineHandle);

impl ErrorType for CdevOutput {
    type Error = CdevPinError;
}

impl OutputPin for CdevOutput {
    fn set_low(&mut self) -> core::result::Result<(), CdevPinError> {
        self.0.set_value(0).map_err(CdevPinError)
    }

    fn set_high(&mut self) -> core::result::Result<(), CdevPinError> {
        self.0.set_value(1).map_err(CdevPinError)
    }
}

pub struct CdevInput(LineHandle);

impl ErrorType for CdevInput {
    type Error = CdevPinError;
}

impl InputPin for CdevInput {
    fn is_high(&mut self) -> core::result::Result<bool, CdevPinError> {
        self.0.get_value().map(|v| v != 0).map_err(CdevPinError)
    }

    fn is_low(&mut self) -> core::result::Result<bool, CdevPinError> {
        self.is_high().map(|high| !high)
    }
}
