//! HC-SR04 ultrasonic ranging.
//!
//! A measurement pulls the trigger line high for 10us, then busy-waits on
//! the echo line and times how long it stays high against a monotonic
//! microsecond clock. The width converts to range at 58us/cm and
//! 148us/inch.
//!
//! Lines are configured up front into an owned [`SensorHandle`]. Any
//! `embedded-hal` pins work; [`CdevChip`] provides them on Linux through
//! the GPIO character device.
//!
//! ```no_run
//! use hcsr04_pulse::HcSr04;
//!
//! let mut sensor = HcSr04::open(21, 20)?;
//! println!("{:.2}cm", sensor.distance_cm()?);
//! # Ok::<(), hcsr04_pulse::HcSr04Error>(())
//! ```

pub mod cdev;
pub mod error;
pub mod hcsr04;
pub mod line;
pub mod pulse;
pub mod units;

pub use cdev::{CdevChip, CdevInput, CdevOutput, DEFAULT_CHIP_PATH};
pub use error::{HcSr04Error, Result};
pub use hcsr04::{HcSr04, SensorOptions};
pub use line::{LineConfigurator, LineId, SensorHandle};
pub use pulse::{
    DEFAULT_TIMEOUT_MICROS, MicrosClock, MonotonicClock, Phase, PulseTimer, TRIGGER_PULSE_MICROS,
    measure_pulse_width,
};
pub use units::{ECHO_RISE_MICROS, Distance, Unit, range_to_timeout, to_centimeters, to_inches};
