//! Conversions from raw echo width (microseconds) to lengths.
//!
//! The divisors come from the speed of sound (~343 m/s) and the round trip
//! of the burst: one centimeter of range costs about 58us of echo.

use crate::error::{HcSr04Error, Result};

/// Echo microseconds per centimeter of range.
pub const MICROS_PER_CM: f64 = 58.0;
/// Echo microseconds per inch of range.
pub const MICROS_PER_INCH: f64 = 148.0;

/// Allowance for the delay between the trigger falling and the echo rising.
/// The 40kHz burst and the module's setup take ~460us on a stock HC-SR04.
pub const ECHO_RISE_MICROS: u32 = 1_000;

pub fn to_centimeters(raw: f64) -> f64 {
    raw / MICROS_PER_CM
}

pub fn to_inches(raw: f64) -> f64 {
    raw / MICROS_PER_INCH
}

pub fn to_millimeters(raw: f64) -> f64 {
    raw / (MICROS_PER_CM / 10.0)
}

pub fn to_meters(raw: f64) -> f64 {
    raw / (MICROS_PER_CM * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Mm,
    Cm,
    Meter,
    Inch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Mm(f64),
    Cm(f64),
    Meter(f64),
    Inch(f64),
}

impl Distance {
    pub fn from_raw(raw: u32, unit: Unit) -> Self {
        let raw = f64::from(raw);
        match unit {
            Unit::Mm => Distance::Mm(to_millimeters(raw)),
            Unit::Cm => Distance::Cm(to_centimeters(raw)),
            Unit::Meter => Distance::Meter(to_meters(raw)),
            Unit::Inch => Distance::Inch(to_inches(raw)),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Distance::Mm(val) => *val,
            Distance::Cm(val) => *val,
            Distance::Meter(val) => *val,
            Distance::Inch(val) => *val,
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            Distance::Mm(_) => Unit::Mm,
            Distance::Cm(_) => Unit::Cm,
            Distance::Meter(_) => Unit::Meter,
            Distance::Inch(_) => Unit::Inch,
        }
    }

    /// Echo width in microseconds a target at this distance would produce.
    pub fn to_raw(&self) -> f64 {
        match self {
            Distance::Mm(val) => val * MICROS_PER_CM / 10.0,
            Distance::Cm(val) => val * MICROS_PER_CM,
            Distance::Meter(val) => val * MICROS_PER_CM * 100.0,
            Distance::Inch(val) => val * MICROS_PER_INCH,
        }
    }
}

/// Echo timeout that still covers a target at `range`: the round trip plus
/// [`ECHO_RISE_MICROS`], since the deadline starts when the trigger falls.
/// YMMV near the sensor's rated 4m limit.
pub fn range_to_timeout(range: Distance) -> Result<u32> {
    let round_trip = range.to_raw();
    if !round_trip.is_finite() || round_trip <= 0.0 {
        return Err(HcSr04Error::invalid(format!("range must be positive, got {range:?}")));
    }
    let micros = round_trip.ceil() + f64::from(ECHO_RISE_MICROS);
    if micros > f64::from(u32::MAX) {
        return Err(HcSr04Error::invalid(format!("range {range:?} overflows the timeout")));
    }
    Ok(micros as u32)
}
