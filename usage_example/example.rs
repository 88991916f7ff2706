use hcsr04_pulse::{Distance, HcSr04, SensorOptions, range_to_timeout};
use std::{thread::sleep, time::Duration};
const ECHO_PIN: u32 = 20; // GPIO20
const TRIG_PIN: u32 = 21; // GPIO21

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = SensorOptions {
        timeout_micros: range_to_timeout(Distance::Meter(4.0))?,
        ..SensorOptions::default()
    };
    let mut hcsr04 = HcSr04::open_with(TRIG_PIN, ECHO_PIN, options)?;

    loop {
        match hcsr04.distance_cm() {
            Ok(cm) => println!("Distance: {:05.2}cm", cm),
            Err(e) if e.is_timeout() => println!("Out of range"),
            Err(e) => return Err(e.into()),
        }
        sleep(Duration::from_secs_f32(0.2));
    }
}
