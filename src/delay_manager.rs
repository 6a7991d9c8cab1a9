use std::time::Duration;
use std::thread;
use log::debug;

/// Politeness pause taken on the aggregating thread after a row is accepted.
pub fn match_delay(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    debug!("Waiting for {:.2} seconds (match delay)...", delay.as_secs_f64());
    thread::sleep(delay);
}
