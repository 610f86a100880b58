//! `on` subcommand — light the LED until Ctrl+C or a hold timeout.

use std::path::Path;
use std::time::Duration;

use super::{LineArgs, Result};

pub(super) fn cmd_on(
    line: &LineArgs,
    custom_path: Option<&Path>,
    hold_ms: Option<u64>,
) -> Result<()> {
    let config = super::resolve_config(line, custom_path)?;
    let mut led = super::open_led(&config)?;

    led.turn_on()?;
    match hold_ms {
        Some(ms) => println!("LED on ({}) for {ms} ms", led.address()),
        None => println!("LED on ({}). Press Ctrl+C to turn off.", led.address()),
    }

    let completed = super::wait_while_running(hold_ms.map(Duration::from_millis));
    if !completed {
        log::debug!("[on] interrupted");
    }

    led.turn_off()?;
    led.clean()?;
    println!("LED off");
    Ok(())
}
