//! `blink` subcommand — timed blink sequence, blocking or polled.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use gpioled_lib::led::half_period;

use super::{BlinkOutput, LineArgs, RUNNING, Result};

pub(super) fn cmd_blink(
    line: &LineArgs,
    custom_path: Option<&Path>,
    duration_ms: u64,
    cycles: u32,
    blocking: bool,
    json: bool,
) -> Result<()> {
    let config = super::resolve_config(line, custom_path)?;
    let mut led = super::open_led(&config)?;
    let half = half_period(duration_ms, cycles);

    if !json {
        match half {
            Some(h) => println!(
                "Blinking {} : {cycles} cycles in {duration_ms} ms (half-period {h:?})",
                led.address()
            ),
            None => println!("Nothing to blink; LED off"),
        }
    }

    let completed = if blocking {
        led.blink(duration_ms, cycles, true)?;
        true
    } else {
        led.blink(duration_ms, cycles, false)?;
        let poll = Duration::from_millis(config.poll_interval_ms);
        while led.is_blinking() && RUNNING.load(Ordering::SeqCst) {
            led.blink_update()?;
            std::thread::sleep(poll);
        }
        if led.is_blinking() {
            let seq = led.sequence();
            log::debug!(
                "[blink] interrupted after {} of {} toggles",
                seq.toggle_count(),
                2 * u64::from(seq.cycles())
            );
            led.blink(0, 0, false)?;
            false
        } else {
            true
        }
    };

    let output = BlinkOutput {
        address: led.address().to_string(),
        polarity: led.polarity().to_string(),
        duration_ms,
        cycles,
        half_period_ms: half.map(|h| h.as_secs_f64() * 1000.0),
        blocking,
        completed,
    };
    led.clean()?;

    if json {
        let text = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        println!("{text}");
    } else if completed {
        println!("Done");
    } else {
        println!("Interrupted; LED off");
    }
    Ok(())
}
