//! `pattern` subcommand — run one of the fixed status patterns.

use std::path::Path;

use super::{BlinkPattern, LineArgs, Result};

pub(super) fn cmd_pattern(
    line: &LineArgs,
    custom_path: Option<&Path>,
    pattern: BlinkPattern,
) -> Result<()> {
    let config = super::resolve_config(line, custom_path)?;
    let mut led = super::open_led(&config)?;

    let steps = pattern.steps();
    log::debug!(
        "[pattern] {pattern}: {} x ({:?} on, {:?} off)",
        steps.repetitions,
        steps.on_time,
        steps.off_time
    );
    led.run_pattern(pattern)?;
    led.clean()?;
    println!("Pattern {pattern} done ({} ms)", steps.total().as_millis());
    Ok(())
}
