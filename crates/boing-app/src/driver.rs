//! Fixed-cadence tick driver.

use anyhow::Result;
use boing_core::{Stage, StageTick};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// How and for how long a performance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Time between ticks; `None` steps back to back.
    pub interval: Option<Duration>,
    /// Stop after this many ticks; `None` runs until the process is stopped.
    pub max_ticks: Option<u64>,
}

impl RunOptions {
    /// Interval derived from the stage tempo, in milliseconds.
    #[must_use]
    pub fn paced(interval_ms: f64, max_ticks: Option<u64>) -> Self {
        Self {
            interval: Some(Duration::from_secs_f64(interval_ms.max(0.0) / 1_000.0)),
            max_ticks,
        }
    }

    #[must_use]
    pub const fn unpaced(max_ticks: Option<u64>) -> Self {
        Self {
            interval: None,
            max_ticks,
        }
    }
}

/// Step `stage` until `options.max_ticks` is reached, calling `on_tick` after
/// every step. Returns the number of ticks performed.
pub fn run<F>(stage: &mut Stage, options: RunOptions, mut on_tick: F) -> Result<u64>
where
    F: FnMut(&Stage, &StageTick) -> Result<()>,
{
    let mut performed = 0u64;
    let mut deadline = Instant::now();
    while options.max_ticks.is_none_or(|max| performed < max) {
        if let Some(interval) = options.interval {
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
            // Keep the cadence fixed even when a tick runs late.
            deadline = deadline.max(now) + interval;
        }
        let result = stage.step()?;
        debug!(tick = result.tick.0, batches = result.batches.len(), "tick");
        on_tick(stage, &result)?;
        performed += 1;
    }
    Ok(performed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boing_core::StageConfig;

    #[test]
    fn runs_requested_number_of_ticks() {
        let mut stage = Stage::new(StageConfig::default()).expect("stage");
        let mut seen = Vec::new();
        let performed = run(&mut stage, RunOptions::unpaced(Some(12)), |_, tick| {
            seen.push(tick.tick.0);
            Ok(())
        })
        .expect("run");
        assert_eq!(performed, 12);
        assert_eq!(seen, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn paced_run_waits_between_ticks() {
        let mut stage = Stage::new(StageConfig::default()).expect("stage");
        let start = Instant::now();
        run(&mut stage, RunOptions::paced(10.0, Some(4)), |_, _| Ok(())).expect("run");
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn hook_errors_stop_the_run() {
        let mut stage = Stage::new(StageConfig::default()).expect("stage");
        let result = run(&mut stage, RunOptions::unpaced(None), |_, tick| {
            anyhow::ensure!(tick.tick.0 < 3, "stop");
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(stage.tick().0, 3);
    }
}
