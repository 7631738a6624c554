//! Poll the window until targets appear.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::automation::detection::{MatchOptions, Target, VisualMatcher};
use crate::errors::{NavigatorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitMode {
    /// Succeed as soon as one target matches.
    #[default]
    Any,
    /// Succeed only when every target matches on the same capture.
    All,
}

/// Shared stop signal for a running wait.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub mode: WaitMode,
    pub timeout: Duration,
    /// Pause between sweeps.
    pub spacing: Duration,
    pub threshold: f32,
    pub matching: MatchOptions,
    pub cancel: Option<CancelFlag>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            mode: WaitMode::Any,
            timeout: Duration::from_secs(60),
            spacing: Duration::from_secs(1),
            threshold: 0.8,
            matching: MatchOptions::default(),
            cancel: None,
        }
    }
}

/// Sweep until the targets are satisfied per `options.mode`, the timeout
/// elapses, or the wait is cancelled.
///
/// Every sweep takes one fresh capture and scores all targets on it. The
/// elapsed time is checked before each sweep, so a sweep that starts
/// inside the timeout always completes. Capture and matcher errors end the
/// wait immediately. An empty target list never succeeds.
pub fn wait_for<F>(mut capture: F, matcher: &VisualMatcher, targets: &[Target], options: &WaitOptions) -> Result<()>
where
    F: FnMut() -> Result<DynamicImage>,
{
    log::info!(
        "waiting for {} targets ({:?}, timeout {:?}, spacing {:?})",
        targets.len(),
        options.mode,
        options.timeout,
        options.spacing
    );
    let start = Instant::now();
    let mut sweeps = 0u32;

    while start.elapsed() <= options.timeout {
        if options.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            log::info!("wait cancelled after {} sweeps", sweeps);
            return Err(NavigatorError::Cancelled);
        }
        sweeps += 1;

        let frame = capture()?;
        let mut satisfied = 0;
        for target in targets {
            let candidate = matcher.match_image(&frame, target, &options.matching)?;
            if candidate.score >= options.threshold {
                satisfied += 1;
                if options.mode == WaitMode::Any {
                    log::info!("{} appeared after {} sweeps", target.label, sweeps);
                    return Ok(());
                }
            }
        }
        if options.mode == WaitMode::All && !targets.is_empty() && satisfied == targets.len() {
            log::info!("all targets present after {} sweeps", sweeps);
            return Ok(());
        }

        thread::sleep(options.spacing);
    }

    log::error!(
        "wait timeout: timeout={:?}, spacing={:?}, sweeps={}",
        options.timeout,
        options.spacing,
        sweeps
    );
    Err(NavigatorError::Timeout { timeout: options.timeout, spacing: options.spacing })
}
