//! One-second driver for a running timer.
//!
//! The engine never ticks itself. This loop calls [`FocusService::tick`]
//! once per second, polls the settings change token before every tick, and
//! stops when the interval completes, when the timer is paused from
//! elsewhere, or when `shutdown` resolves. On shutdown the timer is paused
//! and persisted.

use chrono::Utc;
use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::service::FocusService;
use crate::timer::{CompletedInterval, TickResult};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Why [`run`] returned.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(CompletedInterval),
    /// The timer was not running at a tick.
    Stopped,
    /// `shutdown` resolved; the timer was paused.
    Interrupted,
}

/// Drive the service until the current interval ends.
///
/// `on_tick` sees the service after every tick that counted a second.
pub async fn run<S, F>(service: &mut FocusService, shutdown: S, mut on_tick: F) -> Result<RunOutcome>
where
    S: Future<Output = ()>,
    F: FnMut(&FocusService),
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(TICK_PERIOD);
    // The first tick of an interval resolves immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();
                service.poll_settings(now)?;
                match service.tick(now)? {
                    TickResult::Idle => return Ok(RunOutcome::Stopped),
                    TickResult::Counting { .. } => on_tick(service),
                    TickResult::Completed(done) => return Ok(RunOutcome::Completed(done)),
                }
            }
            _ = &mut shutdown => {
                service.pause(Utc::now())?;
                tracing::info!(time_left = service.state().time_left, "timer paused on shutdown");
                return Ok(RunOutcome::Interrupted);
            }
        }
    }
}

/// Resolves on Ctrl-C. A failure to install the handler never resolves, so
/// the driver keeps running.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
