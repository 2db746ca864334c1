use chrono::Utc;
use clap::Subcommand;
use focusflow_core::driver::{self, RunOutcome};
use focusflow_core::{Config, TickResult};
use std::io::Write;

use super::open_service;
use crate::output::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start if paused, pause if running
    Toggle,
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Restart the current interval from its full length
    Reset,
    /// Count down a number of seconds at once
    Tick {
        #[arg(default_value = "1")]
        seconds: u64,
    },
    /// Start and run the countdown in the foreground until the interval ends
    Run {
        /// Keep going into the next interval instead of stopping
        #[arg(long)]
        continuous: bool,
    },
    /// Attach a task to the timer
    Select {
        /// Task ID
        task_id: String,
    },
    /// Detach the current task
    Clear,
}

pub fn run(action: TimerAction, config: &Config) -> CmdResult {
    let mut service = open_service(config)?;
    let now = Utc::now();

    match action {
        TimerAction::Status => print_json(&service.snapshot(now))?,
        TimerAction::Toggle => print_json(&service.toggle(now)?)?,
        TimerAction::Start => match service.start(now)? {
            Some(event) => print_json(&event)?,
            None => print_json(&service.snapshot(now))?,
        },
        TimerAction::Pause => match service.pause(now)? {
            Some(event) => print_json(&event)?,
            None => print_json(&service.snapshot(now))?,
        },
        TimerAction::Reset => print_json(&service.reset(now)?)?,
        TimerAction::Tick { seconds } => {
            for _ in 0..seconds {
                match service.tick(now)? {
                    TickResult::Idle => break,
                    TickResult::Counting { .. } => {}
                    TickResult::Completed(done) => {
                        print_json(&done)?;
                        break;
                    }
                }
            }
            print_json(&service.snapshot(now))?;
        }
        TimerAction::Run { continuous } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            loop {
                service.start(Utc::now())?;
                let outcome = runtime.block_on(driver::run(&mut service, driver::ctrl_c(), |svc| {
                    let mut err = std::io::stderr().lock();
                    let _ = write!(err, "\r{} {}  ", svc.state().mode.title(), svc.state().clock());
                    let _ = err.flush();
                }))?;
                eprintln!();
                match outcome {
                    RunOutcome::Completed(done) => {
                        print_json(&done)?;
                        if !continuous {
                            break;
                        }
                    }
                    RunOutcome::Stopped | RunOutcome::Interrupted => {
                        print_json(&service.snapshot(Utc::now()))?;
                        break;
                    }
                }
            }
        }
        TimerAction::Select { task_id } => print_json(&service.select_task(&task_id, now)?)?,
        TimerAction::Clear => print_json(&service.clear_task(now)?)?,
    }
    Ok(())
}
