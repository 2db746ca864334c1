mod engine;
mod settings;
mod state;

pub use engine::{CompletedInterval, TickResult, TimerEngine};
pub use settings::TimerSettings;
pub use state::{next_mode, TimerMode, TimerState};
