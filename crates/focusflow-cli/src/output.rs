//! Terminal output: JSON on stdout, notifications and the bell on stderr.

use focusflow_core::{CuePlayer, Notification, Notifier, SoundCue};
use serde::Serialize;
use std::error::Error;
use std::io::Write;

pub type CmdResult = Result<(), Box<dyn Error>>;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes notifications to stderr so stdout stays machine readable.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut err = std::io::stderr().lock();
        writeln!(err, "{}", notification.title)?;
        writeln!(err, "  {}", notification.body)?;
        Ok(())
    }
}

/// Rings the terminal bell; twice for the end of a long break.
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&self, cue: SoundCue) -> Result<(), Box<dyn Error + Send + Sync>> {
        let rings = match cue {
            SoundCue::LongBreakComplete => "\x07\x07",
            SoundCue::FocusComplete | SoundCue::BreakComplete => "\x07",
        };
        let mut err = std::io::stderr().lock();
        err.write_all(rings.as_bytes())?;
        err.flush()?;
        Ok(())
    }
}
