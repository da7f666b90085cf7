//! In-place status rendering for the terminal.
//!
//! During the launch phase every task gets one line appended. While waiting
//! for tasks to stop, the whole block is redrawn in place: move the cursor up
//! by the number of lines, then rewrite each one. Every line is written with
//! a clear-to-end-of-line so a shorter status never leaves stale characters
//! behind.

use crate::rpc::wire::Task;
use anyhow::Result;
use std::io::{self, Write};

pub const CLEAR_TO_EOL: &str = "\x1b[K";

/// Formats one task as `<arn>: <lastStatus> => <desiredStatus>`.
pub fn status_line(task: &Task) -> String {
    format!(
        "{}: {} => {}",
        task.task_arn, task.last_status, task.desired_status
    )
}

/// Sink for the per-task status block. The driver talks to this trait so
/// tests can capture frames instead of scraping a real terminal.
pub trait StatusRenderer {
    /// Appends one line below the block.
    fn push_line(&mut self, line: &str) -> Result<()>;

    /// Rewrites the whole block in place.
    fn redraw(&mut self, lines: &[String]) -> Result<()>;
}

/// Renderer that drives a real ANSI terminal (or any byte sink in tests).
pub struct AnsiRenderer<W: Write> {
    out: W,
}

impl AnsiRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusRenderer for AnsiRenderer<W> {
    fn push_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}{CLEAR_TO_EOL}")?;
        self.out.flush()?;
        Ok(())
    }

    fn redraw(&mut self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        write!(self.out, "\x1b[{}A", lines.len())?;
        for line in lines {
            writeln!(self.out, "{line}{CLEAR_TO_EOL}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}
