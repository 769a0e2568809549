/*!
 * Per-line outcomes of a scene assembly run.
 */

use std::fmt;
use std::time::Duration;

use crate::errors::SkipReason;
use crate::scene::parser::ScriptLine;

/// What happened to one script line
#[derive(Debug)]
pub enum LineOutcome {
    /// The line's audio is in the track
    Synthesized {
        /// Position of the clip from the start of the track
        offset: Duration,
        /// Length of the clip, excluding the trailing gap
        duration: Duration,
    },
    /// The line contributed no audio
    Skipped(SkipReason),
}

/// A script line together with its outcome
#[derive(Debug)]
pub struct LineReport {
    pub line: ScriptLine,
    pub outcome: LineOutcome,
}

/// Outcomes for every line of a run, in script order
#[derive(Debug, Default)]
pub struct AssemblyReport {
    entries: Vec<LineReport>,
}

impl AssemblyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: ScriptLine, outcome: LineOutcome) {
        self.entries.push(LineReport { line, outcome });
    }

    pub fn entries(&self) -> &[LineReport] {
        &self.entries
    }

    pub fn synthesized_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, LineOutcome::Synthesized { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.len() - self.synthesized_count()
    }

    /// Skipped lines with the reason for each
    pub fn skipped(&self) -> impl Iterator<Item = (&ScriptLine, &SkipReason)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            LineOutcome::Skipped(reason) => Some((&e.line, reason)),
            LineOutcome::Synthesized { .. } => None,
        })
    }
}

impl fmt::Display for AssemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} of {} lines synthesized, {} skipped",
            self.synthesized_count(),
            self.entries.len(),
            self.skipped_count()
        )?;
        for (index, entry) in self.entries.iter().enumerate() {
            if let LineOutcome::Skipped(reason) = &entry.outcome {
                writeln!(f, "  line {} ({}): {}", index + 1, entry.line.character, reason)?;
            }
        }
        Ok(())
    }
}
