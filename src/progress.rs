//! Progress bar display for the resolving stage

use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::domain::ArtifactCoordinate;
use crate::resolver::ResolveProgress;

/// Progress display for artifact downloads
///
/// Levels of the traversal extend the bar as they are discovered. Hidden when
/// stderr is not a terminal.
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(0);
        bar.set_style(style);
        if !Term::stderr().is_term() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { bar }
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Abandon on error, leaving the last state visible
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveProgress for ProgressDisplay {
    fn level_started(&self, depth: usize, count: usize) {
        self.bar.inc_length(count as u64);
        self.bar.set_message(format!("level {depth}"));
    }

    fn artifact_resolved(&self, coordinate: &ArtifactCoordinate) {
        let name = coordinate.to_string();
        // Truncate long coordinates for display
        let display = match name.char_indices().rev().nth(46) {
            Some((start, _)) if name.chars().count() > 50 => format!("...{}", &name[start..]),
            _ => name,
        };
        self.bar.set_message(display);
        self.bar.inc(1);
    }
}
