//! Progress reporting for question answering

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use member_qa_application::{AskProgressNotifier, PageOrigin};
use member_qa_domain::ResolvedMembers;
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a single spinner line
pub struct ProgressReporter {
    spinner: ProgressBar,
    candidates_validated: Mutex<usize>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.set_prefix("Searching");
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self {
            spinner,
            candidates_validated: Mutex::new(0),
        }
    }

    /// Spinner for `sync`.
    pub fn syncing() -> Self {
        let reporter = Self::new();
        reporter.spinner.set_prefix("Syncing");
        reporter
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn members_label(members: &ResolvedMembers) -> String {
        if members.is_empty() {
            "any member".to_string()
        } else {
            members.names().join(", ")
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl AskProgressNotifier for ProgressReporter {
    fn on_page(&self, index: usize, origin: PageOrigin, messages: usize) {
        self.spinner.set_message(format!(
            "page {} ({}, {} messages)",
            index + 1,
            origin.as_str(),
            messages
        ));
    }

    fn on_page_failed(&self, index: usize, error: &str) {
        self.spinner
            .println(format!("  {} page {}: {}", "x".red(), index + 1, error));
    }

    fn on_members_resolved(&self, members: &ResolvedMembers, via_oracle: bool) {
        let how = if via_oracle { "model" } else { "heuristic" };
        self.spinner.set_message(format!(
            "looking at {} ({})",
            Self::members_label(members),
            how
        ));
    }

    fn on_validation_start(&self, page: usize, batch_size: usize) {
        let mut validated = self
            .candidates_validated
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *validated += batch_size;
        self.spinner.set_message(format!(
            "page {}: checking {} candidate(s), {} so far",
            page + 1,
            batch_size,
            *validated
        ));
    }

    fn on_answer_candidate(&self, confidence: f64, is_best: bool) {
        if is_best {
            self.spinner.set_message(format!(
                "answer found (confidence {:.0}%)",
                confidence * 100.0
            ));
        }
    }

    fn on_complete(&self, found: bool) {
        if found {
            self.spinner.finish_and_clear();
        } else {
            self.spinner
                .finish_with_message(format!("{}", "no matching message".dimmed()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl AskProgressNotifier for SimpleProgress {
    fn on_page(&self, index: usize, origin: PageOrigin, messages: usize) {
        eprintln!(
            "{} page {} ({}, {} messages)",
            "->".cyan(),
            index + 1,
            origin.as_str(),
            messages
        );
    }

    fn on_page_failed(&self, index: usize, error: &str) {
        eprintln!("  {} page {} failed: {}", "x".red(), index + 1, error);
    }

    fn on_members_resolved(&self, members: &ResolvedMembers, _via_oracle: bool) {
        eprintln!(
            "  {} members: {}",
            "v".green(),
            ProgressReporter::members_label(members)
        );
    }

    fn on_answer_candidate(&self, confidence: f64, is_best: bool) {
        if is_best {
            eprintln!(
                "  {} answer (confidence {:.0}%)",
                "v".green(),
                confidence * 100.0
            );
        }
    }
}
