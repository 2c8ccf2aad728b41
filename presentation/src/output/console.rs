//! Console output formatter for answers

use colored::Colorize;
use member_qa_application::SyncReport;
use member_qa_domain::{AskOutcome, Message, OutputFormat};

/// Formats answers and sync reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn off ANSI colors for everything rendered afterwards.
    pub fn disable_color() {
        colored::control::set_override(false);
    }

    /// Render an outcome in the requested format.
    pub fn render(outcome: &AskOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => Self::format_text(outcome),
            OutputFormat::Json => Self::format_json(outcome),
        }
    }

    /// Answer text, then the supporting message if there is one.
    pub fn format_text(outcome: &AskOutcome) -> String {
        let mut output = String::new();

        match &outcome.message {
            Some(message) => {
                output.push_str(&format!("{} {}\n", "A:".green().bold(), outcome.answer));
                output.push_str(&Self::source_line(message));
            }
            None => {
                output.push_str(&format!("{} {}\n", "A:".yellow().bold(), outcome.answer));
            }
        }

        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &AskOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_sync_report(report: &SyncReport) -> String {
        let mut output = format!(
            "{} {} page(s), {} message(s) received\n",
            "Synced".green().bold(),
            report.pages_fetched,
            report.messages_received
        );
        if report.pages_failed > 0 {
            output.push_str(&format!(
                "{} {} page(s) failed\n",
                "Warning:".yellow().bold(),
                report.pages_failed
            ));
        }
        let total = report
            .remote_total
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        output.push_str(&format!(
            "{} {} cached, cursor {} of {}\n",
            "Cache:".cyan().bold(),
            report.cached_total,
            report.cursor,
            total
        ));
        output
    }

    pub fn format_error(error: &str) -> String {
        format!("{} {}", "Error:".red().bold(), error)
    }

    fn source_line(message: &Message) -> String {
        let author = if message.has_author() {
            message.author.as_str()
        } else {
            "unknown"
        };
        let when = message
            .timestamp_utc()
            .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| message.timestamp.clone());

        let mut line = format!("   {} {}", "-".dimmed(), author.bold());
        if !when.is_empty() {
            line.push_str(&format!(", {}", when.dimmed()));
        }
        line.push_str(&format!(" {}\n", format!("[{}]", message.id).dimmed()));
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use member_qa_domain::{FALLBACK_ANSWER, MessageId, PageCursor};

    fn outcome() -> AskOutcome {
        AskOutcome {
            answer: "Claridge's in London".to_string(),
            message: Some(Message::new(
                MessageId::try_new("b2").unwrap(),
                "Layla Kawaguchi",
                "2025-08-29T09:12:00+00:00",
                "Book Claridge's in London.",
            )),
        }
    }

    #[test]
    fn test_text_includes_source() {
        let text = ConsoleFormatter::render(&outcome(), OutputFormat::Text);
        assert!(text.contains("Claridge's in London"));
        assert!(text.contains("Layla Kawaguchi"));
        assert!(text.contains("2025-08-29 09:12 UTC"));
        assert!(text.contains("b2"));
    }

    #[test]
    fn test_text_fallback_has_no_source() {
        let text = ConsoleFormatter::render(&AskOutcome::not_found(), OutputFormat::Text);
        assert!(text.contains(FALLBACK_ANSWER));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_json_payload() {
        let json = ConsoleFormatter::render(&outcome(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["answer"], "Claridge's in London");
        assert_eq!(value["message"]["user_name"], "Layla Kawaguchi");
        assert_eq!(value["message"]["message"], "Book Claridge's in London.");
    }

    #[test]
    fn test_sync_report() {
        let report = SyncReport {
            pages_fetched: 3,
            pages_failed: 1,
            messages_received: 300,
            cached_total: 300,
            cursor: PageCursor::new(300),
            remote_total: Some(3349),
        };
        let text = ConsoleFormatter::format_sync_report(&report);
        assert!(text.contains("3 page(s), 300 message(s)"));
        assert!(text.contains("1 page(s) failed"));
        assert!(text.contains("cursor 300 of 3349"));
    }
}
