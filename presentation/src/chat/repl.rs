//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::{ConsoleFormatter, ProgressReporter};
use member_qa_application::{AnswerQuestionUseCase, AskError, AskProgressNotifier, NoProgress};
use member_qa_domain::{AskOutcome, OutputFormat};
use reedline::{
    DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const HISTORY_CAPACITY: usize = 1000;
/// Earlier questions kept for resolving "her", "his" and the like.
const CONVERSATION_WINDOW: usize = 4;

/// What to do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatInput<'a> {
    Skip,
    Quit,
    Help,
    Clear,
    Unknown(&'a str),
    Question(&'a str),
}

fn classify(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Skip;
    }
    if !line.starts_with('/') {
        return ChatInput::Question(line);
    }
    match line {
        "/quit" | "/exit" | "/q" => ChatInput::Quit,
        "/help" | "/h" | "/?" => ChatInput::Help,
        "/clear" | "/c" => ChatInput::Clear,
        other => ChatInput::Unknown(other),
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<AnswerQuestionUseCase>,
    format: OutputFormat,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(use_case: Arc<AnswerQuestionUseCase>) -> Self {
        Self {
            use_case,
            format: OutputFormat::Text,
            show_progress: true,
            history_file: dirs::data_dir().map(|p| p.join("member-qa").join("history.txt")),
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_file else {
            return editor;
        };
        if !history_dir_ready(path) {
            return editor;
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                tracing::warn!(error = %e, "Chat history unavailable");
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("member-qa".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        let mut conversation: VecDeque<String> = VecDeque::with_capacity(CONVERSATION_WINDOW);
        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(buffer) => match classify(&buffer) {
                    ChatInput::Skip => continue,
                    ChatInput::Quit => {
                        println!("Bye!");
                        break;
                    }
                    ChatInput::Help => Self::print_help(),
                    ChatInput::Clear => {
                        conversation.clear();
                        println!("Conversation cleared.");
                    }
                    ChatInput::Unknown(cmd) => {
                        println!("Unknown command: {}", cmd);
                        println!("Type /help for available commands");
                    }
                    ChatInput::Question(question) => {
                        let earlier: Vec<String> = conversation.iter().cloned().collect();
                        self.process_question(question, &earlier).await;
                        remember(&mut conversation, question);
                    }
                },
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          member-qa - Chat Mode              │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Ask anything about member messages.");
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /clear, /c       - Forget earlier questions");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }

    async fn process_question(&self, question: &str, earlier: &[String]) {
        println!();

        let result: Result<AskOutcome, AskError> = if self.show_progress {
            let progress = ProgressReporter::new();
            self.ask(question, earlier, &progress).await
        } else {
            self.ask(question, earlier, &NoProgress).await
        };

        match result {
            Ok(outcome) => println!("{}", ConsoleFormatter::render(&outcome, self.format)),
            Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e.to_string())),
        }
        println!();
    }

    async fn ask(
        &self,
        question: &str,
        earlier: &[String],
        progress: &dyn AskProgressNotifier,
    ) -> Result<AskOutcome, AskError> {
        self.use_case.execute_with_history(question, earlier, progress).await
    }
}

/// Create the history file's directory. False means history stays in memory.
fn history_dir_ready(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return true;
    };
    match std::fs::create_dir_all(parent) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                path = %parent.display(),
                error = %e,
                "Could not create history directory; history kept in memory"
            );
            false
        }
    }
}

/// Push a question into the conversation window, dropping the oldest.
fn remember(conversation: &mut VecDeque<String>, question: &str) {
    if conversation.len() == CONVERSATION_WINDOW {
        conversation.pop_front();
    }
    conversation.push_back(question.to_string());
}
