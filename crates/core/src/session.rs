//! Line-oriented chat session on top of an [`Orchestrator`].
//!
//! One orchestrator call per submitted line, strictly sequential. A failed
//! call is reported and the loop keeps going.

use crate::agent::Orchestrator;
use crate::error::SessionError;
use geoagent_llm::chat::ChatMessage;
use log::{debug, warn};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use strum::{Display, EnumString};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Inputs that end the session, compared case-insensitively after trimming.
pub const EXIT_KEYWORDS: [&str; 3] = ["exit", "quit", "q"];

pub const DEFAULT_PROMPT: &str = "You: ";

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_KEYWORDS
        .iter()
        .any(|keyword| input.eq_ignore_ascii_case(keyword))
}

/// What each orchestrator call gets to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum HistoryMode {
    /// Only the newest user message.
    #[default]
    SingleTurn,
    /// The whole conversation so far plus the newest user message.
    MultiTurn,
}

/// Messages exchanged so far. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(messages);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// An exit keyword was entered.
    Exit,
    /// Input was closed.
    EndOfInput,
    /// The interrupt future resolved.
    Interrupted,
}

pub struct Session {
    orchestrator: Arc<dyn Orchestrator>,
    history_mode: HistoryMode,
    conversation: Conversation,
    prompt: String,
}

impl Session {
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            orchestrator,
            history_mode: HistoryMode::default(),
            conversation: Conversation::new(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_history_mode(mut self, mode: HistoryMode) -> Self {
        self.history_mode = mode;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn history_mode(&self) -> HistoryMode {
        self.history_mode
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Runs until an exit keyword, end of input, or `interrupt` resolves.
    ///
    /// An interrupt that fires while a turn is in flight abandons that turn.
    pub async fn run<R, W, I>(
        &mut self,
        input: R,
        output: &mut W,
        interrupt: I,
    ) -> Result<SessionOutcome, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        I: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let mut lines = input.lines();

        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;

            let line = tokio::select! {
                _ = &mut interrupt => {
                    writeln!(output)?;
                    return Ok(SessionOutcome::Interrupted);
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                writeln!(output)?;
                return Ok(SessionOutcome::EndOfInput);
            };

            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if is_exit_command(text) {
                writeln!(output, "Goodbye!")?;
                return Ok(SessionOutcome::Exit);
            }

            let user_message = ChatMessage::user().content(text).build();
            let request = self.request_for(user_message.clone());
            let sent = request.len();
            debug!("Submitting turn with {sent} messages");

            let result = tokio::select! {
                _ = &mut interrupt => {
                    writeln!(output)?;
                    return Ok(SessionOutcome::Interrupted);
                }
                result = self.orchestrator.invoke(request) => result,
            };

            match result {
                Ok(run) => {
                    writeln!(output, "{}", run.final_text())?;
                    self.record(user_message, run.into_messages(), sent);
                }
                Err(e) => {
                    warn!("Turn failed: {e}");
                    writeln!(output, "Error: {e}")?;
                }
            }
        }
    }

    fn request_for(&self, user_message: ChatMessage) -> Vec<ChatMessage> {
        match self.history_mode {
            HistoryMode::SingleTurn => vec![user_message],
            HistoryMode::MultiTurn => {
                let mut messages = self.conversation.messages().to_vec();
                messages.push(user_message);
                messages
            }
        }
    }

    /// Appends a completed turn: the user message and whatever the
    /// orchestrator generated after the `sent` messages it was given.
    fn record(&mut self, user_message: ChatMessage, returned: Vec<ChatMessage>, sent: usize) {
        self.conversation.push(user_message);
        self.conversation.extend(returned.into_iter().skip(sent));
    }
}
