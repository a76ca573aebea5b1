//! Chat bot client.
//!
//! The bot is built from resolved [`Settings`] and talks to the chat platform
//! through a [`ChatProvider`]. Dispatch is a fixed table from [`Command`] to a
//! canned or lightly templated reply.

pub mod commands;
pub mod console;

pub use commands::{COMMAND_PREFIX, Command};
pub use console::ConsoleChat;

use crate::config::Settings;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// A message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Display name of the sender
    pub author: String,
    /// Whether the sender may run administrative commands
    pub is_admin: bool,
    pub content: String,
}

impl IncomingMessage {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            is_admin: false,
            content: content.into(),
        }
    }

    pub fn from_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

/// Abstract interface for a chat platform connection.
#[async_trait]
pub trait ChatProvider: Send {
    /// Authenticate with `token`; returns the bot's display name.
    async fn login(&mut self, token: &str) -> Result<String>;

    /// Wait for the next message. `None` means the connection closed.
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>>;

    /// Send a message to the channel the last message came from.
    async fn send_message(&mut self, content: &str) -> Result<()>;
}

/// Outcome of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Send this text and keep running
    Message(String),
    /// Send this text and stop the bot
    Shutdown(String),
}

const GOOD_BOT_RESPONSES: [&str; 6] = [
    "You're the best",
    "You always were my favourite",
    "You know how to make a bot blush",
    "This is the best day ever!",
    "I do what I can",
    "You are so kind!",
];

const BAD_BOT_RESPONSES: [&str; 5] = [
    "I am having a bad day",
    "I did not mean to upset you",
    "this is *not* like me…",
    "I will try harder",
    "I am not myself today",
];

/// Command dispatcher bound to one set of resolved settings.
#[derive(Debug)]
pub struct Bot {
    token: String,
    /// Rotates through the canned praise/apology responses
    turn: usize,
}

impl Bot {
    pub fn new(settings: &Settings) -> Self {
        Self {
            token: settings.token.clone(),
            turn: 0,
        }
    }

    /// Reply for `message`, or `None` when it is not a known command.
    pub fn handle(&mut self, message: &IncomingMessage) -> Option<Reply> {
        let (command, _args) = Command::parse(&message.content)?;
        info!(
            author = %message.author,
            command = %command,
            content = %message.content,
            "Received command"
        );

        let author = &message.author;
        let reply = match command {
            Command::Hello => Reply::Message(format!("Hello to you too, {author}!")),
            Command::GentlyPats => Reply::Message("*purrs*".to_string()),
            Command::GoodBot => {
                let response = self.next_response(&GOOD_BOT_RESPONSES);
                Reply::Message(format!("Thanks {author}! {response}"))
            }
            Command::BadBot => {
                let response = self.next_response(&BAD_BOT_RESPONSES);
                Reply::Message(format!("Sorry {author}, {response}"))
            }
            Command::AmIAdmin => {
                if message.is_admin {
                    Reply::Message(format!("Indeed {author}, you *are* an admin"))
                } else {
                    Reply::Message(format!("Sorry {author}, you *are not* an admin"))
                }
            }
            Command::NoManCanDefeatMe => Reply::Message("I am no man.".to_string()),
            Command::Shutdown => {
                if message.is_admin {
                    Reply::Shutdown("Goodbye".to_string())
                } else {
                    warn!(author = %author, "Refused shutdown from non-admin");
                    Reply::Message(format!("Sorry {author}, I cannot let you do that."))
                }
            }
        };
        Some(reply)
    }

    fn next_response(&mut self, responses: &[&'static str]) -> &'static str {
        let response = responses[self.turn % responses.len()];
        self.turn = self.turn.wrapping_add(1);
        response
    }

    /// Log in and dispatch messages until shutdown or the connection closes.
    pub async fn run<C: ChatProvider>(&mut self, chat: &mut C) -> Result<()> {
        let name = chat.login(&self.token).await?;
        info!(user = %name, "Logged in");

        while let Some(message) = chat.next_message().await? {
            match self.handle(&message) {
                Some(Reply::Message(text)) => {
                    info!(content = %text, "Sending message");
                    chat.send_message(&text).await?;
                }
                Some(Reply::Shutdown(text)) => {
                    info!(author = %message.author, "Shutting down on request");
                    chat.send_message(&text).await?;
                    break;
                }
                None => {}
            }
        }

        info!("Bot stopped");
        Ok(())
    }
}
