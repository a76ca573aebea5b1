//! Command parsing.
//!
//! Commands are `?`-prefixed words at the start of a message; anything after
//! the first space is the argument string.

use std::fmt;
use std::str::FromStr;

/// Prefix marking a message as a command.
pub const COMMAND_PREFIX: char = '?';

/// Commands the bot responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hello,
    GentlyPats,
    GoodBot,
    BadBot,
    AmIAdmin,
    NoManCanDefeatMe,
    Shutdown,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Hello,
        Command::GentlyPats,
        Command::GoodBot,
        Command::BadBot,
        Command::AmIAdmin,
        Command::NoManCanDefeatMe,
        Command::Shutdown,
    ];

    /// Command word without the prefix.
    pub fn name(self) -> &'static str {
        match self {
            Command::Hello => "hello",
            Command::GentlyPats => "gentlypats",
            Command::GoodBot => "goodbot",
            Command::BadBot => "badbot",
            Command::AmIAdmin => "amiadmin",
            Command::NoManCanDefeatMe => "nomancandefeatme",
            Command::Shutdown => "shutdown",
        }
    }

    /// Split a message into a command and its argument string.
    ///
    /// Returns `None` for plain text and for unknown commands.
    pub fn parse(content: &str) -> Option<(Command, &str)> {
        let rest = content.strip_prefix(COMMAND_PREFIX)?;
        let (word, args) = rest.split_once(' ').unwrap_or((rest, ""));
        let command = word.parse().ok()?;
        Some((command, args.trim()))
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.name() == s)
            .ok_or(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", COMMAND_PREFIX, self.name())
    }
}
