//! Local console chat provider.
//!
//! Reads one message per line from stdin and writes replies to stdout. The
//! local operator is treated as an admin.

use super::{ChatProvider, IncomingMessage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

/// Chat provider over any line-oriented reader and writer.
pub struct ConsoleChat<R, W> {
    lines: Lines<BufReader<R>>,
    output: W,
    author: String,
}

impl ConsoleChat<tokio::io::Stdin, tokio::io::Stdout> {
    /// Console bound to the process's stdin and stdout.
    pub fn stdio(author: impl Into<String>) -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout(), author)
    }
}

impl<R, W> ConsoleChat<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W, author: impl Into<String>) -> Self {
        Self {
            lines: BufReader::new(input).lines(),
            output,
            author: author.into(),
        }
    }
}

#[async_trait]
impl<R, W> ChatProvider for ConsoleChat<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn login(&mut self, _token: &str) -> Result<String> {
        Ok("quartermaster (console)".to_string())
    }

    async fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
        let line = self
            .lines
            .next_line()
            .await
            .context("Failed to read from console")?;
        Ok(line.map(|content| IncomingMessage::new(self.author.clone(), content).from_admin()))
    }

    async fn send_message(&mut self, content: &str) -> Result<()> {
        self.output.write_all(content.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}
