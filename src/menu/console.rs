use std::fmt::Display;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{AppError, AppResult};

/// Line-oriented prompt/answer I/O over any async reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Next input line without its line terminator, `None` at end of input.
    pub async fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub async fn write(&mut self, text: &str) -> AppResult<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    pub async fn write_line(&mut self, text: impl Display) -> AppResult<()> {
        self.write(&format!("{text}\n")).await
    }

    /// Prints `label` and returns the answer line as typed.
    pub async fn prompt(&mut self, label: &str) -> AppResult<String> {
        self.write(label).await?;
        self.read_line()
            .await?
            .ok_or_else(|| AppError::BadRequest("unexpected end of input".into()))
    }

    /// Prompts until a non-blank answer arrives and returns its first word.
    pub async fn prompt_token(&mut self, label: &str) -> AppResult<String> {
        loop {
            let answer = self.prompt(label).await?;
            if let Some(token) = answer.split_whitespace().next() {
                return Ok(token.to_string());
            }
        }
    }

    pub async fn prompt_parse<T>(&mut self, label: &str) -> AppResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let token = self.prompt_token(label).await?;
        token
            .parse()
            .map_err(|err| AppError::BadRequest(format!("'{token}': {err}")))
    }
}
