//! Terminal-backed interaction.

use super::Interaction;
use crate::errors::DevflowError;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Reads answers from stdin and writes prompts to stdout.
#[derive(Debug)]
pub struct ConsoleInteraction {
    reader: Mutex<BufReader<Stdin>>,
}

impl ConsoleInteraction {
    /// Creates a console interaction bound to the process stdin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }

    async fn ask(&self, rendered: &str) -> Result<String, DevflowError> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(rendered.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Err(DevflowError::Interaction("input closed".to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Default for ConsoleInteraction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interaction for ConsoleInteraction {
    async fn prompt(&self, text: &str) -> Result<String, DevflowError> {
        self.ask(&format!("\n{text}\n> ")).await
    }

    async fn confirm(&self, text: &str) -> Result<bool, DevflowError> {
        let answer = self.ask(&format!("\n{text}\n(y/n): ")).await?;
        Ok(is_affirmative(&answer))
    }

    fn display(&self, text: &str) {
        println!("{text}");
    }
}

/// Returns true for `y` or `yes`, ignoring case and surrounding whitespace.
#[must_use]
pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES \n"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yeah"));
        assert!(!is_affirmative(""));
    }
}
