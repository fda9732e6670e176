//! Interactive input
//!
//! The definition wizard reads answers through the [`Prompt`] trait so it can
//! be driven from a terminal or from a fixed script.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// A source of answers to questions
pub trait Prompt {
    /// Ask a question and return the trimmed answer
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Ask a yes/no question; anything but `y`/`yes` means no
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} [y/N]: ", question))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Reads answers from standard input
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }
}

/// Answers questions from a fixed list, recording what was asked
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted answers"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_in_order() {
        let mut prompt = ScriptedPrompt::new(["first", " second "]);
        assert_eq!(prompt.ask("a? ").unwrap(), "first");
        assert_eq!(prompt.ask("b? ").unwrap(), "second");
        assert!(prompt.ask("c? ").is_err());
        assert_eq!(prompt.asked().len(), 3);
    }

    #[test]
    fn test_confirm() {
        let mut prompt = ScriptedPrompt::new(["Y", "no", ""]);
        assert!(prompt.confirm("Save?").unwrap());
        assert!(!prompt.confirm("Save?").unwrap());
        assert!(!prompt.confirm("Save?").unwrap());
    }
}
