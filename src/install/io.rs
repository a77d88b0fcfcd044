//! Terminal interaction used by the installer.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input};

/// Prompting primitives the customizers rely on.
pub trait InstallerIo {
    /// Prints a section title.
    fn title(&mut self, text: &str);

    /// Asks a free-text question. An empty answer returns `default` when set.
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String>;

    /// Asks a yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// [`InstallerIo`] backed by `dialoguer` prompts on the terminal.
#[derive(Debug, Default)]
pub struct DialoguerIo;

impl InstallerIo for DialoguerIo {
    fn title(&mut self, text: &str) {
        println!();
        println!("{}", text.bright_blue().bold());
        println!("{}", "=".repeat(text.len()).bright_black());
    }

    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true);

        if let Some(default) = default {
            input = input.default(default.to_string());
        }

        Ok(input.interact_text()?.trim().to_string())
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()?)
    }
}
