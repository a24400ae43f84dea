//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over system operations,
//! enabling dependency injection and testability.
//!
//! # Structure
//!
//! - `env` - Environment variables and the working directory
//! - `fs` - File system operations (read, write, exists)
//! - `user` - User interaction (confirmation, free text, single and multi select)

mod env;
mod fs;
mod user;

use anyhow::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};

/// Typing this at any prompt cancels the current interactive flow.
pub const CANCEL_INPUT: &str = ":cancel";

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    // User interaction
    /// Prompt user for confirmation. Returns true if user confirms (y/yes), false otherwise.
    fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Prompt for a line of text. An empty answer yields `default` (or "").
    /// Returns `None` when the user cancels or input is closed.
    fn input<'a>(&self, prompt: &str, default: Option<&'a str>) -> Result<Option<String>>;

    /// Pick one of `choices`, returning its index. `None` when cancelled.
    fn select(&self, prompt: &str, choices: &[String]) -> Result<Option<usize>>;

    /// Pick any number of `choices`, returning their indices in ascending order.
    /// An empty answer keeps the `checked` indices. `None` when cancelled.
    fn multi_select(
        &self,
        prompt: &str,
        choices: &[String],
        checked: &[usize],
    ) -> Result<Option<Vec<usize>>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.confirm_impl(prompt)
    }

    fn input<'a>(&self, prompt: &str, default: Option<&'a str>) -> Result<Option<String>> {
        self.input_impl(prompt, default)
    }

    fn select(&self, prompt: &str, choices: &[String]) -> Result<Option<usize>> {
        self.select_impl(prompt, choices)
    }

    fn multi_select(
        &self,
        prompt: &str,
        choices: &[String],
        checked: &[usize],
    ) -> Result<Option<Vec<usize>>> {
        self.multi_select_impl(prompt, choices, checked)
    }
}

/// Runtime wrapper that answers every confirmation with "yes" (`--yes`).
pub struct AssumeYes<R: Runtime>(pub R);

impl<R: Runtime> Runtime for AssumeYes<R> {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.0.env_var(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.0.current_dir()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.0.write(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.0.read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.0.exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.0.create_dir_all(path)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        log::info!("{} [assumed yes]", prompt);
        Ok(true)
    }

    fn input<'a>(&self, prompt: &str, default: Option<&'a str>) -> Result<Option<String>> {
        self.0.input(prompt, default)
    }

    fn select(&self, prompt: &str, choices: &[String]) -> Result<Option<usize>> {
        self.0.select(prompt, choices)
    }

    fn multi_select(
        &self,
        prompt: &str,
        choices: &[String],
        checked: &[usize],
    ) -> Result<Option<Vec<usize>>> {
        self.0.multi_select(prompt, choices, checked)
    }
}
