//! Prompt loops shared by resolution and `init`.

use std::fmt::Display;

use anyhow::Result;
use log::warn;

use crate::error::PackError;
use crate::runtime::Runtime;

/// Multi-select that keeps asking until at least one item is picked.
///
/// `what` names the item kind for the warning ("game version", "mod loader").
/// Cancelling fails with [`PackError::Cancelled`].
pub fn select_non_empty<R, T>(
    runtime: &R,
    prompt: &str,
    what: &str,
    items: &[T],
    checked: &[usize],
) -> Result<Vec<T>>
where
    R: Runtime + ?Sized,
    T: Display + Clone,
{
    let labels: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    loop {
        let Some(picked) = runtime.multi_select(prompt, &labels, checked)? else {
            return Err(PackError::Cancelled.into());
        };
        if picked.is_empty() {
            warn!("Must select at least one {}!", what);
            continue;
        }
        return Ok(picked
            .into_iter()
            .filter_map(|i| items.get(i).cloned())
            .collect());
    }
}

/// Single-select returning the chosen item. Cancelling fails with [`PackError::Cancelled`].
pub fn select_one<R, T>(runtime: &R, prompt: &str, items: &[T]) -> Result<T>
where
    R: Runtime + ?Sized,
    T: Display + Clone,
{
    let labels: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    runtime
        .select(prompt, &labels)?
        .and_then(|i| items.get(i).cloned())
        .ok_or_else(|| PackError::Cancelled.into())
}

/// Free text prompt. Cancelling fails with [`PackError::Cancelled`].
pub fn ask<R: Runtime + ?Sized>(runtime: &R, prompt: &str, default: Option<&str>) -> Result<String> {
    runtime
        .input(prompt, default)?
        .ok_or_else(|| PackError::Cancelled.into())
}
