//! User interaction operations (confirmation, text input, selection prompts).

use anyhow::Result;

use super::{CANCEL_INPUT, RealRuntime};

use std::io::{self, BufRead, Write};

/// Read one line. `None` means input is closed.
fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Core, testable implementation that reads from any BufRead and writes to any Write.
/// This is intentionally free-standing so tests can exercise it without needing a RealRuntime.
pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let response = read_answer(input)?.unwrap_or_default().to_lowercase();
    Ok(response == "y" || response == "yes")
}

pub(crate) fn input_with_io<R: BufRead, W: Write>(
    prompt: &str,
    default: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>> {
    match default {
        Some(d) if !d.is_empty() => write!(output, "{} ({}) ", prompt, d)?,
        _ => write!(output, "{} ", prompt)?,
    }
    output.flush()?;

    let Some(answer) = read_answer(input)? else {
        return Ok(None);
    };
    if answer == CANCEL_INPUT {
        return Ok(None);
    }
    if answer.is_empty() {
        return Ok(Some(default.unwrap_or_default().to_string()));
    }
    Ok(Some(answer))
}

fn write_choices<W: Write>(output: &mut W, choices: &[String], checked: &[usize]) -> Result<()> {
    for (i, choice) in choices.iter().enumerate() {
        let mark = if checked.contains(&i) { "[x]" } else { "[ ]" };
        writeln!(output, "  {:>2}) {} {}", i + 1, mark, choice)?;
    }
    Ok(())
}

fn parse_index(token: &str, len: usize) -> Option<usize> {
    token
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

pub(crate) fn select_with_io<R: BufRead, W: Write>(
    prompt: &str,
    choices: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<Option<usize>> {
    if choices.is_empty() {
        return Ok(None);
    }

    writeln!(output, "{}", prompt)?;
    for (i, choice) in choices.iter().enumerate() {
        writeln!(output, "  {:>2}) {}", i + 1, choice)?;
    }

    loop {
        write!(output, "Select [1-{}]: ", choices.len())?;
        output.flush()?;

        let Some(answer) = read_answer(input)? else {
            return Ok(None);
        };
        if answer == CANCEL_INPUT {
            return Ok(None);
        }
        match parse_index(&answer, choices.len()) {
            Some(index) => return Ok(Some(index)),
            None => writeln!(
                output,
                "Please enter a number between 1 and {}.",
                choices.len()
            )?,
        }
    }
}

pub(crate) fn multi_select_with_io<R: BufRead, W: Write>(
    prompt: &str,
    choices: &[String],
    checked: &[usize],
    input: &mut R,
    output: &mut W,
) -> Result<Option<Vec<usize>>> {
    writeln!(output, "{}", prompt)?;
    write_choices(output, choices, checked)?;

    loop {
        write!(
            output,
            "Select by number, separated by spaces or commas (Enter keeps [x]): "
        )?;
        output.flush()?;

        let Some(answer) = read_answer(input)? else {
            return Ok(None);
        };
        if answer == CANCEL_INPUT {
            return Ok(None);
        }
        if answer.is_empty() {
            let mut kept: Vec<usize> = checked
                .iter()
                .copied()
                .filter(|i| *i < choices.len())
                .collect();
            kept.sort_unstable();
            kept.dedup();
            return Ok(Some(kept));
        }

        let parsed: Option<Vec<usize>> = answer
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| parse_index(t, choices.len()))
            .collect();

        match parsed {
            Some(mut indices) => {
                indices.sort_unstable();
                indices.dedup();
                return Ok(Some(indices));
            }
            None => writeln!(
                output,
                "Please enter numbers between 1 and {}.",
                choices.len()
            )?,
        }
    }
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str) -> Result<bool> {
        // Wire the generic implementation to real stdin/stdout.
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, &mut stdin_lock, &mut stdout)
    }

    pub(crate) fn input_impl(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        input_with_io(prompt, default, &mut stdin.lock(), &mut stdout)
    }

    pub(crate) fn select_impl(&self, prompt: &str, choices: &[String]) -> Result<Option<usize>> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        select_with_io(prompt, choices, &mut stdin.lock(), &mut stdout)
    }

    pub(crate) fn multi_select_impl(
        &self,
        prompt: &str,
        choices: &[String],
        checked: &[usize],
    ) -> Result<Option<Vec<usize>>> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        multi_select_with_io(prompt, choices, checked, &mut stdin.lock(), &mut stdout)
    }
}
