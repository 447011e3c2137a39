//! Line-based prompts used when a form runs without the interactive screen.
//!
//! Each prompt writes a question, reads one line, and repeats until the
//! answer is acceptable. End of input counts as the user giving up.

use std::io::{BufRead, Write};

use crate::error::{FormError, Result};

fn read_line(input: &mut dyn BufRead) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(FormError::UserAborted);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks for a number in `min..=max` until one is given.
pub fn prompt_int(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    prompt: &str,
    min: usize,
    max: usize,
) -> Result<usize> {
    loop {
        write!(output, "{prompt} ")?;
        output.flush()?;
        let line = read_line(input)?;
        match line.trim().parse::<usize>() {
            Ok(n) if (min..=max).contains(&n) => return Ok(n),
            _ => writeln!(output, "Invalid: must be a number between {min} and {max}")?,
        }
    }
}

/// Asks for a line of text until `validate` accepts it.
pub fn prompt_string(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    prompt: &str,
    validate: &dyn Fn(&str) -> Option<String>,
) -> Result<String> {
    loop {
        write!(output, "{prompt} ")?;
        output.flush()?;
        let line = read_line(input)?;
        match validate(&line) {
            None => return Ok(line),
            Some(err) => writeln!(output, "{err}")?,
        }
    }
}
