//! Prompt helpers for the interactive loop.

use crate::error::{AgoraError, Result};
use rpassword::prompt_password;
use std::io::{self, BufRead, Write};

/// Prints `prompt` and reads one trimmed line from stdin.
///
/// End of input is reported as an I/O error so the command loop can wind
/// down instead of spinning.
pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(AgoraError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "end of input",
        )));
    }
    Ok(line.trim().to_string())
}

/// Prompts until the operator enters an unsigned number.
pub fn prompt_u32(prompt: &str) -> Result<u32> {
    loop {
        let line = prompt_line(prompt)?;
        match line.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!(">Not a number, try again."),
        }
    }
}

/// Prompts for a password without echoing it to the terminal.
pub fn prompt_for_password(prompt: &str) -> Result<String> {
    let password = prompt_password(format!("{}: ", prompt))
        .map_err(|e| AgoraError::validation(format!("Failed to read password: {}", e)))?;

    if password.is_empty() {
        return Err(AgoraError::validation("Password cannot be empty"));
    }

    Ok(password)
}

/// Asks a yes/no question; anything but `y`/`Y` counts as no.
pub fn prompt_yes_no(prompt: &str) -> Result<bool> {
    let answer = prompt_line(prompt)?;
    Ok(matches!(answer.as_str(), "y" | "Y"))
}
