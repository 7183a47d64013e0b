//! Interactive console front end.
//!
//! One command per input line, one core operation per command. All
//! prompting and printing happens here; the core only reports results and
//! errors. After every command the user point tallies are recomputed, the
//! way the original loop did.

pub mod command;
pub mod commands;
pub mod utils;

use crate::error::{AgoraError, Result};
use crate::forum::System;
use std::io::ErrorKind;

pub use command::Command;

/// Runs the interactive command loop until `exit` or end of input.
pub fn run() -> Result<()> {
    let mut system = System::new();
    println!(">Welcome! Use 'help' to see all commands.");

    loop {
        let line = match utils::prompt_line("\n>") {
            Ok(line) => line,
            Err(e) if is_end_of_input(&e) => break,
            Err(e) => return Err(e),
        };
        if line.is_empty() {
            continue;
        }

        let Some(command) = Command::parse(&line) else {
            println!(">>No such command exists! Use command 'help' to see all commands.");
            continue;
        };
        let exiting = command == Command::Exit;

        if let Err(e) = commands::dispatch(&mut system, command) {
            if is_end_of_input(&e) {
                break;
            }
            println!(">{}", e);
        }

        system.recompute_points();

        if exiting {
            break;
        }
    }

    Ok(())
}

fn is_end_of_input(error: &AgoraError) -> bool {
    matches!(error, AgoraError::Io(e) if e.kind() == ErrorKind::UnexpectedEof)
}
