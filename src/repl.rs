use crate::evaluator::Evaluator;
use crate::runner::{execute, report};
use std::io::{self, Write};

/// Interactive loop keeping one interpreter instance across lines.
pub fn start() {
    println!("AbyssLang Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut evaluator = Evaluator::new();

    loop {
        print!(">>> ");
        if let Err(error) = io::stdout().flush() {
            log::warn!("could not flush prompt: {}", error);
        }

        let mut line = String::new();
        // Same reader as `ጠይቅ`.
        match evaluator.read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }

                if let Err(error) = execute(line, &mut evaluator) {
                    report(&error, line, None);
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}
