//! Interactive terminal chat over the helper router.
//!
//! ```bash
//! cargo run --bin chat -- micro
//! ```
//!
//! The optional argument picks the starting backend (default `scriptor`).
//! Set `RUST_LOG=romanai_lab=debug` to see turn logs.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use romanai_lab::cli::{parse_command, ChatCommand, HELP};
use romanai_lab::config::LabConfig;
use romanai_lab::helpers::{HelperKind, HelperRouter};
use romanai_lab::lab::TranscriptLog;
use romanai_lab::utilities::paths;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut backend = match std::env::args().nth(1) {
        Some(name) => HelperKind::from_key(&name).with_context(|| format!("unknown backend: {name}"))?,
        None => HelperKind::Scriptor,
    };

    let config = LabConfig::load(&LabConfig::default_path());
    let router = HelperRouter::from_config(&config, &config.memory_dir());
    let transcript = TranscriptLog::new(paths::transcript_path());

    println!("RomanAI Spacetime chat ({backend}). Type /help for commands.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        print!("You> ");
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        match parse_command(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Exit => break,
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Backend(kind) => {
                backend = kind;
                println!("[backend: {backend}]");
            }
            ChatCommand::UnknownBackend(name) => println!("[Unknown backend: {name}]"),
            ChatCommand::Recall => println!("{}", router.recall_memory()),
            ChatCommand::Store(text) => {
                let stored = router.store_memory(&text);
                println!("[stored: {stored}]");
            }
            ChatCommand::Prompt(text) => {
                transcript.append(&format!("[CHAT USER] {text}"));
                let answer = router.run(backend.key(), &text);
                transcript.append(&format!("[CHAT AI] {answer}"));
                println!("RomanAI ({backend})> {answer}\n");
            }
        }
    }

    println!("Exiting RomanAI chat.");
    Ok(())
}
