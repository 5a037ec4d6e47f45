//! Context-Free Grammar Recognizer
//!
//! A recognizer for context-free grammars over single-character symbols, offering two
//! interchangeable engines: Earley chart recognition (any CFG) and canonical LR(1) recognition
//! (LR(1) grammars only, rejecting others at construction time).
//!
//! # References
//! Aho, Alfred V. et al. "Compilers: Principles, Techniques, and Tools" (2nd Edition).
//! Addison-Wesley, 2006.

mod augment;
mod cli;
mod earley;
mod error;
mod first;
mod grammar;
mod lr;
mod symbol;

use clap::Parser;
use std::process;

/// Command-line arguments: which engine to recognize with.
#[derive(Debug, Parser)]
#[command(about = "Recognize words against a context-free grammar read from stdin")]
struct Args {
    /// Which recognition engine to use.
    #[arg(value_enum)]
    engine: cli::Engine,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = cli::run(args.engine) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
