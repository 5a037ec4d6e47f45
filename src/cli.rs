//! CLI glue: textual grammar/word-list I/O over stdin, engine selection, `Yes`/`No` output.

use crate::earley::EarleyEngine;
use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::lr::LREngine;
use clap::ValueEnum;
use std::io::{self, BufRead, Write};

/// Which recognition engine to build and drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    /// Earley chart recognition; accepts any context-free grammar.
    Earley,
    /// Canonical LR(1) recognition; rejects grammars that are not LR(1).
    Lr,
}

/// Runs the CLI: reads a grammar and a word list from stdin per the textual protocol, builds
/// the selected engine, and prints `Yes`/`No` for each word.
pub fn run(engine: Engine) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let grammar = read_grammar(&mut lines)?;

    match engine {
        Engine::Earley => {
            let engine = EarleyEngine::new(grammar)?;
            predict_words(|w| engine.predict(w), &mut lines)?;
        }
        Engine::Lr => {
            let engine = LREngine::new(grammar)?;
            predict_words(|w| engine.predict(w), &mut lines)?;
        }
    }

    Ok(())
}

/// Reads the grammar per the documented textual protocol:
///
/// 1. `n s p` — counts of nonterminals, terminals, rules.
/// 2. a line of `n` nonterminal characters.
/// 3. a line of `s` terminal characters.
/// 4. `p` lines of the form `A -> α`.
/// 5. a line naming the start symbol.
fn read_grammar<R: BufRead>(lines: &mut io::Lines<R>) -> Result<Grammar> {
    let header = next_line(lines)?;
    let mut counts = header.split_whitespace();
    let (n, s, p) = (
        parse_count(counts.next())?,
        parse_count(counts.next())?,
        parse_count(counts.next())?,
    );

    let nonterminal_line = next_line(lines)?;
    let terminal_line = next_line(lines)?;
    let nonterminals: Vec<String> = take_chars(&nonterminal_line, n)?;
    let terminals: Vec<String> = take_chars(&terminal_line, s)?;

    let mut rule_lines = Vec::with_capacity(p);
    for _ in 0..p {
        rule_lines.push(next_line(lines)?);
    }

    let start_line = next_line(lines)?;
    let start = start_line.trim();

    let mut grammar = Grammar::construct(nonterminals, terminals, start)?;

    for line in rule_lines {
        let (lhs, rhs) = parse_rule_line(&line)?;
        grammar.add_rule(lhs, &rhs)?;
    }

    log::debug!(
        "parsed grammar: {} nonterminals, {} terminals, {} rules",
        n,
        s,
        p
    );

    Ok(grammar)
}

/// Splits a textual line of `A -> α` into its left- and right-hand sides.
fn parse_rule_line(line: &str) -> Result<(char, String)> {
    let (lhs_part, rhs_part) = line.split_once("->").ok_or_else(|| {
        GrammarError::InvalidRule(format!("rule line {line:?} is missing '->'"))
    })?;
    let lhs_part = lhs_part.trim();
    let mut lhs_chars = lhs_part.chars();
    let lhs = match (lhs_chars.next(), lhs_chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(GrammarError::InvalidRule(format!(
                "left-hand side {lhs_part:?} is not exactly one character"
            )))
        }
    };
    Ok((lhs, rhs_part.trim().to_string()))
}

fn next_line<R: BufRead>(lines: &mut io::Lines<R>) -> Result<String> {
    lines
        .next()
        .ok_or_else(|| {
            GrammarError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected end of input while reading grammar",
            ))
        })?
        .map_err(GrammarError::from)
}

fn parse_count(field: Option<&str>) -> Result<usize> {
    field
        .ok_or_else(|| {
            GrammarError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "header line is missing a count",
            ))
        })?
        .parse::<usize>()
        .map_err(|_| {
            GrammarError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "header count is not a valid integer",
            ))
        })
}

/// Takes the first `count` characters of `line` as individual one-character strings,
/// tolerating (and ignoring) whitespace between them.
fn take_chars(line: &str, count: usize) -> Result<Vec<String>> {
    let chars: Vec<String> = line
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(String::from)
        .collect();
    if chars.len() != count {
        return Err(GrammarError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected {count} symbols, found {}", chars.len()),
        )));
    }
    Ok(chars)
}

/// Reads `m` followed by `m` word lines, printing `Yes`/`No` for each via `predict_fn`.
fn predict_words<F, R>(predict_fn: F, lines: &mut io::Lines<R>) -> Result<()>
where
    F: Fn(&str) -> Result<bool>,
    R: BufRead,
{
    let count_line = next_line(lines)?;
    let m = parse_count(Some(count_line.trim()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for _ in 0..m {
        let line = next_line(lines)?;
        let word = line.trim();
        let accepted = predict_fn(word)?;
        writeln!(out, "{}", if accepted { "Yes" } else { "No" })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rule_line_trims_whitespace() {
        let (lhs, rhs) = parse_rule_line("S -> aSb").unwrap();
        assert_eq!(lhs, 'S');
        assert_eq!(rhs, "aSb");
    }

    #[test]
    fn parse_rule_line_accepts_empty_rhs() {
        let (lhs, rhs) = parse_rule_line("S ->").unwrap();
        assert_eq!(lhs, 'S');
        assert_eq!(rhs, "");
    }

    #[test]
    fn parse_rule_line_rejects_missing_arrow() {
        assert!(parse_rule_line("S aSb").is_err());
    }

    #[test]
    fn take_chars_rejects_wrong_count() {
        assert!(take_chars("ab", 3).is_err());
    }

    #[test]
    fn take_chars_ignores_interior_whitespace() {
        let chars = take_chars("a b c", 3).unwrap();
        assert_eq!(chars, vec!["a", "b", "c"]);
    }
}
