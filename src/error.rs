//! Error types for grammar construction, engine construction, and recognition.

use thiserror::Error;

/// Errors that can occur while building a [`crate::grammar::Grammar`], building an engine on
/// top of one, or running `predict` against an engine.
///
/// The taxonomy is closed: every failure mode of the core is one of the eight variants below.
/// `Io` is not part of that taxonomy — it exists only to let the CLI's stdin handling (§10.2)
/// propagate `std::io::Error` through the same `Result` type.
#[derive(Error, Debug)]
pub enum GrammarError {
    /// Raised by `Grammar::construct` when a member of N ∪ T is not exactly one character.
    #[error("symbol {0:?} is not exactly one character long")]
    InvalidSymbol(String),

    /// Raised by `Grammar::construct` when a symbol is declared both terminal and nonterminal.
    #[error("symbol '{0}' is declared as both a terminal and a nonterminal")]
    Overlap(char),

    /// Raised by `Grammar::construct` when the start symbol is not in N.
    #[error("start symbol '{0}' is not a nonterminal")]
    InvalidStart(char),

    /// Raised by `Grammar::add_rule` when the left-hand side is not a nonterminal, or the
    /// right-hand side contains a character outside T ∪ N.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Raised by engine construction when the augmentation sentinel already names a symbol.
    #[error("start augmentation sentinel '{0}' already occurs in the grammar's nonterminals")]
    StartSymbolConflict(char),

    /// Raised by `LREngine::new` when ACTION-table construction finds a shift/reduce or
    /// reduce/reduce conflict.
    #[error("grammar is not LR(1): conflict in state {state} on lookahead {lookahead} ({detail})")]
    NotLR1 {
        state: usize,
        lookahead: String,
        detail: String,
    },

    /// Raised by `predict` when the input word contains a character outside T.
    #[error("input contains character '{0}' which is not a terminal of this grammar")]
    InvalidInput(char),

    /// Raised by the LR driver when it falls off the end of well-formed tables; this should be
    /// unreachable and indicates a programming error in table construction.
    #[error("internal error in LR driver: {0}")]
    InternalError(String),

    /// I/O failure while the CLI reads the grammar or word list from stdin. Not part of the
    /// core's closed taxonomy (see above).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for `Result`s in this crate.
pub type Result<T> = std::result::Result<T, GrammarError>;
