//! Integration-level tests for the symbol module.

use cfg_recognizer::symbol::Symbol;

#[test]
fn partition_comes_from_the_caller_not_case() {
    assert!(Symbol::Nonterminal('a').is_nonterminal());
    assert!(Symbol::Terminal('A').is_terminal());
}

#[test]
fn as_char_is_independent_of_partition() {
    assert_eq!(Symbol::Terminal('x').as_char(), 'x');
    assert_eq!(Symbol::Nonterminal('x').as_char(), 'x');
}

#[test]
fn equality_considers_partition() {
    assert_eq!(Symbol::Terminal('a'), Symbol::Terminal('a'));
    assert_ne!(Symbol::Terminal('a'), Symbol::Terminal('b'));
    assert_ne!(Symbol::Terminal('a'), Symbol::Nonterminal('a'));
}

#[test]
fn display_renders_the_bare_character() {
    assert_eq!(Symbol::Nonterminal('S').to_string(), "S");
    assert_eq!(Symbol::Terminal('+').to_string(), "+");
}
