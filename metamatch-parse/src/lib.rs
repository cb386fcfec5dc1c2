//! Parser for expression trees with bindings and attributes.
//!
//! The syntax knows symbols (`x`, `>`, `"with space"`),
//! applications (`(f x y)`), bindings (`(∀ x y , body)`),
//! environments (`{ a b }`), given terms (`:a`), and
//! attributes (`a +{"label":"name"}`).
//! Line comments start with `//`.
//!
//! Example usage:
//!
//! ~~~
//! use metamatch_parse::{Error, Term, Terms};
//!
//! let tm = Term::parse_str("(∀ x , (> x 0))")?;
//! assert_eq!(tm.to_string(), "(∀ x , (> x 0))");
//!
//! let tms: Result<Vec<_>, _> = Terms::new("{ :(= a b) (P a) } (P b)").collect();
//! assert_eq!(tms?.len(), 2);
//! # Ok::<_, Error>(())
//! ~~~
#![no_std]

extern crate alloc;

mod lazy;
pub mod lex;
pub mod term;
mod terms;

pub use lazy::Lazy;
pub use lex::Token;
pub use term::{Error, Term};
pub use terms::Terms;

use logos::Logos;

/// Tokens of a string, without whitespace and comments.
pub type Lex<'s> = core::iter::Filter<logos::Lexer<'s, Token<'s>>, fn(&Token<'s>) -> bool>;

pub fn lex(s: &str) -> Lex {
    let not_space: fn(&Token) -> bool = |token| *token != Token::Space;
    Token::lexer(s).filter(not_space)
}
