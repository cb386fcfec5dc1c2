#![no_std]
#![forbid(unsafe_code)]

//! Higher-order pattern matching of expression trees.
//!
//! This is the library underlying the `mmatch` command-line matcher.
//!
//! # Usage
//!
//! Expressions are trees of symbols, applications, bindings, and environments.
//! Patterns are expressions that may contain *metavariables*, such as `_P`.
//! Matching a pattern against an expression yields all [`Solution`]s,
//! namely assignments of metavariables that make the pattern equal to the expression.
//! Metavariables may stand for *expression functions*, such as `(@ v , (f v))`,
//! which are applied by *expression function applications*, such as `(@ _P x)`.
//!
//! The following example matches the universal elimination rule
//! against a premise and a conclusion.
//!
//! ~~~
//! # use metamatch::{formula, Error, Expr, MatchingChallenge, Problem};
//! let parse = |p, e| -> Result<_, Error> { Ok((Expr::parse(p)?, Expr::parse(e)?)) };
//! let pairs = [
//!     parse("(∀ _x , (@ _P _x))", "(∀ r , (> (sq r) -1))")?,
//!     parse("(@ _P _T)", "(> (sq 3) -1)")?,
//! ];
//! let challenge = MatchingChallenge::new(Problem::from_pairs(pairs)?);
//! let solutions = challenge.solve()?;
//! assert_eq!(solutions.len(), 1);
//! assert_eq!(solutions[0].get("T"), Some(&Expr::parse("3")?));
//!
//! // instantiating the pattern yields the expression again
//! let conclusion = formula::instantiate(&Expr::parse("(@ _P _T)")?, &solutions[0], &[])?;
//! assert_eq!(conclusion.to_string(), "(> (sq 3) -1)");
//! # Ok::<_, Error>(())
//! ~~~
//!
//! # Organisation
//!
//! Expressions are read with the `metamatch-parse` crate and
//! converted to [`Expr`] by [`Expr::parse`].
//! Matching is performed on expressions whose bindings are [`debruijn`]-encoded,
//! such that matching is insensitive to the names of bound parameters.
//! A [`Problem`] is a set of [`Constraint`]s, each pairing a pattern with an expression.
//! A [`MatchingChallenge`] lazily explores the solutions of a problem,
//! optionally giving up after a number of steps.
//! Fresh names for the parameters of expression functions are
//! provided by [`FreshSymbols`].
//! Finally, the [`formula`] module instantiates patterns with solutions.

extern crate alloc;
#[macro_use]
extern crate log;

mod application;
mod binding;
mod constraint;
pub mod debruijn;
mod efun;
pub mod error;
pub mod expr;
pub mod formula;
mod fresh;
mod matching;
mod meta;
mod problem;
mod read;
mod solution;
mod stack;
pub mod symbol;

pub use application::Appl;
pub use binding::Binding;
pub use constraint::{Complexity, Constraint};
pub use error::Error;
pub use expr::{Attrs, Expr, Var};
pub use fresh::FreshSymbols;
pub use matching::{match_all, match_all_pairs, MatchingChallenge, Solutions};
pub use problem::Problem;
pub use solution::Solution;
pub use stack::Stack;
pub use symbol::Symbol;
