//! Common error type.

use crate::Complexity;
use core::fmt::{self, Display};
use metamatch_parse::Error as ParseError;

/// Common error type.
#[derive(Debug, PartialEq)]
pub enum Error {
    Parse(ParseError),
    /// the expression of a constraint contains a metavariable
    InvalidConstraint,
    /// children were requested from a constraint of the given complexity
    WrongComplexity(Complexity),
    /// a constraint that is not an instantiation was applied
    NotApplicable,
    /// an expression function was expected
    NotAFunction,
    /// an expression function was applied to a wrong number of arguments
    ArityMismatch { arity: usize, args: usize },
    /// a metavariable was applied to no arguments
    EmptyEFA,
    /// an environment was placed inside an expression
    NonExpressionInExpressionContext,
    /// a binding parameter was replaced by something else than a symbol
    ParamNotSymbol,
    /// the matching search exceeded its move limit
    SearchAborted,
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse error: {:?}", e),
            Self::InvalidConstraint => write!(f, "The expression in a constraint may not contain metavariables"),
            Self::WrongComplexity(c) => write!(f, "Cannot compute children for a constraint of complexity {}", c),
            Self::NotApplicable => write!(f, "Only instantiations can be applied"),
            Self::NotAFunction => write!(f, "Expected an expression function"),
            Self::ArityMismatch { arity, args } => write!(
                f,
                "Expression function of arity {} applied to {} arguments",
                arity, args
            ),
            Self::EmptyEFA => write!(f, "Expression function applications require at least one argument"),
            Self::NonExpressionInExpressionContext => write!(f, "Cannot place a non-expression inside an expression"),
            Self::ParamNotSymbol => write!(f, "Binding parameters must be symbols"),
            Self::SearchAborted => write!(f, "Matching search exceeded its move limit"),
        }
    }
}
