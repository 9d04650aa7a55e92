//! Syntactic analysis.
//!
//! Recursive descent parser. Each grammar production is a type
//! implementing [`Parse`], which consumes its tokens from the
//! [`TokenStream`] and builds its own node of the syntax tree.
mod class;
mod delim;
mod expr;
mod ident;
mod literal;
mod stmts;
mod subroutine;
mod types;

pub use class::*;
pub use delim::*;
pub use expr::*;
pub use ident::*;
pub use literal::*;
pub use stmts::*;
pub use subroutine::*;
pub use types::*;

use crate::{
    lex::LexError,
    token_stream::TokenStream,
    tokens::{Span, Token},
};
use std::{error::Error, fmt};

pub trait Parse: Sized {
    type Output;
    type Err: Error;

    fn parse(input: &mut TokenStream) -> Result<Self::Output, Self::Err>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token at the cursor doesn't fit any alternative of the
    /// production being parsed.
    Unexpected {
        encountered: Token,
        /// Human readable description of what would have been accepted.
        expected: String,
    },
    /// Source ended in the middle of a production.
    EndOfSource { expected: String, span: Span },
    Lex(LexError),
}

impl ParseError {
    /// Location of the offending token.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Unexpected { encountered, .. } => encountered.span,
            ParseError::EndOfSource { span, .. } => *span,
            ParseError::Lex(err) => err.span(),
        }
    }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Unexpected {
                encountered,
                expected,
            } => write!(
                f,
                "encountered unexpected {} at offset {}, expected {}",
                encountered.kind, encountered.span.index, expected
            ),
            ParseError::EndOfSource { expected, .. } => {
                write!(f, "unexpected end of source code, expected {expected}")
            }
            ParseError::Lex(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}
