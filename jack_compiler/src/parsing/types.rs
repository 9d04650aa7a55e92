//! Type annotations of declarations.
use super::{Ident, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};
use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Char,
    Boolean,
    /// Handle to an instance of the named class.
    Class(Ident),
}

impl Type {
    /// Name of the type, as recorded in the symbol table.
    pub fn name(&self) -> SmolStr {
        match self {
            Type::Int => SmolStr::new("int"),
            Type::Char => SmolStr::new("char"),
            Type::Boolean => SmolStr::new("boolean"),
            Type::Class(ident) => ident.name.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name().as_str())
    }
}

impl Parse for Type {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;
        use TokenKind as T;

        match input.peek_kind()? {
            T::Keyword(K::Int) => input.consume_keyword(K::Int).map(|_| Type::Int),
            T::Keyword(K::Char) => input.consume_keyword(K::Char).map(|_| Type::Char),
            T::Keyword(K::Boolean) => input.consume_keyword(K::Boolean).map(|_| Type::Boolean),
            T::Ident => Ident::parse(input).map(Type::Class),
            _ => Err(input.unexpected("type 'int', 'char', 'boolean' or a class name")),
        }
    }
}

/// Return type of a subroutine. `void` is parsed as `None`.
pub struct ReturnType;

impl Parse for ReturnType {
    type Output = Option<Type>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Option<Type>, ParseError> {
        if input.match_keyword(Keyword::Void) {
            Ok(None)
        } else {
            Type::parse(input).map(Some)
        }
    }
}
