use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Span, TokenKind},
};
use smol_str::SmolStr;

/// User defined name of a class, subroutine or variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub span: Span,
    pub name: SmolStr,
}

impl Ident {
    #[inline]
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl Parse for Ident {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Ident)?;
        let name = input.text(&token).into();
        Ok(Ident {
            span: token.span,
            name,
        })
    }
}
