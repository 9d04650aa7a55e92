//! Literal values.
use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Span, TokenKind},
};
use smol_str::SmolStr;

/// Integer constant.
///
/// Kept as its digits, the code generator decides whether
/// the value fits the target word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntLit {
    pub span: Span,
    pub digits: SmolStr,
}

/// String constant, without quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit {
    pub span: Span,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordConst {
    True,
    False,
    Null,
    This,
}

impl Parse for IntLit {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Int)?;
        Ok(IntLit {
            span: token.span,
            digits: input.text(&token).into(),
        })
    }
}

impl Parse for StrLit {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Str)?;
        Ok(StrLit {
            span: token.span,
            value: input.text(&token).to_owned(),
        })
    }
}

impl Parse for KeywordConst {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;

        let constant = match input.peek_kind()? {
            TokenKind::Keyword(K::True) => KeywordConst::True,
            TokenKind::Keyword(K::False) => KeywordConst::False,
            TokenKind::Keyword(K::Null) => KeywordConst::Null,
            TokenKind::Keyword(K::This) => KeywordConst::This,
            _ => return Err(input.unexpected("'true', 'false', 'null' or 'this'")),
        };
        input.next_token("keyword constant")?;

        Ok(constant)
    }
}
