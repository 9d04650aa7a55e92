//! Buffered stream of tokens for look ahead.
use crate::{
    lex::{LexError, Lexer},
    parsing::ParseError,
    tokens::{Keyword, Span, Symbol, Token, TokenKind},
};

use itertools::{multipeek, MultiPeek};
use std::iter::Iterator;

/// Buffered stream of tokens that allows arbitrary look ahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer.
///
/// Every peek starts from the current cursor, so peeking is
/// idempotent. Looking further ahead is done with
/// [`TokenStream::peek_kind2`].
pub struct TokenStream<'a> {
    lexer: MultiPeek<Lexer<'a>>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    #[inline]
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            source: lexer.source_code(),
            lexer: multipeek(lexer),
        }
    }

    #[inline]
    pub fn source_code(&self) -> &'a str {
        self.source
    }

    /// Text of the given token in the source.
    #[inline]
    pub fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    /// Zero sized span pointing at the end of the source.
    #[inline]
    pub fn end_span(&self) -> Span {
        Span::new(self.source.len() as u32, 0)
    }

    /// Kind of the next token, without advancing the cursor.
    ///
    /// Returns [`TokenKind::EOS`] when lexing is done.
    pub fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        self.lexer.reset_peek();
        let kind = Self::kind_of(self.lexer.peek());
        self.lexer.reset_peek();
        kind
    }

    /// Kinds of the next two tokens, without advancing the cursor.
    pub fn peek_kind2(&mut self) -> Result<(TokenKind, TokenKind), ParseError> {
        self.lexer.reset_peek();
        let first = Self::kind_of(self.lexer.peek())?;
        let second = Self::kind_of(self.lexer.peek());
        self.lexer.reset_peek();
        Ok((first, second?))
    }

    fn kind_of(peeked: Option<&Result<Token, LexError>>) -> Result<TokenKind, ParseError> {
        match peeked {
            Some(Ok(token)) => Ok(token.kind),
            Some(Err(err)) => Err(ParseError::Lex(err.clone())),
            None => Ok(TokenKind::EOS),
        }
    }

    /// Consumes the current token regardless of kind.
    ///
    /// The `expected` description is used for the error when the
    /// stream is at the end.
    pub fn next_token(&mut self, expected: &str) -> Result<Token, ParseError> {
        match self.lexer.next() {
            Some(Ok(token)) => Ok(token),
            Some(Err(err)) => Err(ParseError::Lex(err)),
            None => Err(ParseError::EndOfSource {
                expected: expected.to_owned(),
                span: self.end_span(),
            }),
        }
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Returns false when token kinds
    /// do not match, or the token stream is at the end.
    ///
    /// Does not consume the token if the kinds do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        // Ensure clean peek state.
        self.lexer.reset_peek();

        let is_match = matches!(self.lexer.peek(), Some(Ok(token)) if token.kind == token_kind);
        if is_match {
            self.lexer.next();
        }
        self.lexer.reset_peek();
        is_match
    }

    #[inline]
    pub fn match_symbol(&mut self, symbol: Symbol) -> bool {
        self.match_token(TokenKind::Symbol(symbol))
    }

    #[inline]
    pub fn match_keyword(&mut self, keyword: Keyword) -> bool {
        self.match_token(TokenKind::Keyword(keyword))
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token kind, otherwise
    /// a parse error is returned and the token is left in the stream.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek_kind()? == token_kind {
            self.next_token(&token_kind.to_string())
        } else {
            Err(self.unexpected(token_kind.to_string()))
        }
    }

    #[inline]
    pub fn consume_symbol(&mut self, symbol: Symbol) -> Result<Token, ParseError> {
        self.consume(TokenKind::Symbol(symbol))
    }

    #[inline]
    pub fn consume_keyword(&mut self, keyword: Keyword) -> Result<Token, ParseError> {
        self.consume(TokenKind::Keyword(keyword))
    }

    /// Build an error describing that the current token is not
    /// what the parser expected.
    pub fn unexpected(&mut self, expected: impl Into<String>) -> ParseError {
        let end = self.end_span();
        self.lexer.reset_peek();
        let err = match self.lexer.peek() {
            Some(Ok(token)) => ParseError::Unexpected {
                encountered: token.clone(),
                expected: expected.into(),
            },
            Some(Err(err)) => ParseError::Lex(err.clone()),
            None => ParseError::EndOfSource {
                expected: expected.into(),
                span: end,
            },
        };
        self.lexer.reset_peek();
        err
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_peek_is_idempotent() {
        let mut stream = TokenStream::new(Lexer::new("let x"));
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Keyword(Keyword::Let));
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Keyword(Keyword::Let));
        assert_eq!(
            stream.peek_kind2().unwrap(),
            (TokenKind::Keyword(Keyword::Let), TokenKind::Ident)
        );
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Keyword(Keyword::Let));
    }

    #[test]
    fn test_consume_mismatch_keeps_token() {
        let mut stream = TokenStream::new(Lexer::new("x ;"));
        let err = stream.consume_symbol(Symbol::Semicolon).unwrap_err();
        match err {
            ParseError::Unexpected { encountered, expected } => {
                assert_eq!(encountered.kind, TokenKind::Ident);
                assert_eq!(expected, "symbol ';'");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(stream.consume(TokenKind::Ident).is_ok());
        assert!(stream.match_symbol(Symbol::Semicolon));
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::EOS);
    }

    #[test]
    fn test_consume_at_end() {
        let mut stream = TokenStream::new(Lexer::new("  "));
        let err = stream.consume(TokenKind::Ident).unwrap_err();
        assert!(matches!(err, ParseError::EndOfSource { span, .. } if span.index == 2));
    }
}
