//! Lexical analysis (tokenizer)
use crate::tokens::{Keyword, Span, Symbol, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use std::{error, fmt, iter::Iterator, str::CharIndices};

/// Print a table of the tokens produced by the lexer.
///
/// Stops at the first lexical error, which is returned.
pub fn debug_print_lexer(lexer: Lexer) -> Result<(), LexError> {
    let source = lexer.source_code();
    println!("Source Byte Count: {}", source.len());
    println!("offset | len | token                  | fragment ");

    for result in lexer {
        let token = result?;
        let offset = token.span.index;
        let len = token.span.size;
        let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
        let fragment = token.text(source);
        println!("{offset:6}:{len: <4} {kind: <24} \"{fragment}\"");
    }

    Ok(())
}

/// Convenience for lexing a whole source text in one go.
pub fn tokenize(source_code: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source_code).collect()
}

/// Lexical analyzer.
///
/// Produces tokens lazily. Whitespace and comments are
/// consumed and never reach the caller.
pub struct Lexer<'a> {
    pub(crate) source: SourceText<'a>,
    /// Start absolute byte position of the current token
    /// in the source.
    token_start: u32,
    /// Set once end-of-source or an error was produced,
    /// so iteration is finite.
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: 0,
            done: false,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Returns a token of kind [`TokenKind::EOS`] when the source is exhausted.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        loop {
            self.start_token();

            let next_char = match self.source.next_char() {
                Some(c) => c,
                // Give end-of-source its own zero sized position.
                None => return Ok(self.make_token(T::EOS)),
            };

            match next_char {
                ' ' | '\t' | '\r' | '\n' => self.consume_whitespace(),
                '/' => match self.source.peek_char() {
                    Some('/') => self.consume_line_comment(),
                    Some('*') => self.consume_block_comment()?,
                    _ => return Ok(self.make_token(T::Symbol(Symbol::Slash))),
                },
                '"' => return self.consume_string(),
                '0'..='9' => return Ok(self.consume_number()),
                '_' | 'a'..='z' | 'A'..='Z' => return Ok(self.consume_ident()),
                c => {
                    return match Symbol::from_char(c) {
                        Some(symbol) => Ok(self.make_token(T::Symbol(symbol))),
                        None => Err(LexError::UnknownCharacter {
                            ch: c,
                            span: self.make_span(),
                        }),
                    }
                }
            }
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.offset as u32;
    }

    /// Create a span using the starting position of the current token,
    /// and the current offset of the cursor.
    fn make_span(&self) -> Span {
        let end = self.source.offset as u32;
        debug_assert!(end >= self.token_start);
        Span::new(self.token_start, end - self.token_start)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            span: self.make_span(),
        }
    }

    fn token_fragment(&self) -> &'a str {
        self.make_span().fragment(self.source.original)
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Consume whitespace characters, including line breaks,
    /// until a non-whitespace character is encountered.
    fn consume_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.source.peek_char() {
            self.source.next_char();
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn consume_line_comment(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c == '\n' {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase a block comment up to and including the first `*/`.
    ///
    /// Block comments do not nest.
    fn consume_block_comment(&mut self) -> Result<(), LexError> {
        // Opening star.
        self.source.next_char();

        loop {
            match self.source.next_char() {
                Some('*') => {
                    if self.source.peek_char() == Some('/') {
                        self.source.next_char();
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => {
                    return Err(LexError::UnterminatedComment {
                        span: self.make_span(),
                    })
                }
            }
        }
    }

    /// Make a string constant token. The opening quote was already consumed.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        loop {
            match self.source.peek_char() {
                Some('"') => {
                    self.source.next_char();
                    return Ok(self.make_token(TokenKind::Str));
                }
                Some('\n') | None => {
                    return Err(LexError::UnterminatedString {
                        span: self.make_span(),
                    })
                }
                Some(_) => {
                    self.source.next_char();
                }
            }
        }
    }

    /// Make an integer constant token.
    ///
    /// The range of the value is checked by the code generator.
    fn consume_number(&mut self) -> Token {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        self.make_token(TokenKind::Int)
    }

    fn consume_ident(&mut self) -> Token {
        while let Some('_' | 'a'..='z' | 'A'..='Z' | '0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let token_kind = Keyword::parse(self.token_fragment())
            .map(TokenKind::Keyword)
            .unwrap_or(TokenKind::Ident);
        self.make_token(token_kind)
    }
}

/// Implement `Lexer` as an interator for consuming
/// tokens lazily.
///
/// Iteration ends at end-of-source, which is not yielded,
/// or after the first error.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_token() {
            Ok(token) if token.kind == TokenKind::EOS => {
                self.done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
pub(crate) struct SourceText<'a> {
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    pub(crate) original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// An important semantic feature of `MultiPeek` is that peeking advances
    /// the internal peek cursor by 1. The peek cursor offset is restored to 0
    /// when calling `MultiPeek::next()` or `MultiPeek::reset_peek()`.
    chars: MultiPeek<CharIndices<'a>>,

    /// Byte position of the next character to be consumed.
    offset: usize,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            chars: multipeek(source.char_indices()),
            offset: 0,
        }
    }

    /// Advance the cursor and return the next character.
    fn next_char(&mut self) -> Option<char> {
        match self.chars.next() {
            Some((index, c)) => {
                self.offset = index + c.len_utf8();
                Some(c)
            }
            None => {
                self.offset = self.original.len();
                None
            }
        }
    }

    /// Look at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.reset_peek();
        self.chars.peek().map(|(_, c)| *c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No token starts with this character.
    UnknownCharacter { ch: char, span: Span },
    /// String constant without a closing quote on the same line.
    UnterminatedString { span: Span },
    /// Block comment without a closing `*/`.
    UnterminatedComment { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnknownCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span } => *span,
        }
    }
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexError::UnknownCharacter { ch, span } => {
                write!(f, "unknown character {ch:?} at offset {}", span.index)
            }
            LexError::UnterminatedString { span } => {
                write!(f, "unterminated string constant at offset {}", span.index)
            }
            LexError::UnterminatedComment { span } => {
                write!(f, "unterminated block comment at offset {}", span.index)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_lex_class_header() {
        use TokenKind as T;

        assert_eq!(
            kinds("class Main {"),
            vec![
                T::Keyword(Keyword::Class),
                T::Ident,
                T::Symbol(Symbol::LeftBrace)
            ]
        );
    }

    #[test]
    fn test_lex_comments_discarded() {
        use TokenKind as T;

        let source = "/** doc\n * comment */ let // trailing\n x /* inline */ = 1;";
        assert_eq!(
            kinds(source),
            vec![
                T::Keyword(Keyword::Let),
                T::Ident,
                T::Symbol(Symbol::Eq),
                T::Int,
                T::Symbol(Symbol::Semicolon),
            ]
        );
    }

    #[test]
    fn test_lex_block_comment_non_greedy() {
        let tokens = tokenize("/* a */ x /* b */").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text("/* a */ x /* b */"), "x");
    }

    #[test]
    fn test_lex_slash_is_symbol() {
        assert_eq!(
            kinds("a / b"),
            vec![TokenKind::Ident, TokenKind::Symbol(Symbol::Slash), TokenKind::Ident]
        );
    }

    #[test]
    fn test_lex_string_constant() {
        let source = "do Output.printString(\"Hello, world!\");";
        let tokens = tokenize(source).unwrap();
        let string = tokens
            .iter()
            .find(|token| token.kind == TokenKind::Str)
            .expect("string token");
        assert_eq!(string.text(source), "Hello, world!");
    }

    #[test]
    fn test_lex_keyword_prefix_is_identifier() {
        let source = "classy do_it returned";
        let tokens = tokenize(source).unwrap();
        assert!(tokens.iter().all(|token| token.kind == TokenKind::Ident));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_lex_number_then_ident() {
        let source = "123abc";
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].text(source), "123");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].text(source), "abc");
    }

    #[test]
    fn test_lex_offsets() {
        let tokens = tokenize("let  x").unwrap();
        assert_eq!(tokens[0].offset(), 0);
        assert_eq!(tokens[1].offset(), 5);
    }

    #[test]
    fn test_lex_unknown_character() {
        let err = tokenize("let x = 1 # 2;").unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownCharacter {
                ch: '#',
                span: Span::new(10, 1)
            }
        );
    }

    #[test]
    fn test_lex_unterminated_string() {
        let err = tokenize("let s = \"abc\n\";").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { span } if span.index == 8));
    }

    #[test]
    fn test_lex_unterminated_comment() {
        let err = tokenize("class /* never closed").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { span } if span.index == 6));
    }

    #[test]
    fn test_lexer_is_restartable() {
        let source = "while (i < 10) { let i = i + 1; }";
        let first = tokenize(source).unwrap();
        let second = tokenize(source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lexer_stops_after_end() {
        let mut lexer = Lexer::new("x");
        assert!(lexer.next().is_some());
        assert!(lexer.next().is_none());
        assert!(lexer.next().is_none());
    }
}
