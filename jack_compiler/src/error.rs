//! Result and errors.
use crate::{compile::CompileError, lex::LexError, parsing::ParseError, tokens::Span};
use std::{
    fmt::{self, Display, Formatter, Write},
    io,
    str::Utf8Error,
};

pub type JackResult<T> = std::result::Result<T, JackError>;

#[derive(Debug)]
pub enum JackError {
    Lex(LexError),
    Parse(ParseError),
    Compile(CompileError),
    Io(io::Error),
    /// Source file is not valid UTF-8.
    Utf8(Utf8Error),
}

impl JackError {
    /// Location in the source the error points at, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex(err) => Some(err.span()),
            Self::Parse(err) => Some(err.span()),
            Self::Compile(err) => err.span(),
            Self::Io(_) | Self::Utf8(_) => None,
        }
    }

    /// Render a diagnostic with the line and column, the offending
    /// source line and a caret marker under the error location.
    ///
    /// ```text
    /// error: undefined symbol 'y'
    ///  --> 3:16
    ///   |
    /// 3 |         let x = y;
    ///   |                 ^
    /// ```
    pub fn report(&self, source: &str) -> String {
        let mut buf = String::new();
        // Writing to a String can't fail.
        let _ = self.write_report(&mut buf, source);
        buf
    }

    fn write_report(&self, buf: &mut String, source: &str) -> fmt::Result {
        writeln!(buf, "error: {}", self)?;

        let span = match self.span() {
            Some(span) => span,
            None => return Ok(()),
        };

        let (line_no, column) = span.line_column(source);
        let (line, _) = span.surrounding_line(source);
        let gutter = line_no.to_string().len();
        let marker_len = span.size.max(1) as usize;

        writeln!(buf, "{:gutter$}--> {}:{}", "", line_no, column, gutter = gutter)?;
        writeln!(buf, "{:gutter$} |", "", gutter = gutter)?;
        writeln!(buf, "{} | {}", line_no, line)?;
        writeln!(
            buf,
            "{:gutter$} | {:pad$}{}",
            "",
            "",
            "^".repeat(marker_len),
            gutter = gutter,
            pad = column - 1
        )
    }
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "lexical error: {}", err),
            Self::Parse(err) => write!(f, "syntax error: {}", err),
            Self::Compile(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "{}", err),
            Self::Utf8(err) => write!(f, "source is not valid UTF-8: {}", err),
        }
    }
}

impl std::error::Error for JackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Compile(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Utf8(err) => Some(err),
        }
    }
}

impl From<LexError> for JackError {
    fn from(err: LexError) -> Self {
        JackError::Lex(err)
    }
}

/// Lexical errors found while parsing are reported as such.
impl From<ParseError> for JackError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Lex(err) => JackError::Lex(err),
            err => JackError::Parse(err),
        }
    }
}

impl From<CompileError> for JackError {
    fn from(err: CompileError) -> Self {
        JackError::Compile(err)
    }
}

impl From<io::Error> for JackError {
    fn from(err: io::Error) -> Self {
        JackError::Io(err)
    }
}

impl From<Utf8Error> for JackError {
    fn from(err: Utf8Error) -> Self {
        JackError::Utf8(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_report_points_at_span() {
        let source = "class A {\n  let x = y;\n}";
        let err = JackError::Compile(CompileError::UndefinedSymbol {
            name: "y".into(),
            span: Span::new(20, 1),
        });

        assert_eq!(
            err.report(source),
            "error: undefined symbol 'y'\n\
             \x20--> 2:11\n\
             \x20 |\n\
             2 |   let x = y;\n\
             \x20 |           ^\n"
        );
    }

    #[test]
    fn test_report_without_span() {
        let err = JackError::Compile(CompileError::Internal("oops"));
        assert_eq!(err.report(""), "error: internal compiler error: oops\n");
    }

    #[test]
    fn test_parse_lex_error_flattened() {
        let lex = LexError::UnknownCharacter {
            ch: '#',
            span: Span::new(0, 1),
        };
        let err = JackError::from(ParseError::Lex(lex.clone()));
        assert!(matches!(err, JackError::Lex(ref inner) if *inner == lex));
    }
}
