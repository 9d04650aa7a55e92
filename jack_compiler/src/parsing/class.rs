use super::{comma_separated, Ident, Parse, ParseError, Subroutine, Type};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Symbol, TokenKind},
};

/// Root of the syntax tree. One class per source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: Ident,
    pub vars: Vec<ClassVarDec>,
    pub subroutines: Vec<Subroutine>,
}

/// Class level variable declaration, `field int x, y;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassVarDec {
    pub kind: ClassVarKind,
    pub ty: Type,
    pub names: Vec<Ident>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassVarKind {
    /// Shared by all instances of the class.
    Static,
    /// Per instance.
    Field,
}

impl Class {
    /// Number of fields, which is the size of an instance in words.
    pub fn field_count(&self) -> usize {
        self.vars
            .iter()
            .filter(|dec| dec.kind == ClassVarKind::Field)
            .map(|dec| dec.names.len())
            .sum()
    }
}

impl Parse for Class {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;
        use TokenKind as T;

        input.consume_keyword(K::Class)?;
        let name = Ident::parse(input)?;
        input.consume_symbol(Symbol::LeftBrace)?;

        let mut vars = vec![];
        while let T::Keyword(K::Static | K::Field) = input.peek_kind()? {
            vars.push(ClassVarDec::parse(input)?);
        }

        let mut subroutines = vec![];
        loop {
            match input.peek_kind()? {
                T::Keyword(K::Constructor | K::Function | K::Method) => {
                    subroutines.push(Subroutine::parse(input)?);
                }
                T::Symbol(Symbol::RightBrace) => break,
                _ => return Err(input.unexpected("subroutine declaration or symbol '}'")),
            }
        }
        input.consume_symbol(Symbol::RightBrace)?;

        // Exactly one class per source.
        if input.peek_kind()? != T::EOS {
            return Err(input.unexpected(T::EOS.to_string()));
        }

        Ok(Class {
            name,
            vars,
            subroutines,
        })
    }
}

impl Parse for ClassVarDec {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let kind = match input.peek_kind()? {
            TokenKind::Keyword(Keyword::Static) => ClassVarKind::Static,
            TokenKind::Keyword(Keyword::Field) => ClassVarKind::Field,
            _ => return Err(input.unexpected("'static' or 'field'")),
        };
        input.next_token("class variable declaration")?;

        let ty = Type::parse(input)?;
        let names = comma_separated(input, Ident::parse)?;
        input.consume_symbol(Symbol::Semicolon)?;

        Ok(ClassVarDec { kind, ty, names })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::Lexer;

    fn parse_class(source: &str) -> Result<Class, ParseError> {
        let mut stream = TokenStream::new(Lexer::new(source));
        Class::parse(&mut stream)
    }

    #[test]
    fn test_parse_class_members() {
        let class = parse_class(
            r#"
            class Point {
                field int x, y;
                static int count;
                constructor Point new() { return this; }
                method int getX() { return x; }
                function void reset() { return; }
            }
            "#,
        )
        .unwrap();

        assert_eq!(class.name.as_str(), "Point");
        assert_eq!(class.vars.len(), 2);
        assert_eq!(class.vars[0].kind, ClassVarKind::Field);
        assert_eq!(class.vars[1].kind, ClassVarKind::Static);
        assert_eq!(class.field_count(), 2);
        assert_eq!(class.subroutines.len(), 3);
    }

    #[test]
    fn test_parse_empty_class() {
        let class = parse_class("class Empty {}").unwrap();
        assert!(class.vars.is_empty());
        assert!(class.subroutines.is_empty());
        assert_eq!(class.field_count(), 0);
    }

    #[test]
    fn test_parse_trailing_tokens() {
        let err = parse_class("class A {} class B {}").unwrap_err();
        match err {
            ParseError::Unexpected { encountered, expected } => {
                assert_eq!(encountered.kind, TokenKind::Keyword(Keyword::Class));
                assert_eq!(encountered.span.index, 11);
                assert_eq!(expected, "end of source");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_field_after_subroutine() {
        let err = parse_class("class A { function void f() { return; } field int x; }").unwrap_err();
        assert!(
            matches!(err, ParseError::Unexpected { ref encountered, .. } if encountered.kind == TokenKind::Keyword(Keyword::Field))
        );
    }

    #[test]
    fn test_parse_unclosed_class() {
        let err = parse_class("class A { function void f() { return; }").unwrap_err();
        assert!(matches!(err, ParseError::EndOfSource { .. }));
    }
}
