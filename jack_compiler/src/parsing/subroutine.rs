use super::{comma_separated, parse_statements, Ident, Parse, ParseError, ReturnType, Stmt, Type};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Symbol, TokenKind},
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subroutine {
    pub kind: SubroutineKind,
    /// `None` when declared `void`.
    pub return_ty: Option<Type>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub locals: Vec<VarDec>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    /// Allocates and returns a new instance.
    Constructor,
    /// Static routine, no receiver.
    Function,
    /// Receives the instance as an implicit first argument.
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: Type,
    pub name: Ident,
}

/// Local variable declaration, `var int a, b;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDec {
    pub ty: Type,
    pub names: Vec<Ident>,
}

impl Subroutine {
    /// Number of local variable slots the subroutine needs.
    pub fn local_count(&self) -> usize {
        self.locals.iter().map(|dec| dec.names.len()).sum()
    }
}

impl fmt::Display for SubroutineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubroutineKind::Constructor => write!(f, "constructor"),
            SubroutineKind::Function => write!(f, "function"),
            SubroutineKind::Method => write!(f, "method"),
        }
    }
}

impl Parse for Subroutine {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;

        let kind = match input.peek_kind()? {
            TokenKind::Keyword(K::Constructor) => SubroutineKind::Constructor,
            TokenKind::Keyword(K::Function) => SubroutineKind::Function,
            TokenKind::Keyword(K::Method) => SubroutineKind::Method,
            _ => return Err(input.unexpected("'constructor', 'function' or 'method'")),
        };
        input.next_token("subroutine declaration")?;

        let return_ty = ReturnType::parse(input)?;
        let name = Ident::parse(input)?;

        input.consume_symbol(Symbol::LeftParen)?;
        let params = if input.peek_kind()?.is_symbol(Symbol::RightParen) {
            vec![]
        } else {
            comma_separated(input, Param::parse)?
        };
        input.consume_symbol(Symbol::RightParen)?;

        // Body
        input.consume_symbol(Symbol::LeftBrace)?;
        let mut locals = vec![];
        while input.peek_kind()?.is_keyword(K::Var) {
            locals.push(VarDec::parse(input)?);
        }
        let body = parse_statements(input)?;
        input.consume_symbol(Symbol::RightBrace)?;

        Ok(Subroutine {
            kind,
            return_ty,
            name,
            params,
            locals,
            body,
        })
    }
}

impl Parse for Param {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let ty = Type::parse(input)?;
        let name = Ident::parse(input)?;
        Ok(Param { ty, name })
    }
}

impl Parse for VarDec {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume_keyword(Keyword::Var)?;
        let ty = Type::parse(input)?;
        let names = comma_separated(input, Ident::parse)?;
        input.consume_symbol(Symbol::Semicolon)?;

        Ok(VarDec { ty, names })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::Lexer;

    fn parse_subroutine(source: &str) -> Result<Subroutine, ParseError> {
        let mut stream = TokenStream::new(Lexer::new(source));
        Subroutine::parse(&mut stream)
    }

    #[test]
    fn test_parse_method() {
        let sub = parse_subroutine(
            "method int sum(int a, Point p) { var int x, y; var boolean z; return a; }",
        )
        .unwrap();

        assert_eq!(sub.kind, SubroutineKind::Method);
        assert_eq!(sub.return_ty, Some(Type::Int));
        assert_eq!(sub.name.as_str(), "sum");
        assert_eq!(sub.params.len(), 2);
        assert!(matches!(sub.params[1].ty, Type::Class(ref ident) if ident.as_str() == "Point"));
        assert_eq!(sub.locals.len(), 2);
        assert_eq!(sub.local_count(), 3);
        assert_eq!(sub.body.len(), 1);
    }

    #[test]
    fn test_parse_void_function_without_params() {
        let sub = parse_subroutine("function void main() { return; }").unwrap();
        assert_eq!(sub.kind, SubroutineKind::Function);
        assert_eq!(sub.return_ty, None);
        assert!(sub.params.is_empty());
        assert_eq!(sub.local_count(), 0);
    }

    #[test]
    fn test_parse_var_after_statement() {
        let err = parse_subroutine("function void f() { let x = 1; var int y; }").unwrap_err();
        match err {
            ParseError::Unexpected { encountered, .. } => {
                assert_eq!(encountered.kind, TokenKind::Keyword(Keyword::Var));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_void_param_rejected() {
        let err = parse_subroutine("function void f(void x) { return; }").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
    }
}
