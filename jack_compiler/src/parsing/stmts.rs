//! Statement parsing.
use super::{Call, Expr, Ident, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Span, Symbol, TokenKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Let(LetStmt),
    If(IfStmt),
    While(WhileStmt),
    Do(DoStmt),
    Return(ReturnStmt),
}

/// Assignment to a variable, or to an array element when
/// an index is present.
///
/// # Example
///
/// ```text
/// let x = 1;
/// let arr[i] = x + 1;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetStmt {
    pub target: Ident,
    pub index: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

/// Subroutine call for its side effects. The result is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStmt {
    pub call: Call,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    /// Location of the `return` keyword.
    pub span: Span,
    pub expr: Option<Expr>,
}

impl Stmt {
    pub fn name(&self) -> &'static str {
        match self {
            Stmt::Let(_) => "let",
            Stmt::If(_) => "if",
            Stmt::While(_) => "while",
            Stmt::Do(_) => "do",
            Stmt::Return(_) => "return",
        }
    }
}

/// Parse statements until the closing brace of the enclosing block.
///
/// The brace itself is left in the stream.
pub fn parse_statements(input: &mut TokenStream) -> Result<Vec<Stmt>, ParseError> {
    let mut stmts = vec![];

    loop {
        match input.peek_kind()? {
            TokenKind::Symbol(Symbol::RightBrace) => break,
            TokenKind::Keyword(
                Keyword::Let | Keyword::If | Keyword::While | Keyword::Do | Keyword::Return,
            ) => stmts.push(Stmt::parse(input)?),
            _ => return Err(input.unexpected("statement or symbol '}'")),
        }
    }

    Ok(stmts)
}

/// Parse a brace delimited block of statements.
fn parse_block(input: &mut TokenStream) -> Result<Vec<Stmt>, ParseError> {
    input.consume_symbol(Symbol::LeftBrace)?;
    let stmts = parse_statements(input)?;
    input.consume_symbol(Symbol::RightBrace)?;
    Ok(stmts)
}

/// Parse a parenthesised condition.
fn parse_cond(input: &mut TokenStream) -> Result<Expr, ParseError> {
    input.consume_symbol(Symbol::LeftParen)?;
    let cond = Expr::parse(input)?;
    input.consume_symbol(Symbol::RightParen)?;
    Ok(cond)
}

impl Parse for Stmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;
        use TokenKind as T;

        match input.peek_kind()? {
            T::Keyword(K::Let) => LetStmt::parse(input).map(Stmt::Let),
            T::Keyword(K::If) => IfStmt::parse(input).map(Stmt::If),
            T::Keyword(K::While) => WhileStmt::parse(input).map(Stmt::While),
            T::Keyword(K::Do) => DoStmt::parse(input).map(Stmt::Do),
            T::Keyword(K::Return) => ReturnStmt::parse(input).map(Stmt::Return),
            _ => Err(input.unexpected("statement")),
        }
    }
}

impl Parse for LetStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume_keyword(Keyword::Let)?;
        let target = Ident::parse(input)?;

        let index = if input.match_symbol(Symbol::LeftBracket) {
            let index = Expr::parse(input)?;
            input.consume_symbol(Symbol::RightBracket)?;
            Some(index)
        } else {
            None
        };

        input.consume_symbol(Symbol::Eq)?;
        let value = Expr::parse(input)?;
        input.consume_symbol(Symbol::Semicolon)?;

        Ok(LetStmt {
            target,
            index,
            value,
        })
    }
}

impl Parse for IfStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume_keyword(Keyword::If)?;
        let cond = parse_cond(input)?;
        let then_body = parse_block(input)?;

        let else_body = if input.match_keyword(Keyword::Else) {
            Some(parse_block(input)?)
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            then_body,
            else_body,
        })
    }
}

impl Parse for WhileStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume_keyword(Keyword::While)?;
        let cond = parse_cond(input)?;
        let body = parse_block(input)?;

        Ok(WhileStmt { cond, body })
    }
}

impl Parse for DoStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume_keyword(Keyword::Do)?;
        let call = Call::parse(input)?;
        input.consume_symbol(Symbol::Semicolon)?;

        Ok(DoStmt { call })
    }
}

impl Parse for ReturnStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume_keyword(Keyword::Return)?;

        let expr = if input.match_symbol(Symbol::Semicolon) {
            None
        } else {
            let expr = Expr::parse(input)?;
            input.consume_symbol(Symbol::Semicolon)?;
            Some(expr)
        };

        Ok(ReturnStmt {
            span: keyword.span,
            expr,
        })
    }
}
