//! Expressions and terms.
use super::{comma_separated, Ident, IntLit, KeywordConst, Parse, ParseError, StrLit};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Symbol, TokenKind},
};

/// Chain of terms joined by binary operators.
///
/// There is no operator precedence. The chain is grouped strictly
/// from left to right, so `1 + 2 * 3` means `(1 + 2) * 3`.
/// Parentheses are the only way to group otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub first: Term,
    pub rest: Vec<(BinOp, Term)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Int(IntLit),
    Str(StrLit),
    Keyword(KeywordConst),
    /// Plain variable reference.
    Var(Ident),
    /// Array element read, `name[index]`.
    Index { name: Ident, index: Box<Expr> },
    Unary { op: UnaryOp, term: Box<Term> },
    Paren(Box<Expr>),
    Call(Call),
}

/// Subroutine call.
///
/// The receiver is either a class name or a variable holding an
/// object. Which one is decided by the code generator, since it
/// depends on the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub receiver: Option<Ident>,
    pub name: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum BinOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    And, // &
    Or,  // |
    Lt,  // <
    Gt,  // >
    Eq,  // =
}

impl BinOp {
    #[rustfmt::skip]
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol {
            Symbol::Plus    => Some(Self::Add),
            Symbol::Minus   => Some(Self::Sub),
            Symbol::Star    => Some(Self::Mul),
            Symbol::Slash   => Some(Self::Div),
            Symbol::Amp     => Some(Self::And),
            Symbol::Pipe    => Some(Self::Or),
            Symbol::Less    => Some(Self::Lt),
            Symbol::Greater => Some(Self::Gt),
            Symbol::Eq      => Some(Self::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation `-`
    Neg,
    /// Bitwise not `~`
    Not,
}

impl Expr {
    /// Number of terms in the chain, not counting nested expressions.
    pub fn term_count(&self) -> usize {
        1 + self.rest.len()
    }
}

impl Parse for Expr {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let first = Term::parse(input)?;
        let mut rest = vec![];

        while let TokenKind::Symbol(symbol) = input.peek_kind()? {
            match BinOp::from_symbol(symbol) {
                Some(op) => {
                    input.next_token("binary operator")?;
                    rest.push((op, Term::parse(input)?));
                }
                None => break,
            }
        }

        Ok(Expr { first, rest })
    }
}

impl Parse for Term {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;
        use Symbol as S;
        use TokenKind as T;

        // Identifiers need a second token to decide between
        // variable, array element and subroutine call.
        let (kind, next) = input.peek_kind2()?;

        match kind {
            T::Int => IntLit::parse(input).map(Term::Int),
            T::Str => StrLit::parse(input).map(Term::Str),
            T::Keyword(K::True | K::False | K::Null | K::This) => {
                KeywordConst::parse(input).map(Term::Keyword)
            }
            T::Symbol(S::LeftParen) => {
                input.consume_symbol(S::LeftParen)?;
                let expr = Expr::parse(input)?;
                input.consume_symbol(S::RightParen)?;
                Ok(Term::Paren(Box::new(expr)))
            }
            T::Symbol(S::Minus) | T::Symbol(S::Tilde) => {
                input.next_token("unary operator")?;
                let op = if kind.is_symbol(S::Minus) {
                    UnaryOp::Neg
                } else {
                    UnaryOp::Not
                };
                let term = Term::parse(input)?;
                Ok(Term::Unary {
                    op,
                    term: Box::new(term),
                })
            }
            T::Ident => match next {
                T::Symbol(S::LeftBracket) => {
                    let name = Ident::parse(input)?;
                    input.consume_symbol(S::LeftBracket)?;
                    let index = Expr::parse(input)?;
                    input.consume_symbol(S::RightBracket)?;
                    Ok(Term::Index {
                        name,
                        index: Box::new(index),
                    })
                }
                T::Symbol(S::LeftParen) | T::Symbol(S::Dot) => Call::parse(input).map(Term::Call),
                _ => Ident::parse(input).map(Term::Var),
            },
            _ => Err(input.unexpected("expression term")),
        }
    }
}

impl Parse for Call {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let first = Ident::parse(input)?;

        let (receiver, name) = if input.match_symbol(Symbol::Dot) {
            (Some(first), Ident::parse(input)?)
        } else {
            (None, first)
        };

        input.consume_symbol(Symbol::LeftParen)?;
        let args = if input.peek_kind()?.is_symbol(Symbol::RightParen) {
            vec![]
        } else {
            comma_separated(input, Expr::parse)?
        };
        input.consume_symbol(Symbol::RightParen)?;

        Ok(Call {
            receiver,
            name,
            args,
        })
    }
}
