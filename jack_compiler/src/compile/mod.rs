//! Code generation.
mod codegen;
mod ir;
mod labels;
mod symbol;

pub use codegen::{resolve_call, CodeGen, Receiver, ResolvedCall, MAX_INT};
pub use ir::{render, ArithOp, Segment, IR};
pub use labels::LabelGen;
pub use symbol::{StorageClass, Symbol, SymbolTable};

use crate::tokens::Span;
use smol_str::SmolStr;
use std::{error, fmt};

/// Configuration for the code generator.
#[derive(Debug, Clone, Default)]
pub struct CompilerConf {
    /// Interleave comments describing subroutines and
    /// statements with the generated code.
    pub annotate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Name already defined in the same scope.
    DuplicateSymbol { name: SmolStr, span: Span },
    /// Variable used without being declared.
    UndefinedSymbol { name: SmolStr, span: Span },
    /// Integer constant doesn't fit the target word.
    IntegerOverflow { text: SmolStr, span: Span },
    /// Character in a string constant whose code doesn't fit the target word.
    InvalidCharacter { ch: char, span: Span },
    /// String constant longer than the largest integer constant.
    StringTooLong { len: usize, span: Span },
    /// More arguments than a call instruction can pass.
    TooManyArguments { name: SmolStr, span: Span },
    /// Code generator reached a state it can't handle.
    Internal(&'static str),
}

impl CompileError {
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::DuplicateSymbol { span, .. }
            | CompileError::UndefinedSymbol { span, .. }
            | CompileError::IntegerOverflow { span, .. }
            | CompileError::InvalidCharacter { span, .. }
            | CompileError::StringTooLong { span, .. }
            | CompileError::TooManyArguments { span, .. } => Some(*span),
            CompileError::Internal(_) => None,
        }
    }
}

impl error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::DuplicateSymbol { name, .. } => {
                write!(f, "symbol '{}' is already defined in this scope", name)
            }
            CompileError::UndefinedSymbol { name, .. } => write!(f, "undefined symbol '{}'", name),
            CompileError::IntegerOverflow { text, .. } => {
                write!(f, "integer constant {} exceeds maximum {}", text, MAX_INT)
            }
            CompileError::InvalidCharacter { ch, .. } => write!(
                f,
                "character {:?} in string constant has code {} which exceeds maximum {}",
                ch, *ch as u32, MAX_INT
            ),
            CompileError::StringTooLong { len, .. } => {
                write!(f, "string constant of length {} exceeds maximum {}", len, MAX_INT)
            }
            CompileError::TooManyArguments { name, .. } => {
                write!(f, "too many arguments in call to '{}'", name)
            }
            CompileError::Internal(msg) => write!(f, "internal compiler error: {}", msg),
        }
    }
}
