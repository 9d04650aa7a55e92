use super::{ir::Segment, CompileError};
use crate::tokens::Span;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Named variable with its storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Primitive type name, or the name of a class.
    pub ty: SmolStr,
    pub kind: StorageClass,
    /// Slot within the storage class' segment.
    pub index: u16,
}

impl Symbol {
    #[inline]
    pub fn segment(&self) -> Segment {
        self.kind.segment()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Class scope, shared by all instances.
    Static,
    /// Class scope, one per instance.
    Field,
    /// Subroutine scope, passed by the caller.
    Argument,
    /// Subroutine scope, allocated in the frame.
    Local,
}

impl StorageClass {
    #[rustfmt::skip]
    pub fn segment(self) -> Segment {
        match self {
            StorageClass::Static   => Segment::Static,
            StorageClass::Field    => Segment::This,
            StorageClass::Argument => Segment::Argument,
            StorageClass::Local    => Segment::Local,
        }
    }

    #[inline]
    fn is_class_scope(self) -> bool {
        matches!(self, StorageClass::Static | StorageClass::Field)
    }
}

#[derive(Debug, Default)]
struct Scope {
    symbols: HashMap<SmolStr, Symbol>,
}

impl Scope {
    fn count_of(&self, kind: StorageClass) -> u16 {
        self.symbols.values().filter(|s| s.kind == kind).count() as u16
    }
}

/// Two level symbol table.
///
/// The class scope lives for the whole class. The subroutine scope
/// is cleared at the start of each subroutine. Lookups prefer the
/// subroutine scope, so locals and arguments shadow class variables.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class: Scope,
    subroutine: Scope,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the subroutine scope. The class scope is untouched.
    pub fn start_subroutine(&mut self) {
        self.subroutine.symbols.clear();
    }

    /// Clear both scopes, for compiling a new class.
    pub fn reset(&mut self) {
        self.class.symbols.clear();
        self.subroutine.symbols.clear();
    }

    /// Define a new symbol in the scope its storage class belongs to.
    ///
    /// The index is the number of symbols of the same storage
    /// class defined before it.
    pub fn define(
        &mut self,
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        kind: StorageClass,
        span: Span,
    ) -> Result<&Symbol, CompileError> {
        let name = name.into();
        let scope = self.scope_mut(kind);

        if scope.symbols.contains_key(&name) {
            return Err(CompileError::DuplicateSymbol { name, span });
        }

        let symbol = Symbol {
            name: name.clone(),
            ty: ty.into(),
            kind,
            index: scope.count_of(kind),
        };
        log::trace!("define {:?} {} {}: {}", kind, symbol.index, symbol.name, symbol.ty);

        let symbol: &Symbol = scope.symbols.entry(name).or_insert(symbol);
        Ok(symbol)
    }

    /// Find a symbol by name, searching the subroutine
    /// scope before the class scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine
            .symbols
            .get(name)
            .or_else(|| self.class.symbols.get(name))
    }

    /// Number of symbols defined with the given storage class.
    pub fn count_of(&self, kind: StorageClass) -> u16 {
        if kind.is_class_scope() {
            self.class.count_of(kind)
        } else {
            self.subroutine.count_of(kind)
        }
    }

    fn scope_mut(&mut self, kind: StorageClass) -> &mut Scope {
        if kind.is_class_scope() {
            &mut self.class
        } else {
            &mut self.subroutine
        }
    }
}
