use super::{
    ir::{ArithOp, Segment, IR},
    labels::LabelGen,
    symbol::{StorageClass, SymbolTable},
    CompileError, CompilerConf,
};
use crate::parsing::{
    BinOp, Call, Class, ClassVarKind, DoStmt, Expr, Ident, IfStmt, IntLit, KeywordConst, LetStmt, ReturnStmt, Stmt,
    StrLit, Subroutine, SubroutineKind, Term, UnaryOp, WhileStmt,
};
use crate::tokens::Span;
use log::{debug, trace};
use smol_str::SmolStr;

/// Largest integer constant the target word can hold.
pub const MAX_INT: u16 = 32767;

/// Code generator.
///
/// Walks the syntax tree of one class and emits stack machine code.
/// After any expression is compiled, exactly one value has been
/// added to the operand stack.
pub struct CodeGen {
    conf: CompilerConf,
    /// Resulting generated code.
    code: Vec<IR>,
    symbols: SymbolTable,
    labels: LabelGen,
    /// Name of the class being compiled.
    class_name: SmolStr,
    /// Kind of the subroutine being compiled.
    subroutine_kind: SubroutineKind,
}

/// Call target after resolving the receiver against the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Fully qualified `Class.subroutine` name.
    pub name: SmolStr,
    /// Object passed as the implicit first argument, if any.
    pub receiver: Option<Receiver>,
    /// Number of arguments including the receiver.
    pub n_args: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// The current object.
    This,
    /// Object stored in a variable.
    Var(Segment, u16),
}

impl Receiver {
    fn push(self) -> IR {
        match self {
            Receiver::This => IR::Push(Segment::Pointer, 0),
            Receiver::Var(segment, index) => IR::Push(segment, index),
        }
    }
}

/// Decide what a call refers to.
///
/// - No receiver: method on the current object.
/// - Receiver is a variable: method on that object, looked up by its type.
/// - Otherwise the receiver names a class: function or constructor.
///
/// Fails when the argument count doesn't fit the call instruction.
pub fn resolve_call(call: &Call, symbols: &SymbolTable, class_name: &str) -> Result<ResolvedCall, CompileError> {
    // Room is kept for the receiver.
    let n_args = u16::try_from(call.args.len())
        .ok()
        .filter(|n| *n < u16::MAX)
        .ok_or_else(|| CompileError::TooManyArguments {
            name: call.name.name.clone(),
            span: match &call.receiver {
                Some(receiver) => receiver.span.merge(&call.name.span),
                None => call.name.span,
            },
        })?;

    let resolved = match &call.receiver {
        None => ResolvedCall {
            name: qualified(class_name, call.name.as_str()),
            receiver: Some(Receiver::This),
            n_args: n_args + 1,
        },
        Some(receiver) => match symbols.lookup(receiver.as_str()) {
            Some(symbol) => ResolvedCall {
                name: qualified(&symbol.ty, call.name.as_str()),
                receiver: Some(Receiver::Var(symbol.segment(), symbol.index)),
                n_args: n_args + 1,
            },
            None => ResolvedCall {
                name: qualified(receiver.as_str(), call.name.as_str()),
                receiver: None,
                n_args,
            },
        },
    };

    Ok(resolved)
}

#[inline]
fn qualified(class_name: &str, subroutine: &str) -> SmolStr {
    SmolStr::from(format!("{class_name}.{subroutine}"))
}

impl CodeGen {
    #[inline]
    pub fn new(conf: CompilerConf) -> Self {
        Self {
            conf,
            code: vec![],
            symbols: SymbolTable::new(),
            labels: LabelGen::new(),
            class_name: SmolStr::default(),
            subroutine_kind: SubroutineKind::Function,
        }
    }

    /// Compile a class into instructions.
    ///
    /// The generator is reset first, so it can be reused
    /// for more than one class.
    pub fn compile(&mut self, class: &Class) -> Result<Vec<IR>, CompileError> {
        self.reset();
        self.emit_class(class)?;
        Ok(std::mem::take(&mut self.code))
    }

    /// Clear the internal state so the code generator can be reused.
    pub fn reset(&mut self) {
        self.code.clear();
        self.symbols.reset();
        self.labels.reset();
        self.class_name = SmolStr::default();
    }

    fn emit(&mut self, ir: IR) {
        trace!("{}", ir);
        self.code.push(ir)
    }

    fn annotate(&mut self, text: impl FnOnce() -> String) {
        if self.conf.annotate {
            self.emit(IR::Comment(text()));
        }
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new(CompilerConf::default())
    }
}

/// Recursive visitor
impl CodeGen {
    fn emit_class(&mut self, class: &Class) -> Result<(), CompileError> {
        debug!("compile class {}", class.name.as_str());
        self.class_name = class.name.name.clone();

        for dec in &class.vars {
            let kind = match dec.kind {
                ClassVarKind::Static => StorageClass::Static,
                ClassVarKind::Field => StorageClass::Field,
            };
            for name in &dec.names {
                self.symbols.define(name.name.clone(), dec.ty.name(), kind, name.span)?;
            }
        }

        for subroutine in &class.subroutines {
            self.emit_subroutine(subroutine)?;
        }

        Ok(())
    }

    fn emit_subroutine(&mut self, subroutine: &Subroutine) -> Result<(), CompileError> {
        debug!(
            "compile {} {}.{}",
            subroutine.kind,
            self.class_name,
            subroutine.name.as_str()
        );

        self.symbols.start_subroutine();
        self.labels.reset();
        self.subroutine_kind = subroutine.kind;

        if subroutine.kind == SubroutineKind::Method {
            // The receiver is always argument 0.
            let class_name = self.class_name.clone();
            let receiver = self
                .symbols
                .define("this", class_name, StorageClass::Argument, subroutine.name.span)?;
            if receiver.index != 0 {
                return Err(CompileError::Internal("method receiver is not argument 0"));
            }
        }
        for param in &subroutine.params {
            self.symbols
                .define(param.name.name.clone(), param.ty.name(), StorageClass::Argument, param.name.span)?;
        }
        for dec in &subroutine.locals {
            for name in &dec.names {
                self.symbols
                    .define(name.name.clone(), dec.ty.name(), StorageClass::Local, name.span)?;
            }
        }

        self.annotate(|| format!("{} {}", subroutine.kind, subroutine.name.as_str()));
        let n_locals = self.symbols.count_of(StorageClass::Local);
        self.emit(IR::Function(
            qualified(&self.class_name, subroutine.name.as_str()),
            n_locals,
        ));

        match subroutine.kind {
            SubroutineKind::Method => {
                self.emit(IR::Push(Segment::Argument, 0));
                self.emit(IR::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.count_of(StorageClass::Field);
                self.emit(IR::Push(Segment::Constant, n_fields));
                self.emit(IR::Call("Memory.alloc".into(), 1));
                self.emit(IR::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Function => {}
        }

        self.emit_stmts(&subroutine.body)?;

        // Falling off the end of the body behaves like a bare `return;`.
        if !matches!(subroutine.body.last(), Some(Stmt::Return(_))) {
            self.emit_bare_return();
        }

        Ok(())
    }

    fn emit_stmts(&mut self, stmts: &[Stmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        self.annotate(|| stmt.name().to_string());

        match stmt {
            Stmt::Let(stmt) => self.emit_let(stmt),
            Stmt::If(stmt) => self.emit_if(stmt),
            Stmt::While(stmt) => self.emit_while(stmt),
            Stmt::Do(stmt) => self.emit_do(stmt),
            Stmt::Return(stmt) => self.emit_return(stmt),
        }
    }

    fn emit_let(&mut self, stmt: &LetStmt) -> Result<(), CompileError> {
        let target = self.lookup_var(&stmt.target)?;

        match &stmt.index {
            None => {
                self.emit_expr(&stmt.value)?;
                self.emit(IR::Pop(target.0, target.1));
            }
            Some(index) => {
                // Address is computed before the value, and stashed while
                // the value is evaluated, because the value may itself
                // move the `that` pointer.
                self.emit_expr(index)?;
                self.emit(IR::Push(target.0, target.1));
                self.emit(IR::Op(ArithOp::Add));
                self.emit_expr(&stmt.value)?;
                self.emit(IR::Pop(Segment::Temp, 0));
                self.emit(IR::Pop(Segment::Pointer, 1));
                self.emit(IR::Push(Segment::Temp, 0));
                self.emit(IR::Pop(Segment::That, 0));
            }
        }

        Ok(())
    }

    fn emit_if(&mut self, stmt: &IfStmt) -> Result<(), CompileError> {
        let id = self.labels.next_id("IF");
        let end_label = LabelGen::label("IF_END", id);

        self.emit_expr(&stmt.cond)?;
        self.emit(IR::Op(ArithOp::Not));

        match &stmt.else_body {
            None => {
                self.emit(IR::IfGoto(end_label.clone()));
                self.emit_stmts(&stmt.then_body)?;
            }
            Some(else_body) => {
                let false_label = LabelGen::label("IF_FALSE", id);
                self.emit(IR::IfGoto(false_label.clone()));
                self.emit_stmts(&stmt.then_body)?;
                self.emit(IR::Goto(end_label.clone()));
                self.emit(IR::Label(false_label));
                self.emit_stmts(else_body)?;
            }
        }

        self.emit(IR::Label(end_label));
        Ok(())
    }

    fn emit_while(&mut self, stmt: &WhileStmt) -> Result<(), CompileError> {
        let id = self.labels.next_id("WHILE");
        let exp_label = LabelGen::label("WHILE_EXP", id);
        let end_label = LabelGen::label("WHILE_END", id);

        self.emit(IR::Label(exp_label.clone()));
        self.emit_expr(&stmt.cond)?;
        self.emit(IR::Op(ArithOp::Not));
        self.emit(IR::IfGoto(end_label.clone()));
        self.emit_stmts(&stmt.body)?;
        self.emit(IR::Goto(exp_label));
        self.emit(IR::Label(end_label));

        Ok(())
    }

    fn emit_do(&mut self, stmt: &DoStmt) -> Result<(), CompileError> {
        self.emit_call(&stmt.call)?;
        // Every subroutine returns a value, discard it.
        self.emit(IR::Pop(Segment::Temp, 0));
        Ok(())
    }

    fn emit_return(&mut self, stmt: &ReturnStmt) -> Result<(), CompileError> {
        match &stmt.expr {
            Some(expr) => {
                self.emit_expr(expr)?;
                self.emit(IR::Return);
            }
            None => self.emit_bare_return(),
        }
        Ok(())
    }

    /// Constructors hand back the new object, everything else returns 0.
    fn emit_bare_return(&mut self) {
        if self.subroutine_kind == SubroutineKind::Constructor {
            self.emit(IR::Push(Segment::Pointer, 0));
        } else {
            self.emit(IR::Push(Segment::Constant, 0));
        }
        self.emit(IR::Return);
    }

    fn emit_call(&mut self, call: &Call) -> Result<(), CompileError> {
        let resolved = resolve_call(call, &self.symbols, &self.class_name)?;

        if let Some(receiver) = resolved.receiver {
            self.emit(receiver.push());
        }
        for arg in &call.args {
            self.emit_expr(arg)?;
        }
        self.emit(IR::Call(resolved.name, resolved.n_args));

        Ok(())
    }

    /// Operands are evaluated strictly left to right, with each
    /// operator applied as soon as its right hand term is on the stack.
    fn emit_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        self.emit_term(&expr.first)?;

        for (op, term) in &expr.rest {
            self.emit_term(term)?;
            self.emit_binop(*op);
        }

        Ok(())
    }

    #[rustfmt::skip]
    fn emit_binop(&mut self, op: BinOp) {
        let ir = match op {
            BinOp::Add => IR::Op(ArithOp::Add),
            BinOp::Sub => IR::Op(ArithOp::Sub),
            BinOp::Mul => IR::Call("Math.multiply".into(), 2),
            BinOp::Div => IR::Call("Math.divide".into(), 2),
            BinOp::And => IR::Op(ArithOp::And),
            BinOp::Or  => IR::Op(ArithOp::Or),
            BinOp::Lt  => IR::Op(ArithOp::Lt),
            BinOp::Gt  => IR::Op(ArithOp::Gt),
            BinOp::Eq  => IR::Op(ArithOp::Eq),
        };
        self.emit(ir);
    }

    fn emit_term(&mut self, term: &Term) -> Result<(), CompileError> {
        match term {
            Term::Int(lit) => self.emit_int(lit),
            Term::Str(lit) => self.emit_str(lit),
            Term::Keyword(constant) => {
                self.emit_keyword_const(*constant);
                Ok(())
            }
            Term::Var(name) => {
                let (segment, index) = self.lookup_var(name)?;
                self.emit(IR::Push(segment, index));
                Ok(())
            }
            Term::Index { name, index } => {
                let (segment, slot) = self.lookup_var(name)?;
                self.emit_expr(index)?;
                self.emit(IR::Push(segment, slot));
                self.emit(IR::Op(ArithOp::Add));
                self.emit(IR::Pop(Segment::Pointer, 1));
                self.emit(IR::Push(Segment::That, 0));
                Ok(())
            }
            Term::Unary { op, term } => {
                self.emit_term(term)?;
                match op {
                    UnaryOp::Neg => self.emit(IR::Op(ArithOp::Neg)),
                    UnaryOp::Not => self.emit(IR::Op(ArithOp::Not)),
                }
                Ok(())
            }
            Term::Paren(expr) => self.emit_expr(expr),
            Term::Call(call) => self.emit_call(call),
        }
    }

    fn emit_int(&mut self, lit: &IntLit) -> Result<(), CompileError> {
        let value = lit
            .digits
            .parse::<u16>()
            .ok()
            .filter(|n| *n <= MAX_INT)
            .ok_or_else(|| CompileError::IntegerOverflow {
                text: lit.digits.clone(),
                span: lit.span,
            })?;
        self.emit(IR::Push(Segment::Constant, value));
        Ok(())
    }

    fn emit_str(&mut self, lit: &StrLit) -> Result<(), CompileError> {
        let len = lit.value.chars().count();
        let len = u16::try_from(len)
            .ok()
            .filter(|n| *n <= MAX_INT)
            .ok_or(CompileError::StringTooLong { len, span: lit.span })?;
        self.emit(IR::Push(Segment::Constant, len));
        self.emit(IR::Call("String.new".into(), 1));

        for (offset, ch) in lit.value.char_indices() {
            let code = u16::try_from(ch as u32)
                .ok()
                .filter(|n| *n <= MAX_INT)
                .ok_or_else(|| CompileError::InvalidCharacter {
                    ch,
                    // Skip the opening quote.
                    span: Span::new(lit.span.index + 1 + offset as u32, ch.len_utf8() as u32),
                })?;
            self.emit(IR::Push(Segment::Constant, code));
            self.emit(IR::Call("String.appendChar".into(), 2));
        }

        Ok(())
    }

    fn emit_keyword_const(&mut self, constant: KeywordConst) {
        match constant {
            KeywordConst::True => {
                // All bits set.
                self.emit(IR::Push(Segment::Constant, 1));
                self.emit(IR::Op(ArithOp::Neg));
            }
            KeywordConst::False | KeywordConst::Null => self.emit(IR::Push(Segment::Constant, 0)),
            KeywordConst::This => self.emit(IR::Push(Segment::Pointer, 0)),
        }
    }

    fn lookup_var(&self, name: &Ident) -> Result<(Segment, u16), CompileError> {
        self.symbols
            .lookup(name.as_str())
            .map(|symbol| (symbol.segment(), symbol.index))
            .ok_or_else(|| CompileError::UndefinedSymbol {
                name: name.name.clone(),
                span: name.span,
            })
    }
}
