use smol_str::SmolStr;
use std::fmt::{self, Write};

/// Intermediate representation.
///
/// One variant per instruction of the stack based virtual machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IR {
    /// `push segment index`
    Push(Segment, u16),
    /// `pop segment index`
    Pop(Segment, u16),
    /// Arithmetic and logic on the top of the stack.
    Op(ArithOp),
    Label(SmolStr),
    Goto(SmolStr),
    /// Jump when the popped value is not zero.
    IfGoto(SmolStr),
    /// `call name nArgs`
    Call(SmolStr, u16),
    /// `function name nLocals`
    Function(SmolStr, u16),
    Return,
    /// Not an instruction, annotation for the reader.
    Comment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl IR {
    /// Net change in operand stack depth when the instruction runs.
    ///
    /// Calls are counted as popping their arguments and pushing
    /// a single return value.
    pub fn stack_effect(&self) -> i32 {
        match self {
            IR::Push(_, _) => 1,
            IR::Pop(_, _) => -1,
            IR::Op(ArithOp::Neg | ArithOp::Not) => 0,
            IR::Op(_) => -1,
            IR::IfGoto(_) => -1,
            IR::Call(_, n_args) => 1 - *n_args as i32,
            IR::Label(_) | IR::Goto(_) | IR::Function(_, _) | IR::Comment(_) => 0,
            IR::Return => -1,
        }
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self, IR::Comment(_))
    }
}

/// Outputs instruction as VM code.
impl fmt::Display for IR {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IR::Push(seg, index)       => write!(f, "push {} {}", seg, index),
            IR::Pop(seg, index)        => write!(f, "pop {} {}", seg, index),
            IR::Op(op)                 => write!(f, "{}", op),
            IR::Label(label)           => write!(f, "label {}", label),
            IR::Goto(label)            => write!(f, "goto {}", label),
            IR::IfGoto(label)          => write!(f, "if-goto {}", label),
            IR::Call(name, n_args)     => write!(f, "call {} {}", name, n_args),
            IR::Function(name, n_locals) => write!(f, "function {} {}", name, n_locals),
            IR::Return                 => write!(f, "return"),
            IR::Comment(text)          => write!(f, "// {}", text),
        }
    }
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local    => "local",
            Segment::Static   => "static",
            Segment::This     => "this",
            Segment::That     => "that",
            Segment::Pointer  => "pointer",
            Segment::Temp     => "temp",
        })
    }
}

impl fmt::Display for ArithOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Neg => "neg",
            ArithOp::Eq  => "eq",
            ArithOp::Gt  => "gt",
            ArithOp::Lt  => "lt",
            ArithOp::And => "and",
            ArithOp::Or  => "or",
            ArithOp::Not => "not",
        })
    }
}

/// Render instructions as text, one per line.
pub fn render(code: &[IR]) -> String {
    let mut buf = String::new();
    for ir in code {
        // Writing to a String can't fail.
        let _ = writeln!(buf, "{}", ir);
    }
    buf
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render() {
        let code = vec![
            IR::Function("Main.main".into(), 2),
            IR::Comment("let".to_string()),
            IR::Push(Segment::Constant, 7),
            IR::Pop(Segment::Local, 1),
            IR::Label("WHILE_EXP0".into()),
            IR::IfGoto("WHILE_END0".into()),
            IR::Goto("WHILE_EXP0".into()),
            IR::Op(ArithOp::Not),
            IR::Call("Math.multiply".into(), 2),
            IR::Return,
        ];

        assert_eq!(
            render(&code),
            "function Main.main 2\n\
             // let\n\
             push constant 7\n\
             pop local 1\n\
             label WHILE_EXP0\n\
             if-goto WHILE_END0\n\
             goto WHILE_EXP0\n\
             not\n\
             call Math.multiply 2\n\
             return\n"
        );
    }

    #[test]
    fn test_stack_effect() {
        assert_eq!(IR::Push(Segment::This, 0).stack_effect(), 1);
        assert_eq!(IR::Op(ArithOp::Add).stack_effect(), -1);
        assert_eq!(IR::Op(ArithOp::Neg).stack_effect(), 0);
        assert_eq!(IR::Call("String.new".into(), 1).stack_effect(), 0);
        assert_eq!(IR::Call("Sys.halt".into(), 0).stack_effect(), 1);
    }
}
