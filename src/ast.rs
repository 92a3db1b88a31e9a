use std::fmt;
use std::rc::Rc;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "Mod",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Greater => ">",
            BinaryOp::Less => "<",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::LessEq => "<=",
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Declared type of a variable or parameter. `Auto` marks an untyped
/// parameter whose type is adopted from the argument at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Real,
    String,
    Auto,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "Integer"),
            DataType::Real => write!(f, "Real"),
            DataType::String => write!(f, "String"),
            DataType::Auto => write!(f, "Auto"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Rc<str>,
    pub data_type: DataType,
    pub is_reference: bool,
    pub is_array: bool,
}

/// One name in a `Declare`/`Constant` list, with optional array size and
/// initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Rc<str>,
    pub size: Option<Expr>,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    Expr(Expr),
    Tap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Value),
    Identifier(Rc<str>),
    ArrayLiteral(Vec<Expr>),
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Grouping(Box<Expr>),
    Unary {
        op: UnaryOp,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Call {
        callee: Rc<str>,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Declaration {
        data_type: DataType,
        is_constant: bool,
        declarators: Vec<Declarator>,
    },
    Assignment {
        target: Expr,
        value: Expr,
    },
    Display {
        items: Vec<DisplayItem>,
    },
    Input {
        name: Rc<str>,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        condition: Expr,
    },
    DoUntil {
        body: Vec<Stmt>,
        condition: Expr,
    },
    For {
        counter: Rc<str>,
        start: Expr,
        end: Expr,
        body: Vec<Stmt>,
    },
    Module {
        name: Rc<str>,
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    Function {
        name: Rc<str>,
        return_type: DataType,
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    Call {
        name: Rc<str>,
        args: Vec<Expr>,
    },
    Return(Expr),
}

/// Source-mirroring rendering, used for flowchart node labels.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(value) => match value {
                Value::String(s) => write!(f, "\"{}\"", s),
                other => write!(f, "{}", crate::value::value_to_string(other)),
            },
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::ArrayLiteral(elements) => {
                let rendered: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", rendered.join(", "))
            }
            ExprKind::ArrayAccess { array, index } => write!(f, "{}[{}]", array, index),
            ExprKind::Grouping(inner) => write!(f, "({})", inner),
            ExprKind::Unary { op, right } => match op {
                UnaryOp::Neg => write!(f, "-{}", right),
                UnaryOp::Not => write!(f, "Not {}", right),
            },
            ExprKind::Binary { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            ExprKind::Call { callee, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", callee, rendered.join(", "))
            }
        }
    }
}
