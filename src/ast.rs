// program    ::= import* statement*
// import     ::= 'use' '<' path '>' ';'
// path       ::= (ID | INT | '.' | '/')+
// statement  ::= TYPE ID ':=' expr ';'
//              | 'says' expr ';'
//              | 'if' '(' expr ')' statement ['else' statement]
//              | '{' statement* '}'
// expr       ::= expr '?=' expr
//              | expr '+' expr
//              | '(' expr ')'
//              | ID
//              | integer
//              | float
//              | string
//              | true
//              | false
// TYPE       ::= number | lnumber | text | logic | riel

// Precedence
//
// +
// ?=

use std::fmt;

use crate::{token::Span, types::Type};

/// Describes which information is attached to the tree.
///
/// The parser produces [`Untyped`] trees; the type checker consumes them and
/// builds fresh [`Typed`] ones.
pub trait Info {
    /// Information attached to every expression.
    type Expr: fmt::Debug + Clone + PartialEq;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Untyped;

impl Info for Untyped {
    type Expr = ();
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Typed;

impl Info for Typed {
    /// The inferred type.
    type Expr = Type;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program<I: Info> {
    pub imports: Vec<Import>,
    pub statements: Vec<Stmt<I>>,
}

/// A `use <header>;` directive. Copied to the output as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub header: Box<str>,
    pub is_system: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt<I: Info> {
    pub kind: StmtKind<I>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind<I: Info> {
    VarDecl {
        ty: Type,
        name: Ident,
        initializer: Expr<I>,
    },
    Print(Expr<I>),
    If {
        predicate: Expr<I>,
        then_arm: Box<Stmt<I>>,
        else_arm: Option<Box<Stmt<I>>>,
    },
    /// Doesn't open a new scope.
    Block(Vec<Stmt<I>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr<I: Info> {
    pub kind: ExprKind<I>,
    pub span: Span,
    pub info: I::Expr,
}

impl Expr<Typed> {
    pub fn ty(&self) -> Type {
        self.info
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<I: Info> {
    Int(i64),
    Float(f64),
    String(Box<str>),
    Bool(bool),
    Id(Ident),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr<I>>,
        rhs: Box<Expr<I>>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `?=`
    Eq,
}

impl BinaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Eq => "?=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: Box<str>,
    pub span: Span,
}
