//! Header planning. Runs before any code is emitted.

use crate::{
    ast::{Expr, ExprKind, Program, Stmt, StmtKind, Typed},
    types::Type,
};

const STRING: &str = "string";
const IOSTREAM: &str = "iostream";
const IOMANIP: &str = "iomanip";

/// Headers of a generated program, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imports {
    /// Headers named by `use` directives, in source order.
    pub explicit: Vec<Box<str>>,
    /// Headers the generated code needs but the source doesn't import.
    pub auto: Vec<AutoInclude>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AutoInclude {
    pub header: &'static str,
    pub reason: &'static str,
}

impl Imports {
    /// Whether `header` ends up included, explicitly or not.
    pub fn includes(&self, header: &str) -> bool {
        self.is_explicit(header) || self.auto.iter().any(|auto| auto.header == header)
    }

    fn is_explicit(&self, header: &str) -> bool {
        self.explicit.iter().any(|explicit| &**explicit == header)
    }

    /// Adds `header` unless it's already included.
    fn require(&mut self, header: &'static str, reason: &'static str) {
        if !self.includes(header) {
            self.auto.push(AutoInclude { header, reason });
        }
    }
}

/// Computes the headers the program needs.
///
/// Text values need `<string>`. Printing needs `<iostream>`, `<iomanip>` for
/// `std::boolalpha` and `<string>` for `std::to_string`.
pub fn required_imports(program: &Program<Typed>) -> Imports {
    let mut usage = Usage::default();
    for stmt in &program.statements {
        usage.scan_stmt(stmt);
    }

    let mut imports = Imports {
        explicit: program
            .imports
            .iter()
            .map(|import| import.header.clone())
            .collect(),
        auto: Vec::new(),
    };

    if usage.text {
        imports.require(STRING, "Auto-included for text values");
    }
    if usage.print {
        imports.require(IOSTREAM, "Auto-included for 'says'");
        imports.require(IOMANIP, "Auto-included for std::boolalpha");
        imports.require(STRING, "Auto-included for std::to_string");
    }

    imports
}

#[derive(Debug, Default)]
struct Usage {
    text: bool,
    print: bool,
}

impl Usage {
    fn scan_stmt(&mut self, stmt: &Stmt<Typed>) {
        match &stmt.kind {
            StmtKind::VarDecl {
                ty, initializer, ..
            } => {
                self.text |= *ty == Type::Text;
                self.scan_expr(initializer);
            }
            StmtKind::Print(expr) => {
                self.print = true;
                self.scan_expr(expr);
            }
            StmtKind::If {
                predicate,
                then_arm,
                else_arm,
            } => {
                self.scan_expr(predicate);
                self.scan_stmt(then_arm);
                if let Some(else_arm) = else_arm {
                    self.scan_stmt(else_arm);
                }
            }
            StmtKind::Block(body) => {
                for stmt in body {
                    self.scan_stmt(stmt);
                }
            }
        }
    }

    fn scan_expr(&mut self, expr: &Expr<Typed>) {
        self.text |= expr.ty() == Type::Text;
        if let ExprKind::Binary { lhs, rhs, .. } = &expr.kind {
            self.scan_expr(lhs);
            self.scan_expr(rhs);
        }
    }
}
