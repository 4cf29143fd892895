use std::fmt::{self, Write};

use crate::{ast::*, types::Type};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string<I: InfoWriter>(program: &Program<I>) -> String {
    let mut buf = String::with_capacity(1024);
    print_program(&mut buf, program).expect("formatting into a string never fails");
    buf
}

pub fn print_expr_string<I: InfoWriter>(expr: &Expr<I>) -> String {
    let mut buf = String::with_capacity(512);
    print_expr(&mut buf, 0, expr).expect("formatting into a string never fails");
    buf
}

pub fn print_program<I: InfoWriter>(w: &mut impl Write, program: &Program<I>) -> fmt::Result {
    for import in &program.imports {
        writeln!(w, "import <{}> ({})", import.header, import.span)?;
    }
    for stmt in &program.statements {
        print_stmt(w, 0, stmt)?;
    }
    Ok(())
}

fn print_stmt<I: InfoWriter>(w: &mut impl Write, i: usize, stmt: &Stmt<I>) -> fmt::Result {
    sp(w, i)?;
    let span = stmt.span;
    match &stmt.kind {
        StmtKind::VarDecl {
            ty,
            name,
            initializer,
        } => {
            writeln!(w, "var {}: {ty} ({span})", name.name)?;
            print_expr(w, i + 1, initializer)?;
        }
        StmtKind::Print(expr) => {
            writeln!(w, "print ({span})")?;
            print_expr(w, i + 1, expr)?;
        }
        StmtKind::If {
            predicate,
            then_arm,
            else_arm,
        } => {
            writeln!(w, "if ({span})")?;
            print_expr(w, i + 1, predicate)?;
            sp(w, i + 1)?;
            writeln!(w, "then")?;
            print_stmt(w, i + 2, then_arm)?;
            if let Some(else_arm) = else_arm {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_stmt(w, i + 2, else_arm)?;
            }
        }
        StmtKind::Block(body) => {
            writeln!(w, "block ({span})")?;
            for stmt in body {
                print_stmt(w, i + 1, stmt)?;
            }
        }
    }
    Ok(())
}

pub fn print_expr<I: InfoWriter>(w: &mut impl Write, i: usize, expr: &Expr<I>) -> fmt::Result {
    sp(w, i)?;
    let info = I::write_info(&expr.info); // inferred type, for typed ASTs
    let span = expr.span;
    match &expr.kind {
        ExprKind::Int(val) => writeln!(w, "int {val} ({span}{info})")?,
        ExprKind::Float(val) => writeln!(w, "float {val:?} ({span}{info})")?,
        ExprKind::String(val) => writeln!(w, "string {val:?} ({span}{info})")?,
        ExprKind::Bool(val) => writeln!(w, "bool {val} ({span}{info})")?,
        ExprKind::Id(ident) => writeln!(w, "ident {} ({span}{info})", ident.name)?,
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span}{info})")?;
            print_expr(w, i + 1, lhs)?;
            print_expr(w, i + 1, rhs)?;
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> fmt::Result {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

/// Renders the information attached to each expression.
pub trait InfoWriter: Info {
    fn write_info(info: &Self::Expr) -> impl fmt::Display;
}

impl InfoWriter for Untyped {
    fn write_info(_: &()) -> impl fmt::Display {
        ""
    }
}

impl InfoWriter for Typed {
    fn write_info(ty: &Type) -> impl fmt::Display {
        struct TypeWriter(Type);

        impl fmt::Display for TypeWriter {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, " %: {}", self.0)
            }
        }

        TypeWriter(*ty)
    }
}
