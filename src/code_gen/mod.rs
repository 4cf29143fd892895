use std::{
    fmt::{self, Write},
    format_args as f,
};

use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Program, Stmt, StmtKind, Typed},
    types::Type,
};

pub mod imports;


const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB
const INDENT: &str = "    ";

pub const BANNER: &str = "// Generated by HumanScript Compiler";

type Result<T, E = Error> = std::result::Result<T, E>;

/// Emits C++17 from a checked program.
pub struct CodeGen {
    code: String,
    level: usize,
}

impl CodeGen {
    pub fn new() -> CodeGen {
        CodeGen {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            level: 0,
        }
    }

    pub fn gen(mut self, program: &Program<Typed>) -> Result<String> {
        let imports = imports::required_imports(program);
        self.gen_prologue(&imports);
        self.gen_main(program, imports.includes("iostream"))?;

        Ok(self.code)
    }

    fn gen_prologue(&mut self, imports: &imports::Imports) {
        self.out(BANNER);
        self.out_line();

        for header in &imports.explicit {
            self.out(f!("#include <{header}>"));
        }
        for auto in &imports.auto {
            self.out(f!("#include <{}> // {}", auto.header, auto.reason));
        }
        if !imports.explicit.is_empty() || !imports.auto.is_empty() {
            self.out_line();
        }
    }

    fn gen_main(&mut self, program: &Program<Typed>, has_iostream: bool) -> Result<()> {
        self.out("int main() {");
        self.indented(|this| -> Result<()> {
            if has_iostream {
                this.out("std::cout << std::boolalpha;");
            }
            for stmt in &program.statements {
                this.gen_stmt(stmt)?;
            }
            this.out("return 0;");
            Ok(())
        })?;
        self.out("}");
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt<Typed>) -> Result<()> {
        match &stmt.kind {
            StmtKind::VarDecl {
                ty,
                name,
                initializer,
            } => {
                // C++ widens numeric initializers on its own.
                let ty = cpp_type(*ty)?;
                let value = expr(initializer);
                self.out(f!("{ty} {} = {value};", name.name));
            }
            StmtKind::Print(operand) => {
                let code = expr(operand);
                let code = match operand.ty() {
                    Type::Void | Type::Unknown => format!("std::to_string({code})"),
                    _ => code,
                };
                self.out(f!("std::cout << {code} << std::endl;"));
            }
            StmtKind::If {
                predicate,
                then_arm,
                else_arm,
            } => {
                let cond = expr(predicate);
                if matches!(predicate.kind, ExprKind::Binary { .. }) {
                    // Already parenthesized.
                    self.out(f!("if {cond} {{"));
                } else {
                    self.out(f!("if ({cond}) {{"));
                }
                self.indented(|this| this.gen_arm(then_arm))?;
                if let Some(else_arm) = else_arm {
                    self.out("} else {");
                    self.indented(|this| this.gen_arm(else_arm))?;
                }
                self.out("}");
            }
            StmtKind::Block(body) => {
                self.out("{");
                self.indented(|this| this.gen_stmts(body))?;
                self.out("}");
            }
        }
        Ok(())
    }

    /// Generates the inside of an `if` arm. Arms are always braced, so a block
    /// arm doesn't get a second pair of braces.
    fn gen_arm(&mut self, arm: &Stmt<Typed>) -> Result<()> {
        match &arm.kind {
            StmtKind::Block(body) => self.gen_stmts(body),
            _ => self.gen_stmt(arm),
        }
    }

    fn gen_stmts(&mut self, stmts: &[Stmt<Typed>]) -> Result<()> {
        for stmt in stmts {
            self.gen_stmt(stmt)?;
        }
        Ok(())
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        CodeGen::new()
    }
}

// Utility functions.
impl CodeGen {
    /// Emits an indented line.
    fn out(&mut self, line: impl fmt::Display) {
        for _ in 0..self.level {
            self.code.push_str(INDENT);
        }
        self.emit(f!("{line}\n"));
    }

    /// Emits an empty line.
    fn out_line(&mut self) {
        self.code.push('\n');
    }

    fn emit(&mut self, f: fmt::Arguments<'_>) {
        self.code
            .write_fmt(f)
            .expect("code emit should be infallible");
    }

    /// Runs `f` one indentation level deeper.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.level += 1;
        let res = f(self);
        self.level -= 1;
        res
    }
}

/// Maps a type to its C++ spelling.
pub fn cpp_type(ty: Type) -> Result<&'static str> {
    let name = match ty {
        Type::Number => "int",
        Type::LNumber => "long long",
        Type::Text => "std::string",
        Type::Logic => "bool",
        Type::Riel => "double",
        Type::Void => "void",
        Type::Unknown => return Err(Error::UnmappableType(ty)),
    };
    Ok(name)
}

/// Returns the C++ code of an expression. Binary operations are always
/// parenthesized.
fn expr(e: &Expr<Typed>) -> String {
    match &e.kind {
        // Tagged so that big literals aren't truncated.
        ExprKind::Int(int) => format!("{int}LL"),
        ExprKind::Float(float) => float_literal(*float),
        ExprKind::String(string) => string_literal(string),
        ExprKind::Bool(bool) => bool.to_string(),
        ExprKind::Id(ident) => ident.name.to_string(),
        ExprKind::Binary { op, lhs, rhs } => {
            let (op, lhs_code, rhs_code) = match op {
                BinaryOperator::Add if e.ty() == Type::Text => {
                    ("+", textified(lhs), textified(rhs))
                }
                BinaryOperator::Add => ("+", expr(lhs), expr(rhs)),
                BinaryOperator::Eq => ("==", expr(lhs), expr(rhs)),
            };
            // Two string literals would otherwise be operated on as pointers.
            let lhs_code = if is_string_literal(lhs) && is_string_literal(rhs) {
                format!("std::string({lhs_code})")
            } else {
                lhs_code
            };
            format!("({lhs_code} {op} {rhs_code})")
        }
    }
}

/// Returns the code of `e` as a `std::string` expression, converting it if
/// needed.
fn textified(e: &Expr<Typed>) -> String {
    let code = expr(e);
    match e.ty() {
        Type::Text => code,
        // Same rendering as `std::boolalpha`.
        Type::Logic => format!("std::string({code} ? \"true\" : \"false\")"),
        _ => format!("std::to_string({code})"),
    }
}

fn is_string_literal(e: &Expr<Typed>) -> bool {
    matches!(e.kind, ExprKind::String(_))
}

/// Renders a float so that C++ reads it back as a `double`.
fn float_literal(float: f64) -> String {
    let mut s = format!("{float:?}");
    if !s.contains(['.', 'e', 'E']) {
        s.push_str(".0");
    }
    s
}

fn string_literal(string: &str) -> String {
    let mut s = String::with_capacity(string.len() + 2);
    s.push('"');
    for c in string.chars() {
        match c {
            '"' => s.push_str("\\\""),
            '\\' => s.push_str("\\\\"),
            '\n' => s.push_str("\\n"),
            '\r' => s.push_str("\\r"),
            '\t' => s.push_str("\\t"),
            // Three octal digits, so a following digit isn't absorbed.
            '\0' => s.push_str("\\000"),
            c => s.push(c),
        }
    }
    s.push('"');
    s
}

/// Problems that can only come from a defect in an earlier stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnmappableType(Type),
}
