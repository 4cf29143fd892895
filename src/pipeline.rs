//! Runs the stages in order, stopping at the first fatal error.
//!
//! Each call owns its buffers, so independent compilations don't share any
//! state.

use log::debug;
use thiserror::Error;

use crate::{
    ast::{Program, Untyped},
    code_gen::{self, CodeGen},
    diagnostics::Diagnostic,
    lexer, parser,
    token::{Span, Spanned},
    type_checker::{self, Checked, Checker},
};

const TARGET: &str = "humanscript::pipeline";

/// Generated C++ code along with every non-fatal diagnostic.
#[derive(Debug)]
pub struct Compilation {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0:#}")]
    Parse(Spanned<parser::Error>),
    #[error("{0:#}")]
    Check(Spanned<type_checker::Error>),
    #[error("{0}")]
    Generate(code_gen::Error),
}

impl CompileError {
    /// Location of the problem in the source, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Parse(error) => Some(error.span),
            CompileError::Check(error) => Some(error.span),
            CompileError::Generate(_) => None,
        }
    }
}

pub fn compile(src: &str) -> Result<Compilation, CompileError> {
    let mut diagnostics = Vec::new();
    let checked = check(src, &mut diagnostics)?;

    debug!(target: TARGET, "generating code");
    let code = CodeGen::new()
        .gen(&checked.program)
        .map_err(CompileError::Generate)?;
    debug!(target: TARGET, "generated {} bytes", code.len());

    Ok(Compilation { code, diagnostics })
}

/// Lexes and parses `src`. Lexer diagnostics are logged and appended to
/// `diagnostics`, even if parsing fails.
pub fn parse(
    src: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Program<Untyped>, CompileError> {
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    let mut lex_errors = Vec::new();

    debug!(target: TARGET, "parsing {} bytes", src.len());
    let result = parser::parse_program(src, &mut tokens, &mut lex_errors);
    report(src, diagnostics, lex_errors.iter().map(Diagnostic::from_lexer));

    let program = result.map_err(CompileError::Parse)?;
    debug!(
        target: TARGET,
        "parsed {} tokens into {} imports and {} statements",
        tokens.len(),
        program.imports.len(),
        program.statements.len()
    );
    Ok(program)
}

/// Parses and checks `src`. Checker notes are logged and appended to
/// `diagnostics`.
pub fn check(src: &str, diagnostics: &mut Vec<Diagnostic>) -> Result<Checked, CompileError> {
    let program = parse(src, diagnostics)?;

    debug!(target: TARGET, "checking");
    let checked = Checker::with_capacity(32)
        .check(program)
        .map_err(CompileError::Check)?;
    report(src, diagnostics, checked.notes.iter().map(Diagnostic::from_note));
    debug!(target: TARGET, "{} variables declared", checked.symbols.len());

    Ok(checked)
}

fn report(
    src: &str,
    diagnostics: &mut Vec<Diagnostic>,
    new: impl Iterator<Item = Diagnostic>,
) {
    for diagnostic in new {
        diagnostic.log(src);
        diagnostics.push(diagnostic);
    }
}
