#![allow(clippy::items_after_statements)]

use std::fmt;

use crate::{code_gen, lexer, parser, token::Spanned, type_checker};

impl<T> fmt::Display for Spanned<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Spanned { span, inner } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }
        write!(f, "{inner}")
    }
}

impl fmt::Display for lexer::Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use lexer::Error::*;
        match self {
            UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            UnclosedString => write!(f, "unclosed string"),
            IntOverflow => write!(f, "integer literal out of range, using 0"),
            FloatOverflow => write!(f, "float literal out of range, using 0.0"),
        }
    }
}

impl fmt::Display for parser::Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use parser::Error::*;
        match self {
            Unexpected { actual, expected } => {
                write!(f, "expected token {expected:?}, but got {actual:?}")
            }
            UnexpectedTokenInExpr { actual } => {
                write!(f, "unexpected token {actual:?} in expression")
            }
            UnexpectedStatement { actual } => {
                write!(f, "unexpected token {actual:?} at start of statement")
            }
            UnexpectedTopLevel { actual } => {
                write!(f, "unexpected token {actual:?} at top level")
            }
            InvalidImportPath { actual } => {
                write!(f, "invalid token {actual:?} in import path")
            }
            EmptyImportPath => write!(f, "empty import path"),
            UnknownToken => write!(f, "unrecognized token"),
        }
    }
}

impl fmt::Display for type_checker::Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use type_checker::Error::*;
        match self {
            AlreadyDeclared {
                name,
                other_definition_span,
            } => {
                write!(
                    f,
                    "variable {name} already declared at {other_definition_span}"
                )
            }
            UndeclaredName(name) => write!(f, "variable {name} used before declaration"),
            Unassignable {
                name,
                declared,
                actual,
            } => write!(
                f,
                "cannot assign type {actual} to variable {name} of type {declared}"
            ),
            InvalidOperands { op, lhs, rhs } => {
                let op = op.symbol();
                write!(f, "invalid operands for {op}: {lhs} and {rhs}")
            }
            NonLogicPredicate(actual) => {
                write!(f, "if condition must be of type logic, but got {actual}")
            }
            Unprintable(ty) => write!(f, "cannot print an expression of type {ty}"),
        }
    }
}

impl fmt::Display for type_checker::Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use type_checker::Note::*;
        match self {
            Import(header) => write!(f, "processing `use <{header}>;`"),
            Declared { name, ty } => write!(f, "declared variable {name} of type {ty}"),
            Print(ty) => write!(f, "says statement with expression of type {ty}"),
            If => write!(f, "processed if statement"),
            Block => write!(f, "processed block statement"),
        }
    }
}

impl fmt::Display for code_gen::Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            code_gen::Error::UnmappableType(ty) => {
                write!(f, "internal error: type {ty} has no C++ counterpart")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{parser, token::Span};

    #[test]
    fn alternate_prefixes_span() {
        let error = Span::new_of_bounds(3..7).wrap(parser::Error::EmptyImportPath);
        assert_eq!(format!("{error}"), "empty import path");
        assert_eq!(format!("{error:#}"), "3..7: empty import path");
    }
}
