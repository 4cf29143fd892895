use std::{collections::HashMap, fmt};

use crate::token::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// 32-bit signed integer.
    Number,
    /// 64-bit signed integer. Also the type of every integer literal.
    LNumber,
    Text,
    Logic,
    /// 64-bit float.
    Riel,
    Void,
    Unknown,
}

impl Type {
    pub const fn name(self) -> &'static str {
        match self {
            Type::Number => "number",
            Type::LNumber => "lnumber",
            Type::Text => "text",
            Type::Logic => "logic",
            Type::Riel => "riel",
            Type::Void => "void",
            Type::Unknown => "unknown",
        }
    }

    pub const fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Whether a value of this type exists at all.
    pub const fn is_valued(self) -> bool {
        !matches!(self, Type::Void | Type::Unknown)
    }

    /// Widening order: `number < lnumber < riel`.
    const fn numeric_rank(self) -> Option<u8> {
        match self {
            Type::Number => Some(0),
            Type::LNumber => Some(1),
            Type::Riel => Some(2),
            _ => None,
        }
    }

    /// Returns the widest of two numeric types, or `None` if any of them
    /// isn't numeric.
    pub fn widest(self, other: Type) -> Option<Type> {
        let lhs = self.numeric_rank()?;
        let rhs = other.numeric_rank()?;
        Some(if lhs >= rhs { self } else { other })
    }

    /// Whether a variable declared as `self` may be initialized with a value
    /// of type `value`.
    ///
    /// Only numeric widening is implicit here; `text` never accepts anything
    /// but `text`.
    pub fn is_assignable(self, value: Type) -> bool {
        match (self, value) {
            (declared, value) if declared == value => true,
            (Type::LNumber, Type::Number) => true,
            (Type::Riel, Type::Number | Type::LNumber) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    /// The declared type (not the initializer's).
    pub ty: Type,
    /// Declaration site.
    pub span: Span,
}

/// The single, flat scope of a program. Blocks and `if` branches don't open
/// new scopes, so a name is declared at most once per program.
#[derive(Debug, Default)]
pub struct SymbolTable {
    map: HashMap<Box<str>, Symbol>,
}

impl SymbolTable {
    pub fn with_capacity(capacity: usize) -> SymbolTable {
        SymbolTable {
            map: HashMap::with_capacity(capacity),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Attempts to define the provided name.
    ///
    /// Fails with the span of the previous definition if the name is already
    /// defined. Existing entries are never touched.
    pub fn define(&mut self, name: &str, ty: Type, span: Span) -> Result<Symbol, Span> {
        if let Some(existing) = self.map.get(name) {
            return Err(existing.span);
        }
        let symbol = Symbol { ty, span };
        self.map.insert(name.into(), symbol);
        Ok(symbol)
    }
}
