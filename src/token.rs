use std::{fmt, ops::Range};

use crate::types::Type;

#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Decoded value of literal tokens (and of `true`/`false`).
    pub value: Option<Literal>,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, value: Option<Literal>, span: Span) -> Token {
        Token {
            kind,
            value,
            len: span.len,
            lo: span.lo,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    /// Returns the raw source text of this token.
    pub fn text<'src>(&self, src: &'src str) -> &'src str {
        self.span().substr(src)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "Token({:?}, {}, {value:?})", self.kind, self.span()),
            None => write!(f, "Token({:?}, {})", self.kind, self.span()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(Box<str>),
    Bool(bool),
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap_or(u32::MAX))
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn hi(self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span which covers both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new_of_bounds(self.lo.min(other.lo)..self.hi().max(other.hi()))
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }

    /// Returns the one-based line and column of the span start.
    pub fn location(self, src: &str) -> (usize, usize) {
        let before = &src[..self.lo.min(src.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// `number`
    Number,
    /// `lnumber`
    LNumber,
    /// `text`
    Text,
    /// `logic`
    Logic,
    /// `riel`
    Riel,
    Says,
    True,
    False,
    Use,
    If,
    Else,

    Identifier,
    Int,
    Float,
    String,

    /// `:=`
    ColonEq,
    /// `?=`
    QuestionEq,
    Plus,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Less,
    Greater,
    Dot,
    Slash,

    Eof,
    /// Sentinel for a character the lexer doesn't recognize. Lexing stops
    /// right after it.
    Unknown,
}

impl TokenKind {
    /// Returns the declared type named by a type keyword.
    pub fn as_type(self) -> Option<Type> {
        let ty = match self {
            TokenKind::Number => Type::Number,
            TokenKind::LNumber => Type::LNumber,
            TokenKind::Text => Type::Text,
            TokenKind::Logic => Type::Logic,
            TokenKind::Riel => Type::Riel,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether a statement may begin with this token.
    pub fn starts_statement(self) -> bool {
        self.as_type().is_some()
            || matches!(self, TokenKind::Says | TokenKind::If | TokenKind::LBrace)
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "number" => TokenKind::Number,
    "lnumber" => TokenKind::LNumber,
    "text" => TokenKind::Text,
    "logic" => TokenKind::Logic,
    "riel" => TokenKind::Riel,
    "says" => TokenKind::Says,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "use" => TokenKind::Use,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_location() {
        let src = "number a := 1;\n  says a;\n";
        let says = Span::new_of_length(17, 4);
        assert_eq!(says.substr(src), "says");
        assert_eq!(says.location(src), (2, 3));
        assert_eq!(Span::new_of_length(0, 6).location(src), (1, 1));
    }

    #[test]
    fn span_to_covers_both() {
        let a = Span::new_of_bounds(4..6);
        let b = Span::new_of_bounds(10..12);
        assert_eq!(a.to(b), Span::new_of_bounds(4..12));
        assert_eq!(b.to(a), Span::new_of_bounds(4..12));
    }
}
