use std::iter::Peekable;

use crate::token::{Literal, Span, Spanned, Token, TokenKind, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// Problems found along the way are recorded in `errors`; none of them stops
/// the lexer, except for an unrecognized character, after which only the
/// [`TokenKind::Unknown`] sentinel and the final [`TokenKind::Eof`] are
/// produced.
pub fn lex(src: &str, tokens: &mut Vec<Token>, errors: &mut Vec<Spanned<Error>>) {
    Lexer::new(src, tokens, errors).lex();
}

/// A convenience function that allocates new buffers per lexed input and
/// returns them.
pub fn lex_in_new(src: &str) -> (Vec<Token>, Vec<Spanned<Error>>) {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    let mut errors = Vec::new();
    lex(src, &mut tokens, &mut errors);
    (tokens, errors)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar(char),
    /// The string token is still produced, holding the text collected up to
    /// the end of the input.
    UnclosedString,
    /// The literal is replaced by zero.
    IntOverflow,
    /// The literal is replaced by zero.
    FloatOverflow,
}

impl Error {
    /// Overflowing literals are degraded to a fallback value and only warned
    /// about.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::IntOverflow | Error::FloatOverflow)
    }
}

struct Lexer<'src, 'buf> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    /// Value of the literal currently being scanned, if any.
    pending: Option<Literal>,
    tokens: &'buf mut Vec<Token>,
    errors: &'buf mut Vec<Spanned<Error>>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted or an unknown
    /// character is found.
    fn lex(mut self) {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            self.skip_trivia();
            let next = self.scan_token_kind();
            self.produce(next);
            match next {
                TokenKind::Eof => break,
                TokenKind::Unknown => {
                    self.current_lo = self.cursor;
                    self.produce(TokenKind::Eof);
                    break;
                }
                _ => (),
            }
        }
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        if self.is_at_end() {
            self.current_lo = self.cursor;
            return Eof;
        }
        match self.mark_advance() {
            '+' => Plus,
            ';' => Semicolon,
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '<' => Less,
            '>' => Greater,
            '.' => Dot,
            '/' => Slash,
            ':' if self.peek() == '=' => self.advance_with(ColonEq),
            '?' if self.peek() == '=' => self.advance_with(QuestionEq),
            '"' => self.string(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c if c.is_ascii_digit() => self.number(),
            c => {
                self.error(Error::UnexpectedChar(c));
                Unknown
            }
        }
    }

    /// Skips whitespace and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                c if c.is_ascii_whitespace() => {
                    self.advance();
                }
                '/' if self.peek_second() == '/' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Lexes a string literal, decoding its escape sequences on the fly.
    ///
    /// An unclosed string is reported but still produces a string token with
    /// whatever was collected.
    fn string(&mut self) -> TokenKind {
        let mut buf = String::new();
        loop {
            if self.is_at_end() {
                self.error(Error::UnclosedString);
                break;
            }
            match self.advance() {
                '"' => break,
                '\\' if self.is_at_end() => {
                    self.error(Error::UnclosedString);
                    break;
                }
                '\\' => match self.advance() {
                    'n' => buf.push('\n'),
                    't' => buf.push('\t'),
                    // Covers `\"` and `\\`. Unknown escapes keep the escaped
                    // character.
                    other => buf.push(other),
                },
                c => buf.push(c),
            }
        }
        self.pending = Some(Literal::String(buf.into_boxed_str()));
        TokenKind::String
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';

        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        match KEYWORDS.get(self.substr()).copied() {
            Some(TokenKind::True) => {
                self.pending = Some(Literal::Bool(true));
                TokenKind::True
            }
            Some(TokenKind::False) => {
                self.pending = Some(Literal::Bool(false));
                TokenKind::False
            }
            Some(keyword) => keyword,
            None => TokenKind::Identifier,
        }
    }

    /// Lexes an integer or a float literal. A dot is only part of the number
    /// if digits follow it.
    fn number(&mut self) -> TokenKind {
        self.digits();
        if self.peek() == '.' && self.peek_second().is_ascii_digit() {
            self.advance();
            self.digits();
            return self.float();
        }
        let value = self.substr().parse::<i64>().unwrap_or_else(|_| {
            self.error(Error::IntOverflow);
            0
        });
        self.pending = Some(Literal::Int(value));
        TokenKind::Int
    }

    fn float(&mut self) -> TokenKind {
        let value = match self.substr().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                self.error(Error::FloatOverflow);
                0.0
            }
        };
        self.pending = Some(Literal::Float(value));
        TokenKind::Float
    }

    fn digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'buf>(
        src: &'src str,
        tokens: &'buf mut Vec<Token>,
        errors: &'buf mut Vec<Spanned<Error>>,
    ) -> Lexer<'src, 'buf> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            pending: None,
            tokens,
            errors,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Whether the whole input was consumed. `'\0'` is an ordinary char here.
    fn is_at_end(&mut self) -> bool {
        self.iter.peek().is_none()
    }

    /// Returns the next char and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next char without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the char after the next one without advancing the iterator.
    fn peek_second(&self) -> char {
        self.src[self.cursor..].chars().nth(1).unwrap_or('\0')
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    /// Records an error spanning the current marked bounds.
    fn error(&mut self, error: Error) {
        self.errors.push(self.span().wrap(error));
    }

    /// Produces a token using the marked bounds and the pending literal value.
    fn produce(&mut self, kind: TokenKind) {
        let value = self.pending.take();
        self.tokens.push(Token::new(kind, value, self.span()));
    }
}
