use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Ident, Import, Program, Stmt, StmtKind, Untyped},
    lexer,
    token::{Literal, Span, Spanned, Token, TokenKind},
    types::Type,
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// The parser stops at the first problem, so a failed parse carries exactly
/// one error.
pub type ParseResult<T> = Result<T>;

/// Lexes and parses a whole program.
///
/// `tokens` must be empty; it is used as the token buffer. Lexer problems are
/// appended to `lex_errors`. Degraded tokens (such as an unclosed string) are
/// still parsed, but the lexer's [`TokenKind::Unknown`] sentinel always fails
/// the parse.
pub fn parse_program(
    src: &str,
    tokens: &mut Vec<Token>,
    lex_errors: &mut Vec<Spanned<lexer::Error>>,
) -> ParseResult<Program<Untyped>> {
    parse(src, tokens, lex_errors, Parser::parse_program)
}

/// Lexes and parses a single expression, which must span the whole input.
pub fn parse_expr(
    src: &str,
    tokens: &mut Vec<Token>,
    lex_errors: &mut Vec<Spanned<lexer::Error>>,
) -> ParseResult<Expr<Untyped>> {
    parse(src, tokens, lex_errors, |p| {
        let expr = p.parse_expr()?;
        p.consume(TokenKind::Eof)?;
        Ok(expr)
    })
}

fn parse<'src, 'tok, T>(
    src: &'src str,
    tokens: &'tok mut Vec<Token>,
    lex_errors: &mut Vec<Spanned<lexer::Error>>,
    f: impl for<'a> FnOnce(&'a mut Parser<'src, 'tok>) -> Result<T>,
) -> ParseResult<T> {
    assert!(tokens.is_empty());

    lexer::lex(src, tokens, lex_errors);
    let mut p = Parser::new(src, tokens);
    f(&mut p)
}

struct Parser<'src, 'tok> {
    src: &'src str,
    tokens: &'tok [Token],
    cursor: usize,
}

impl<'tok> Parser<'_, 'tok> {
    fn parse_program(&mut self) -> Result<Program<Untyped>> {
        let mut imports = Vec::new();
        while self.is(TokenKind::Use) {
            imports.push(self.parse_import()?);
        }

        let mut statements = Vec::with_capacity(16);
        loop {
            let c = self.peek();
            match c.kind {
                TokenKind::Eof => break,
                TokenKind::Unknown => return Err(c.span().wrap(Error::UnknownToken)),
                kind if kind.starts_statement() => statements.push(self.parse_stmt()?),
                actual => return Err(c.span().wrap(Error::UnexpectedTopLevel { actual })),
            }
        }

        Ok(Program {
            imports,
            statements,
        })
    }

    fn parse_import(&mut self) -> Result<Import> {
        let start = self.consume(TokenKind::Use)?;
        self.consume(TokenKind::Less)?;

        let path_start = self.peek().span();
        let mut header = String::new();
        while !self.is(TokenKind::Greater) && !self.is(TokenKind::Eof) {
            let part = self.advance();
            match part.kind {
                TokenKind::Identifier | TokenKind::Int | TokenKind::Dot | TokenKind::Slash => {
                    header.push_str(part.text(self.src));
                }
                TokenKind::Unknown => return Err(part.span().wrap(Error::UnknownToken)),
                actual => return Err(part.span().wrap(Error::InvalidImportPath { actual })),
            }
        }
        if header.is_empty() {
            return Err(path_start.wrap(Error::EmptyImportPath));
        }

        self.consume(TokenKind::Greater)?;
        let end = self.consume(TokenKind::Semicolon)?;

        Ok(Import {
            header: header.into_boxed_str(),
            is_system: true,
            span: start.span().to(end.span()),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt<Untyped>> {
        let token = self.advance();
        let start = token.span();

        if let Some(ty) = token.kind.as_type() {
            return self.parse_var_decl(ty, start);
        }

        let (kind, span) = match token.kind {
            // Print: says expr ;
            TokenKind::Says => {
                let expr = self.parse_expr()?;
                let end = self.consume(TokenKind::Semicolon)?;
                (StmtKind::Print(expr), start.to(end.span()))
            }

            // Conditional: if ( expr ) stmt [else stmt]
            TokenKind::If => {
                self.consume(TokenKind::LParen)?;
                let predicate = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                let then_arm = self.parse_stmt()?;
                let else_arm = if self.take(TokenKind::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };

                let end = else_arm.as_ref().map_or(then_arm.span, |arm| arm.span);
                let kind = StmtKind::If {
                    predicate,
                    then_arm: Box::new(then_arm),
                    else_arm,
                };
                (kind, start.to(end))
            }

            // Block: { stmt* }
            TokenKind::LBrace => {
                let mut body = Vec::new();
                while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
                    body.push(self.parse_stmt()?);
                }
                let end = self.consume(TokenKind::RBrace)?;
                (StmtKind::Block(body), start.to(end.span()))
            }

            TokenKind::Unknown => return Err(start.wrap(Error::UnknownToken)),
            actual => return Err(start.wrap(Error::UnexpectedStatement { actual })),
        };

        Ok(Stmt { kind, span })
    }

    // Declaration: TYPE ID := expr ;
    fn parse_var_decl(&mut self, ty: Type, start: Span) -> Result<Stmt<Untyped>> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::ColonEq)?;
        let initializer = self.parse_expr()?;
        let end = self.consume(TokenKind::Semicolon)?;

        Ok(Stmt {
            kind: StmtKind::VarDecl {
                ty,
                name,
                initializer,
            },
            span: start.to(end.span()),
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: token.text(self.src).into(),
            span: token.span(),
        })
    }

    fn parse_expr(&mut self) -> Result<Expr<Untyped>> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr<Untyped>> {
        let mut lhs = self.parse_nud()?;

        loop {
            let op_token = self.peek();
            let Some((op, (lbp, rbp))) = Self::infix_binding_power(op_token.kind) else {
                // Not an infix operator
                break;
            };
            if lbp < min_bp {
                // Operator binds less tightly than the minimum required
                break;
            }

            self.advance(); // Operator
            let rhs = self.parse_expr_bp(rbp)?;

            let span = lhs.span.to(rhs.span);
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
                info: (),
            };
        }

        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression (literals, names and
    /// grouping).
    fn parse_nud(&mut self) -> Result<Expr<Untyped>> {
        let token = self.advance();
        let span = token.span();

        let kind = match (token.kind, &token.value) {
            (TokenKind::Int, Some(Literal::Int(int))) => ExprKind::Int(*int),
            (TokenKind::Float, Some(Literal::Float(float))) => ExprKind::Float(*float),
            (TokenKind::String, Some(Literal::String(string))) => ExprKind::String(string.clone()),
            (TokenKind::True | TokenKind::False, Some(Literal::Bool(bool))) => {
                ExprKind::Bool(*bool)
            }
            (TokenKind::Identifier, _) => ExprKind::Id(Ident {
                name: token.text(self.src).into(),
                span,
            }),

            // Grouping: ( expr )
            (TokenKind::LParen, _) => {
                let mut expr = self.parse_expr()?;
                let end = self.consume(TokenKind::RParen)?;
                expr.span = span.to(end.span());
                return Ok(expr);
            }

            (TokenKind::Unknown, _) => return Err(span.wrap(Error::UnknownToken)),
            (actual, _) => return Err(span.wrap(Error::UnexpectedTokenInExpr { actual })),
        };

        Ok(Expr {
            kind,
            span,
            info: (),
        })
    }

    /// Both operators are left-associative; `+` binds tighter than `?=`.
    fn infix_binding_power(kind: TokenKind) -> Option<(BinaryOperator, (u8, u8))> {
        let bp = match kind {
            TokenKind::QuestionEq => (BinaryOperator::Eq, (1, 2)),
            TokenKind::Plus => (BinaryOperator::Add, (3, 4)),
            _ => return None,
        };
        Some(bp)
    }
}

impl<'src, 'tok> Parser<'src, 'tok> {
    fn new(src: &'src str, tokens: &'tok [Token]) -> Parser<'src, 'tok> {
        debug_assert!(tokens.last().is_some_and(Token::is_eof));
        Parser {
            src,
            tokens,
            cursor: 0,
        }
    }

    /// Returns the current token. Past the end, the last token (always
    /// [`TokenKind::Eof`]) is returned.
    fn peek(&self) -> &'tok Token {
        let tokens = self.tokens;
        tokens
            .get(self.cursor)
            .or_else(|| tokens.last())
            .expect("token stream always ends with eof")
    }

    /// Returns the current token and advances. Never moves past the end.
    fn advance(&mut self) -> &'tok Token {
        let c = self.peek();
        if !c.is_eof() {
            self.cursor += 1;
        }
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not, fails
    /// with the expected and actual tokens.
    fn consume(&mut self, expect: TokenKind) -> Result<&'tok Token> {
        let c = self.peek();
        if c.kind == expect {
            Ok(self.advance())
        } else if c.kind == TokenKind::Unknown {
            Err(c.span().wrap(Error::UnknownToken))
        } else {
            Err(c.span().wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedTokenInExpr {
        actual: TokenKind,
    },
    UnexpectedStatement {
        actual: TokenKind,
    },
    /// A token that can't start a statement was found at the top level.
    UnexpectedTopLevel {
        actual: TokenKind,
    },
    InvalidImportPath {
        actual: TokenKind,
    },
    EmptyImportPath,
    /// The lexer's sentinel for an unrecognized character was reached.
    UnknownToken,
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use parser;

        fn test_int_literal_expr() {
            let expr = "12345";
            let tree_ok = "int 12345 (0..5)";
        }

        fn test_float_literal_expr() {
            let expr = "2.5";
            let tree_ok = "float 2.5 (0..3)";
        }

        fn test_string_literal_expr() {
            let expr = r#""hello world""#;
            let tree_ok = r#"string "hello world" (0..13)"#;
        }

        fn test_escaped_string_literal_expr() {
            let expr = r#""hello\nworld""#;
            let tree_ok = r#"string "hello\nworld" (0..14)"#;
        }

        fn test_boolean_literal_exprs() {
            let expr = "true ?= false";
            let tree_ok = "
                binary Eq (0..13)
                  bool true (0..4)
                  bool false (8..13)
            ";
        }

        fn test_identifier_expr() {
            let expr = "myVar";
            let tree_ok = "ident myVar (0..5)";
        }

        fn test_addition_is_left_associative() {
            let expr = "a + b + c";
            let tree_ok = "
                binary Add (0..9)
                  binary Add (0..5)
                    ident a (0..1)
                    ident b (4..5)
                  ident c (8..9)
            ";
        }

        fn test_equality_is_left_associative() {
            let expr = "a ?= b ?= c";
            let tree_ok = "
                binary Eq (0..11)
                  binary Eq (0..6)
                    ident a (0..1)
                    ident b (5..6)
                  ident c (10..11)
            ";
        }

        fn test_addition_binds_tighter_than_equality() {
            let expr = "a ?= b + 1";
            let tree_ok = "
                binary Eq (0..10)
                  ident a (0..1)
                  binary Add (5..10)
                    ident b (5..6)
                    int 1 (9..10)
            ";
        }

        fn test_parenthesized_expr() {
            let expr = r#""n" + (a ?= 5)"#;
            let tree_ok = r#"
                binary Add (0..14)
                  string "n" (0..3)
                  binary Eq (6..14)
                    ident a (7..8)
                    int 5 (12..13)
            "#;
        }

        fn test_var_decls() {
            let program = "
                number a := 5;
                riel b := 2.5;
                text c := \"hi\";
            ";
            let tree_ok = r#"
                var a: number (17..31)
                  int 5 (29..30)
                var b: riel (48..62)
                  float 2.5 (58..61)
                var c: text (79..94)
                  string "hi" (89..93)
            "#;
        }

        fn test_imports() {
            let program = "
                use <iostream>;
                use <sys/types.h>;
                use <3ds.h>;
            ";
            let tree_ok = "
                import <iostream> (17..32)
                import <sys/types.h> (49..67)
                import <3ds.h> (84..96)
            ";
        }

        fn test_print() {
            let program = "says a + 1;";
            let tree_ok = "
                print (0..11)
                  binary Add (5..10)
                    ident a (5..6)
                    int 1 (9..10)
            ";
        }

        fn test_if_else() {
            let program = "if (a ?= 1) says a; else { says b; }";
            let tree_ok = "
                if (0..36)
                  binary Eq (4..10)
                    ident a (4..5)
                    int 1 (9..10)
                  then
                    print (12..19)
                      ident a (17..18)
                  else
                    block (25..36)
                      print (27..34)
                        ident b (32..33)
            ";
        }

        fn test_if_without_else() {
            let program = "if (true) { }";
            let tree_ok = "
                if (0..13)
                  bool true (4..8)
                  then
                    block (10..13)
            ";
        }

        fn test_nested_blocks() {
            let program = "{ { number x := 1; } says x; }";
            let tree_ok = "
                block (0..30)
                  block (2..20)
                    var x: number (4..18)
                      int 1 (16..17)
                  print (21..28)
                    ident x (26..27)
            ";
        }

        fn test_empty_program() {
            let program = "  // nothing here\n";
            let tree_ok = "";
        }

        fn test_error_missing_semicolon() {
            let program = "number a := 5 says a;";
            let expected_errors = &["14..18: expected token Semicolon, but got Says"];
        }

        fn test_error_missing_initializer() {
            let program = "number a;";
            let expected_errors = &["8..9: expected token ColonEq, but got Semicolon"];
        }

        fn test_error_unexpected_token_in_expr() {
            let expr = "1 + ;";
            let expected_errors = &["4..5: unexpected token Semicolon in expression"];
        }

        fn test_error_unmatched_paren_open() {
            let expr = "(1 + 2";
            let expected_errors = &["6..6: expected token RParen, but got Eof"];
        }

        fn test_error_unmatched_paren_close() {
            let expr = "1 + 2)";
            let expected_errors = &["5..6: expected token Eof, but got RParen"];
        }

        fn test_error_import_after_statement() {
            let program = "says 1; use <string>;";
            let expected_errors = &["8..11: unexpected token Use at top level"];
        }

        fn test_error_stray_else_at_top_level() {
            let program = "says 1; else says 2;";
            let expected_errors = &["8..12: unexpected token Else at top level"];
        }

        fn test_error_unexpected_statement() {
            let program = "{ else }";
            let expected_errors = &["2..6: unexpected token Else at start of statement"];
        }

        fn test_error_if_without_parens() {
            let program = "if true says 1;";
            let expected_errors = &["3..7: expected token LParen, but got True"];
        }

        fn test_error_unclosed_block() {
            let program = "{ says 1;";
            let expected_errors = &["9..9: expected token RBrace, but got Eof"];
        }

        fn test_error_invalid_import_path() {
            let program = "use <\"iostream\">;";
            let expected_errors = &["5..15: invalid token String in import path"];
        }

        fn test_error_unknown_char_in_import_path() {
            let program = "use <std$io>;";
            let expected_errors = &[
                "8..9: unexpected character '$'",
                "8..9: unrecognized token",
            ];
        }

        fn test_error_empty_import_path() {
            let program = "use <>;";
            let expected_errors = &["5..6: empty import path"];
        }

        fn test_error_lexer_unknown_char() {
            let program = "number a := 1 $ 2;";
            let expected_errors = &[
                "14..15: unexpected character '$'",
                "14..15: unrecognized token",
            ];
        }

        fn test_error_lexer_unclosed_string() {
            let program = "says \"abc";
            let expected_errors = &[
                "5..9: unclosed string",
                "9..9: expected token Semicolon, but got Eof",
            ];
        }
    );
}
