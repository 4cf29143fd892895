use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Ident, Program, Stmt, StmtKind, Typed, Untyped},
    token::{Span, Spanned},
    types::{SymbolTable, Type},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// The result of a successful check.
#[derive(Debug)]
pub struct Checked {
    pub program: Program<Typed>,
    pub symbols: SymbolTable,
    /// Informational notes, in visiting order.
    pub notes: Vec<Spanned<Note>>,
}

pub struct Checker {
    symbols: SymbolTable,
    notes: Vec<Spanned<Note>>,
}

impl Checker {
    pub fn with_capacity(capacity: usize) -> Checker {
        Checker {
            symbols: SymbolTable::with_capacity(capacity),
            notes: Vec::with_capacity(capacity),
        }
    }

    /// Checks the program in a single depth-first pass, building a fresh typed
    /// tree. Stops at the first error.
    pub fn check(mut self, program: Program<Untyped>) -> Result<Checked> {
        let Program {
            imports,
            statements,
        } = program;

        for import in &imports {
            self.note(import.span, Note::Import(import.header.clone()));
        }

        let statements = statements
            .into_iter()
            .map(|stmt| self.check_stmt(stmt))
            .collect::<Result<Vec<_>>>()?;

        Ok(Checked {
            program: Program {
                imports,
                statements,
            },
            symbols: self.symbols,
            notes: self.notes,
        })
    }

    fn check_stmt(&mut self, stmt: Stmt<Untyped>) -> Result<Stmt<Typed>> {
        let Stmt { kind, span } = stmt;

        let kind = match kind {
            StmtKind::VarDecl {
                ty,
                name,
                initializer,
            } => {
                // Checked before the initializer, which may mention the name.
                if let Some(existing) = self.symbols.get(&name.name) {
                    return Err(already_declared(&name, existing.span));
                }

                let initializer = self.check_expr(initializer)?;
                if !fits(ty, &initializer) {
                    let error = Error::Unassignable {
                        name: name.name.clone(),
                        declared: ty,
                        actual: initializer.ty(),
                    };
                    return Err(initializer.span.wrap(error));
                }

                self.symbols
                    .define(&name.name, ty, name.span)
                    .map_err(|other| already_declared(&name, other))?;
                self.note(
                    span,
                    Note::Declared {
                        name: name.name.clone(),
                        ty,
                    },
                );

                StmtKind::VarDecl {
                    ty,
                    name,
                    initializer,
                }
            }

            StmtKind::Print(expr) => {
                let expr = self.check_expr(expr)?;
                if !expr.ty().is_valued() {
                    return Err(expr.span.wrap(Error::Unprintable(expr.ty())));
                }
                self.note(span, Note::Print(expr.ty()));
                StmtKind::Print(expr)
            }

            StmtKind::If {
                predicate,
                then_arm,
                else_arm,
            } => {
                let predicate = self.check_expr(predicate)?;
                if predicate.ty() != Type::Logic {
                    let error = Error::NonLogicPredicate(predicate.ty());
                    return Err(predicate.span.wrap(error));
                }

                // Arms share the program-wide scope.
                let then_arm = Box::new(self.check_stmt(*then_arm)?);
                let else_arm = else_arm
                    .map(|arm| self.check_stmt(*arm).map(Box::new))
                    .transpose()?;

                self.note(span, Note::If);
                StmtKind::If {
                    predicate,
                    then_arm,
                    else_arm,
                }
            }

            StmtKind::Block(body) => {
                let body = body
                    .into_iter()
                    .map(|stmt| self.check_stmt(stmt))
                    .collect::<Result<Vec<_>>>()?;
                self.note(span, Note::Block);
                StmtKind::Block(body)
            }
        };

        Ok(Stmt { kind, span })
    }

    fn check_expr(&mut self, expr: Expr<Untyped>) -> Result<Expr<Typed>> {
        let Expr { kind, span, .. } = expr;

        let (kind, ty) = match kind {
            ExprKind::Int(int) => (ExprKind::Int(int), Type::LNumber),
            ExprKind::Float(float) => (ExprKind::Float(float), Type::Riel),
            ExprKind::String(string) => (ExprKind::String(string), Type::Text),
            ExprKind::Bool(bool) => (ExprKind::Bool(bool), Type::Logic),
            ExprKind::Id(ident) => {
                let Some(symbol) = self.symbols.get(&ident.name) else {
                    return Err(ident.span.wrap(Error::UndeclaredName(ident.name)));
                };
                (ExprKind::Id(ident), symbol.ty)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.check_expr(*lhs)?;
                let rhs = self.check_expr(*rhs)?;
                let Some(ty) = binary_type(op, lhs.ty(), rhs.ty()) else {
                    let error = Error::InvalidOperands {
                        op,
                        lhs: lhs.ty(),
                        rhs: rhs.ty(),
                    };
                    return Err(span.wrap(error));
                };
                let binary = ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (binary, ty)
            }
        };

        Ok(Expr {
            kind,
            span,
            info: ty,
        })
    }

    fn note(&mut self, span: Span, note: Note) {
        self.notes.push(span.wrap(note));
    }
}

/// Returns the type of a binary operation, or `None` if the operands are
/// invalid for the operator.
pub fn binary_type(op: BinaryOperator, lhs: Type, rhs: Type) -> Option<Type> {
    match op {
        BinaryOperator::Add => {
            if let Some(widest) = lhs.widest(rhs) {
                return Some(widest);
            }
            // Any valued operand is textified when the other one is text.
            let textified = (lhs == Type::Text && rhs.is_valued())
                || (rhs == Type::Text && lhs.is_valued());
            textified.then_some(Type::Text)
        }
        BinaryOperator::Eq => {
            let comparable =
                (lhs == rhs && lhs.is_valued()) || (lhs.is_numeric() && rhs.is_numeric());
            comparable.then_some(Type::Logic)
        }
    }
}

/// Whether `initializer` may initialize a variable declared as `declared`.
///
/// Integer literals are `lnumber`s, but also fit `number` declarations when
/// their value does.
fn fits(declared: Type, initializer: &Expr<Typed>) -> bool {
    declared.is_assignable(initializer.ty())
        || matches!(
            (declared, &initializer.kind),
            (Type::Number, ExprKind::Int(int)) if i32::try_from(*int).is_ok()
        )
}

fn already_declared(name: &Ident, other_definition_span: Span) -> Spanned<Error> {
    name.span.wrap(Error::AlreadyDeclared {
        name: name.name.clone(),
        other_definition_span,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    AlreadyDeclared {
        name: Box<str>,
        other_definition_span: Span,
    },
    UndeclaredName(Box<str>),
    Unassignable {
        name: Box<str>,
        declared: Type,
        actual: Type,
    },
    InvalidOperands {
        op: BinaryOperator,
        lhs: Type,
        rhs: Type,
    },
    NonLogicPredicate(Type),
    Unprintable(Type),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Note {
    Import(Box<str>),
    Declared { name: Box<str>, ty: Type },
    Print(Type),
    If,
    Block,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{parser, util::test_utils::tree_tests};

    fn check(src: &str) -> Result<Checked> {
        let program = parser::parse_program(src, &mut Vec::new(), &mut Vec::new())
            .expect("failed to parse");
        Checker::with_capacity(16).check(program)
    }

    #[test]
    fn test_binary_type() {
        use BinaryOperator::{Add, Eq};
        use Type::*;

        assert_eq!(binary_type(Add, Number, Number), Some(Number));
        assert_eq!(binary_type(Add, Number, LNumber), Some(LNumber));
        assert_eq!(binary_type(Add, LNumber, Riel), Some(Riel));
        assert_eq!(binary_type(Add, Text, Text), Some(Text));
        assert_eq!(binary_type(Add, Text, Number), Some(Text));
        assert_eq!(binary_type(Add, Logic, Text), Some(Text));
        assert_eq!(binary_type(Add, Logic, Number), None);
        assert_eq!(binary_type(Add, Logic, Logic), None);
        assert_eq!(binary_type(Add, Text, Void), None);
        assert_eq!(binary_type(Add, Unknown, Text), None);

        for ty in [Number, LNumber, Text, Logic, Riel] {
            assert_eq!(binary_type(Eq, ty, ty), Some(Logic));
        }
        assert_eq!(binary_type(Eq, Number, Riel), Some(Logic));
        assert_eq!(binary_type(Eq, Text, Number), None);
        assert_eq!(binary_type(Eq, Logic, Number), None);
        assert_eq!(binary_type(Eq, Void, Void), None);
    }

    #[test]
    fn test_symbols_keep_declared_type() {
        let checked = check("riel x := 3; lnumber y := 1; text z := \"z\";").unwrap();
        assert_eq!(checked.symbols.len(), 3);
        assert_eq!(checked.symbols.get("x").map(|s| s.ty), Some(Type::Riel));
        assert_eq!(checked.symbols.get("y").map(|s| s.ty), Some(Type::LNumber));
        assert_eq!(checked.symbols.get("z").map(|s| s.ty), Some(Type::Text));
    }

    #[test]
    fn test_notes_in_visiting_order() {
        let src = "use <string>; if (true) { number a := 1; } says a;";
        let notes: Vec<_> = check(src)
            .unwrap()
            .notes
            .into_iter()
            .map(|note| note.inner)
            .collect();
        assert_eq!(
            notes,
            [
                Note::Import("string".into()),
                Note::Declared {
                    name: "a".into(),
                    ty: Type::Number
                },
                Note::Block,
                Note::If,
                Note::Print(Type::Number),
            ]
        );
    }

    #[test]
    fn test_integer_literal_fits_number_only_in_range() {
        assert!(check("number x := 2147483647;").is_ok());
        let error = check("number x := 2147483648;").unwrap_err();
        assert_eq!(
            error.inner,
            Error::Unassignable {
                name: "x".into(),
                declared: Type::Number,
                actual: Type::LNumber,
            }
        );
    }

    tree_tests!(
        use checker;

        fn test_literals() {
            let program = r#"lnumber a := 1; riel b := 2.5; text c := "c"; logic d := true;"#;
            let tree_ok = r#"
                var a: lnumber (0..15)
                  int 1 (13..14 %: lnumber)
                var b: riel (16..30)
                  float 2.5 (26..29 %: riel)
                var c: text (31..45)
                  string "c" (41..44 %: text)
                var d: logic (46..62)
                  bool true (57..61 %: logic)
            "#;
        }

        fn test_numeric_widening() {
            let program = "number a := 5; riel b := 2.5; says a + b;";
            let tree_ok = "
                var a: number (0..14)
                  int 5 (12..13 %: lnumber)
                var b: riel (15..29)
                  float 2.5 (25..28 %: riel)
                print (30..41)
                  binary Add (35..40 %: riel)
                    ident a (35..36 %: number)
                    ident b (39..40 %: riel)
            ";
        }

        fn test_number_widens_into_riel() {
            let program = "riel x := 3;";
            let tree_ok = "
                var x: riel (0..12)
                  int 3 (10..11 %: lnumber)
            ";
        }

        fn test_textification() {
            let program = r#"text x := "n=" + 5;"#;
            let tree_ok = r#"
                var x: text (0..19)
                  binary Add (10..18 %: text)
                    string "n=" (10..14 %: text)
                    int 5 (17..18 %: lnumber)
            "#;
        }

        fn test_equality_yields_logic() {
            let program = r#"says "equal?" + (1 ?= 1.0);"#;
            let tree_ok = r#"
                print (0..27)
                  binary Add (5..26 %: text)
                    string "equal?" (5..13 %: text)
                    binary Eq (16..26 %: logic)
                      int 1 (17..18 %: lnumber)
                      float 1.0 (22..25 %: riel)
            "#;
        }

        fn test_declaration_in_branch_is_visible_afterwards() {
            let program = "if (true) number a := 1; says a;";
            let tree_ok = "
                if (0..24)
                  bool true (4..8 %: logic)
                  then
                    var a: number (10..24)
                      int 1 (22..23 %: lnumber)
                print (25..32)
                  ident a (30..31 %: number)
            ";
        }

        fn test_error_redeclaration() {
            let program = "number a := 1; text a := \"a\";";
            let expected_errors = &["20..21: variable a already declared at 7..8"];
        }

        fn test_error_redeclaration_in_branch() {
            let program = "number a := 1; if (true) { number a := 2; } else { }";
            let expected_errors = &["34..35: variable a already declared at 7..8"];
        }

        fn test_error_redeclaration_across_branches() {
            let program = "if (true) number a := 1; else number a := 2;";
            let expected_errors = &["37..38: variable a already declared at 17..18"];
        }

        fn test_error_redeclaration_reported_before_initializer() {
            let program = "number a := 1; number a := b;";
            let expected_errors = &["22..23: variable a already declared at 7..8"];
        }

        fn test_error_self_reference() {
            let program = "number a := a;";
            let expected_errors = &["12..13: variable a used before declaration"];
        }

        fn test_error_use_before_declaration() {
            let program = "says a; number a := 1;";
            let expected_errors = &["5..6: variable a used before declaration"];
        }

        fn test_error_narrowing_riel() {
            let program = "number x := 3.5;";
            let expected_errors = &["12..15: cannot assign type riel to variable x of type number"];
        }

        fn test_error_numeric_into_text() {
            let program = "text x := 5;";
            let expected_errors = &["10..11: cannot assign type lnumber to variable x of type text"];
        }

        fn test_error_compare_text_and_number() {
            let program = "number n := 1; says \"a\" ?= n;";
            let expected_errors = &["20..28: invalid operands for ?=: text and number"];
        }

        fn test_error_add_logic_and_number() {
            let program = "says true + 1;";
            let expected_errors = &["5..13: invalid operands for +: logic and lnumber"];
        }

        fn test_error_non_logic_predicate() {
            let program = "if (5) says \"x\";";
            let expected_errors = &["4..5: if condition must be of type logic, but got lnumber"];
        }
    );
}
