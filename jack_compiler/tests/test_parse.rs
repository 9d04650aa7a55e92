use jack_compiler::{
    compile_str,
    lex::{debug_print_lexer, tokenize, LexError, Lexer},
    parse_class,
    parsing::{ClassVarKind, ParseError, Stmt, SubroutineKind, Term, Type},
    tokens::{Symbol, TokenKind},
    JackError,
};

const AVERAGE: &str = include_str!("fixtures/Average.jack");
const POINT: &str = include_str!("fixtures/Point.jack");

#[test]
fn test_lex_average() {
    let lexer = Lexer::new(AVERAGE);
    debug_print_lexer(lexer).unwrap();
}

#[test]
fn test_tokens_reproduce_lexemes() {
    let source = r#"
        /** Doc comment. */
        let s = "a b"; // trailing
        let arr[i] = -x*2; /* inline */ do Foo.bar();
    "#;
    let tokens = tokenize(source).unwrap();

    let joined = tokens
        .iter()
        .map(|token| match token.kind {
            TokenKind::Str => format!("\"{}\"", token.text(source)),
            _ => token.text(source).to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    assert_eq!(
        joined,
        r#"let s = "a b" ; let arr [ i ] = - x * 2 ; do Foo . bar ( ) ;"#
    );
}

#[test]
fn test_lexer_restartable() {
    let first: Vec<_> = Lexer::new(POINT).collect();
    let second: Vec<_> = Lexer::new(POINT).collect();
    assert_eq!(first, second);
    assert!(first.iter().all(Result::is_ok));
}

#[test]
fn test_parse_point() {
    let class = parse_class(POINT).unwrap();

    assert_eq!(class.name.as_str(), "Point");
    assert_eq!(class.field_count(), 2);
    assert_eq!(class.vars[1].kind, ClassVarKind::Static);

    let kinds: Vec<_> = class.subroutines.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SubroutineKind::Constructor,
            SubroutineKind::Method,
            SubroutineKind::Method,
            SubroutineKind::Method,
        ]
    );

    let plus = &class.subroutines[2];
    assert_eq!(plus.name.as_str(), "plus");
    assert!(matches!(plus.return_ty, Some(Type::Class(ref ident)) if ident.as_str() == "Point"));
    assert_eq!(plus.params[0].name.as_str(), "other");
    assert_eq!(class.subroutines[3].return_ty, None);
}

#[test]
fn test_parse_average() {
    let class = parse_class(AVERAGE).unwrap();
    let main = &class.subroutines[0];

    assert_eq!(main.local_count(), 4);
    let names: Vec<_> = main.body.iter().map(Stmt::name).collect();
    assert_eq!(
        names,
        vec!["let", "let", "let", "let", "while", "if", "do", "do", "return"]
    );

    match &main.body[5] {
        Stmt::If(stmt) => {
            assert!(matches!(stmt.cond.first, Term::Unary { .. }));
            assert_eq!(stmt.cond.rest.len(), 1);
            assert!(stmt.else_body.is_some());
        }
        other => panic!("expected if, found {:?}", other),
    }
}

#[test]
fn test_let_missing_value() {
    let source = "class A { function void f() { var int x; let x = ; return; } }";
    let err = compile_str(source).unwrap_err();

    match err {
        JackError::Parse(ParseError::Unexpected { encountered, .. }) => {
            assert_eq!(encountered.kind, TokenKind::Symbol(Symbol::Semicolon));
            assert_eq!(encountered.span.fragment(source), ";");
            assert_eq!(encountered.span.index, 49);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_missing_semicolon_report() {
    let source = "class A {\n    function void f() {\n        return\n    }\n}\n";
    let err = compile_str(source).unwrap_err();
    assert!(matches!(err, JackError::Parse(_)));

    let report = err.report(source);
    assert!(report.contains("--> 4:5"), "{}", report);
    assert!(report.contains("4 |     }"), "{}", report);
}

#[test]
fn test_lex_error_surfaces() {
    let err = compile_str("class A { field int #x; }").unwrap_err();
    match err {
        JackError::Lex(LexError::UnknownCharacter { ch, span }) => {
            assert_eq!(ch, '#');
            assert_eq!(span.index, 20);
        }
        other => panic!("unexpected error {:?}", other),
    }

    let err = compile_str("class A { /* never closed }").unwrap_err();
    assert!(matches!(err, JackError::Lex(LexError::UnterminatedComment { .. })));
}

#[test]
fn test_unexpected_end_of_source() {
    let err = parse_class("class A { function void f() {").unwrap_err();
    assert!(matches!(err, JackError::Parse(ParseError::EndOfSource { .. })));
}
