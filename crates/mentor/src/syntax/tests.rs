use crate::diagnostics::diagnostics_have_errors;
use crate::syntax::{
    apply, lex, parse_document, print_document, BlockRef, Edit, Item, RewriteError, StmtId, TExpr,
    TItem, TItemKind, TStmt, TStmtKind, TType, TokenKind,
};

const CANONICAL: &str = r#"analyzer IfSpacing {
    const RULE_ID: Str = "if_spacing";

    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "If spacing",
        "the if keyword must be followed by a single space", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(RULE);
    }

    fn register(reg: &mut Registrar) {
        reg.on_node(NodeKind::IfStmt, analyze_if);
    }

    fn analyze_if(ctx: &NodeContext) {
        let if_stmt = ctx.node.as_if_stmt();
        let if_keyword = if_stmt.if_keyword();
        if if_keyword.has_trailing_trivia() {
            let trailing = if_keyword.trailing_trivia();
            if trailing.kind() == TriviaKind::Space {
                if trailing.text() == " " {
                    return;
                }
            }
        }
        let open_paren = if_stmt.open_paren();
        let start = if_keyword.span().start();
        let end = open_paren.span().start();
        let span = Span::of(start, end);
        let location = Location::of(ctx.file(), span);
        let diagnostic = Diagnostic::of(RULE, location, RULE.message());
        ctx.report(diagnostic);
    }
}
"#;

#[test]
fn lex_tokens_and_kinds() {
    let (tokens, diagnostics) = lex("let x = \"a\"; // note");
    assert!(diagnostics.is_empty());
    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Symbol,
            TokenKind::Str,
            TokenKind::Symbol,
            TokenKind::Comment,
        ]
    );
    assert_eq!(tokens[3].text, "a");
    assert_eq!(tokens[5].text, "note");
}

#[test]
fn lex_reports_unterminated_string() {
    let (_, diagnostics) = lex("\"oops");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "P101");
}

#[test]
fn lex_string_escapes() {
    let (tokens, diagnostics) = lex(r#""a\"b\\c\nd""#);
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].text, "a\"b\\c\nd");
}

#[test]
fn parse_canonical_document() {
    let (tree, diagnostics) = parse_document(CANONICAL);
    assert!(!diagnostics_have_errors(&diagnostics), "{diagnostics:?}");
    let analyzer = tree.document.analyzer.as_ref().unwrap();
    assert_eq!(analyzer.name.name, "IfSpacing");
    assert_eq!(analyzer.items.len(), 5);
    let names: Vec<&str> = analyzer
        .items
        .iter()
        .map(|id| tree.arena.item(*id).name().name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["RULE_ID", "RULE", "supported_rules", "register", "analyze_if"]
    );
}

#[test]
fn parse_attaches_comments() {
    let source = "analyzer A {\n    // the id\n    // second line\n    const X: Str = \"x\";\n}\n";
    let (tree, diagnostics) = parse_document(source);
    assert!(!diagnostics_have_errors(&diagnostics));
    let analyzer = tree.document.analyzer.as_ref().unwrap();
    let item = tree.arena.item(analyzer.items[0]);
    assert_eq!(item.comment(), Some("the id\nsecond line"));
}

#[test]
fn dangling_comments_survive_print_and_rewrite() {
    let source = "// about the analyzer\nanalyzer A {\n    fn helper() {\n        if flag.is_set() {\n            // branch note\n        }\n        let a = \"1\";\n        // keep this note\n    }\n    // last words\n}\n";
    let (tree, diagnostics) = parse_document(source);
    assert!(!diagnostics_have_errors(&diagnostics), "{diagnostics:?}");
    let printed = print_document(&tree);
    assert!(printed.contains("// about the analyzer"), "{printed}");
    assert!(printed.contains("// branch note"), "{printed}");
    assert!(printed.contains("// keep this note"), "{printed}");
    assert!(printed.contains("// last words"), "{printed}");
    let (reparsed, _) = parse_document(&printed);
    assert_eq!(print_document(&reparsed), printed);

    let edit = Edit::InsertItem {
        index: 0,
        item: TItem {
            kind: TItemKind::Const {
                name: "X".to_string(),
                ty: TType::plain("Str"),
                value: TExpr::Str("x".to_string()),
            },
            comment: None,
        },
    };
    let rewritten = apply(&tree, &edit).unwrap();
    let printed = print_document(&rewritten);
    assert!(printed.contains("// branch note"), "{printed}");
    assert!(printed.contains("// keep this note"), "{printed}");
    assert!(printed.contains("// last words"), "{printed}");
}

#[test]
fn parse_recovers_inside_analyzer() {
    let source = "analyzer A {\n    const X: Str = ;\n    fn f() {\n    }\n}\n";
    let (tree, diagnostics) = parse_document(source);
    assert!(diagnostics_have_errors(&diagnostics));
    let analyzer = tree.document.analyzer.as_ref().unwrap();
    // The fn after the bad const still parses.
    assert!(analyzer
        .items
        .iter()
        .any(|id| matches!(tree.arena.item(*id), Item::Fn { name, .. } if name.name == "f")));
}

#[test]
fn parse_without_analyzer_yields_empty_document() {
    let (tree, diagnostics) = parse_document("");
    assert!(tree.document.analyzer.is_none());
    assert!(diagnostics.is_empty());
}

#[test]
fn print_is_stable() {
    let (tree, _) = parse_document(CANONICAL);
    let printed = print_document(&tree);
    let (reparsed, diagnostics) = parse_document(&printed);
    assert!(!diagnostics_have_errors(&diagnostics), "{diagnostics:?}");
    assert_eq!(print_document(&reparsed), printed);
}

#[test]
fn insert_item_keeps_siblings_in_order() {
    let source = "analyzer A {\n    const X: Str = \"x\";\n\n    fn f() {\n    }\n}\n";
    let (tree, _) = parse_document(source);
    let edit = Edit::InsertItem {
        index: 1,
        item: TItem {
            kind: TItemKind::Static {
                name: "S".to_string(),
                ty: TType::plain("RuleInfo"),
                value: TExpr::Ident("X".to_string()),
            },
            comment: None,
        },
    };
    let rewritten = apply(&tree, &edit).unwrap();
    let printed = print_document(&rewritten);
    let x = printed.find("const X").unwrap();
    let s = printed.find("static S").unwrap();
    let f = printed.find("fn f").unwrap();
    assert!(x < s && s < f, "{printed}");
}

#[test]
fn replace_stmt_inherits_existing_comment() {
    let source = "analyzer A {\n    fn f() {\n        // original note\n        let x = \"a\";\n    }\n}\n";
    let (tree, _) = parse_document(source);
    let target = first_fn_stmt(&tree);
    let edit = Edit::ReplaceStmt {
        target,
        stmt: TStmt {
            kind: TStmtKind::Let {
                name: "y".to_string(),
                value: TExpr::Bool(true),
            },
            comment: None,
        },
    };
    let rewritten = apply(&tree, &edit).unwrap();
    let printed = print_document(&rewritten);
    assert!(printed.contains("// original note"), "{printed}");
    assert!(printed.contains("let y = true;"), "{printed}");
    assert!(!printed.contains("let x"), "{printed}");
}

#[test]
fn retain_stmts_drops_the_rest() {
    let source = "analyzer A {\n    fn f() {\n        let a = \"1\";\n        let b = \"2\";\n        let c = \"3\";\n    }\n}\n";
    let (tree, _) = parse_document(source);
    let analyzer = tree.document.analyzer.as_ref().unwrap();
    let fn_id = analyzer.items[0];
    let body = match tree.arena.item(fn_id) {
        Item::Fn { body, .. } => body.clone(),
        _ => unreachable!(),
    };
    let edit = Edit::RetainStmts {
        block: BlockRef::FnBody(fn_id),
        keep: vec![body[1]],
    };
    let rewritten = apply(&tree, &edit).unwrap();
    let printed = print_document(&rewritten);
    assert!(!printed.contains("let a"));
    assert!(printed.contains("let b"));
    assert!(!printed.contains("let c"));
}

#[test]
fn apply_fails_on_dangling_target() {
    let (tree, _) = parse_document("analyzer A {\n}\n");
    let edit = Edit::ReplaceStmt {
        target: StmtId::new(u32::MAX),
        stmt: TStmt {
            kind: TStmtKind::Return(None),
            comment: None,
        },
    };
    assert!(matches!(
        apply(&tree, &edit),
        Err(RewriteError::TargetNotFound)
    ));
}

#[test]
fn rewrite_does_not_touch_the_input_tree() {
    let (tree, _) = parse_document(CANONICAL);
    let before = print_document(&tree);
    let edit = Edit::InsertItem {
        index: 0,
        item: TItem {
            kind: TItemKind::Const {
                name: "OTHER".to_string(),
                ty: TType::plain("Str"),
                value: TExpr::Str("other".to_string()),
            },
            comment: None,
        },
    };
    let _ = apply(&tree, &edit).unwrap();
    assert_eq!(print_document(&tree), before);
}

fn first_fn_stmt(tree: &crate::syntax::SyntaxTree) -> StmtId {
    let analyzer = tree.document.analyzer.as_ref().unwrap();
    for id in &analyzer.items {
        if let Item::Fn { body, .. } = tree.arena.item(*id) {
            return body[0];
        }
    }
    panic!("no fn with a body");
}
