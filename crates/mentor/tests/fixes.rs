use mentor::{
    diagnostics_have_errors, fixes, fixes_for_tree, parse_document, verify, verify_tree, StageId,
};

const COMPLETE: &str = r#"analyzer IfSpacing {
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

/// Walks an empty analyzer all the way to the terminal stage, taking the
/// first offered fix at every step. Each applied fix must move the next
/// finding strictly later in the catalog.
#[test]
fn first_fix_always_advances_the_stage() {
    let mut source = String::from("analyzer IfSpacing {\n}\n");
    let mut last_order: Option<usize> = None;
    for _ in 0..64 {
        let (tree, diagnostics) = parse_document(&source);
        assert!(
            !diagnostics_have_errors(&diagnostics),
            "fix produced unparsable text:\n{source}"
        );
        let found = verify_tree(&tree).expect("analyzer present");
        if found.stage == StageId::Complete {
            return;
        }
        let order = found.stage.order();
        if let Some(previous) = last_order {
            assert!(
                order > previous,
                "stage went backwards at {:?}:\n{source}",
                found.stage
            );
        }
        last_order = Some(order);
        let offered = fixes_for_tree(found.stage, &tree);
        assert!(!offered.is_empty(), "no fix offered for {:?}", found.stage);
        source = offered[0].text.clone();
    }
    panic!("never reached the terminal stage:\n{source}");
}

#[test]
fn satisfied_stage_offers_no_fixes() {
    assert!(fixes(StageId::IdConstMissing, COMPLETE).is_empty());
    assert!(fixes(StageId::ReportStmt, COMPLETE).is_empty());
}

#[test]
fn severity_stage_offers_both_readings() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Hint, true);
}
"#;
    let offered = fixes(StageId::RuleSeverityArg, source);
    assert_eq!(offered.len(), 2);
    assert!(offered[0].text.contains("Severity::Warning"));
    assert!(offered[1].text.contains("Severity::Error"));
    assert!(offered[0].title != offered[1].title);
    // Applying either reading clears the stage.
    for fix in &offered {
        let (fixed, diagnostics) = parse_document(&fix.text);
        assert!(!diagnostics_have_errors(&diagnostics), "{}", fix.text);
        let found = verify_tree(&fixed).expect("analyzer present");
        assert!(
            found.stage.order() > StageId::RuleSeverityArg.order(),
            "{:?} after {:?}",
            found.stage,
            fix.title
        );
    }
}

#[test]
fn if_extraction_offers_both_accepted_forms() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(RULE);
    }

    fn register(reg: &mut Registrar) {
        reg.on_node(NodeKind::IfStmt, analyze_if);
    }

    fn analyze_if(ctx: &NodeContext) {
    }
}
"#;
    let offered = fixes(StageId::IfStmtDecl, source);
    assert_eq!(offered.len(), 2);
    assert!(offered[0].text.contains("ctx.node.as_if_stmt()"));
    assert!(offered[1].text.contains("IfStmt::cast(ctx.node)"));
}

#[test]
fn replacement_keeps_siblings_and_their_comments() {
    let broken = COMPLETE.replace(
        "        let if_keyword = if_stmt.if_keyword();\n",
        "        // the keyword token\n        let if_keyword = if_stmt.wrong_accessor();\n",
    );
    let (tree, _) = parse_document(&broken);
    let found = verify_tree(&tree).expect("diagnostic");
    assert_eq!(found.stage, StageId::IfKeywordDecl);
    let offered = fixes_for_tree(found.stage, &tree);
    assert_eq!(offered.len(), 1);
    let text = &offered[0].text;
    // The offending statement is rewritten in place.
    assert!(text.contains("let if_keyword = if_stmt.if_keyword();"), "{text}");
    assert!(!text.contains("wrong_accessor"), "{text}");
    // Its own comment and every sibling statement survive.
    assert!(text.contains("// the keyword token"), "{text}");
    assert!(text.contains("let open_paren = if_stmt.open_paren();"), "{text}");
    assert!(text.contains("ctx.report(diagnostic);"), "{text}");
}

#[test]
fn register_too_many_keeps_the_recognized_call() {
    let broken = COMPLETE.replace(
        "        reg.on_node(NodeKind::IfStmt, analyze_if);\n",
        "        reg.on_node(NodeKind::IfStmt, analyze_if);\n        let extra = \"nope\";\n",
    );
    let (tree, _) = parse_document(&broken);
    let found = verify_tree(&tree).expect("diagnostic");
    assert_eq!(found.stage, StageId::RegisterTooMany);
    let offered = fixes_for_tree(found.stage, &tree);
    assert_eq!(offered.len(), 1);
    let text = &offered[0].text;
    assert!(text.contains("reg.on_node(NodeKind::IfStmt, analyze_if);"));
    assert!(!text.contains("let extra"), "{text}");
}

#[test]
fn second_registration_is_dropped_and_the_walk_moves_on() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(RULE);
    }

    fn register(reg: &mut Registrar) {
        reg.on_node(NodeKind::IfStmt, analyze_if);
        reg.on_node(NodeKind::IfStmt, analyze_other);
    }
}
"#;
    let (tree, _) = parse_document(source);
    let found = verify_tree(&tree).expect("diagnostic");
    assert_eq!(found.stage, StageId::RegisterTooMany);
    let offered = fixes_for_tree(found.stage, &tree);
    assert_eq!(offered.len(), 1);
    let text = &offered[0].text;
    // Only the first recognized registration survives.
    assert_eq!(text.matches("reg.on_node").count(), 1, "{text}");
    assert!(text.contains("reg.on_node(NodeKind::IfStmt, analyze_if);"), "{text}");
    // Re-verifying the fixed text lands on the handler that was never declared.
    let diagnostic = verify(text).expect("analyzer present");
    assert_eq!(diagnostic.code, "mentor::analysis_fn_missing");
}

#[test]
fn fixes_keep_comments_before_closing_braces() {
    let source = "analyzer A {\n    const RULE_ID: Str = \"x\";\n\n    fn helper() {\n        let a = \"1\";\n        // keep this note\n    }\n}\n";
    let offered = fixes(StageId::RuleStaticMissing, source);
    assert_eq!(offered.len(), 1);
    let text = &offered[0].text;
    assert!(text.contains("let a = \"1\";"), "{text}");
    assert!(text.contains("// keep this note"), "{text}");
}

#[test]
fn missing_rule_in_list_is_appended_not_replaced() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(OTHER);
    }
}
"#;
    let offered = fixes(StageId::SupportedRulesIncludesRule, source);
    assert_eq!(offered.len(), 1);
    assert!(offered[0].text.contains("list(OTHER, RULE)"), "{}", offered[0].text);
}

#[test]
fn inserted_items_carry_an_explanatory_comment() {
    let offered = fixes(StageId::IdConstMissing, "analyzer IfSpacing {\n}\n");
    assert_eq!(offered.len(), 1);
    let text = &offered[0].text;
    assert!(text.contains("const RULE_ID: Str = \"if_spacing\";"), "{text}");
    // The insertion explains itself with a leading comment.
    let comment_line = text
        .lines()
        .position(|line| line.trim_start().starts_with("//"))
        .expect("comment present");
    let const_line = text
        .lines()
        .position(|line| line.contains("const RULE_ID"))
        .expect("const present");
    assert!(comment_line < const_line);
}

#[test]
fn fix_text_parses_cleanly() {
    let offered = fixes(StageId::IdConstMissing, "analyzer IfSpacing {\n}\n");
    let (_, diagnostics) = parse_document(&offered[0].text);
    assert!(!diagnostics_have_errors(&diagnostics));
}
