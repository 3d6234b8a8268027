use mentor::{parse_document, verify, verify_tree, Severity, StageId};

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

fn stage_of(source: &str) -> StageId {
    let (tree, _) = parse_document(source);
    verify_tree(&tree).expect("analyzer declaration present").stage
}

#[test]
fn complete_document_gets_the_info_notice() {
    let diagnostic = verify(COMPLETE).expect("terminal diagnostic");
    assert_eq!(diagnostic.code, "mentor::complete");
    assert_eq!(diagnostic.severity, Severity::Info);
    // Anchored at the analyzer name on line 1.
    assert_eq!(diagnostic.span.start.line, 1);
}

#[test]
fn variant_forms_also_reach_complete() {
    let source = r#"analyzer IfSpacing {
    const SPACING_ID: Str = "spacing";

    static SPACING: RuleInfo = RuleInfo::new(SPACING_ID, "Spacing",
        "one space after if", Severity::Error, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(SPACING);
    }

    fn register(r: &mut Registrar) {
        r.on_node(NodeKind::IfStmt, check_if);
    }

    fn check_if(c: &NodeContext) {
        let stmt = IfStmt::cast(c.node);
        let kw = stmt.if_keyword();
        if kw.has_trailing_trivia() {
            let t = kw.trailing_trivia();
            if t.kind() == TriviaKind::Space {
                if t.text() == " " {
                    return;
                }
            }
        }
        let paren = stmt.open_paren();
        let s = kw.start();
        let e = paren.start();
        let span = Span::of(s, e);
        let loc = Location::of(c.file(), span);
        let d = Diagnostic::of(SPACING, loc, SPACING.message());
        c.report(d);
    }
}
"#;
    assert_eq!(stage_of(source), StageId::Complete);
}

#[test]
fn no_analyzer_means_no_diagnostic() {
    assert!(verify("").is_none());
    assert!(verify("// just a comment\n").is_none());
}

#[test]
fn empty_analyzer_starts_at_the_id_constant() {
    let diagnostic = verify("analyzer IfSpacing {\n}\n").expect("diagnostic");
    assert_eq!(diagnostic.code, "mentor::id_const_missing");
    assert_eq!(diagnostic.severity, Severity::Error);
}

#[test]
fn wrong_id_type_is_flagged_after_presence() {
    let source = "analyzer A {\n    const RULE_ID: Bool = \"x\";\n}\n";
    assert_eq!(stage_of(source), StageId::IdConstType);
}

#[test]
fn empty_id_value_is_flagged() {
    let source = "analyzer A {\n    const RULE_ID: Str = \"\";\n}\n";
    assert_eq!(stage_of(source), StageId::IdConstValue);
}

#[test]
fn malformed_anchor_points_at_the_offending_node() {
    let source = "analyzer A {\n    const RULE_ID: Bool = \"x\";\n}\n";
    let diagnostic = verify(source).expect("diagnostic");
    // The `Bool` token sits on line 2.
    assert_eq!(diagnostic.span.start.line, 2);
    assert_eq!(diagnostic.span.start.column, 20);
}

#[test]
fn rule_severity_must_be_warning_or_error() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Hint, true);
}
"#;
    assert_eq!(stage_of(source), StageId::RuleSeverityArg);
}

#[test]
fn rule_id_arg_must_name_the_declared_constant() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(OTHER, "t", "m", Severity::Warning, true);
}
"#;
    let (tree, _) = parse_document(source);
    let found = verify_tree(&tree).expect("diagnostic");
    assert_eq!(found.stage, StageId::RuleIdArg);
    // The message names the constant the initializer should reference.
    assert!(found.diagnostic.message.contains("RULE_ID"));
}

#[test]
fn supported_rules_checks_follow_the_descriptor() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);
}
"#;
    assert_eq!(stage_of(source), StageId::SupportedRulesMissing);
}

#[test]
fn supported_rules_must_include_the_descriptor() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(OTHER);
    }
}
"#;
    assert_eq!(stage_of(source), StageId::SupportedRulesIncludesRule);
}

#[test]
fn register_param_must_be_a_mutable_registrar_reference() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(RULE);
    }

    fn register(reg: Registrar) {
        reg.on_node(NodeKind::IfStmt, analyze_if);
    }
}
"#;
    assert_eq!(stage_of(source), StageId::RegisterParam);
}

#[test]
fn extra_register_statements_are_flagged_at_the_parameter_list() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(RULE);
    }

    fn register(reg: &mut Registrar) {
        reg.on_node(NodeKind::IfStmt, analyze_if);
        reg.on_node(NodeKind::IfStmt, analyze_if);
    }
}
"#;
    let (tree, _) = parse_document(source);
    let found = verify_tree(&tree).expect("diagnostic");
    assert_eq!(found.stage, StageId::RegisterTooMany);
    // Anchored at `(reg: &mut Registrar)`, not at either call.
    assert_eq!(found.diagnostic.span.start.line, 9);
}

#[test]
fn missing_handler_is_reported_at_the_registered_name() {
    let source = r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(RULE);
    }

    fn register(reg: &mut Registrar) {
        reg.on_node(NodeKind::IfStmt, analyze_if);
    }
}
"#;
    let (tree, _) = parse_document(source);
    let found = verify_tree(&tree).expect("diagnostic");
    assert_eq!(found.stage, StageId::AnalysisFnMissing);
    assert!(found.diagnostic.message.contains("analyze_if"));
    // The registered handler name sits on line 10.
    assert_eq!(found.diagnostic.span.start.line, 10);
}

#[test]
fn body_statements_are_checked_in_order() {
    let mut source = String::from(
        r#"analyzer A {
    const RULE_ID: Str = "x";
    static RULE: RuleInfo = RuleInfo::new(RULE_ID, "t", "m", Severity::Warning, true);

    fn supported_rules() -> List<RuleInfo> {
        return list(RULE);
    }

    fn register(reg: &mut Registrar) {
        reg.on_node(NodeKind::IfStmt, analyze_if);
    }

    fn analyze_if(ctx: &NodeContext) {
"#,
    );
    source.push_str("    }\n}\n");
    assert_eq!(stage_of(&source), StageId::IfStmtDecl);
}

#[test]
fn trailing_extra_statements_after_report_are_tolerated() {
    let with_extra = COMPLETE.replace(
        "        ctx.report(diagnostic);\n",
        "        ctx.report(diagnostic);\n        let after = ctx.file();\n",
    );
    let diagnostic = verify(&with_extra).expect("diagnostic");
    assert_eq!(diagnostic.code, "mentor::complete");
}

#[test]
fn diagnostics_serialize_to_json() {
    let diagnostic = verify(COMPLETE).expect("diagnostic");
    let value = serde_json::to_value(&diagnostic).expect("serializable");
    assert_eq!(value["code"], "mentor::complete");
    assert_eq!(value["severity"], "info");
    assert_eq!(value["span"]["start"]["line"], 1);
    let batch = mentor::diagnostics_to_json(&[diagnostic]);
    assert_eq!(batch[0]["code"], "mentor::complete");
}
