use crate::fix::templates as t;
use crate::stages::{predicates::BodyShape, StageId, StageResult};
use crate::syntax::{BlockRef, Edit, ExprId, NodeRef, TExpr, TStmt, TStmtKind, TType, TypeId};
use crate::unit::AnalyzedUnit;

/// Candidate edits for one failed stage. Usually one; the ambiguous stages
/// (severity choice, the two accepted cast forms) return one per reading.
pub(super) fn edits(
    stage: StageId,
    result: StageResult,
    unit: &AnalyzedUnit<'_>,
) -> Vec<(String, Edit)> {
    if result == StageResult::Satisfied {
        return Vec::new();
    }
    let id_name = unit
        .id_const()
        .map(|id| unit.item_name(id))
        .unwrap_or(t::CANONICAL_RULE_ID);
    let rule_name = unit
        .rule_static()
        .map(|id| unit.item_name(id))
        .unwrap_or(t::CANONICAL_RULE);
    match stage {
        StageId::IdConstMissing => one(
            "Insert a rule id constant",
            Edit::InsertItem {
                index: 0,
                item: t::id_const_item(),
            },
        ),
        StageId::IdConstType => replace_type(result, "Change the constant's type to Str", || {
            TType::plain("Str")
        }),
        StageId::IdConstValue => replace_expr(result, "Set a non-empty rule id string", || {
            t::string(t::RULE_ID_VALUE)
        }),
        StageId::RuleStaticMissing => {
            let index = unit
                .id_const()
                .and_then(|id| unit.item_index(id))
                .map(|index| index + 1)
                .unwrap_or(0);
            one(
                "Insert the rule descriptor",
                Edit::InsertItem {
                    index,
                    item: t::rule_static_item(id_name),
                },
            )
        }
        StageId::RuleStaticType => replace_type(result, "Change the descriptor's type to RuleInfo", || {
            TType::plain("RuleInfo")
        }),
        StageId::RuleInit => replace_expr(result, "Initialize the rule with RuleInfo::new", || {
            t::rule_init(id_name)
        }),
        StageId::RuleIdArg => replace_expr(result, "Pass the declared id constant", || {
            t::ident(id_name)
        }),
        StageId::RuleTitleArg => replace_expr(result, "Give the rule a non-empty title", || {
            t::string(t::RULE_TITLE)
        }),
        StageId::RuleMessageArg => replace_expr(result, "Give the rule a non-empty message", || {
            t::string(t::RULE_MESSAGE)
        }),
        StageId::RuleSeverityArg => {
            let Some(target) = malformed_expr(result) else {
                return Vec::new();
            };
            vec![
                (
                    "Report at warning severity".to_string(),
                    Edit::ReplaceExpr {
                        target,
                        expr: t::path("Severity", "Warning"),
                    },
                ),
                (
                    "Report at error severity".to_string(),
                    Edit::ReplaceExpr {
                        target,
                        expr: t::path("Severity", "Error"),
                    },
                ),
            ]
        }
        StageId::RuleEnabledArg => replace_expr(result, "Enable the rule by default", || {
            TExpr::Bool(true)
        }),
        StageId::SupportedRulesMissing => {
            let index = unit
                .rule_static()
                .and_then(|id| unit.item_index(id))
                .map(|index| index + 1)
                .unwrap_or(unit.analyzer.items.len());
            one(
                "Insert the supported_rules function",
                Edit::InsertItem {
                    index,
                    item: t::supported_rules_item(rule_name),
                },
            )
        }
        StageId::SupportedRulesParams => {
            let Some(target) = unit.supported_rules_fn() else {
                return Vec::new();
            };
            one(
                "Remove the parameters from supported_rules",
                Edit::SetFnParams {
                    target,
                    params: Vec::new(),
                },
            )
        }
        StageId::SupportedRulesReturnType => {
            let list = || TType::generic("List", vec![TType::plain("RuleInfo")]);
            match result {
                StageResult::Missing => {
                    let Some(target) = unit.supported_rules_fn() else {
                        return Vec::new();
                    };
                    one(
                        "Declare the List<RuleInfo> return type",
                        Edit::SetFnRet {
                            target,
                            ret: Some(list()),
                        },
                    )
                }
                _ => replace_type(result, "Return List<RuleInfo>", list),
            }
        }
        StageId::SupportedRulesBody | StageId::SupportedRulesReturn => {
            let mut stmt = t::list_of_rule(rule_name);
            match result {
                StageResult::Missing => {
                    let Some(target) = unit.supported_rules_fn() else {
                        return Vec::new();
                    };
                    stmt.comment =
                        Some("Hand back every rule this analyzer can report.".to_string());
                    one(
                        "Return the rule list",
                        Edit::InsertStmt {
                            block: BlockRef::FnBody(target),
                            index: 0,
                            stmt,
                        },
                    )
                }
                StageResult::Malformed(NodeRef::Stmt(target)) => one(
                    "Return the rule list",
                    Edit::ReplaceStmt { target, stmt },
                ),
                _ => Vec::new(),
            }
        }
        StageId::SupportedRulesIncludesRule => {
            let Some(target) = malformed_expr(result) else {
                return Vec::new();
            };
            // Keep whatever the list already returns; the rule joins it.
            let mut template = t::expr_template(unit, target);
            if let TExpr::Call { args, .. } = &mut template {
                args.push(t::ident(rule_name));
            } else {
                template = t::call(t::ident("list"), vec![t::ident(rule_name)]);
            }
            one(
                "Include the rule descriptor in the returned list",
                Edit::ReplaceExpr {
                    target,
                    expr: template,
                },
            )
        }
        StageId::SupportedRulesTooMany => {
            let Some(target) = unit.supported_rules_fn() else {
                return Vec::new();
            };
            let Some(first) = unit.fn_body(target).first().copied() else {
                return Vec::new();
            };
            one(
                "Keep only the return statement",
                Edit::RetainStmts {
                    block: BlockRef::FnBody(target),
                    keep: vec![first],
                },
            )
        }
        StageId::RegisterMissing => {
            let index = unit
                .supported_rules_fn()
                .and_then(|id| unit.item_index(id))
                .map(|index| index + 1)
                .unwrap_or(unit.analyzer.items.len());
            one(
                "Insert the register function",
                Edit::InsertItem {
                    index,
                    item: t::register_item(),
                },
            )
        }
        StageId::RegisterParam => {
            let Some(target) = unit.register_fn() else {
                return Vec::new();
            };
            one(
                "Take the registrar by mutable reference",
                Edit::SetFnParams {
                    target,
                    params: t::registrar_params(),
                },
            )
        }
        StageId::RegisterReturnType => {
            let Some(target) = unit.register_fn() else {
                return Vec::new();
            };
            one(
                "Remove the return type from register",
                Edit::SetFnRet { target, ret: None },
            )
        }
        StageId::RegisterBodyMissing | StageId::RegisterCall => {
            let Some(register) = unit.register_fn() else {
                return Vec::new();
            };
            let param = unit
                .fn_params(register)
                .first()
                .map(|param| param.name.name.as_str())
                .unwrap_or("reg");
            let handler = unit
                .handler_name()
                .map(|name| name.name.as_str())
                .unwrap_or(t::CANONICAL_HANDLER);
            let mut stmt = t::register_call_stmt(param, handler);
            match result {
                StageResult::Missing => one(
                    "Register the analysis function for if statements",
                    Edit::InsertStmt {
                        block: BlockRef::FnBody(register),
                        index: 0,
                        stmt,
                    },
                ),
                StageResult::Malformed(NodeRef::Stmt(target)) => {
                    stmt.comment = None;
                    one(
                        "Register the analysis function for if statements",
                        Edit::ReplaceStmt { target, stmt },
                    )
                }
                _ => Vec::new(),
            }
        }
        StageId::RegisterKindArg => replace_expr(result, "Subscribe to if-statement nodes", || {
            t::path("NodeKind", "IfStmt")
        }),
        StageId::RegisterHandlerArg => {
            replace_expr(result, "Name the analysis function directly", || {
                t::ident(t::CANONICAL_HANDLER)
            })
        }
        StageId::RegisterTooMany => {
            let Some(register) = unit.register_fn() else {
                return Vec::new();
            };
            let Some((keep, _)) = unit.register_call() else {
                return Vec::new();
            };
            one(
                "Keep only the registration call",
                Edit::RetainStmts {
                    block: BlockRef::FnBody(register),
                    keep: vec![keep],
                },
            )
        }
        StageId::AnalysisFnMissing => {
            let Some(handler) = unit.handler_name() else {
                return Vec::new();
            };
            one(
                "Declare the registered analysis function",
                Edit::InsertItem {
                    index: unit.analyzer.items.len(),
                    item: t::analysis_fn_item(&handler.name),
                },
            )
        }
        StageId::AnalysisFnParam => {
            let Some(target) = unit.analysis_fn() else {
                return Vec::new();
            };
            one(
                "Take the node context by reference",
                Edit::SetFnParams {
                    target,
                    params: t::context_params(),
                },
            )
        }
        StageId::AnalysisFnReturnType => {
            let Some(target) = unit.analysis_fn() else {
                return Vec::new();
            };
            one(
                "Remove the return type from the analysis function",
                Edit::SetFnRet { target, ret: None },
            )
        }
        StageId::IfStmtDecl
        | StageId::IfKeywordDecl
        | StageId::TriviaCheck
        | StageId::TriviaVarDecl
        | StageId::TriviaKindCheck
        | StageId::WhitespaceCheck
        | StageId::ReturnStmt
        | StageId::OpenParenDecl
        | StageId::StartSpanDecl
        | StageId::EndSpanDecl
        | StageId::SpanDecl
        | StageId::LocationDecl
        | StageId::DiagnosticDecl
        | StageId::ReportStmt => body_edits(stage, result, unit, rule_name),
        StageId::Complete => Vec::new(),
    }
}

fn body_edits(
    stage: StageId,
    result: StageResult,
    unit: &AnalyzedUnit<'_>,
    rule_name: &str,
) -> Vec<(String, Edit)> {
    let Some(shape) = BodyShape::of(unit) else {
        return Vec::new();
    };
    let Some(analysis) = unit.analysis_fn() else {
        return Vec::new();
    };
    let top = BlockRef::FnBody(analysis);
    let ctx = shape.ctx();
    let if_stmt = shape.if_stmt_var().unwrap_or("if_stmt");
    let if_keyword = shape.if_keyword_var().unwrap_or("if_keyword");
    let trailing = shape.trivia_var().unwrap_or("trailing");
    match stage {
        StageId::IfStmtDecl => {
            let node = t::field(t::ident(ctx), "node");
            let method_form = t::let_stmt(
                "if_stmt",
                t::method(node.clone(), "as_if_stmt", Vec::new()),
                "Grab the if statement this callback fired for.",
            );
            let cast_form = t::let_stmt(
                "if_stmt",
                t::call(t::path("IfStmt", "cast"), vec![node]),
                "Grab the if statement this callback fired for.",
            );
            let mut out = Vec::new();
            if let Some(edit) = place(result, top, 0, method_form) {
                out.push(("Extract the if statement with as_if_stmt()".to_string(), edit));
            }
            if let Some(edit) = place(result, top, 0, cast_form) {
                out.push(("Extract the if statement with IfStmt::cast".to_string(), edit));
            }
            out
        }
        StageId::IfKeywordDecl => placed(
            result,
            top,
            1,
            t::let_stmt(
                "if_keyword",
                t::method(t::ident(if_stmt), "if_keyword", Vec::new()),
                "The keyword token carries the trivia being checked.",
            ),
            "Extract the if keyword",
        ),
        StageId::TriviaCheck => placed(
            result,
            top,
            2,
            t::if_stmt(
                t::method(t::ident(if_keyword), "has_trailing_trivia", Vec::new()),
                Vec::new(),
                "Only whitespace attached to the keyword matters here.",
            ),
            "Guard on the keyword's trailing trivia",
        ),
        StageId::TriviaVarDecl => {
            let Some(block) = shape.trivia_if().map(BlockRef::IfBody) else {
                return Vec::new();
            };
            placed(
                result,
                block,
                0,
                t::let_stmt(
                    "trailing",
                    t::method(t::ident(if_keyword), "trailing_trivia", Vec::new()),
                    "Bind the trivia so the next checks can inspect it.",
                ),
                "Extract the trailing trivia",
            )
        }
        StageId::TriviaKindCheck => {
            let Some(block) = shape.trivia_if().map(BlockRef::IfBody) else {
                return Vec::new();
            };
            placed(
                result,
                block,
                1,
                t::if_stmt(
                    TExpr::Eq(
                        Box::new(t::method(t::ident(trailing), "kind", Vec::new())),
                        Box::new(t::path("TriviaKind", "Space")),
                    ),
                    Vec::new(),
                    "Anything other than plain spaces needs the diagnostic.",
                ),
                "Check the trivia kind",
            )
        }
        StageId::WhitespaceCheck => {
            let Some(block) = shape.kind_if().map(BlockRef::IfBody) else {
                return Vec::new();
            };
            placed(
                result,
                block,
                0,
                t::if_stmt(
                    TExpr::Eq(
                        Box::new(t::method(t::ident(trailing), "text", Vec::new())),
                        Box::new(t::string(" ")),
                    ),
                    Vec::new(),
                    "Exactly one space is the accepted spelling.",
                ),
                "Check for a single space",
            )
        }
        StageId::ReturnStmt => {
            let Some(block) = shape.ws_if().map(BlockRef::IfBody) else {
                return Vec::new();
            };
            placed(
                result,
                block,
                0,
                TStmt {
                    kind: TStmtKind::Return(None),
                    comment: Some("The spacing is already correct.".to_string()),
                },
                "Return early for correct spacing",
            )
        }
        StageId::OpenParenDecl => placed(
            result,
            top,
            3,
            t::let_stmt(
                "open_paren",
                t::method(t::ident(if_stmt), "open_paren", Vec::new()),
                "The open parenthesis bounds the squiggle on the right.",
            ),
            "Extract the open parenthesis",
        ),
        StageId::StartSpanDecl => placed(
            result,
            top,
            4,
            t::let_stmt(
                "start",
                t::method(
                    t::method(t::ident(if_keyword), "span", Vec::new()),
                    "start",
                    Vec::new(),
                ),
                "The squiggle starts where the keyword starts.",
            ),
            "Extract the diagnostic start",
        ),
        StageId::EndSpanDecl => {
            let open_paren = shape.open_paren_var().unwrap_or("open_paren");
            placed(
                result,
                top,
                5,
                t::let_stmt(
                    "end",
                    t::method(
                        t::method(t::ident(open_paren), "span", Vec::new()),
                        "start",
                        Vec::new(),
                    ),
                    "It ends just before the parenthesis.",
                ),
                "Extract the diagnostic end",
            )
        }
        StageId::SpanDecl => {
            let start = shape.start_var().unwrap_or("start");
            let end = shape.end_var().unwrap_or("end");
            placed(
                result,
                top,
                6,
                t::let_stmt(
                    "span",
                    t::call(t::path("Span", "of"), vec![t::ident(start), t::ident(end)]),
                    "The span covering the bad spacing.",
                ),
                "Build the diagnostic span",
            )
        }
        StageId::LocationDecl => {
            let span = shape.span_var().unwrap_or("span");
            placed(
                result,
                top,
                7,
                t::let_stmt(
                    "location",
                    t::call(
                        t::path("Location", "of"),
                        vec![
                            t::method(t::ident(ctx), "file", Vec::new()),
                            t::ident(span),
                        ],
                    ),
                    "Pin the span to the file under analysis.",
                ),
                "Build the diagnostic location",
            )
        }
        StageId::DiagnosticDecl => {
            let location = shape.location_var().unwrap_or("location");
            placed(
                result,
                top,
                8,
                t::let_stmt(
                    "diagnostic",
                    t::call(
                        t::path("Diagnostic", "of"),
                        vec![
                            t::ident(rule_name),
                            t::ident(location),
                            t::method(t::ident(rule_name), "message", Vec::new()),
                        ],
                    ),
                    "Pair the rule with the location and its message.",
                ),
                "Build the diagnostic",
            )
        }
        StageId::ReportStmt => {
            let diagnostic = shape.diagnostic_var().unwrap_or("diagnostic");
            placed(
                result,
                top,
                9,
                t::expr_stmt(
                    t::method(t::ident(ctx), "report", vec![t::ident(diagnostic)]),
                    "Hand the diagnostic to the host.",
                ),
                "Report the diagnostic",
            )
        }
        _ => Vec::new(),
    }
}

fn one(title: &str, edit: Edit) -> Vec<(String, Edit)> {
    vec![(title.to_string(), edit)]
}

fn malformed_expr(result: StageResult) -> Option<ExprId> {
    match result {
        StageResult::Malformed(NodeRef::Expr(id)) => Some(id),
        _ => None,
    }
}

fn malformed_type(result: StageResult) -> Option<TypeId> {
    match result {
        StageResult::Malformed(NodeRef::Type(id)) => Some(id),
        _ => None,
    }
}

fn replace_expr(
    result: StageResult,
    title: &str,
    expr: impl FnOnce() -> TExpr,
) -> Vec<(String, Edit)> {
    match malformed_expr(result) {
        Some(target) => one(title, Edit::ReplaceExpr {
            target,
            expr: expr(),
        }),
        None => Vec::new(),
    }
}

fn replace_type(
    result: StageResult,
    title: &str,
    ty: impl FnOnce() -> TType,
) -> Vec<(String, Edit)> {
    match malformed_type(result) {
        Some(target) => one(title, Edit::ReplaceType { target, ty: ty() }),
        None => Vec::new(),
    }
}

/// Missing becomes an insert at the candidate position, Malformed a
/// replacement of the offending statement. Replacement drops the template
/// comment so the user's own comment on that statement survives.
fn place(result: StageResult, block: BlockRef, index: usize, mut stmt: TStmt) -> Option<Edit> {
    match result {
        StageResult::Missing => Some(Edit::InsertStmt { block, index, stmt }),
        StageResult::Malformed(NodeRef::Stmt(target)) => {
            stmt.comment = None;
            Some(Edit::ReplaceStmt { target, stmt })
        }
        _ => None,
    }
}

fn placed(
    result: StageResult,
    block: BlockRef,
    index: usize,
    stmt: TStmt,
    title: &str,
) -> Vec<(String, Edit)> {
    match place(result, block, index, stmt) {
        Some(edit) => one(title, edit),
        None => Vec::new(),
    }
}
