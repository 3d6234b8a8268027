use crate::diagnostics::{Diagnostic, Span};
use crate::stages::{catalog, predicates, render_message, StageId, StageResult};
use crate::syntax::{parse_document, SyntaxTree};
use crate::unit::AnalyzedUnit;
use rustc_hash::FxHashSet;

/// One verification finding: the stage it belongs to plus the rendered
/// diagnostic. The stage id is what `fixes` keys on.
#[derive(Debug, Clone)]
pub struct StageDiagnostic {
    pub stage: StageId,
    pub diagnostic: Diagnostic,
}

/// Runs the staged verifier over a source text. `None` when the document
/// has no analyzer declaration to anchor diagnostics to. At most one
/// diagnostic per pass: the first stage that does not hold, or the
/// informational completion notice once every stage holds.
pub fn verify(source: &str) -> Option<Diagnostic> {
    let (tree, _) = parse_document(source);
    verify_tree(&tree).map(|found| found.diagnostic)
}

pub fn verify_tree(tree: &SyntaxTree) -> Option<StageDiagnostic> {
    let unit = AnalyzedUnit::extract(tree)?;
    let mut satisfied: FxHashSet<StageId> = FxHashSet::default();
    for stage in catalog().stages() {
        if stage.id == StageId::Complete {
            continue;
        }
        if !stage
            .preconditions
            .iter()
            .all(|pre| satisfied.contains(pre))
        {
            // Unmet precondition: the stage cannot be judged yet and
            // produces no diagnostic of its own.
            continue;
        }
        match predicates::evaluate(stage.id, &unit) {
            StageResult::Satisfied => {
                satisfied.insert(stage.id);
            }
            result => return Some(stage_diagnostic(stage.id, result, &unit)),
        }
    }
    Some(stage_diagnostic(
        StageId::Complete,
        StageResult::Satisfied,
        &unit,
    ))
}

fn stage_diagnostic(
    stage: StageId,
    result: StageResult,
    unit: &AnalyzedUnit<'_>,
) -> StageDiagnostic {
    StageDiagnostic {
        stage,
        diagnostic: Diagnostic {
            code: stage.code().to_string(),
            severity: stage.severity(),
            message: render_message(stage, unit),
            span: span_for(stage, result, unit),
        },
    }
}

/// Anchor span for a finding. `Malformed` points at the offending node;
/// `Missing` points at the narrowest enclosing name that is present: the
/// owning function's name for function-scoped stages, the registered
/// handler name for a handler that never got declared, and the analyzer
/// name for everything document-scoped (including the completion notice).
fn span_for(stage: StageId, result: StageResult, unit: &AnalyzedUnit<'_>) -> Span {
    if let StageResult::Malformed(node) = result {
        return unit.tree.node_span(node);
    }
    match stage {
        StageId::SupportedRulesParams
        | StageId::SupportedRulesReturnType
        | StageId::SupportedRulesBody
        | StageId::SupportedRulesReturn
        | StageId::SupportedRulesIncludesRule
        | StageId::SupportedRulesTooMany => fn_name_span(unit, unit.supported_rules_fn()),
        StageId::RegisterParam
        | StageId::RegisterReturnType
        | StageId::RegisterBodyMissing
        | StageId::RegisterCall
        | StageId::RegisterKindArg
        | StageId::RegisterHandlerArg
        | StageId::RegisterTooMany => fn_name_span(unit, unit.register_fn()),
        StageId::AnalysisFnMissing => unit
            .handler_name()
            .map(|name| name.span.clone())
            .unwrap_or_else(|| analyzer_span(unit)),
        StageId::AnalysisFnParam
        | StageId::AnalysisFnReturnType
        | StageId::IfStmtDecl
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
        | StageId::ReportStmt => fn_name_span(unit, unit.analysis_fn()),
        _ => analyzer_span(unit),
    }
}

fn fn_name_span(unit: &AnalyzedUnit<'_>, id: Option<crate::syntax::ItemId>) -> Span {
    match id {
        Some(id) => unit.item(id).name().span.clone(),
        None => analyzer_span(unit),
    }
}

fn analyzer_span(unit: &AnalyzedUnit<'_>) -> Span {
    unit.analyzer.name.span.clone()
}
