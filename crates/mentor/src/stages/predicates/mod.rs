mod body;
mod functions;
mod members;

pub use body::BodyShape;

use crate::stages::{StageId, StageResult};
use crate::syntax::{Expr, ExprId, TypeId};
use crate::unit::AnalyzedUnit;

/// Classifies one stage for one document view. Pure: no state, no panics —
/// any shape the check cannot positively confirm comes back as `Missing`
/// or `Malformed`, never as an error.
pub fn evaluate(stage: StageId, unit: &AnalyzedUnit<'_>) -> StageResult {
    match stage {
        StageId::IdConstMissing
        | StageId::IdConstType
        | StageId::IdConstValue
        | StageId::RuleStaticMissing
        | StageId::RuleStaticType
        | StageId::RuleInit
        | StageId::RuleIdArg
        | StageId::RuleTitleArg
        | StageId::RuleMessageArg
        | StageId::RuleSeverityArg
        | StageId::RuleEnabledArg => members::evaluate(stage, unit),
        StageId::SupportedRulesMissing
        | StageId::SupportedRulesParams
        | StageId::SupportedRulesReturnType
        | StageId::SupportedRulesBody
        | StageId::SupportedRulesReturn
        | StageId::SupportedRulesIncludesRule
        | StageId::SupportedRulesTooMany
        | StageId::RegisterMissing
        | StageId::RegisterParam
        | StageId::RegisterReturnType
        | StageId::RegisterBodyMissing
        | StageId::RegisterCall
        | StageId::RegisterKindArg
        | StageId::RegisterHandlerArg
        | StageId::RegisterTooMany
        | StageId::AnalysisFnMissing
        | StageId::AnalysisFnParam
        | StageId::AnalysisFnReturnType => functions::evaluate(stage, unit),
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
        | StageId::ReportStmt => body::evaluate(stage, unit),
        // The terminal stage is synthesized by the verifier once everything
        // else passed; it never fails on its own.
        StageId::Complete => StageResult::Satisfied,
    }
}

pub(crate) fn ident_name<'a>(unit: &AnalyzedUnit<'a>, expr: ExprId) -> Option<&'a str> {
    match unit.expr(expr) {
        Expr::Ident(name) => Some(name.name.as_str()),
        _ => None,
    }
}

pub(crate) fn is_nonempty_str(unit: &AnalyzedUnit<'_>, expr: ExprId) -> bool {
    matches!(unit.expr(expr), Expr::Str { value, .. } if !value.is_empty())
}

pub(crate) fn is_path(unit: &AnalyzedUnit<'_>, expr: ExprId, qualifier: &str, member: &str) -> bool {
    matches!(
        unit.expr(expr),
        Expr::Path { qualifier: q, member: m, .. } if q.name == qualifier && m.name == member
    )
}

/// `true` for a plain (argument-free) type with the given name.
pub(crate) fn type_is_plain(unit: &AnalyzedUnit<'_>, ty: TypeId, name: &str) -> bool {
    let ty = unit.tree.arena.type_expr(ty);
    ty.name.name == name && ty.args.is_empty()
}

/// `true` for `Outer<Inner>` with exactly one plain argument.
pub(crate) fn type_is_generic1(
    unit: &AnalyzedUnit<'_>,
    ty: TypeId,
    outer: &str,
    inner: &str,
) -> bool {
    let ty = unit.tree.arena.type_expr(ty);
    if ty.name.name != outer || ty.args.len() != 1 {
        return false;
    }
    type_is_plain(unit, ty.args[0], inner)
}

/// `recv.method()` with no arguments, where `recv` is a plain identifier.
pub(crate) fn is_method0(
    unit: &AnalyzedUnit<'_>,
    expr: ExprId,
    recv: &str,
    method: &str,
) -> bool {
    match unit.expr(expr) {
        Expr::MethodCall {
            recv: recv_id,
            method: m,
            args,
            ..
        } => args.is_empty() && m.name == method && ident_name(unit, *recv_id) == Some(recv),
        _ => false,
    }
}
