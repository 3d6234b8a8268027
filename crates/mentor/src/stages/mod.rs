mod catalog;
pub(crate) mod predicates;

pub use catalog::{catalog, Catalog, Stage};
pub use predicates::evaluate;

use crate::diagnostics::Severity;
use crate::syntax::NodeRef;
use crate::unit::AnalyzedUnit;

/// One milestone in the expected implementation. Declaration order is the
/// catalog order; the verifier walks stages strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageId {
    IdConstMissing,
    IdConstType,
    IdConstValue,
    RuleStaticMissing,
    RuleStaticType,
    RuleInit,
    RuleIdArg,
    RuleTitleArg,
    RuleMessageArg,
    RuleSeverityArg,
    RuleEnabledArg,
    SupportedRulesMissing,
    SupportedRulesParams,
    SupportedRulesReturnType,
    SupportedRulesBody,
    SupportedRulesReturn,
    SupportedRulesIncludesRule,
    SupportedRulesTooMany,
    RegisterMissing,
    RegisterParam,
    RegisterReturnType,
    RegisterBodyMissing,
    RegisterCall,
    RegisterKindArg,
    RegisterHandlerArg,
    RegisterTooMany,
    AnalysisFnMissing,
    AnalysisFnParam,
    AnalysisFnReturnType,
    IfStmtDecl,
    IfKeywordDecl,
    TriviaCheck,
    TriviaVarDecl,
    TriviaKindCheck,
    WhitespaceCheck,
    ReturnStmt,
    OpenParenDecl,
    StartSpanDecl,
    EndSpanDecl,
    SpanDecl,
    LocationDecl,
    DiagnosticDecl,
    ReportStmt,
    Complete,
}

impl StageId {
    pub const ALL: [StageId; 44] = [
        StageId::IdConstMissing,
        StageId::IdConstType,
        StageId::IdConstValue,
        StageId::RuleStaticMissing,
        StageId::RuleStaticType,
        StageId::RuleInit,
        StageId::RuleIdArg,
        StageId::RuleTitleArg,
        StageId::RuleMessageArg,
        StageId::RuleSeverityArg,
        StageId::RuleEnabledArg,
        StageId::SupportedRulesMissing,
        StageId::SupportedRulesParams,
        StageId::SupportedRulesReturnType,
        StageId::SupportedRulesBody,
        StageId::SupportedRulesReturn,
        StageId::SupportedRulesIncludesRule,
        StageId::SupportedRulesTooMany,
        StageId::RegisterMissing,
        StageId::RegisterParam,
        StageId::RegisterReturnType,
        StageId::RegisterBodyMissing,
        StageId::RegisterCall,
        StageId::RegisterKindArg,
        StageId::RegisterHandlerArg,
        StageId::RegisterTooMany,
        StageId::AnalysisFnMissing,
        StageId::AnalysisFnParam,
        StageId::AnalysisFnReturnType,
        StageId::IfStmtDecl,
        StageId::IfKeywordDecl,
        StageId::TriviaCheck,
        StageId::TriviaVarDecl,
        StageId::TriviaKindCheck,
        StageId::WhitespaceCheck,
        StageId::ReturnStmt,
        StageId::OpenParenDecl,
        StageId::StartSpanDecl,
        StageId::EndSpanDecl,
        StageId::SpanDecl,
        StageId::LocationDecl,
        StageId::DiagnosticDecl,
        StageId::ReportStmt,
        StageId::Complete,
    ];

    /// Stable wire-level diagnostic code.
    pub fn code(self) -> &'static str {
        match self {
            StageId::IdConstMissing => "mentor::id_const_missing",
            StageId::IdConstType => "mentor::id_const_type",
            StageId::IdConstValue => "mentor::id_const_value",
            StageId::RuleStaticMissing => "mentor::rule_static_missing",
            StageId::RuleStaticType => "mentor::rule_static_type",
            StageId::RuleInit => "mentor::rule_init",
            StageId::RuleIdArg => "mentor::rule_id_arg",
            StageId::RuleTitleArg => "mentor::rule_title_arg",
            StageId::RuleMessageArg => "mentor::rule_message_arg",
            StageId::RuleSeverityArg => "mentor::rule_severity_arg",
            StageId::RuleEnabledArg => "mentor::rule_enabled_arg",
            StageId::SupportedRulesMissing => "mentor::supported_rules_missing",
            StageId::SupportedRulesParams => "mentor::supported_rules_params",
            StageId::SupportedRulesReturnType => "mentor::supported_rules_return_type",
            StageId::SupportedRulesBody => "mentor::supported_rules_body",
            StageId::SupportedRulesReturn => "mentor::supported_rules_return",
            StageId::SupportedRulesIncludesRule => "mentor::supported_rules_includes_rule",
            StageId::SupportedRulesTooMany => "mentor::supported_rules_too_many",
            StageId::RegisterMissing => "mentor::register_missing",
            StageId::RegisterParam => "mentor::register_param",
            StageId::RegisterReturnType => "mentor::register_return_type",
            StageId::RegisterBodyMissing => "mentor::register_body_missing",
            StageId::RegisterCall => "mentor::register_call",
            StageId::RegisterKindArg => "mentor::register_kind_arg",
            StageId::RegisterHandlerArg => "mentor::register_handler_arg",
            StageId::RegisterTooMany => "mentor::register_too_many",
            StageId::AnalysisFnMissing => "mentor::analysis_fn_missing",
            StageId::AnalysisFnParam => "mentor::analysis_fn_param",
            StageId::AnalysisFnReturnType => "mentor::analysis_fn_return_type",
            StageId::IfStmtDecl => "mentor::if_stmt_decl",
            StageId::IfKeywordDecl => "mentor::if_keyword_decl",
            StageId::TriviaCheck => "mentor::trivia_check",
            StageId::TriviaVarDecl => "mentor::trivia_var_decl",
            StageId::TriviaKindCheck => "mentor::trivia_kind_check",
            StageId::WhitespaceCheck => "mentor::whitespace_check",
            StageId::ReturnStmt => "mentor::return_stmt",
            StageId::OpenParenDecl => "mentor::open_paren_decl",
            StageId::StartSpanDecl => "mentor::start_span_decl",
            StageId::EndSpanDecl => "mentor::end_span_decl",
            StageId::SpanDecl => "mentor::span_decl",
            StageId::LocationDecl => "mentor::location_decl",
            StageId::DiagnosticDecl => "mentor::diagnostic_decl",
            StageId::ReportStmt => "mentor::report_stmt",
            StageId::Complete => "mentor::complete",
        }
    }

    /// Position in the total stage ordering.
    pub fn order(self) -> usize {
        catalog().order(self)
    }

    pub fn severity(self) -> Severity {
        match self {
            StageId::Complete => Severity::Info,
            _ => Severity::Error,
        }
    }
}

/// Classification of one stage for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageResult {
    Satisfied,
    Missing,
    Malformed(NodeRef),
}

/// Human-readable message for a stage. Fixed per stage, except for the few
/// stages that echo back a user-chosen name.
pub fn render_message(stage: StageId, unit: &AnalyzedUnit<'_>) -> String {
    let template = catalog().get(stage).message;
    match stage {
        StageId::RuleIdArg => {
            let name = unit
                .id_const()
                .map(|id| unit.item_name(id))
                .unwrap_or("the rule id constant");
            template.replace("{name}", name)
        }
        StageId::SupportedRulesIncludesRule => {
            let name = unit
                .rule_static()
                .map(|id| unit.item_name(id))
                .unwrap_or("the rule descriptor");
            template.replace("{name}", name)
        }
        StageId::AnalysisFnMissing => {
            let name = unit
                .handler_name()
                .map(|name| name.name.as_str())
                .unwrap_or("the registered handler");
            template.replace("{name}", name)
        }
        StageId::IfKeywordDecl => {
            let shape = predicates::BodyShape::of(unit);
            let name = shape
                .as_ref()
                .and_then(|shape| shape.if_stmt_var())
                .unwrap_or("if_stmt");
            template.replace("{name}", name)
        }
        StageId::TriviaCheck | StageId::TriviaVarDecl => {
            let shape = predicates::BodyShape::of(unit);
            let name = shape
                .as_ref()
                .and_then(|shape| shape.if_keyword_var())
                .unwrap_or("if_keyword");
            template.replace("{name}", name)
        }
        _ => template.to_string(),
    }
}
