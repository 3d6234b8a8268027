use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::diagnostics::Severity;
use crate::stages::StageId;

/// One catalog entry: preconditions gate evaluation, the message is the
/// fixed diagnostic text (with at most one `{name}` echo slot).
#[derive(Debug, Clone)]
pub struct Stage {
    pub id: StageId,
    pub preconditions: &'static [StageId],
    pub severity: Severity,
    pub message: &'static str,
}

#[derive(Debug)]
pub struct Catalog {
    stages: Vec<Stage>,
    order: FxHashMap<StageId, usize>,
}

impl Catalog {
    fn new() -> Self {
        let stages = build_stages();
        let order = stages
            .iter()
            .enumerate()
            .map(|(index, stage)| (stage.id, index))
            .collect();
        Self { stages, order }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn get(&self, id: StageId) -> &Stage {
        &self.stages[self.order[&id]]
    }

    pub fn order(&self, id: StageId) -> usize {
        self.order[&id]
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// The catalog is constructed once at first use and immutable afterwards.
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(Catalog::new)
}

fn build_stages() -> Vec<Stage> {
    use StageId::*;

    let stage = |id: StageId, preconditions: &'static [StageId], message: &'static str| Stage {
        id,
        preconditions,
        severity: id.severity(),
        message,
    };

    vec![
        stage(
            IdConstMissing,
            &[],
            "declare a rule id constant of type `Str` to identify this rule",
        ),
        stage(
            IdConstType,
            &[IdConstMissing],
            "the rule id constant must have type `Str`",
        ),
        stage(
            IdConstValue,
            &[IdConstType],
            "the rule id constant must be initialized with a non-empty string literal",
        ),
        stage(
            RuleStaticMissing,
            &[],
            "declare a `static` rule descriptor of type `RuleInfo` describing this rule",
        ),
        stage(
            RuleStaticType,
            &[RuleStaticMissing],
            "the rule descriptor must have type `RuleInfo`",
        ),
        stage(
            RuleInit,
            &[RuleStaticType],
            "initialize the rule descriptor with `RuleInfo::new(id, title, message, severity, enabled)`",
        ),
        stage(
            RuleIdArg,
            &[RuleInit, IdConstMissing],
            "the first argument of `RuleInfo::new` must be the declared rule id constant '{name}'",
        ),
        stage(
            RuleTitleArg,
            &[RuleIdArg],
            "the second argument of `RuleInfo::new` must be a non-empty title string",
        ),
        stage(
            RuleMessageArg,
            &[RuleTitleArg],
            "the third argument of `RuleInfo::new` must be a non-empty message string",
        ),
        stage(
            RuleSeverityArg,
            &[RuleMessageArg],
            "the fourth argument of `RuleInfo::new` must be a `Severity` member such as `Severity::Warning`",
        ),
        stage(
            RuleEnabledArg,
            &[RuleSeverityArg],
            "the fifth argument of `RuleInfo::new` must be `true` so the rule is enabled by default",
        ),
        stage(
            SupportedRulesMissing,
            &[],
            "implement a `supported_rules` function returning the rules this analyzer can report",
        ),
        stage(
            SupportedRulesParams,
            &[SupportedRulesMissing],
            "`supported_rules` must not take parameters",
        ),
        stage(
            SupportedRulesReturnType,
            &[SupportedRulesMissing],
            "`supported_rules` must return `List<RuleInfo>`",
        ),
        stage(
            SupportedRulesBody,
            &[SupportedRulesMissing],
            "`supported_rules` must return a list holding the rule descriptor",
        ),
        stage(
            SupportedRulesReturn,
            &[SupportedRulesBody],
            "the `supported_rules` body must be a single `return list(..);` statement",
        ),
        stage(
            SupportedRulesIncludesRule,
            &[SupportedRulesReturn, RuleStaticMissing],
            "the returned list must contain the rule descriptor '{name}'",
        ),
        stage(
            SupportedRulesTooMany,
            &[SupportedRulesReturn],
            "`supported_rules` must contain exactly one statement",
        ),
        stage(
            RegisterMissing,
            &[],
            "implement a `register` function so the host can invoke this analyzer",
        ),
        stage(
            RegisterParam,
            &[RegisterMissing],
            "`register` must take exactly one parameter, `reg: &mut Registrar`",
        ),
        stage(
            RegisterReturnType,
            &[RegisterMissing],
            "`register` must not declare a return type",
        ),
        stage(
            RegisterBodyMissing,
            &[RegisterParam],
            "`register` must register an analysis callback with `reg.on_node(..)`",
        ),
        stage(
            RegisterCall,
            &[RegisterBodyMissing],
            "the `register` body must call `on_node` on its `Registrar` parameter with a node kind and a handler",
        ),
        stage(
            RegisterKindArg,
            &[RegisterCall],
            "the first argument of `on_node` must be `NodeKind::IfStmt`",
        ),
        stage(
            RegisterHandlerArg,
            &[RegisterCall],
            "the second argument of `on_node` must name the analysis function",
        ),
        stage(
            RegisterTooMany,
            &[RegisterHandlerArg],
            "`register` must contain exactly one registration statement",
        ),
        stage(
            AnalysisFnMissing,
            &[RegisterHandlerArg],
            "implement the analysis function '{name}' registered in `register`",
        ),
        stage(
            AnalysisFnParam,
            &[AnalysisFnMissing],
            "the analysis function must take exactly one parameter, `ctx: &NodeContext`",
        ),
        stage(
            AnalysisFnReturnType,
            &[AnalysisFnMissing],
            "the analysis function must not declare a return type",
        ),
        stage(
            IfStmtDecl,
            &[AnalysisFnParam],
            "extract the if statement under analysis from the context node",
        ),
        stage(
            IfKeywordDecl,
            &[IfStmtDecl],
            "extract the if keyword of '{name}' into its own variable",
        ),
        stage(
            TriviaCheck,
            &[IfKeywordDecl],
            "check whether '{name}' has trailing trivia",
        ),
        stage(
            TriviaVarDecl,
            &[TriviaCheck],
            "extract the trailing trivia of '{name}' into its own variable",
        ),
        stage(
            TriviaKindCheck,
            &[TriviaVarDecl],
            "check whether the trailing trivia is a single whitespace trivia",
        ),
        stage(
            WhitespaceCheck,
            &[TriviaKindCheck],
            "check whether the trailing trivia text is exactly one space",
        ),
        stage(
            ReturnStmt,
            &[WhitespaceCheck],
            "return without reporting when the spacing is already correct",
        ),
        stage(
            OpenParenDecl,
            &[TriviaCheck],
            "extract the open parenthesis token of the if statement",
        ),
        stage(
            StartSpanDecl,
            &[OpenParenDecl],
            "extract the start of the if keyword's span",
        ),
        stage(
            EndSpanDecl,
            &[StartSpanDecl],
            "extract the start of the open parenthesis' span",
        ),
        stage(
            SpanDecl,
            &[EndSpanDecl],
            "create a span from the start of the if keyword to the start of the open parenthesis",
        ),
        stage(
            LocationDecl,
            &[SpanDecl],
            "create a location for the diagnostic from the context file and the span",
        ),
        stage(
            DiagnosticDecl,
            &[LocationDecl, RuleStaticMissing],
            "create the diagnostic from the rule descriptor, the location and the rule message",
        ),
        stage(
            ReportStmt,
            &[DiagnosticDecl],
            "report the diagnostic through the context",
        ),
        stage(
            Complete,
            &[],
            "congratulations, the analyzer is complete; every milestone is satisfied",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_declared_order() {
        let catalog = catalog();
        assert_eq!(catalog.len(), StageId::ALL.len());
        for (index, id) in StageId::ALL.iter().enumerate() {
            assert_eq!(catalog.order(*id), index, "stage {id:?} out of order");
        }
    }

    #[test]
    fn preconditions_reference_earlier_stages_only() {
        let catalog = catalog();
        for stage in catalog.stages() {
            for pre in stage.preconditions {
                assert!(
                    catalog.order(*pre) < catalog.order(stage.id),
                    "{:?} has a precondition {:?} that is not earlier",
                    stage.id,
                    pre
                );
            }
        }
    }

    #[test]
    fn only_terminal_stage_is_informational() {
        for stage in catalog().stages() {
            if stage.id == StageId::Complete {
                assert_eq!(stage.severity, Severity::Info);
            } else {
                assert_eq!(stage.severity, Severity::Error);
            }
        }
    }
}
