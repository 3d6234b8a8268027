use crate::stages::predicates::{ident_name, is_nonempty_str, is_path, type_is_plain};
use crate::stages::{StageId, StageResult};
use crate::syntax::{Expr, ExprId, Item, NodeRef};
use crate::unit::AnalyzedUnit;

pub(super) fn evaluate(stage: StageId, unit: &AnalyzedUnit<'_>) -> StageResult {
    match stage {
        StageId::IdConstMissing => match unit.id_const() {
            Some(_) => StageResult::Satisfied,
            None => StageResult::Missing,
        },
        StageId::IdConstType => {
            let Some(id) = unit.id_const() else {
                return StageResult::Missing;
            };
            match unit.item(id) {
                Item::Const { ty, .. } if type_is_plain(unit, *ty, "Str") => {
                    StageResult::Satisfied
                }
                Item::Const { ty, .. } => StageResult::Malformed(NodeRef::Type(*ty)),
                _ => StageResult::Missing,
            }
        }
        StageId::IdConstValue => {
            let Some(id) = unit.id_const() else {
                return StageResult::Missing;
            };
            match unit.item(id) {
                Item::Const { value, .. } if is_nonempty_str(unit, *value) => {
                    StageResult::Satisfied
                }
                Item::Const { value, .. } => StageResult::Malformed(NodeRef::Expr(*value)),
                _ => StageResult::Missing,
            }
        }
        StageId::RuleStaticMissing => match unit.rule_static() {
            Some(_) => StageResult::Satisfied,
            None => StageResult::Missing,
        },
        StageId::RuleStaticType => {
            let Some(id) = unit.rule_static() else {
                return StageResult::Missing;
            };
            match unit.item(id) {
                Item::Static { ty, .. } if type_is_plain(unit, *ty, "RuleInfo") => {
                    StageResult::Satisfied
                }
                Item::Static { ty, .. } => StageResult::Malformed(NodeRef::Type(*ty)),
                _ => StageResult::Missing,
            }
        }
        StageId::RuleInit => match rule_init_args(unit) {
            RuleInit::WellFormed { .. } => StageResult::Satisfied,
            RuleInit::Malformed(value) => StageResult::Malformed(NodeRef::Expr(value)),
            RuleInit::NoRule => StageResult::Missing,
        },
        StageId::RuleIdArg => rule_arg(unit, 0, |unit, arg| {
            let Some(id) = unit.id_const() else {
                return false;
            };
            ident_name(unit, arg) == Some(unit.item_name(id))
        }),
        StageId::RuleTitleArg => rule_arg(unit, 1, |unit, arg| is_nonempty_str(unit, arg)),
        StageId::RuleMessageArg => rule_arg(unit, 2, |unit, arg| is_nonempty_str(unit, arg)),
        StageId::RuleSeverityArg => rule_arg(unit, 3, |unit, arg| {
            is_path(unit, arg, "Severity", "Warning") || is_path(unit, arg, "Severity", "Error")
        }),
        StageId::RuleEnabledArg => rule_arg(unit, 4, |unit, arg| {
            matches!(unit.expr(arg), Expr::Bool { value: true, .. })
        }),
        _ => StageResult::Satisfied,
    }
}

enum RuleInit {
    NoRule,
    Malformed(ExprId),
    WellFormed { args: Vec<ExprId> },
}

/// The rule descriptor initializer, once it is a well-shaped
/// `RuleInfo::new(..)` call with all five arguments.
fn rule_init_args(unit: &AnalyzedUnit<'_>) -> RuleInit {
    let Some(id) = unit.rule_static() else {
        return RuleInit::NoRule;
    };
    let Item::Static { value, .. } = unit.item(id) else {
        return RuleInit::NoRule;
    };
    if let Expr::Call { callee, args, .. } = unit.expr(*value) {
        if is_path(unit, *callee, "RuleInfo", "new") && args.len() == 5 {
            return RuleInit::WellFormed { args: args.clone() };
        }
    }
    RuleInit::Malformed(*value)
}

fn rule_arg(
    unit: &AnalyzedUnit<'_>,
    index: usize,
    ok: impl Fn(&AnalyzedUnit<'_>, ExprId) -> bool,
) -> StageResult {
    match rule_init_args(unit) {
        RuleInit::WellFormed { args } => match args.get(index) {
            Some(arg) if ok(unit, *arg) => StageResult::Satisfied,
            Some(arg) => StageResult::Malformed(NodeRef::Expr(*arg)),
            None => StageResult::Missing,
        },
        RuleInit::Malformed(value) => StageResult::Malformed(NodeRef::Expr(value)),
        RuleInit::NoRule => StageResult::Missing,
    }
}
