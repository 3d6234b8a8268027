use crate::stages::predicates::{ident_name, is_path, type_is_generic1, type_is_plain};
use crate::stages::{StageId, StageResult};
use crate::syntax::{Expr, ExprId, ItemId, NodeRef, Stmt};
use crate::unit::AnalyzedUnit;

pub(super) fn evaluate(stage: StageId, unit: &AnalyzedUnit<'_>) -> StageResult {
    match stage {
        StageId::SupportedRulesMissing => present(unit.supported_rules_fn()),
        StageId::SupportedRulesParams => {
            let Some(id) = unit.supported_rules_fn() else {
                return StageResult::Missing;
            };
            if unit.fn_params(id).is_empty() {
                StageResult::Satisfied
            } else {
                StageResult::Malformed(NodeRef::ParamList(id))
            }
        }
        StageId::SupportedRulesReturnType => {
            let Some(id) = unit.supported_rules_fn() else {
                return StageResult::Missing;
            };
            match unit.fn_ret(id) {
                None => StageResult::Missing,
                Some(ty) if type_is_generic1(unit, ty, "List", "RuleInfo") => {
                    StageResult::Satisfied
                }
                Some(ty) => StageResult::Malformed(NodeRef::Type(ty)),
            }
        }
        StageId::SupportedRulesBody => {
            let Some(id) = unit.supported_rules_fn() else {
                return StageResult::Missing;
            };
            if unit.fn_body(id).is_empty() {
                StageResult::Missing
            } else {
                StageResult::Satisfied
            }
        }
        StageId::SupportedRulesReturn => {
            let Some(id) = unit.supported_rules_fn() else {
                return StageResult::Missing;
            };
            let Some(first) = unit.fn_body(id).first().copied() else {
                return StageResult::Missing;
            };
            if supported_rules_list(unit).is_some() {
                StageResult::Satisfied
            } else {
                StageResult::Malformed(NodeRef::Stmt(first))
            }
        }
        StageId::SupportedRulesIncludesRule => {
            let Some((call, args)) = supported_rules_list(unit) else {
                return StageResult::Missing;
            };
            let Some(rule) = unit.rule_static() else {
                return StageResult::Missing;
            };
            let rule_name = unit.item_name(rule);
            if args
                .iter()
                .any(|arg| ident_name(unit, *arg) == Some(rule_name))
            {
                StageResult::Satisfied
            } else {
                StageResult::Malformed(NodeRef::Expr(call))
            }
        }
        StageId::SupportedRulesTooMany => {
            let Some(id) = unit.supported_rules_fn() else {
                return StageResult::Missing;
            };
            let body = unit.fn_body(id);
            match body.get(1) {
                None => StageResult::Satisfied,
                Some(extra) => StageResult::Malformed(NodeRef::Stmt(*extra)),
            }
        }
        StageId::RegisterMissing => present(unit.register_fn()),
        StageId::RegisterParam => {
            let Some(id) = unit.register_fn() else {
                return StageResult::Missing;
            };
            let params = unit.fn_params(id);
            let well_formed = params.len() == 1 && {
                let param = &params[0];
                param.by_ref && param.mutable && type_is_plain(unit, param.ty, "Registrar")
            };
            if well_formed {
                StageResult::Satisfied
            } else {
                StageResult::Malformed(NodeRef::ParamList(id))
            }
        }
        StageId::RegisterReturnType => {
            let Some(id) = unit.register_fn() else {
                return StageResult::Missing;
            };
            match unit.fn_ret(id) {
                None => StageResult::Satisfied,
                Some(ty) => StageResult::Malformed(NodeRef::Type(ty)),
            }
        }
        StageId::RegisterBodyMissing => {
            let Some(id) = unit.register_fn() else {
                return StageResult::Missing;
            };
            if unit.fn_body(id).is_empty() {
                StageResult::Missing
            } else {
                StageResult::Satisfied
            }
        }
        StageId::RegisterCall => {
            let Some(id) = unit.register_fn() else {
                return StageResult::Missing;
            };
            let Some(first) = unit.fn_body(id).first().copied() else {
                return StageResult::Missing;
            };
            let param = unit
                .fn_params(id)
                .first()
                .map(|param| param.name.name.as_str());
            let well_formed = param.is_some_and(|param| {
                if let Stmt::Expr { expr, .. } = unit.stmt(first) {
                    if let Expr::MethodCall {
                        recv, method, args, ..
                    } = unit.expr(*expr)
                    {
                        return method.name == "on_node"
                            && args.len() == 2
                            && ident_name(unit, *recv) == Some(param);
                    }
                }
                false
            });
            if well_formed {
                StageResult::Satisfied
            } else {
                StageResult::Malformed(NodeRef::Stmt(first))
            }
        }
        StageId::RegisterKindArg => match register_arg(unit, 0) {
            Some(arg) if is_path(unit, arg, "NodeKind", "IfStmt") => StageResult::Satisfied,
            Some(arg) => StageResult::Malformed(NodeRef::Expr(arg)),
            None => StageResult::Missing,
        },
        StageId::RegisterHandlerArg => match register_arg(unit, 1) {
            Some(arg) if ident_name(unit, arg).is_some() => StageResult::Satisfied,
            Some(arg) => StageResult::Malformed(NodeRef::Expr(arg)),
            None => StageResult::Missing,
        },
        StageId::RegisterTooMany => {
            let Some(id) = unit.register_fn() else {
                return StageResult::Missing;
            };
            if unit.fn_body(id).len() <= 1 {
                StageResult::Satisfied
            } else {
                StageResult::Malformed(NodeRef::ParamList(id))
            }
        }
        StageId::AnalysisFnMissing => {
            if unit.handler_name().is_none() {
                return StageResult::Missing;
            }
            present(unit.analysis_fn())
        }
        StageId::AnalysisFnParam => {
            let Some(id) = unit.analysis_fn() else {
                return StageResult::Missing;
            };
            let params = unit.fn_params(id);
            let well_formed = params.len() == 1 && {
                let param = &params[0];
                param.by_ref && !param.mutable && type_is_plain(unit, param.ty, "NodeContext")
            };
            if well_formed {
                StageResult::Satisfied
            } else {
                StageResult::Malformed(NodeRef::ParamList(id))
            }
        }
        StageId::AnalysisFnReturnType => {
            let Some(id) = unit.analysis_fn() else {
                return StageResult::Missing;
            };
            match unit.fn_ret(id) {
                None => StageResult::Satisfied,
                Some(ty) => StageResult::Malformed(NodeRef::Type(ty)),
            }
        }
        _ => StageResult::Satisfied,
    }
}

fn present(item: Option<ItemId>) -> StageResult {
    match item {
        Some(_) => StageResult::Satisfied,
        None => StageResult::Missing,
    }
}

/// The `list(..)` call of a well-shaped `return list(..);` first statement,
/// with its arguments.
fn supported_rules_list(
    unit: &AnalyzedUnit<'_>,
) -> Option<(ExprId, Vec<ExprId>)> {
    let id = unit.supported_rules_fn()?;
    let first = unit.fn_body(id).first().copied()?;
    let Stmt::Return {
        value: Some(value), ..
    } = unit.stmt(first)
    else {
        return None;
    };
    let Expr::Call { callee, args, .. } = unit.expr(*value) else {
        return None;
    };
    if ident_name(unit, *callee) == Some("list") {
        Some((*value, args.clone()))
    } else {
        None
    }
}

fn register_arg(unit: &AnalyzedUnit<'_>, index: usize) -> Option<ExprId> {
    let (_, call) = unit.register_call()?;
    if let Expr::MethodCall { args, .. } = unit.expr(call) {
        args.get(index).copied()
    } else {
        None
    }
}
