use crate::syntax::{Expr, ExprId, TExpr, TItem, TItemKind, TParam, TStmt, TStmtKind, TType};
use crate::unit::AnalyzedUnit;

pub const CANONICAL_RULE_ID: &str = "RULE_ID";
pub const CANONICAL_RULE: &str = "RULE";
pub const CANONICAL_HANDLER: &str = "analyze_if";
pub const RULE_ID_VALUE: &str = "if_spacing";
pub const RULE_TITLE: &str = "If spacing";
pub const RULE_MESSAGE: &str = "the if keyword must be followed by a single space";

pub fn ident(name: &str) -> TExpr {
    TExpr::Ident(name.to_string())
}

pub fn string(value: &str) -> TExpr {
    TExpr::Str(value.to_string())
}

pub fn path(qualifier: &str, member: &str) -> TExpr {
    TExpr::Path(qualifier.to_string(), member.to_string())
}

pub fn call(callee: TExpr, args: Vec<TExpr>) -> TExpr {
    TExpr::Call {
        callee: Box::new(callee),
        args,
    }
}

pub fn method(recv: TExpr, name: &str, args: Vec<TExpr>) -> TExpr {
    TExpr::Method {
        recv: Box::new(recv),
        method: name.to_string(),
        args,
    }
}

pub fn field(recv: TExpr, name: &str) -> TExpr {
    TExpr::Field {
        recv: Box::new(recv),
        field: name.to_string(),
    }
}

pub fn let_stmt(name: &str, value: TExpr, comment: &str) -> TStmt {
    TStmt {
        kind: TStmtKind::Let {
            name: name.to_string(),
            value,
        },
        comment: Some(comment.to_string()),
    }
}

pub fn if_stmt(cond: TExpr, body: Vec<TStmt>, comment: &str) -> TStmt {
    TStmt {
        kind: TStmtKind::If { cond, body },
        comment: Some(comment.to_string()),
    }
}

pub fn expr_stmt(expr: TExpr, comment: &str) -> TStmt {
    TStmt {
        kind: TStmtKind::Expr(expr),
        comment: Some(comment.to_string()),
    }
}

/// The canonical `RuleInfo::new(..)` initializer, spelled with whatever
/// name the document gave its id constant.
pub fn rule_init(id_name: &str) -> TExpr {
    call(
        path("RuleInfo", "new"),
        vec![
            ident(id_name),
            string(RULE_TITLE),
            string(RULE_MESSAGE),
            path("Severity", "Warning"),
            TExpr::Bool(true),
        ],
    )
}

pub fn id_const_item() -> TItem {
    TItem {
        kind: TItemKind::Const {
            name: CANONICAL_RULE_ID.to_string(),
            ty: TType::plain("Str"),
            value: string(RULE_ID_VALUE),
        },
        comment: Some("Every diagnostic this analyzer reports is filed under this id.".to_string()),
    }
}

pub fn rule_static_item(id_name: &str) -> TItem {
    TItem {
        kind: TItemKind::Static {
            name: CANONICAL_RULE.to_string(),
            ty: TType::plain("RuleInfo"),
            value: rule_init(id_name),
        },
        comment: Some(
            "The rule descriptor: id, title, message, severity, enabled by default.".to_string(),
        ),
    }
}

pub fn list_of_rule(rule_name: &str) -> TStmt {
    TStmt {
        kind: TStmtKind::Return(Some(call(ident("list"), vec![ident(rule_name)]))),
        comment: None,
    }
}

pub fn supported_rules_item(rule_name: &str) -> TItem {
    TItem {
        kind: TItemKind::Fn {
            name: crate::unit::SUPPORTED_RULES_FN.to_string(),
            params: Vec::new(),
            ret: Some(TType::generic("List", vec![TType::plain("RuleInfo")])),
            body: vec![list_of_rule(rule_name)],
        },
        comment: Some("Tells the host which rules this analyzer can report.".to_string()),
    }
}

pub fn registrar_params() -> Vec<TParam> {
    vec![TParam {
        name: "reg".to_string(),
        by_ref: true,
        mutable: true,
        ty: TType::plain("Registrar"),
    }]
}

pub fn register_call_stmt(param_name: &str, handler: &str) -> TStmt {
    expr_stmt(
        method(
            ident(param_name),
            crate::unit::REGISTER_METHOD,
            vec![path("NodeKind", "IfStmt"), ident(handler)],
        ),
        "Ask to be called back for every if statement in the file.",
    )
}

pub fn register_item() -> TItem {
    TItem {
        kind: TItemKind::Fn {
            name: crate::unit::REGISTER_FN.to_string(),
            params: registrar_params(),
            ret: None,
            body: vec![register_call_stmt("reg", CANONICAL_HANDLER)],
        },
        comment: Some("Hooks the analysis function up to the node walker.".to_string()),
    }
}

pub fn context_params() -> Vec<TParam> {
    vec![TParam {
        name: "ctx".to_string(),
        by_ref: true,
        mutable: false,
        ty: TType::plain("NodeContext"),
    }]
}

/// An empty analysis function skeleton with the right signature; the body
/// stages then guide the statements in one at a time.
pub fn analysis_fn_item(name: &str) -> TItem {
    TItem {
        kind: TItemKind::Fn {
            name: name.to_string(),
            params: context_params(),
            ret: None,
            body: Vec::new(),
        },
        comment: Some("Runs once per if statement.".to_string()),
    }
}

/// Rebuilds an owned template from an existing expression so an edit can
/// keep a subtree's siblings while changing one part of it.
pub fn expr_template(unit: &AnalyzedUnit<'_>, id: ExprId) -> TExpr {
    match unit.expr(id) {
        Expr::Ident(name) => ident(&name.name),
        Expr::Str { value, .. } => string(value),
        Expr::Bool { value, .. } => TExpr::Bool(*value),
        Expr::Path {
            qualifier, member, ..
        } => path(&qualifier.name, &member.name),
        Expr::Call { callee, args, .. } => call(
            expr_template(unit, *callee),
            args.iter().map(|arg| expr_template(unit, *arg)).collect(),
        ),
        Expr::MethodCall {
            recv, method: name, args, ..
        } => method(
            expr_template(unit, *recv),
            &name.name,
            args.iter().map(|arg| expr_template(unit, *arg)).collect(),
        ),
        Expr::Field { recv, field: name, .. } => field(expr_template(unit, *recv), &name.name),
        Expr::Eq { left, right, .. } => TExpr::Eq(
            Box::new(expr_template(unit, *left)),
            Box::new(expr_template(unit, *right)),
        ),
    }
}
