use crate::stages::predicates::{ident_name, is_method0, is_path};
use crate::stages::{StageId, StageResult};
use crate::syntax::{Expr, ExprId, NodeRef, Stmt, StmtId};
use crate::unit::AnalyzedUnit;

/// Resolved view of the analysis function body. Variable lookups go
/// through the names the user actually bound, not the canonical ones, so
/// later checks keep working after a rename.
pub struct BodyShape<'a> {
    unit: AnalyzedUnit<'a>,
    ctx: &'a str,
    body: &'a [StmtId],
}

impl<'a> BodyShape<'a> {
    pub fn of(unit: &AnalyzedUnit<'a>) -> Option<Self> {
        let id = unit.analysis_fn()?;
        let ctx = unit.fn_params(id).first()?.name.name.as_str();
        Some(Self {
            unit: *unit,
            ctx,
            body: unit.fn_body(id),
        })
    }

    fn let_var(&self, block: &[StmtId], index: usize) -> Option<&'a str> {
        match self.unit.stmt(*block.get(index)?) {
            Stmt::Let { name, .. } => Some(name.name.as_str()),
            _ => None,
        }
    }

    pub fn if_stmt_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 0)
    }

    pub fn if_keyword_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 1)
    }

    /// Body of the `has_trailing_trivia` guard, once statement 2 is an if.
    fn trivia_block(&self) -> Option<&'a [StmtId]> {
        match self.unit.stmt(*self.body.get(2)?) {
            Stmt::If { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn trivia_var(&self) -> Option<&'a str> {
        self.let_var(self.trivia_block()?, 0)
    }

    fn kind_block(&self) -> Option<&'a [StmtId]> {
        match self.unit.stmt(*self.trivia_block()?.get(1)?) {
            Stmt::If { body, .. } => Some(body),
            _ => None,
        }
    }

    fn ws_block(&self) -> Option<&'a [StmtId]> {
        match self.unit.stmt(*self.kind_block()?.first()?) {
            Stmt::If { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn ctx(&self) -> &'a str {
        self.ctx
    }

    pub(crate) fn top_stmt(&self, index: usize) -> Option<StmtId> {
        self.body.get(index).copied()
    }

    /// Statement id of the trailing-trivia guard, once it is an if.
    pub(crate) fn trivia_if(&self) -> Option<StmtId> {
        let id = self.top_stmt(2)?;
        matches!(self.unit.stmt(id), Stmt::If { .. }).then_some(id)
    }

    pub(crate) fn kind_if(&self) -> Option<StmtId> {
        let id = self.trivia_block()?.get(1).copied()?;
        matches!(self.unit.stmt(id), Stmt::If { .. }).then_some(id)
    }

    pub(crate) fn ws_if(&self) -> Option<StmtId> {
        let id = self.kind_block()?.first().copied()?;
        matches!(self.unit.stmt(id), Stmt::If { .. }).then_some(id)
    }

    pub(crate) fn open_paren_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 3)
    }

    pub(crate) fn start_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 4)
    }

    pub(crate) fn end_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 5)
    }

    pub(crate) fn span_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 6)
    }

    pub(crate) fn location_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 7)
    }

    pub(crate) fn diagnostic_var(&self) -> Option<&'a str> {
        self.let_var(self.body, 8)
    }

    /// `recv.field` where `recv` is the context parameter.
    fn is_ctx_node(&self, expr: ExprId) -> bool {
        match self.unit.expr(expr) {
            Expr::Field { recv, field, .. } => {
                field.name == "node" && ident_name(&self.unit, *recv) == Some(self.ctx)
            }
            _ => false,
        }
    }

    /// Accepts both forms of the if-statement extraction:
    /// `ctx.node.as_if_stmt()` and `IfStmt::cast(ctx.node)`.
    fn is_if_extraction(&self, expr: ExprId) -> bool {
        match self.unit.expr(expr) {
            Expr::MethodCall {
                recv, method, args, ..
            } => method.name == "as_if_stmt" && args.is_empty() && self.is_ctx_node(*recv),
            Expr::Call { callee, args, .. } => {
                is_path(&self.unit, *callee, "IfStmt", "cast")
                    && args.len() == 1
                    && self.is_ctx_node(args[0])
            }
            _ => false,
        }
    }

    /// Accepts `recv.span().start()` and the shorthand `recv.start()`.
    fn is_span_start(&self, expr: ExprId, recv_name: &str) -> bool {
        match self.unit.expr(expr) {
            Expr::MethodCall {
                recv, method, args, ..
            } if method.name == "start" && args.is_empty() => {
                is_method0(&self.unit, *recv, recv_name, "span")
                    || ident_name(&self.unit, *recv) == Some(recv_name)
            }
            _ => false,
        }
    }

    fn let_matches(&self, stmt: StmtId, check: impl Fn(ExprId) -> bool) -> bool {
        match self.unit.stmt(stmt) {
            Stmt::Let { value, .. } => check(*value),
            _ => false,
        }
    }

    fn if_cond_matches(&self, stmt: StmtId, check: impl Fn(ExprId) -> bool) -> bool {
        match self.unit.stmt(stmt) {
            Stmt::If { cond, .. } => check(*cond),
            _ => false,
        }
    }
}

pub(super) fn evaluate(stage: StageId, unit: &AnalyzedUnit<'_>) -> StageResult {
    let Some(shape) = BodyShape::of(unit) else {
        return StageResult::Missing;
    };
    match stage {
        StageId::IfStmtDecl => {
            check_at(&shape, shape.body, 0, |shape, stmt| {
                shape.let_matches(stmt, |value| shape.is_if_extraction(value))
            })
        }
        StageId::IfKeywordDecl => {
            let Some(if_stmt) = shape.if_stmt_var() else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 1, |shape, stmt| {
                shape.let_matches(stmt, |value| {
                    is_method0(&shape.unit, value, if_stmt, "if_keyword")
                })
            })
        }
        StageId::TriviaCheck => {
            let Some(if_keyword) = shape.if_keyword_var() else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 2, |shape, stmt| {
                shape.if_cond_matches(stmt, |cond| {
                    is_method0(&shape.unit, cond, if_keyword, "has_trailing_trivia")
                })
            })
        }
        StageId::TriviaVarDecl => {
            let Some(if_keyword) = shape.if_keyword_var() else {
                return StageResult::Missing;
            };
            let Some(block) = shape.trivia_block() else {
                return StageResult::Missing;
            };
            check_at(&shape, block, 0, |shape, stmt| {
                shape.let_matches(stmt, |value| {
                    is_method0(&shape.unit, value, if_keyword, "trailing_trivia")
                })
            })
        }
        StageId::TriviaKindCheck => {
            let Some(trivia) = shape.trivia_var() else {
                return StageResult::Missing;
            };
            let Some(block) = shape.trivia_block() else {
                return StageResult::Missing;
            };
            check_at(&shape, block, 1, |shape, stmt| {
                shape.if_cond_matches(stmt, |cond| match shape.unit.expr(cond) {
                    Expr::Eq { left, right, .. } => {
                        is_method0(&shape.unit, *left, trivia, "kind")
                            && is_path(&shape.unit, *right, "TriviaKind", "Space")
                    }
                    _ => false,
                })
            })
        }
        StageId::WhitespaceCheck => {
            let Some(trivia) = shape.trivia_var() else {
                return StageResult::Missing;
            };
            let Some(block) = shape.kind_block() else {
                return StageResult::Missing;
            };
            check_at(&shape, block, 0, |shape, stmt| {
                shape.if_cond_matches(stmt, |cond| match shape.unit.expr(cond) {
                    Expr::Eq { left, right, .. } => {
                        is_method0(&shape.unit, *left, trivia, "text")
                            && matches!(shape.unit.expr(*right), Expr::Str { value, .. } if value == " ")
                    }
                    _ => false,
                })
            })
        }
        StageId::ReturnStmt => {
            let Some(block) = shape.ws_block() else {
                return StageResult::Missing;
            };
            check_at(&shape, block, 0, |shape, stmt| {
                matches!(shape.unit.stmt(stmt), Stmt::Return { value: None, .. })
            })
        }
        StageId::OpenParenDecl => {
            let Some(if_stmt) = shape.if_stmt_var() else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 3, |shape, stmt| {
                shape.let_matches(stmt, |value| {
                    is_method0(&shape.unit, value, if_stmt, "open_paren")
                })
            })
        }
        StageId::StartSpanDecl => {
            let Some(if_keyword) = shape.if_keyword_var() else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 4, |shape, stmt| {
                shape.let_matches(stmt, |value| shape.is_span_start(value, if_keyword))
            })
        }
        StageId::EndSpanDecl => {
            let Some(open_paren) = shape.open_paren_var() else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 5, |shape, stmt| {
                shape.let_matches(stmt, |value| shape.is_span_start(value, open_paren))
            })
        }
        StageId::SpanDecl => {
            let (Some(start), Some(end)) = (shape.start_var(), shape.end_var()) else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 6, |shape, stmt| {
                shape.let_matches(stmt, |value| match shape.unit.expr(value) {
                    Expr::Call { callee, args, .. } => {
                        is_path(&shape.unit, *callee, "Span", "of")
                            && args.len() == 2
                            && ident_name(&shape.unit, args[0]) == Some(start)
                            && ident_name(&shape.unit, args[1]) == Some(end)
                    }
                    _ => false,
                })
            })
        }
        StageId::LocationDecl => {
            let Some(span) = shape.span_var() else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 7, |shape, stmt| {
                shape.let_matches(stmt, |value| match shape.unit.expr(value) {
                    Expr::Call { callee, args, .. } => {
                        is_path(&shape.unit, *callee, "Location", "of")
                            && args.len() == 2
                            && is_method0(&shape.unit, args[0], shape.ctx, "file")
                            && ident_name(&shape.unit, args[1]) == Some(span)
                    }
                    _ => false,
                })
            })
        }
        StageId::DiagnosticDecl => {
            let Some(location) = shape.location_var() else {
                return StageResult::Missing;
            };
            let Some(rule) = unit.rule_static() else {
                return StageResult::Missing;
            };
            let rule = unit.item_name(rule);
            check_at(&shape, shape.body, 8, |shape, stmt| {
                shape.let_matches(stmt, |value| match shape.unit.expr(value) {
                    Expr::Call { callee, args, .. } => {
                        is_path(&shape.unit, *callee, "Diagnostic", "of")
                            && args.len() == 3
                            && ident_name(&shape.unit, args[0]) == Some(rule)
                            && ident_name(&shape.unit, args[1]) == Some(location)
                            && is_method0(&shape.unit, args[2], rule, "message")
                    }
                    _ => false,
                })
            })
        }
        StageId::ReportStmt => {
            let Some(diagnostic) = shape.diagnostic_var() else {
                return StageResult::Missing;
            };
            check_at(&shape, shape.body, 9, |shape, stmt| {
                match shape.unit.stmt(stmt) {
                    Stmt::Expr { expr, .. } => match shape.unit.expr(*expr) {
                        Expr::MethodCall {
                            recv, method, args, ..
                        } => {
                            method.name == "report"
                                && ident_name(&shape.unit, *recv) == Some(shape.ctx)
                                && args.len() == 1
                                && ident_name(&shape.unit, args[0]) == Some(diagnostic)
                        }
                        _ => false,
                    },
                    _ => false,
                }
            })
        }
        _ => StageResult::Satisfied,
    }
}

/// Classifies the candidate statement at a fixed block position: no
/// statement there is `Missing`, a statement of the wrong shape is
/// `Malformed` anchored at that statement.
fn check_at(
    shape: &BodyShape<'_>,
    block: &[StmtId],
    index: usize,
    matches: impl Fn(&BodyShape<'_>, StmtId) -> bool,
) -> StageResult {
    match block.get(index) {
        None => StageResult::Missing,
        Some(stmt) if matches(shape, *stmt) => StageResult::Satisfied,
        Some(stmt) => StageResult::Malformed(NodeRef::Stmt(*stmt)),
    }
}
