use thiserror::Error;

use crate::diagnostics::Span;
use crate::syntax::ast::{
    AnalyzerDecl, Document, Expr, ExprId, Item, ItemId, Param, SpannedName, Stmt, StmtId,
    SyntaxArena, SyntaxTree, TypeExpr, TypeId,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("edit target not found in the tree")]
    TargetNotFound,
}

/// Owned replacement subtrees. Edits carry these instead of arena ids so a
/// canonical template can be built without an arena and materialized into
/// the rewritten tree.
#[derive(Debug, Clone)]
pub enum TExpr {
    Ident(String),
    Str(String),
    Bool(bool),
    Path(String, String),
    Call {
        callee: Box<TExpr>,
        args: Vec<TExpr>,
    },
    Method {
        recv: Box<TExpr>,
        method: String,
        args: Vec<TExpr>,
    },
    Field {
        recv: Box<TExpr>,
        field: String,
    },
    Eq(Box<TExpr>, Box<TExpr>),
}

#[derive(Debug, Clone)]
pub struct TType {
    pub name: String,
    pub args: Vec<TType>,
}

impl TType {
    pub fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: &str, args: Vec<TType>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TParam {
    pub name: String,
    pub by_ref: bool,
    pub mutable: bool,
    pub ty: TType,
}

#[derive(Debug, Clone)]
pub struct TStmt {
    pub kind: TStmtKind,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TStmtKind {
    Let { name: String, value: TExpr },
    Return(Option<TExpr>),
    If { cond: TExpr, body: Vec<TStmt> },
    Expr(TExpr),
}

#[derive(Debug, Clone)]
pub struct TItem {
    pub kind: TItemKind,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TItemKind {
    Const {
        name: String,
        ty: TType,
        value: TExpr,
    },
    Static {
        name: String,
        ty: TType,
        value: TExpr,
    },
    Fn {
        name: String,
        params: Vec<TParam>,
        ret: Option<TType>,
        body: Vec<TStmt>,
    },
}

/// Identifies a statement list in the old tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    FnBody(ItemId),
    IfBody(StmtId),
}

/// One tree edit. Applying an edit never mutates the input tree; a fresh
/// tree is built and the original stays valid.
#[derive(Debug, Clone)]
pub enum Edit {
    InsertItem {
        index: usize,
        item: TItem,
    },
    ReplaceItem {
        target: ItemId,
        item: TItem,
    },
    SetFnParams {
        target: ItemId,
        params: Vec<TParam>,
    },
    SetFnRet {
        target: ItemId,
        ret: Option<TType>,
    },
    InsertStmt {
        block: BlockRef,
        index: usize,
        stmt: TStmt,
    },
    ReplaceStmt {
        target: StmtId,
        stmt: TStmt,
    },
    /// Keeps only the listed statements of a block, in their original order.
    RetainStmts {
        block: BlockRef,
        keep: Vec<StmtId>,
    },
    ReplaceExpr {
        target: ExprId,
        expr: TExpr,
    },
    ReplaceType {
        target: TypeId,
        ty: TType,
    },
}

pub fn apply(tree: &SyntaxTree, edit: &Edit) -> Result<SyntaxTree, RewriteError> {
    let mut rewriter = Rewriter {
        old: tree,
        arena: SyntaxArena::default(),
        edit,
        applied: false,
    };
    let document = rewriter.document()?;
    if !rewriter.applied {
        return Err(RewriteError::TargetNotFound);
    }
    Ok(SyntaxTree {
        arena: rewriter.arena,
        document,
    })
}

struct Rewriter<'a> {
    old: &'a SyntaxTree,
    arena: SyntaxArena,
    edit: &'a Edit,
    applied: bool,
}

impl Rewriter<'_> {
    fn document(&mut self) -> Result<Document, RewriteError> {
        let Some(analyzer) = &self.old.document.analyzer else {
            return Ok(Document::default());
        };
        let mut items = Vec::with_capacity(analyzer.items.len() + 1);
        for old_id in &analyzer.items {
            items.push(self.copy_item(*old_id)?);
        }
        if let Edit::InsertItem { index, item } = self.edit {
            let at = (*index).min(items.len());
            let materialized = self.materialize_item(item);
            items.insert(at, materialized);
            self.applied = true;
        }
        Ok(Document {
            analyzer: Some(AnalyzerDecl {
                name: analyzer.name.clone(),
                items,
                comment: analyzer.comment.clone(),
                trailing_comment: analyzer.trailing_comment.clone(),
                span: analyzer.span.clone(),
            }),
        })
    }

    fn copy_item(&mut self, id: ItemId) -> Result<ItemId, RewriteError> {
        if let Edit::ReplaceItem { target, item } = self.edit {
            if *target == id {
                self.applied = true;
                let inherited = self.old.arena.item(id).comment().map(str::to_string);
                let mut template = item.clone();
                if template.comment.is_none() {
                    template.comment = inherited;
                }
                return Ok(self.materialize_item(&template));
            }
        }
        let item = self.old.arena.item(id).clone();
        let copied = match item {
            Item::Const {
                name,
                ty,
                value,
                comment,
                span,
            } => Item::Const {
                name,
                ty: self.copy_type(ty)?,
                value: self.copy_expr(value)?,
                comment,
                span,
            },
            Item::Static {
                name,
                ty,
                value,
                comment,
                span,
            } => Item::Static {
                name,
                ty: self.copy_type(ty)?,
                value: self.copy_expr(value)?,
                comment,
                span,
            },
            Item::Fn {
                name,
                params,
                params_span,
                ret,
                body,
                comment,
                trailing_comment,
                span,
            } => {
                let params = match self.edit {
                    Edit::SetFnParams { target, params } if *target == id => {
                        self.applied = true;
                        params
                            .iter()
                            .map(|param| self.materialize_param(param))
                            .collect::<Vec<_>>()
                    }
                    _ => params
                        .into_iter()
                        .map(|param| self.copy_param(param))
                        .collect::<Result<Vec<_>, _>>()?,
                };
                let ret = match self.edit {
                    Edit::SetFnRet { target, ret } if *target == id => {
                        self.applied = true;
                        ret.as_ref().map(|ty| self.materialize_type(ty))
                    }
                    _ => match ret {
                        Some(ty) => Some(self.copy_type(ty)?),
                        None => None,
                    },
                };
                let body = self.copy_block(&body, BlockRef::FnBody(id))?;
                Item::Fn {
                    name,
                    params,
                    params_span,
                    ret,
                    body,
                    comment,
                    trailing_comment,
                    span,
                }
            }
        };
        Ok(self.arena.alloc_item(copied))
    }

    fn copy_param(&mut self, param: Param) -> Result<Param, RewriteError> {
        Ok(Param {
            name: param.name,
            by_ref: param.by_ref,
            mutable: param.mutable,
            ty: self.copy_type(param.ty)?,
            span: param.span,
        })
    }

    fn copy_block(
        &mut self,
        stmts: &[StmtId],
        block: BlockRef,
    ) -> Result<Vec<StmtId>, RewriteError> {
        let mut copied = Vec::with_capacity(stmts.len() + 1);
        for old_id in stmts {
            if let Edit::RetainStmts {
                block: target,
                keep,
            } = self.edit
            {
                if *target == block {
                    self.applied = true;
                    if !keep.contains(old_id) {
                        continue;
                    }
                }
            }
            copied.push(self.copy_stmt(*old_id)?);
        }
        if let Edit::InsertStmt {
            block: target,
            index,
            stmt,
        } = self.edit
        {
            if *target == block {
                let at = (*index).min(copied.len());
                let materialized = self.materialize_stmt(stmt);
                copied.insert(at, materialized);
                self.applied = true;
            }
        }
        Ok(copied)
    }

    fn copy_stmt(&mut self, id: StmtId) -> Result<StmtId, RewriteError> {
        if let Edit::ReplaceStmt { target, stmt } = self.edit {
            if *target == id {
                self.applied = true;
                let inherited = self.old.arena.stmt(id).comment().map(str::to_string);
                let mut template = stmt.clone();
                if template.comment.is_none() {
                    template.comment = inherited;
                }
                return Ok(self.materialize_stmt(&template));
            }
        }
        let stmt = self.old.arena.stmt(id).clone();
        let copied = match stmt {
            Stmt::Let {
                name,
                value,
                comment,
                span,
            } => Stmt::Let {
                name,
                value: self.copy_expr(value)?,
                comment,
                span,
            },
            Stmt::Return {
                value,
                comment,
                span,
            } => Stmt::Return {
                value: match value {
                    Some(value) => Some(self.copy_expr(value)?),
                    None => None,
                },
                comment,
                span,
            },
            Stmt::If {
                cond,
                body,
                comment,
                trailing_comment,
                span,
            } => Stmt::If {
                cond: self.copy_expr(cond)?,
                body: self.copy_block(&body, BlockRef::IfBody(id))?,
                comment,
                trailing_comment,
                span,
            },
            Stmt::Expr {
                expr,
                comment,
                span,
            } => Stmt::Expr {
                expr: self.copy_expr(expr)?,
                comment,
                span,
            },
        };
        Ok(self.arena.alloc_stmt(copied))
    }

    fn copy_expr(&mut self, id: ExprId) -> Result<ExprId, RewriteError> {
        if let Edit::ReplaceExpr { target, expr } = self.edit {
            if *target == id {
                self.applied = true;
                let template = expr.clone();
                return Ok(self.materialize_expr(&template));
            }
        }
        let expr = self.old.arena.expr(id).clone();
        let copied = match expr {
            Expr::Ident(name) => Expr::Ident(name),
            Expr::Str { value, span } => Expr::Str { value, span },
            Expr::Bool { value, span } => Expr::Bool { value, span },
            Expr::Path {
                qualifier,
                member,
                span,
            } => Expr::Path {
                qualifier,
                member,
                span,
            },
            Expr::Call { callee, args, span } => Expr::Call {
                callee: self.copy_expr(callee)?,
                args: self.copy_exprs(args)?,
                span,
            },
            Expr::MethodCall {
                recv,
                method,
                args,
                span,
            } => Expr::MethodCall {
                recv: self.copy_expr(recv)?,
                method,
                args: self.copy_exprs(args)?,
                span,
            },
            Expr::Field { recv, field, span } => Expr::Field {
                recv: self.copy_expr(recv)?,
                field,
                span,
            },
            Expr::Eq { left, right, span } => Expr::Eq {
                left: self.copy_expr(left)?,
                right: self.copy_expr(right)?,
                span,
            },
        };
        Ok(self.arena.alloc_expr(copied))
    }

    fn copy_exprs(&mut self, ids: Vec<ExprId>) -> Result<Vec<ExprId>, RewriteError> {
        ids.into_iter().map(|id| self.copy_expr(id)).collect()
    }

    fn copy_type(&mut self, id: TypeId) -> Result<TypeId, RewriteError> {
        if let Edit::ReplaceType { target, ty } = self.edit {
            if *target == id {
                self.applied = true;
                let template = ty.clone();
                return Ok(self.materialize_type(&template));
            }
        }
        let ty = self.old.arena.type_expr(id).clone();
        let args = ty
            .args
            .into_iter()
            .map(|arg| self.copy_type(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.arena.alloc_type(TypeExpr {
            name: ty.name,
            args,
            span: ty.span,
        }))
    }

    fn materialize_item(&mut self, item: &TItem) -> ItemId {
        let comment = item.comment.clone();
        let materialized = match &item.kind {
            TItemKind::Const { name, ty, value } => Item::Const {
                name: synthetic_name(name),
                ty: self.materialize_type(ty),
                value: self.materialize_expr(value),
                comment,
                span: Span::synthetic(),
            },
            TItemKind::Static { name, ty, value } => Item::Static {
                name: synthetic_name(name),
                ty: self.materialize_type(ty),
                value: self.materialize_expr(value),
                comment,
                span: Span::synthetic(),
            },
            TItemKind::Fn {
                name,
                params,
                ret,
                body,
            } => {
                let params = params
                    .iter()
                    .map(|param| self.materialize_param(param))
                    .collect();
                let ret = ret.as_ref().map(|ty| self.materialize_type(ty));
                let body = body
                    .iter()
                    .map(|stmt| self.materialize_stmt(stmt))
                    .collect();
                Item::Fn {
                    name: synthetic_name(name),
                    params,
                    params_span: Span::synthetic(),
                    ret,
                    body,
                    comment,
                    trailing_comment: None,
                    span: Span::synthetic(),
                }
            }
        };
        self.arena.alloc_item(materialized)
    }

    fn materialize_param(&mut self, param: &TParam) -> Param {
        Param {
            name: synthetic_name(&param.name),
            by_ref: param.by_ref,
            mutable: param.mutable,
            ty: self.materialize_type(&param.ty),
            span: Span::synthetic(),
        }
    }

    fn materialize_stmt(&mut self, stmt: &TStmt) -> StmtId {
        let comment = stmt.comment.clone();
        let materialized = match &stmt.kind {
            TStmtKind::Let { name, value } => Stmt::Let {
                name: synthetic_name(name),
                value: self.materialize_expr(value),
                comment,
                span: Span::synthetic(),
            },
            TStmtKind::Return(value) => Stmt::Return {
                value: value.as_ref().map(|value| self.materialize_expr(value)),
                comment,
                span: Span::synthetic(),
            },
            TStmtKind::If { cond, body } => Stmt::If {
                cond: self.materialize_expr(cond),
                body: body
                    .iter()
                    .map(|stmt| self.materialize_stmt(stmt))
                    .collect(),
                comment,
                trailing_comment: None,
                span: Span::synthetic(),
            },
            TStmtKind::Expr(expr) => Stmt::Expr {
                expr: self.materialize_expr(expr),
                comment,
                span: Span::synthetic(),
            },
        };
        self.arena.alloc_stmt(materialized)
    }

    fn materialize_expr(&mut self, expr: &TExpr) -> ExprId {
        let materialized = match expr {
            TExpr::Ident(name) => Expr::Ident(synthetic_name(name)),
            TExpr::Str(value) => Expr::Str {
                value: value.clone(),
                span: Span::synthetic(),
            },
            TExpr::Bool(value) => Expr::Bool {
                value: *value,
                span: Span::synthetic(),
            },
            TExpr::Path(qualifier, member) => Expr::Path {
                qualifier: synthetic_name(qualifier),
                member: synthetic_name(member),
                span: Span::synthetic(),
            },
            TExpr::Call { callee, args } => {
                let callee = self.materialize_expr(callee);
                let args = args.iter().map(|arg| self.materialize_expr(arg)).collect();
                Expr::Call {
                    callee,
                    args,
                    span: Span::synthetic(),
                }
            }
            TExpr::Method { recv, method, args } => {
                let recv = self.materialize_expr(recv);
                let args = args.iter().map(|arg| self.materialize_expr(arg)).collect();
                Expr::MethodCall {
                    recv,
                    method: synthetic_name(method),
                    args,
                    span: Span::synthetic(),
                }
            }
            TExpr::Field { recv, field } => {
                let recv = self.materialize_expr(recv);
                Expr::Field {
                    recv,
                    field: synthetic_name(field),
                    span: Span::synthetic(),
                }
            }
            TExpr::Eq(left, right) => {
                let left = self.materialize_expr(left);
                let right = self.materialize_expr(right);
                Expr::Eq {
                    left,
                    right,
                    span: Span::synthetic(),
                }
            }
        };
        self.arena.alloc_expr(materialized)
    }

    fn materialize_type(&mut self, ty: &TType) -> TypeId {
        let args = ty.args.iter().map(|arg| self.materialize_type(arg)).collect();
        self.arena.alloc_type(TypeExpr {
            name: synthetic_name(&ty.name),
            args,
            span: Span::synthetic(),
        })
    }
}

fn synthetic_name(name: &str) -> SpannedName {
    SpannedName::new(name, Span::synthetic())
}
