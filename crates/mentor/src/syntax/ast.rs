use crate::diagnostics::Span;

macro_rules! node_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub fn as_u32(self) -> u32 {
                self.0
            }
        }
    };
}

node_id!(ItemId);
node_id!(StmtId);
node_id!(ExprId);
node_id!(TypeId);

#[derive(Debug, Clone)]
pub struct SpannedName {
    pub name: String,
    pub span: Span,
}

impl SpannedName {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Reference to any node in the tree, used when a structural check wants to
/// point at the exact offending sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Item(ItemId),
    Stmt(StmtId),
    Expr(ExprId),
    Type(TypeId),
    /// The parenthesized parameter list of a fn item.
    ParamList(ItemId),
    /// The name token of a fn item.
    FnName(ItemId),
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: SpannedName,
    pub by_ref: bool,
    pub mutable: bool,
    pub ty: TypeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub name: SpannedName,
    pub args: Vec<TypeId>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Item {
    Const {
        name: SpannedName,
        ty: TypeId,
        value: ExprId,
        comment: Option<String>,
        span: Span,
    },
    Static {
        name: SpannedName,
        ty: TypeId,
        value: ExprId,
        comment: Option<String>,
        span: Span,
    },
    Fn {
        name: SpannedName,
        params: Vec<Param>,
        params_span: Span,
        ret: Option<TypeId>,
        body: Vec<StmtId>,
        comment: Option<String>,
        /// Comment sitting between the last body statement and the closing
        /// brace, kept so rewrites do not drop it.
        trailing_comment: Option<String>,
        span: Span,
    },
}

impl Item {
    pub fn name(&self) -> &SpannedName {
        match self {
            Item::Const { name, .. } | Item::Static { name, .. } | Item::Fn { name, .. } => name,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Item::Const { span, .. } | Item::Static { span, .. } | Item::Fn { span, .. } => span,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Item::Const { comment, .. }
            | Item::Static { comment, .. }
            | Item::Fn { comment, .. } => comment.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let {
        name: SpannedName,
        value: ExprId,
        comment: Option<String>,
        span: Span,
    },
    Return {
        value: Option<ExprId>,
        comment: Option<String>,
        span: Span,
    },
    If {
        cond: ExprId,
        body: Vec<StmtId>,
        comment: Option<String>,
        trailing_comment: Option<String>,
        span: Span,
    },
    Expr {
        expr: ExprId,
        comment: Option<String>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Let { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Expr { span, .. } => span,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Stmt::Let { comment, .. }
            | Stmt::Return { comment, .. }
            | Stmt::If { comment, .. }
            | Stmt::Expr { comment, .. } => comment.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(SpannedName),
    Str {
        value: String,
        span: Span,
    },
    Bool {
        value: bool,
        span: Span,
    },
    /// `Qualifier::member` — an enum member or associated function path.
    Path {
        qualifier: SpannedName,
        member: SpannedName,
        span: Span,
    },
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
        span: Span,
    },
    MethodCall {
        recv: ExprId,
        method: SpannedName,
        args: Vec<ExprId>,
        span: Span,
    },
    Field {
        recv: ExprId,
        field: SpannedName,
        span: Span,
    },
    Eq {
        left: ExprId,
        right: ExprId,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Ident(name) => &name.span,
            Expr::Str { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Path { span, .. }
            | Expr::Call { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::Field { span, .. }
            | Expr::Eq { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerDecl {
    pub name: SpannedName,
    pub items: Vec<ItemId>,
    /// Comment above the `analyzer` keyword.
    pub comment: Option<String>,
    /// Comment between the last item and the closing brace.
    pub trailing_comment: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub analyzer: Option<AnalyzerDecl>,
}

#[derive(Debug, Default, Clone)]
pub struct SyntaxArena {
    pub items: Vec<Item>,
    pub stmts: Vec<Stmt>,
    pub exprs: Vec<Expr>,
    pub types: Vec<TypeExpr>,
}

impl SyntaxArena {
    pub fn alloc_item(&mut self, item: Item) -> ItemId {
        let id = ItemId::new(self.items.len() as u32);
        self.items.push(item);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn alloc_type(&mut self, ty: TypeExpr) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.as_u32() as usize]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.as_u32() as usize]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.as_u32() as usize]
    }

    pub fn type_expr(&self, id: TypeId) -> &TypeExpr {
        &self.types[id.as_u32() as usize]
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    pub arena: SyntaxArena,
    pub document: Document,
}

impl SyntaxTree {
    pub fn node_span(&self, node: NodeRef) -> Span {
        match node {
            NodeRef::Item(id) => self.arena.item(id).span().clone(),
            NodeRef::Stmt(id) => self.arena.stmt(id).span().clone(),
            NodeRef::Expr(id) => self.arena.expr(id).span().clone(),
            NodeRef::Type(id) => self.arena.type_expr(id).span.clone(),
            NodeRef::ParamList(id) => match self.arena.item(id) {
                Item::Fn { params_span, .. } => params_span.clone(),
                other => other.span().clone(),
            },
            NodeRef::FnName(id) => self.arena.item(id).name().span.clone(),
        }
    }
}
