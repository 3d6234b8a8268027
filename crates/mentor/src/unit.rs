use crate::syntax::{
    AnalyzerDecl, Expr, ExprId, Item, ItemId, Param, SpannedName, Stmt, StmtId, SyntaxTree, TypeId,
};

pub const SUPPORTED_RULES_FN: &str = "supported_rules";
pub const REGISTER_FN: &str = "register";
pub const REGISTER_METHOD: &str = "on_node";

/// Read-only structured view of one document under verification. Derived
/// fresh from the tree on every pass and discarded afterwards; owns no
/// mutable state.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzedUnit<'a> {
    pub tree: &'a SyntaxTree,
    pub analyzer: &'a AnalyzerDecl,
}

impl<'a> AnalyzedUnit<'a> {
    pub fn extract(tree: &'a SyntaxTree) -> Option<Self> {
        let analyzer = tree.document.analyzer.as_ref()?;
        Some(Self { tree, analyzer })
    }

    pub fn item(&self, id: ItemId) -> &'a Item {
        self.tree.arena.item(id)
    }

    pub fn stmt(&self, id: StmtId) -> &'a Stmt {
        self.tree.arena.stmt(id)
    }

    pub fn expr(&self, id: ExprId) -> &'a Expr {
        self.tree.arena.expr(id)
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &'a Item)> + '_ {
        self.analyzer
            .items
            .iter()
            .map(|id| (*id, self.tree.arena.item(*id)))
    }

    pub fn item_index(&self, target: ItemId) -> Option<usize> {
        self.analyzer.items.iter().position(|id| *id == target)
    }

    /// The rule id constant: the first `const` item in declaration order.
    pub fn id_const(&self) -> Option<ItemId> {
        self.items()
            .find(|(_, item)| matches!(item, Item::Const { .. }))
            .map(|(id, _)| id)
    }

    /// The rule descriptor: the first `static` item in declaration order.
    pub fn rule_static(&self) -> Option<ItemId> {
        self.items()
            .find(|(_, item)| matches!(item, Item::Static { .. }))
            .map(|(id, _)| id)
    }

    pub fn find_fn(&self, name: &str) -> Option<ItemId> {
        self.items()
            .find(|(_, item)| matches!(item, Item::Fn { name: fn_name, .. } if fn_name.name == name))
            .map(|(id, _)| id)
    }

    pub fn supported_rules_fn(&self) -> Option<ItemId> {
        self.find_fn(SUPPORTED_RULES_FN)
    }

    pub fn register_fn(&self) -> Option<ItemId> {
        self.find_fn(REGISTER_FN)
    }

    pub fn fn_params(&self, id: ItemId) -> &'a [Param] {
        match self.item(id) {
            Item::Fn { params, .. } => params,
            _ => &[],
        }
    }

    pub fn fn_ret(&self, id: ItemId) -> Option<TypeId> {
        match self.item(id) {
            Item::Fn { ret, .. } => *ret,
            _ => None,
        }
    }

    pub fn fn_body(&self, id: ItemId) -> &'a [StmtId] {
        match self.item(id) {
            Item::Fn { body, .. } => body,
            _ => &[],
        }
    }

    /// The first statement of the register body that is recognizably an
    /// `<param>.on_node(..)` registration call.
    pub fn register_call(&self) -> Option<(StmtId, ExprId)> {
        let register = self.register_fn()?;
        for stmt_id in self.fn_body(register) {
            if let Stmt::Expr { expr, .. } = self.stmt(*stmt_id) {
                if let Expr::MethodCall { method, .. } = self.expr(*expr) {
                    if method.name == REGISTER_METHOD {
                        return Some((*stmt_id, *expr));
                    }
                }
            }
        }
        None
    }

    /// The handler name passed as the second argument of the registration
    /// call, once that argument is a plain identifier.
    pub fn handler_name(&self) -> Option<&'a SpannedName> {
        let (_, call) = self.register_call()?;
        if let Expr::MethodCall { args, .. } = self.expr(call) {
            if let Some(arg) = args.get(1) {
                if let Expr::Ident(name) = self.expr(*arg) {
                    return Some(name);
                }
            }
        }
        None
    }

    pub fn analysis_fn(&self) -> Option<ItemId> {
        let handler = self.handler_name()?;
        self.find_fn(&handler.name)
    }

    /// Name of the const/static/fn item, as written by the user.
    pub fn item_name(&self, id: ItemId) -> &'a str {
        &self.item(id).name().name
    }
}
