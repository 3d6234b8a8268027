use crate::syntax::ast::{Expr, ExprId, Item, ItemId, Stmt, StmtId, SyntaxTree, TypeId};

/// Prints a tree back to source text in canonical formatting, emitting
/// attached comments ahead of the node that owns them.
pub fn print_document(tree: &SyntaxTree) -> String {
    let mut printer = Printer {
        tree,
        out: String::new(),
    };
    printer.document();
    printer.out
}

struct Printer<'a> {
    tree: &'a SyntaxTree,
    out: String,
}

impl Printer<'_> {
    fn document(&mut self) {
        let Some(analyzer) = &self.tree.document.analyzer else {
            return;
        };
        self.comment(analyzer.comment.as_deref(), 0);
        self.out.push_str(&format!("analyzer {} {{\n", analyzer.name.name));
        for (index, item) in analyzer.items.iter().enumerate() {
            if index > 0 {
                self.out.push('\n');
            }
            self.item(*item, 1);
        }
        self.comment(analyzer.trailing_comment.as_deref(), 1);
        self.out.push_str("}\n");
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str("    ");
        }
    }

    fn comment(&mut self, comment: Option<&str>, depth: usize) {
        let Some(comment) = comment else { return };
        for line in comment.lines() {
            self.indent(depth);
            if line.is_empty() {
                self.out.push_str("//\n");
            } else {
                self.out.push_str(&format!("// {line}\n"));
            }
        }
    }

    fn item(&mut self, id: ItemId, depth: usize) {
        let item = self.tree.arena.item(id);
        self.comment(item.comment(), depth);
        match item {
            Item::Const {
                name, ty, value, ..
            } => {
                self.indent(depth);
                self.out
                    .push_str(&format!("const {}: {} = ", name.name, self.type_text(*ty)));
                self.expr(*value);
                self.out.push_str(";\n");
            }
            Item::Static {
                name, ty, value, ..
            } => {
                self.indent(depth);
                self.out
                    .push_str(&format!("static {}: {} = ", name.name, self.type_text(*ty)));
                self.expr(*value);
                self.out.push_str(";\n");
            }
            Item::Fn {
                name,
                params,
                ret,
                body,
                trailing_comment,
                ..
            } => {
                self.indent(depth);
                self.out.push_str(&format!("fn {}(", name.name));
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&param.name.name);
                    self.out.push_str(": ");
                    if param.by_ref {
                        self.out.push('&');
                        if param.mutable {
                            self.out.push_str("mut ");
                        }
                    }
                    self.out.push_str(&self.type_text(param.ty));
                }
                self.out.push(')');
                if let Some(ret) = ret {
                    self.out.push_str(&format!(" -> {}", self.type_text(*ret)));
                }
                self.out.push_str(" {\n");
                for stmt in body {
                    self.stmt(*stmt, depth + 1);
                }
                self.comment(trailing_comment.as_deref(), depth + 1);
                self.indent(depth);
                self.out.push_str("}\n");
            }
        }
    }

    fn stmt(&mut self, id: StmtId, depth: usize) {
        let stmt = self.tree.arena.stmt(id);
        self.comment(stmt.comment(), depth);
        match stmt {
            Stmt::Let { name, value, .. } => {
                self.indent(depth);
                self.out.push_str(&format!("let {} = ", name.name));
                self.expr(*value);
                self.out.push_str(";\n");
            }
            Stmt::Return { value, .. } => {
                self.indent(depth);
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(*value);
                }
                self.out.push_str(";\n");
            }
            Stmt::If {
                cond,
                body,
                trailing_comment,
                ..
            } => {
                self.indent(depth);
                self.out.push_str("if ");
                self.expr(*cond);
                self.out.push_str(" {\n");
                for stmt in body {
                    self.stmt(*stmt, depth + 1);
                }
                self.comment(trailing_comment.as_deref(), depth + 1);
                self.indent(depth);
                self.out.push_str("}\n");
            }
            Stmt::Expr { expr, .. } => {
                self.indent(depth);
                self.expr(*expr);
                self.out.push_str(";\n");
            }
        }
    }

    fn type_text(&self, id: TypeId) -> String {
        let ty = self.tree.arena.type_expr(id);
        if ty.args.is_empty() {
            ty.name.name.clone()
        } else {
            let args: Vec<String> = ty.args.iter().map(|arg| self.type_text(*arg)).collect();
            format!("{}<{}>", ty.name.name, args.join(", "))
        }
    }

    fn expr(&mut self, id: ExprId) {
        let text = self.expr_text(id);
        self.out.push_str(&text);
    }

    fn expr_text(&self, id: ExprId) -> String {
        match self.tree.arena.expr(id) {
            Expr::Ident(name) => name.name.clone(),
            Expr::Str { value, .. } => format!("\"{}\"", escape_str(value)),
            Expr::Bool { value, .. } => value.to_string(),
            Expr::Path {
                qualifier, member, ..
            } => format!("{}::{}", qualifier.name, member.name),
            Expr::Call { callee, args, .. } => {
                format!("{}({})", self.expr_text(*callee), self.args_text(args))
            }
            Expr::MethodCall {
                recv, method, args, ..
            } => format!(
                "{}.{}({})",
                self.expr_text(*recv),
                method.name,
                self.args_text(args)
            ),
            Expr::Field { recv, field, .. } => {
                format!("{}.{}", self.expr_text(*recv), field.name)
            }
            Expr::Eq { left, right, .. } => {
                format!("{} == {}", self.expr_text(*left), self.expr_text(*right))
            }
        }
    }

    fn args_text(&self, args: &[ExprId]) -> String {
        let parts: Vec<String> = args.iter().map(|arg| self.expr_text(*arg)).collect();
        parts.join(", ")
    }
}

fn escape_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}
