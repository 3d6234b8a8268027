use crate::diagnostics::{Diagnostic, Severity, Span};
use crate::syntax::ast::{
    AnalyzerDecl, Document, Expr, ExprId, Item, ItemId, Param, SpannedName, Stmt, StmtId, SyntaxArena,
    SyntaxTree, TypeExpr, TypeId,
};
use crate::syntax::token::{lex, Token, TokenKind, KEYWORDS};

/// Parses one analyzer document. Never fails fatally: parse problems are
/// accumulated as diagnostics and the best-effort tree is returned anyway so
/// the stage verifier can run over whatever structure was recognized.
pub fn parse_document(source: &str) -> (SyntaxTree, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = lex(source);
    let mut parser = Parser::new(tokens);
    let document = parser.parse();
    diagnostics.append(&mut parser.diagnostics);
    (
        SyntaxTree {
            arena: parser.arena,
            document,
        },
        diagnostics,
    )
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    arena: SyntaxArena,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            arena: SyntaxArena::default(),
        }
    }

    fn parse(&mut self) -> Document {
        let mut document = Document::default();
        let mut reported_leading_tokens = false;
        while self.pos < self.tokens.len() {
            let comment = self.take_comment();
            if self.match_keyword("analyzer") {
                let decl = self.parse_analyzer(comment);
                if document.analyzer.is_none() {
                    document.analyzer = decl;
                } else {
                    self.emit_diag(
                        "P105",
                        "only one `analyzer` declaration is allowed per document",
                        self.previous_span(),
                    );
                }
            } else if self.pos < self.tokens.len() {
                if !reported_leading_tokens {
                    reported_leading_tokens = true;
                    let span = self.peek_span().unwrap_or_else(|| self.previous_span());
                    self.emit_diag("P102", "expected `analyzer` declaration", span);
                }
                self.pos += 1;
            }
        }
        document
    }

    fn parse_analyzer(&mut self, comment: Option<String>) -> Option<AnalyzerDecl> {
        let kw_span = self.previous_span();
        let Some(name) = self.consume_ident() else {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            self.emit_diag("P103", "expected analyzer name after `analyzer`", span);
            return None;
        };
        self.expect_symbol("{", "expected `{` to open the analyzer body");
        let mut items = Vec::new();
        let mut trailing_comment = None;
        loop {
            let loop_start = self.pos;
            let item_comment = self.take_comment();
            if self.check_symbol("}") || self.pos >= self.tokens.len() {
                // A comment with no item after it belongs to the closing
                // brace and must survive rewrites.
                trailing_comment = item_comment;
                break;
            }
            if let Some(item) = self.parse_item(item_comment) {
                items.push(item);
            } else {
                self.recover_to_item();
            }
            if self.pos == loop_start {
                self.pos += 1;
            }
        }
        let end_span = self
            .expect_symbol("}", "expected `}` to close the analyzer body")
            .unwrap_or_else(|| self.previous_span());
        Some(AnalyzerDecl {
            span: Span::merge(kw_span, end_span),
            name,
            items,
            comment,
            trailing_comment,
        })
    }

    fn parse_item(&mut self, comment: Option<String>) -> Option<ItemId> {
        if self.match_keyword("const") {
            return self.parse_const_or_static(comment, false);
        }
        if self.match_keyword("static") {
            return self.parse_const_or_static(comment, true);
        }
        if self.match_keyword("fn") {
            return self.parse_fn(comment);
        }
        let span = self.peek_span().unwrap_or_else(|| self.previous_span());
        self.emit_diag("P104", "expected `const`, `static` or `fn` item", span);
        None
    }

    fn parse_const_or_static(
        &mut self,
        comment: Option<String>,
        is_static: bool,
    ) -> Option<ItemId> {
        let kw_span = self.previous_span();
        let name = self.consume_ident().or_else(|| {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            self.emit_diag("P103", "expected a name for the declaration", span);
            None
        })?;
        self.expect_symbol(":", "expected `:` before the declared type")?;
        let ty = self.parse_type()?;
        self.expect_symbol("=", "expected `=` before the initializer")?;
        let value = self.parse_expr()?;
        let end = self
            .expect_symbol(";", "expected `;` after the initializer")
            .unwrap_or_else(|| self.previous_span());
        let span = Span::merge(kw_span, end);
        let item = if is_static {
            Item::Static {
                name,
                ty,
                value,
                comment,
                span,
            }
        } else {
            Item::Const {
                name,
                ty,
                value,
                comment,
                span,
            }
        };
        Some(self.arena.alloc_item(item))
    }

    fn parse_fn(&mut self, comment: Option<String>) -> Option<ItemId> {
        let kw_span = self.previous_span();
        let name = self.consume_ident().or_else(|| {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            self.emit_diag("P103", "expected a function name after `fn`", span);
            None
        })?;
        let open = self.expect_symbol("(", "expected `(` after the function name")?;
        let mut params = Vec::new();
        while !self.check_symbol(")") && self.pos < self.tokens.len() {
            if let Some(param) = self.parse_param() {
                params.push(param);
            } else {
                break;
            }
            if !self.consume_symbol(",") {
                break;
            }
        }
        let close = self
            .expect_symbol(")", "expected `)` to close the parameter list")
            .unwrap_or_else(|| self.previous_span());
        let params_span = Span::merge(open, close);
        let ret = if self.consume_symbol("->") {
            Some(self.parse_type()?)
        } else {
            None
        };
        let (body, trailing_comment, end_span) = self.parse_block()?;
        let span = Span::merge(kw_span, end_span);
        Some(self.arena.alloc_item(Item::Fn {
            name,
            params,
            params_span,
            ret,
            body,
            comment,
            trailing_comment,
            span,
        }))
    }

    fn parse_param(&mut self) -> Option<Param> {
        let name = self.consume_ident().or_else(|| {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            self.emit_diag("P103", "expected a parameter name", span);
            None
        })?;
        self.expect_symbol(":", "expected `:` after the parameter name")?;
        let by_ref = self.consume_symbol("&");
        let mutable = by_ref && self.match_keyword("mut");
        let ty = self.parse_type()?;
        let span = Span::merge(name.span.clone(), self.previous_span());
        Some(Param {
            name,
            by_ref,
            mutable,
            ty,
            span,
        })
    }

    fn parse_type(&mut self) -> Option<TypeId> {
        let name = self.consume_ident().or_else(|| {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            self.emit_diag("P103", "expected a type name", span);
            None
        })?;
        let mut args = Vec::new();
        let mut end = name.span.clone();
        if self.consume_symbol("<") {
            while !self.check_symbol(">") && self.pos < self.tokens.len() {
                args.push(self.parse_type()?);
                if !self.consume_symbol(",") {
                    break;
                }
            }
            end = self
                .expect_symbol(">", "expected `>` to close the type arguments")
                .unwrap_or_else(|| self.previous_span());
        }
        let span = Span::merge(name.span.clone(), end);
        Some(self.arena.alloc_type(TypeExpr { name, args, span }))
    }

    fn parse_block(&mut self) -> Option<(Vec<StmtId>, Option<String>, Span)> {
        self.expect_symbol("{", "expected `{` to open a block")?;
        let mut stmts = Vec::new();
        let mut trailing_comment = None;
        loop {
            let loop_start = self.pos;
            let comment = self.take_comment();
            if self.check_symbol("}") || self.pos >= self.tokens.len() {
                trailing_comment = comment;
                break;
            }
            if let Some(stmt) = self.parse_stmt(comment) {
                stmts.push(stmt);
            } else {
                self.recover_to_stmt();
            }
            if self.pos == loop_start {
                self.pos += 1;
            }
        }
        let end = self
            .expect_symbol("}", "expected `}` to close the block")
            .unwrap_or_else(|| self.previous_span());
        Some((stmts, trailing_comment, end))
    }

    fn parse_stmt(&mut self, comment: Option<String>) -> Option<StmtId> {
        if self.match_keyword("let") {
            let kw_span = self.previous_span();
            let name = self.consume_ident().or_else(|| {
                let span = self.peek_span().unwrap_or_else(|| self.previous_span());
                self.emit_diag("P103", "expected a name after `let`", span);
                None
            })?;
            self.expect_symbol("=", "expected `=` after the `let` name")?;
            let value = self.parse_expr()?;
            let end = self
                .expect_symbol(";", "expected `;` after the `let` initializer")
                .unwrap_or_else(|| self.previous_span());
            return Some(self.arena.alloc_stmt(Stmt::Let {
                name,
                value,
                comment,
                span: Span::merge(kw_span, end),
            }));
        }
        if self.match_keyword("return") {
            let kw_span = self.previous_span();
            let value = if self.check_symbol(";") {
                None
            } else {
                Some(self.parse_expr()?)
            };
            let end = self
                .expect_symbol(";", "expected `;` after `return`")
                .unwrap_or_else(|| self.previous_span());
            return Some(self.arena.alloc_stmt(Stmt::Return {
                value,
                comment,
                span: Span::merge(kw_span, end),
            }));
        }
        if self.match_keyword("if") {
            let kw_span = self.previous_span();
            let cond = self.parse_expr()?;
            let (body, trailing_comment, end_span) = self.parse_block()?;
            return Some(self.arena.alloc_stmt(Stmt::If {
                cond,
                body,
                comment,
                trailing_comment,
                span: Span::merge(kw_span, end_span),
            }));
        }
        let start_span = self.peek_span().unwrap_or_else(|| self.previous_span());
        let expr = self.parse_expr()?;
        let end = self
            .expect_symbol(";", "expected `;` after the expression")
            .unwrap_or_else(|| self.previous_span());
        Some(self.arena.alloc_stmt(Stmt::Expr {
            expr,
            comment,
            span: Span::merge(start_span, end),
        }))
    }

    fn parse_expr(&mut self) -> Option<ExprId> {
        let left = self.parse_postfix()?;
        if self.consume_symbol("==") {
            let right = self.parse_postfix()?;
            let span = Span::merge(
                self.arena.expr(left).span().clone(),
                self.arena.expr(right).span().clone(),
            );
            return Some(self.arena.alloc_expr(Expr::Eq { left, right, span }));
        }
        Some(left)
    }

    fn parse_postfix(&mut self) -> Option<ExprId> {
        let mut expr = self.parse_primary()?;
        while self.consume_symbol(".") {
            let Some(member) = self.consume_any_ident() else {
                let span = self.peek_span().unwrap_or_else(|| self.previous_span());
                self.emit_diag("P103", "expected a member name after `.`", span);
                return None;
            };
            if self.consume_symbol("(") {
                let args = self.parse_args()?;
                let end = self.previous_span();
                let span = Span::merge(self.arena.expr(expr).span().clone(), end);
                expr = self.arena.alloc_expr(Expr::MethodCall {
                    recv: expr,
                    method: member,
                    args,
                    span,
                });
            } else {
                let span = Span::merge(self.arena.expr(expr).span().clone(), member.span.clone());
                expr = self.arena.alloc_expr(Expr::Field {
                    recv: expr,
                    field: member,
                    span,
                });
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<ExprId> {
        if let Some(token) = self.tokens.get(self.pos) {
            if token.kind == TokenKind::Str {
                let expr = Expr::Str {
                    value: token.text.clone(),
                    span: token.span.clone(),
                };
                self.pos += 1;
                return Some(self.arena.alloc_expr(expr));
            }
        }
        if self.peek_keyword("true") || self.peek_keyword("false") {
            let token = &self.tokens[self.pos];
            let expr = Expr::Bool {
                value: token.text == "true",
                span: token.span.clone(),
            };
            self.pos += 1;
            return Some(self.arena.alloc_expr(expr));
        }
        let Some(name) = self.consume_ident() else {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            self.emit_diag("P106", "expected an expression", span);
            return None;
        };
        let head = if self.consume_symbol("::") {
            let Some(member) = self.consume_any_ident() else {
                let span = self.peek_span().unwrap_or_else(|| self.previous_span());
                self.emit_diag("P103", "expected a member name after `::`", span);
                return None;
            };
            let span = Span::merge(name.span.clone(), member.span.clone());
            self.arena.alloc_expr(Expr::Path {
                qualifier: name,
                member,
                span,
            })
        } else {
            self.arena.alloc_expr(Expr::Ident(name))
        };
        if self.consume_symbol("(") {
            let args = self.parse_args()?;
            let end = self.previous_span();
            let span = Span::merge(self.arena.expr(head).span().clone(), end);
            return Some(self.arena.alloc_expr(Expr::Call {
                callee: head,
                args,
                span,
            }));
        }
        Some(head)
    }

    /// Parses call arguments up to and including the closing `)`. The caller
    /// has already consumed the opening `(`.
    fn parse_args(&mut self) -> Option<Vec<ExprId>> {
        let mut args = Vec::new();
        while !self.check_symbol(")") && self.pos < self.tokens.len() {
            args.push(self.parse_expr()?);
            if !self.consume_symbol(",") {
                break;
            }
        }
        self.expect_symbol(")", "expected `)` to close the argument list")?;
        Some(args)
    }

    fn recover_to_item(&mut self) {
        while self.pos < self.tokens.len() {
            if self.check_symbol("}")
                || self.peek_keyword("const")
                || self.peek_keyword("static")
                || self.peek_keyword("fn")
            {
                return;
            }
            self.pos += 1;
        }
    }

    fn recover_to_stmt(&mut self) {
        while self.pos < self.tokens.len() {
            if self.check_symbol("}") {
                return;
            }
            if self.consume_symbol(";") {
                return;
            }
            self.pos += 1;
        }
    }

    fn take_comment(&mut self) -> Option<String> {
        let mut lines: Vec<String> = Vec::new();
        while let Some(token) = self.tokens.get(self.pos) {
            if token.kind != TokenKind::Comment {
                break;
            }
            lines.push(token.text.clone());
            self.pos += 1;
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    fn emit_diag(&mut self, code: &str, message: &str, span: Span) {
        self.diagnostics.push(Diagnostic {
            code: code.to_string(),
            severity: Severity::Error,
            message: message.to_string(),
            span,
        });
    }

    fn peek_span(&self) -> Option<Span> {
        self.tokens.get(self.pos).map(|token| token.span.clone())
    }

    fn previous_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|token| token.span.clone())
            .unwrap_or_else(Span::synthetic)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|token| token.kind == TokenKind::Ident && token.text == keyword)
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn check_symbol(&self, symbol: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|token| token.kind == TokenKind::Symbol && token.text == symbol)
    }

    fn consume_symbol(&mut self, symbol: &str) -> bool {
        if self.check_symbol(symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str, message: &str) -> Option<Span> {
        if self.check_symbol(symbol) {
            let span = self.tokens[self.pos].span.clone();
            self.pos += 1;
            Some(span)
        } else {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            self.emit_diag("P107", message, span);
            None
        }
    }

    /// Consumes an identifier that is not a keyword.
    fn consume_ident(&mut self) -> Option<SpannedName> {
        let token = self.tokens.get(self.pos)?;
        if token.kind != TokenKind::Ident || KEYWORDS.contains(&token.text.as_str()) {
            return None;
        }
        let name = SpannedName::new(token.text.clone(), token.span.clone());
        self.pos += 1;
        Some(name)
    }

    /// Consumes any identifier, keywords included. Member positions after
    /// `.` and `::` are never keyword positions in this dialect.
    fn consume_any_ident(&mut self) -> Option<SpannedName> {
        let token = self.tokens.get(self.pos)?;
        if token.kind != TokenKind::Ident {
            return None;
        }
        let name = SpannedName::new(token.text.clone(), token.span.clone());
        self.pos += 1;
        Some(name)
    }
}
