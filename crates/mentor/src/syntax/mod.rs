mod ast;
mod parser;
mod print;
mod rewrite;
mod token;

pub use ast::*;
pub use parser::parse_document;
pub use print::print_document;
pub use rewrite::{
    apply, BlockRef, Edit, RewriteError, TExpr, TItem, TItemKind, TParam, TStmt, TStmtKind, TType,
};
pub use token::{lex, Token, TokenKind};

#[cfg(test)]
mod tests;
