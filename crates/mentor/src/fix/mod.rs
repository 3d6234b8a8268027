mod synthesize;
mod templates;

use crate::stages::{evaluate, StageId, StageResult};
use crate::syntax::{apply, parse_document, print_document, SyntaxTree};
use crate::unit::AnalyzedUnit;

/// One offered repair: a short imperative title plus the full replacement
/// document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub title: String,
    pub text: String,
}

/// Repairs for the given stage against a source text. Empty when the stage
/// currently holds, when there is nothing to anchor an edit to, or when an
/// edit's anchor cannot be found in the tree.
pub fn fixes(stage: StageId, source: &str) -> Vec<Fix> {
    let (tree, _) = parse_document(source);
    fixes_for_tree(stage, &tree)
}

pub fn fixes_for_tree(stage: StageId, tree: &SyntaxTree) -> Vec<Fix> {
    let Some(unit) = AnalyzedUnit::extract(tree) else {
        return Vec::new();
    };
    let result = evaluate(stage, &unit);
    if result == StageResult::Satisfied {
        return Vec::new();
    }
    let mut fixes = Vec::new();
    for (title, edit) in synthesize::edits(stage, result, &unit) {
        // A lost anchor means the tree changed under us; offer nothing
        // rather than a wrong rewrite.
        if let Ok(rewritten) = apply(tree, &edit) {
            fixes.push(Fix {
                title,
                text: print_document(&rewritten),
            });
        }
    }
    fixes
}
