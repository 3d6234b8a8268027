pub mod diagnostics;
pub mod fix;
pub mod stages;
pub mod syntax;
pub mod unit;
pub mod verify;

pub use diagnostics::{
    diagnostics_have_errors, diagnostics_to_json, render_diagnostic, render_diagnostics,
    Diagnostic, Position, Severity, Span,
};
pub use fix::{fixes, fixes_for_tree, Fix};
pub use stages::{StageId, StageResult};
pub use syntax::{parse_document, print_document, SyntaxTree};
pub use unit::AnalyzedUnit;
pub use verify::{verify, verify_tree, StageDiagnostic};
