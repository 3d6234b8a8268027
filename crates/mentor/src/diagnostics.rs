use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span for nodes synthesized by the fix engine; they never reach a
    /// diagnostic because fixed documents are re-parsed before verification.
    pub fn synthetic() -> Self {
        Self {
            start: Position { line: 0, column: 0 },
            end: Position { line: 0, column: 0 },
        }
    }

    pub fn merge(start: Span, end: Span) -> Span {
        Span {
            start: start.start,
            end: end.end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

// ANSI color codes
const RED: &str = "\x1b[1;31m";
const CYAN: &str = "\x1b[1;36m";
const DARK_GRAY: &str = "\x1b[90m";
const WHITE: &str = "\x1b[97m";
const YELLOW: &str = "\x1b[1;33m";
const RESET: &str = "\x1b[0m";

pub fn diagnostics_have_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|diag| diag.severity == Severity::Error)
}

/// Machine-readable form of a diagnostic batch, for editor integrations.
pub fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> serde_json::Value {
    serde_json::to_value(diagnostics).unwrap_or(serde_json::Value::Null)
}

pub fn render_diagnostics(source: &str, diagnostics: &[Diagnostic], use_color: bool) -> String {
    let mut output = String::new();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&render_diagnostic(source, diagnostic, use_color));
    }
    output
}

fn caret_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Info => CYAN,
    }
}

pub fn render_diagnostic(source: &str, diagnostic: &Diagnostic, use_color: bool) -> String {
    let mut output = String::new();
    let start = &diagnostic.span.start;
    let severity_label = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Info => "info",
    };
    if use_color {
        output.push_str(&format!(
            "{YELLOW}{severity_label}[{}]{RESET} {DARK_GRAY}{}:{}{RESET}\n  {WHITE}{}{RESET}\n",
            diagnostic.code, start.line, start.column, diagnostic.message
        ));
    } else {
        output.push_str(&format!(
            "{severity_label}[{}] {}:{}\n  {}\n",
            diagnostic.code, start.line, start.column, diagnostic.message
        ));
    }
    if let Some(frame) = render_source_frame(source, &diagnostic.span, use_color, diagnostic.severity)
    {
        output.push_str(&frame);
    }
    output.trim_end().to_string()
}

fn render_source_frame(
    source: &str,
    span: &Span,
    use_color: bool,
    severity: Severity,
) -> Option<String> {
    let line_index = span.start.line.checked_sub(1)?;
    let line = source.lines().nth(line_index)?;
    let line_no = span.start.line;
    let width = line_no.to_string().len();

    let mut output = String::new();
    if use_color {
        output.push_str(&format!("{DARK_GRAY}{:>width$} |{RESET}\n", ""));
        output.push_str(&format!("{DARK_GRAY}{line_no:>width$} |{RESET} {line}\n"));
    } else {
        output.push_str(&format!("{:>width$} |\n", ""));
        output.push_str(&format!("{line_no:>width$} | {line}\n"));
    }

    let line_len = line.chars().count();
    let mut start_col = span.start.column.max(1);
    if start_col > line_len + 1 {
        start_col = line_len + 1;
    }
    let mut end_col = if span.start.line == span.end.line {
        span.end.column
    } else {
        start_col
    };
    if end_col < start_col {
        end_col = start_col;
    }
    if end_col > line_len {
        end_col = line_len.max(start_col);
    }
    let caret_len = end_col.saturating_sub(start_col).saturating_add(1);

    let padding = " ".repeat(start_col.saturating_sub(1));
    let carets = "^".repeat(caret_len);
    if use_color {
        let cc = caret_color(severity);
        output.push_str(&format!(
            "{DARK_GRAY}{:>width$} |{RESET} {padding}{cc}{carets}{RESET}\n",
            ""
        ));
    } else {
        output.push_str(&format!("{:>width$} | {padding}{carets}\n", ""));
    }
    Some(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(line: usize, start_col: usize, end_col: usize) -> Diagnostic {
        Diagnostic {
            code: "mentor::complete".to_string(),
            severity: Severity::Info,
            message: "all good".to_string(),
            span: Span::new(
                Position {
                    line,
                    column: start_col,
                },
                Position {
                    line,
                    column: end_col,
                },
            ),
        }
    }

    #[test]
    fn plain_frame_underlines_the_span() {
        let rendered = render_diagnostic("analyzer IfSpacing {", &diag(1, 10, 17), false);
        assert_eq!(
            rendered,
            "info[mentor::complete] 1:10\n  all good\n  |\n1 | analyzer IfSpacing {\n  |          ^^^^^^^^"
        );
    }

    #[test]
    fn caret_is_clamped_to_the_line() {
        // Columns past the end of the line collapse to a single caret just
        // after the last character.
        let rendered = render_diagnostic("let x;", &diag(1, 50, 60), false);
        let caret_line = rendered.lines().last().unwrap();
        assert_eq!(caret_line, "  |       ^");
    }

    #[test]
    fn missing_line_renders_header_only() {
        let rendered = render_diagnostic("one line", &diag(7, 1, 3), false);
        assert_eq!(rendered, "info[mentor::complete] 7:1\n  all good");
    }

    #[test]
    fn batch_renders_every_diagnostic() {
        let source = "let x;";
        let rendered = render_diagnostics(source, &[diag(1, 1, 3), diag(1, 5, 5)], false);
        assert_eq!(rendered.matches("info[mentor::complete]").count(), 2);
    }

    #[test]
    fn json_batch_keeps_order_and_fields() {
        let value = diagnostics_to_json(&[diag(1, 1, 3), diag(2, 1, 1)]);
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["severity"], "info");
        assert_eq!(list[1]["span"]["start"]["line"], 2);
    }
}
