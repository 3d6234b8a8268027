use crate::diagnostics::{Diagnostic, Position, Severity, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    Symbol,
    Comment,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

pub const KEYWORDS: &[&str] = &[
    "analyzer", "const", "static", "fn", "let", "return", "if", "mut", "true", "false",
];

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

pub fn lex(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
        diagnostics: Vec::new(),
    };
    lexer.run();
    (lexer.tokens, lexer.diagnostics)
}

impl Lexer {
    fn run(&mut self) {
        while self.pos < self.chars.len() {
            let ch = self.chars[self.pos];
            if ch == '\n' {
                self.advance();
                continue;
            }
            if ch.is_whitespace() {
                self.advance();
                continue;
            }
            if ch == '/' && self.peek_at(1) == Some('/') {
                self.lex_comment();
                continue;
            }
            if ch == '"' {
                self.lex_string();
                continue;
            }
            if ch.is_ascii_alphabetic() || ch == '_' {
                self.lex_ident();
                continue;
            }
            if let Some(symbol) = self.match_symbol() {
                let start = self.position();
                for _ in 0..symbol.len() {
                    self.advance();
                }
                let end = self.previous_position();
                self.push(TokenKind::Symbol, symbol.to_string(), start, end);
                continue;
            }
            let here = self.position();
            self.diagnostics.push(Diagnostic {
                code: "P100".to_string(),
                severity: Severity::Error,
                message: format!("unexpected character `{ch}`"),
                span: Span::new(here.clone(), here),
            });
            self.advance();
        }
    }

    fn match_symbol(&self) -> Option<&'static str> {
        let two = |a: char, b: char| self.chars[self.pos] == a && self.peek_at(1) == Some(b);
        if two(':', ':') {
            return Some("::");
        }
        if two('-', '>') {
            return Some("->");
        }
        if two('=', '=') {
            return Some("==");
        }
        match self.chars[self.pos] {
            '(' => Some("("),
            ')' => Some(")"),
            '{' => Some("{"),
            '}' => Some("}"),
            '<' => Some("<"),
            '>' => Some(">"),
            ',' => Some(","),
            ';' => Some(";"),
            ':' => Some(":"),
            '.' => Some("."),
            '=' => Some("="),
            '&' => Some("&"),
            _ => None,
        }
    }

    fn lex_comment(&mut self) {
        let start = self.position();
        let mut text = String::new();
        // Skip the leading slashes.
        self.advance();
        self.advance();
        if self.peek_at(0) == Some(' ') {
            self.advance();
        }
        while let Some(ch) = self.peek_at(0) {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }
        let end = self.previous_position();
        self.push(TokenKind::Comment, text, start, end);
    }

    fn lex_string(&mut self) {
        let start = self.position();
        self.advance();
        let mut text = String::new();
        let mut closed = false;
        while let Some(ch) = self.peek_at(0) {
            if ch == '\n' {
                break;
            }
            if ch == '\\' {
                self.advance();
                match self.peek_at(0) {
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some('n') => text.push('\n'),
                    Some(other) => text.push(other),
                    None => break,
                }
                self.advance();
                continue;
            }
            if ch == '"' {
                self.advance();
                closed = true;
                break;
            }
            text.push(ch);
            self.advance();
        }
        let end = self.previous_position();
        if !closed {
            self.diagnostics.push(Diagnostic {
                code: "P101".to_string(),
                severity: Severity::Error,
                message: "unterminated string literal".to_string(),
                span: Span::new(start.clone(), end.clone()),
            });
        }
        self.push(TokenKind::Str, text, start, end);
    }

    fn lex_ident(&mut self) {
        let start = self.position();
        let mut text = String::new();
        while let Some(ch) = self.peek_at(0) {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        let end = self.previous_position();
        self.push(TokenKind::Ident, text, start, end);
    }

    fn push(&mut self, kind: TokenKind, text: String, start: Position, end: Position) {
        self.tokens.push(Token {
            kind,
            text,
            span: Span::new(start, end),
        });
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn previous_position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column.saturating_sub(1).max(1),
        }
    }

    fn advance(&mut self) {
        if let Some(&ch) = self.chars.get(self.pos) {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}
