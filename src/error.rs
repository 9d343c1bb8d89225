use crate::lexer::{Token, TokenKind};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io::{self, Write};

/// Source location of a token or node.
///
/// `start`/`end` are char offsets into the normalized source (what ariadne
/// expects); `line`/`column` are 1-based and point at the first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn single(pos: usize, line: usize, column: usize) -> Self {
        Self::new(pos, pos + 1, line, column)
    }

    /// Span covering `self` through `other`, keeping `self`'s line/column.
    pub fn to(&self, other: &Span) -> Self {
        Self::new(self.start, other.end.max(self.end), self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexer,
    Parser,
    Interpreter,
    Internal,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Lexer => "Lexical Error",
            ErrorKind::Parser => "Parse Error",
            ErrorKind::Interpreter => "Runtime Error",
            ErrorKind::Internal => "Internal Error",
        }
    }

    fn color(&self) -> Color {
        match self {
            ErrorKind::Lexer => Color::Red,
            ErrorKind::Parser => Color::Yellow,
            ErrorKind::Interpreter => Color::Magenta,
            ErrorKind::Internal => Color::Blue,
        }
    }
}

/// The token that triggered a diagnostic: its kind and, when it has one,
/// its textual value.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundToken {
    pub kind: TokenKind,
    pub value: Option<String>,
}

impl From<&Token> for FoundToken {
    fn from(token: &Token) -> Self {
        let value = match token.kind {
            TokenKind::Eof => None,
            TokenKind::String => token.literal.as_ref().map(|v| v.to_string()),
            _ => Some(token.lexeme.clone()),
        };
        Self {
            kind: token.kind.clone(),
            value,
        }
    }
}

impl fmt::Display for FoundToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({})", self.kind, value),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AbyssError {
    pub kind: ErrorKind,
    pub message: String,
    pub token: Option<FoundToken>,
    pub expected: Option<TokenKind>,
    pub span: Option<Span>,
    pub filename: Option<String>,
    pub help: Option<String>,
}

impl AbyssError {
    pub fn new(kind: ErrorKind, span: Option<Span>, message: String) -> Self {
        Self {
            kind,
            message,
            token: None,
            expected: None,
            span,
            filename: None,
            help: None,
        }
    }

    pub fn lex_error(character: char, span: Span) -> Self {
        let mut error = Self::new(
            ErrorKind::Lexer,
            Some(span),
            format!("Unexpected character: '{}'", character),
        );
        error.token = Some(FoundToken {
            kind: TokenKind::Char,
            value: Some(character.to_string()),
        });
        error
    }

    pub fn number_error(text: &str, span: Span) -> Self {
        let mut error = Self::new(
            ErrorKind::Lexer,
            Some(span),
            format!("Invalid number literal: {}", text),
        );
        error.token = Some(FoundToken {
            kind: TokenKind::Number,
            value: Some(text.to_string()),
        });
        error.with_help(format!(
            "Integers must lie between {} and {}.",
            i64::MIN,
            i64::MAX
        ))
    }

    pub fn parse_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Parser, Some(span), message)
    }

    /// A grammar violation: `expected` was required but `found` sits at the
    /// cursor.
    pub fn unexpected_token(found: &Token, expected: TokenKind) -> Self {
        let token = FoundToken::from(found);
        let found_text = match found.kind {
            TokenKind::Eof => "<EOF>".to_string(),
            _ => token.to_string(),
        };
        let mut error = Self::parse_error(
            found.span.clone(),
            format!("Unexpected token: found {}, expected {}", found_text, expected),
        );
        error.token = Some(token);
        error.expected = Some(expected);
        error
    }

    pub fn runtime_error(span: Option<Span>, message: String) -> Self {
        Self::new(ErrorKind::Interpreter, span, message)
    }

    pub fn internal_error(span: Option<Span>, message: String) -> Self {
        Self::new(ErrorKind::Internal, span, message)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn line(&self) -> Option<usize> {
        self.span.as_ref().map(|span| span.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.span.as_ref().map(|span| span.column)
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename
            .or(self.filename.as_deref())
            .unwrap_or("<repl>");
        let color = self.kind.color();

        // Errors without a location still get a report, anchored at the start.
        let range = match &self.span {
            Some(span) => span.start..span.end,
            None => 0..0,
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, range.start)
            .with_message(format!("{}: {}", self.kind.label().fg(color), self.message))
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            log::error!("failed to render diagnostic: {}", error);
            eprintln!("{}", self);
        }
    }
}

impl fmt::Display for AbyssError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.message)?;

        if let Some(ref token) = self.token {
            write!(f, " — token={}", token.kind)?;
            if let Some(ref value) = token.value {
                write!(f, "('{}')", value)?;
            }
        }

        let mut location = self.filename.clone().unwrap_or_default();
        if let Some(ref span) = self.span {
            location.push_str(&format!(":{}:{}", span.line, span.column));
        }
        if !location.is_empty() {
            write!(f, " — {}", location)?;
        }

        if let Some(ref help) = self.help {
            write!(f, " — Hint: {}", help)?;
        }
        Ok(())
    }
}

impl std::error::Error for AbyssError {}

/// Collects diagnostics instead of failing on the first one.
#[derive(Debug, Default)]
pub struct Reporter {
    errors: Vec<AbyssError>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: AbyssError) {
        self.errors.push(error);
    }

    pub fn add_message(
        &mut self,
        message: impl Into<String>,
        span: Option<Span>,
        help: Option<String>,
    ) {
        let mut error = AbyssError::new(ErrorKind::Parser, span, message.into());
        error.help = help;
        self.add(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[AbyssError] {
        &self.errors
    }

    pub fn display_all<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for error in &self.errors {
            writeln!(out, "{}", error)?;
        }
        Ok(())
    }

    /// Folds every collected diagnostic into a single parse error.
    pub fn raise_if_any(&self) -> Result<(), AbyssError> {
        if !self.has_errors() {
            return Ok(());
        }

        let lines = self
            .errors
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Err(AbyssError::new(
            ErrorKind::Parser,
            None,
            format!("Multiple errors:\n{}", lines),
        ))
    }
}
