use crate::error::{AbyssError, Span};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Semicolon,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    EqualEqual,
    BangEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    And,
    Or,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    If,
    ElseIf,
    Else,
    While,
    For,
    From,
    To,
    Fun,
    Print,
    Input,
    Import,
    As,
    Class,

    // Only ever carried by lexer diagnostics
    Char,

    Eof,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::LeftBrace => "LBRACKET",
            TokenKind::RightBrace => "RBRACKET",
            TokenKind::LeftBracket => "SLBRACKET",
            TokenKind::RightBracket => "SRBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "MULT",
            TokenKind::Slash => "DIV",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQ",
            TokenKind::BangEqual => "NEQ",
            TokenKind::Greater => "GT",
            TokenKind::GreaterEqual => "GTE",
            TokenKind::Less => "LT",
            TokenKind::LessEqual => "LTE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::If => "IF",
            TokenKind::ElseIf => "ELSEIF",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::For => "FOR",
            TokenKind::From => "FROM",
            TokenKind::To => "TO",
            TokenKind::Fun => "FUN",
            TokenKind::Print => "PRINT",
            TokenKind::Input => "INPUT",
            TokenKind::Import => "IMPORT",
            TokenKind::As => "AS",
            TokenKind::Class => "CLASS",
            TokenKind::Char => "CHAR",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text of the token, quotes included for strings.
    pub lexeme: String,
    pub literal: Option<Value>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, literal: Option<Value>, span: Span) -> Self {
        Self {
            kind,
            lexeme,
            literal,
            span,
        }
    }
}

/// Rewrites source text so that every later rule can stay ASCII-shaped:
/// NFKC composition, soft hyphens dropped, Ethiopic punctuation and the
/// `እና`/`ወይም` words mapped to their ASCII operators, typographic quotes
/// mapped to plain ones.
pub fn normalize_code(code: &str) -> String {
    let mut code: String = code.nfkc().filter(|c| *c != '\u{00ad}').collect();

    const REPLACEMENTS: [(&str, &str); 13] = [
        ("።", ";"),
        ("፣", ","),
        ("፡", "."),
        ("እና", "&&"),
        ("ወይም", "||"),
        ("\u{201c}", "\""),
        ("\u{201d}", "\""),
        ("\u{2018}", "'"),
        ("\u{2019}", "'"),
        ("\u{2039}", "<"),
        ("\u{203a}", ">"),
        ("\u{00ab}", "<<"),
        ("\u{00bb}", ">>"),
    ];
    for (from, to) in REPLACEMENTS {
        if code.contains(from) {
            code = code.replace(from, to);
        }
    }
    code
}

/// Normalizes and scans `source` in one step.
pub fn tokenize(source: &str) -> Result<Vec<Token>, AbyssError> {
    Lexer::new(&normalize_code(source)).scan_tokens()
}

fn is_ethiopic(c: char) -> bool {
    ('\u{1200}'..='\u{1350}').contains(&c)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_ethiopic(c)
}

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    keywords: HashMap<&'static str, TokenKind>,
}

impl Lexer {
    /// Expects already-normalized text; see [`tokenize`].
    pub fn new(source: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("ከሆነ", TokenKind::If);
        keywords.insert("ካልሆነ", TokenKind::ElseIf);
        keywords.insert("ሌላ", TokenKind::Else);
        keywords.insert("እያለ", TokenKind::While);
        keywords.insert("ለ", TokenKind::For);
        keywords.insert("ከ", TokenKind::From);
        keywords.insert("እስከ", TokenKind::To);
        keywords.insert("ተግባር", TokenKind::Fun);
        keywords.insert("አሳይ", TokenKind::Print);
        keywords.insert("ጠይቅ", TokenKind::Input);
        keywords.insert("አስገባ", TokenKind::Import);
        keywords.insert("እንደ", TokenKind::As);
        keywords.insert("ክፍል", TokenKind::Class);

        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            keywords,
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, AbyssError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            None,
            Span::new(self.current, self.current, self.line, self.column),
        ));

        log::trace!("scanned {} tokens", self.tokens.len());
        Ok(self.tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), AbyssError> {
        let c = self.advance();

        match c {
            '\n' | ' ' | '\r' | '\t' => {}
            c if c.is_whitespace() => {}
            '~' if self.peek() == '~' => self.block_comment()?,
            '#' => {
                while self.peek() != '\n' && !self.is_at_end() {
                    self.advance();
                }
            }
            c if c.is_ascii_digit() => self.number()?,
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '!' if self.peek() == '=' => {
                self.advance();
                self.add_token(TokenKind::BangEqual);
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '&' if self.peek() == '&' => {
                self.advance();
                self.add_token(TokenKind::And);
            }
            '|' if self.peek() == '|' => {
                self.advance();
                self.add_token(TokenKind::Or);
            }
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Star),
            '/' => self.add_token(TokenKind::Slash),
            '"' | '\'' => self.string(c)?,
            c if is_word_char(c) => self.identifier(),
            '.' => self.add_token(TokenKind::Dot),
            ';' => self.add_token(TokenKind::Semicolon),
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            ',' => self.add_token(TokenKind::Comma),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            _ => {
                return Err(AbyssError::lex_error(
                    c,
                    Span::single(self.start, self.start_line, self.start_column),
                ));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        let c = self.source.get(self.current).copied().unwrap_or('\0');
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn start_span(&self) -> Span {
        Span::new(self.start, self.current, self.start_line, self.start_column)
    }

    fn block_comment(&mut self) -> Result<(), AbyssError> {
        // Opening "~~"
        self.advance();

        loop {
            if self.is_at_end() {
                return Err(AbyssError::lex_error('~', self.start_span())
                    .with_help("Block comments opened with '~~' must be closed with '~~'."));
            }
            if self.peek() == '~' && self.peek_next() == '~' {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }
    }

    fn string(&mut self, quote: char) -> Result<(), AbyssError> {
        // Strings never cross a line break.
        while self.peek() != quote && self.peek() != '\n' && !self.is_at_end() {
            self.advance();
        }

        if self.peek() != quote {
            return Err(AbyssError::lex_error(
                quote,
                Span::single(self.start, self.start_line, self.start_column),
            )
            .with_help("Unterminated string: close it with the same quote on the same line."));
        }

        self.advance();

        let content: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token_with_literal(TokenKind::String, Some(Value::Str(content)));
        Ok(())
    }

    fn number(&mut self) -> Result<(), AbyssError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.text();
        let literal = if is_float {
            text.parse::<f64>().ok().map(Value::Float)
        } else {
            text.parse::<i64>().ok().map(Value::Int)
        };

        match literal {
            Some(value) => {
                self.add_token_with_literal(TokenKind::Number, Some(value));
                Ok(())
            }
            None => Err(AbyssError::number_error(&text, self.start_span())),
        }
    }

    fn identifier(&mut self) {
        while is_word_char(self.peek()) {
            self.advance();
        }

        // Keywords only match whole words, so `ለምሳሌ` stays an identifier.
        let text = self.text();
        let kind = self
            .keywords
            .get(text.as_str())
            .cloned()
            .unwrap_or(TokenKind::Identifier);

        self.add_token(kind);
    }

    fn text(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_with_literal(kind, None);
    }

    fn add_token_with_literal(&mut self, kind: TokenKind, literal: Option<Value>) {
        let lexeme = self.text();
        let span = self.start_span();
        self.tokens.push(Token::new(kind, lexeme, literal, span));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_maps_ethiopic_punctuation() {
        assert_eq!(normalize_code("x = 1።"), "x = 1;");
        assert_eq!(normalize_code("a፣ b"), "a, b");
        assert_eq!(normalize_code("m፡f"), "m.f");
        assert_eq!(normalize_code("a እና b ወይም c"), "a && b || c");
        assert_eq!(normalize_code("\u{201c}hi\u{201d}"), "\"hi\"");
        assert_eq!(normalize_code("so\u{00ad}ft"), "soft");
    }

    #[test]
    fn normalization_is_idempotent() {
        let source = "ከሆነ (x > 1 እና y) { አሳይ(\u{201c}ok\u{201d})። }";
        let once = normalize_code(source);
        assert_eq!(normalize_code(&once), once);
    }
}
