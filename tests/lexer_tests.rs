use abyss::error::ErrorKind;
use abyss::lexer::{normalize_code, tokenize, Lexer, Token, TokenKind};
use abyss::value::Value;

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|token| token.kind.clone()).collect()
}

fn find<'a>(tokens: &'a [Token], lexeme: &str) -> &'a Token {
    tokens
        .iter()
        .find(|token| token.lexeme == lexeme)
        .unwrap_or_else(|| panic!("no token '{}'", lexeme))
}

#[test]
fn keywords_are_recognized() {
    let tokens = tokenize("ከሆነ ካልሆነ ሌላ እያለ ለ ከ እስከ ተግባር አሳይ ጠይቅ አስገባ እንደ ክፍል").unwrap();
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::If,
            TokenKind::ElseIf,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::For,
            TokenKind::From,
            TokenKind::To,
            TokenKind::Fun,
            TokenKind::Print,
            TokenKind::Input,
            TokenKind::Import,
            TokenKind::As,
            TokenKind::Class,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_only_match_whole_words() {
    // Both start with a keyword but are plain names.
    let tokens = tokenize("ለምሳሌ ከሆነው").unwrap();
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
    );
    assert_eq!(tokens[0].lexeme, "ለምሳሌ");
    assert_eq!(tokens[1].lexeme, "ከሆነው");
}

#[test]
fn operators_and_punctuation() {
    let tokens = tokenize("( ) { } [ ] , . ; + - * / = == != > >= < <= && ||").unwrap();
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::LeftBrace,
            TokenKind::RightBrace,
            TokenKind::LeftBracket,
            TokenKind::RightBracket,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Semicolon,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Equal,
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn kind_names_match_diagnostics() {
    assert_eq!(TokenKind::LeftBrace.name(), "LBRACKET");
    assert_eq!(TokenKind::RightBrace.name(), "RBRACKET");
    assert_eq!(TokenKind::LeftBracket.name(), "SLBRACKET");
    assert_eq!(TokenKind::RightBracket.name(), "SRBRACKET");
    assert_eq!(TokenKind::To.to_string(), "TO");
}

#[test]
fn positions_are_one_based() {
    let tokens = tokenize("x = 1\n  y = 2").unwrap();
    let x = find(&tokens, "x");
    assert_eq!((x.span.line, x.span.column), (1, 1));
    let y = find(&tokens, "y");
    assert_eq!((y.span.line, y.span.column), (2, 3));
    let two = find(&tokens, "2");
    assert_eq!((two.span.line, two.span.column), (2, 7));
}

#[test]
fn comments_produce_no_tokens_but_keep_positions() {
    let tokens = tokenize("# c\n~~ a\nb ~~ x").unwrap();
    assert_eq!(kinds(&tokens), vec![TokenKind::Identifier, TokenKind::Eof]);
    assert_eq!(tokens[0].lexeme, "x");
    assert_eq!((tokens[0].span.line, tokens[0].span.column), (3, 6));
}

#[test]
fn string_literals_keep_quotes_in_lexeme() {
    let tokens = tokenize("'ሰላም' \"world\"").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].lexeme, "'ሰላም'");
    assert_eq!(tokens[0].literal, Some(Value::Str("ሰላም".to_string())));
    assert_eq!(tokens[1].lexeme, "\"world\"");
    assert_eq!(tokens[1].literal, Some(Value::Str("world".to_string())));
}

#[test]
fn numbers_distinguish_int_float_and_member_dot() {
    let tokens = tokenize("42 3.5 7.x").unwrap();
    assert_eq!(tokens[0].literal, Some(Value::Int(42)));
    assert_eq!(tokens[1].literal, Some(Value::Float(3.5)));
    assert_eq!(tokens[2].literal, Some(Value::Int(7)));
    assert_eq!(tokens[3].kind, TokenKind::Dot);
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
}

#[test]
fn unknown_character_is_a_lexer_error() {
    let error = tokenize("x = @").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Lexer);
    assert_eq!(error.message, "Unexpected character: '@'");
    assert_eq!(error.line(), Some(1));
    assert_eq!(error.column(), Some(5));
    assert!(error.to_string().contains("token=CHAR('@')"));
}

#[test]
fn integer_overflow_names_the_literal() {
    let error = tokenize("x = 99999999999999999999").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Lexer);
    assert_eq!(error.message, "Invalid number literal: 99999999999999999999");
    assert_eq!(error.column(), Some(5));
    let token = error.token.as_ref().expect("offending token");
    assert_eq!(token.kind, TokenKind::Number);
    assert_eq!(token.value.as_deref(), Some("99999999999999999999"));
    assert!(error.help.is_some());
}

#[test]
fn unassigned_ethiopic_code_points_stay_in_identifiers() {
    let tokens = tokenize("\u{1310}\u{1311} = 1").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].lexeme, "\u{1310}\u{1311}");
}

#[test]
fn unterminated_string_is_reported_at_the_quote() {
    let error = tokenize("x = \"open\ny = 1").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Lexer);
    assert_eq!((error.line(), error.column()), (Some(1), Some(5)));
    assert!(error.help.is_some());
}

#[test]
fn unterminated_block_comment_is_an_error() {
    let error = tokenize("x = 1 ~~ never closed").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Lexer);
}

#[test]
fn eof_sits_after_the_last_character() {
    let tokens = tokenize("ab\ncd").unwrap();
    let eof = tokens.last().unwrap();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.lexeme, "");
    assert_eq!((eof.span.line, eof.span.column), (2, 3));
}

#[test]
fn lexemes_rebuild_the_source_without_whitespace() {
    let source = "ተግባር f(a,b){አሳይ(a+b*2)}";
    let tokens = tokenize(source).unwrap();
    let rebuilt: String = tokens.iter().map(|token| token.lexeme.as_str()).collect();
    assert_eq!(rebuilt, source.replace(' ', ""));
}

#[test]
fn normalization_maps_words_to_operators() {
    let tokens = tokenize("a እና b ወይም c").unwrap();
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Identifier,
            TokenKind::And,
            TokenKind::Identifier,
            TokenKind::Or,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn ethiopic_punctuation_lexes_like_ascii() {
    let ethiopic = tokenize("ሂሳብ፡sqrt(1፣ 2)።").unwrap();
    let ascii = tokenize("ሂሳብ.sqrt(1, 2);").unwrap();
    assert_eq!(kinds(&ethiopic), kinds(&ascii));
}

#[test]
fn normalization_reaches_a_fixed_point() {
    let samples = [
        "x = \u{201c}ሰላም\u{201d}።",
        "ከሆነ (a እና b) { አሳይ(\u{2018}y\u{2019}) }",
        "so\u{00ad}ft ＡＢＣ",
        "plain ascii",
    ];
    for sample in samples {
        let once = normalize_code(sample);
        assert_eq!(normalize_code(&once), once, "not stable: {:?}", sample);
    }
}

#[test]
fn lexer_scans_pre_normalized_text_as_is() {
    // Without the normalization pass `።` is not a separator.
    let error = Lexer::new("x = 1።").scan_tokens().unwrap_err();
    assert_eq!(error.kind, ErrorKind::Lexer);
    assert!(Lexer::new("x = 1;").scan_tokens().is_ok());
}
