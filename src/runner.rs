use crate::error::AbyssError;
use crate::evaluator::Evaluator;
use crate::lexer::{normalize_code, tokenize};
use crate::parser::Parser;

/// Lex, parse and execute `source` against `evaluator`, stopping at the
/// first error of any stage.
pub fn execute(source: &str, evaluator: &mut Evaluator) -> Result<(), AbyssError> {
    log::debug!("lexing {} bytes", source.len());
    let tokens = tokenize(source)?;

    log::debug!("parsing {} tokens", tokens.len());
    let program = Parser::new(tokens).parse()?;

    evaluator.evaluate_program(&program)
}

/// Runs a whole program on stdin/stdout and reports the first error.
pub fn run(source: &str, filename: Option<&str>) -> Result<(), AbyssError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut evaluator = Evaluator::new();

    execute(source, &mut evaluator).map_err(|error| {
        report(&error, source, filename);
        error
    })
}

/// Diagnostics point into normalized text, so that is what gets rendered.
pub fn report(error: &AbyssError, source: &str, filename: Option<&str>) {
    if error.is_internal() {
        eprintln!("[የኮድ ስህተት ሪፖርት] Internal interpreter error");
    }
    log::debug!("{}", error);

    match error.filename.as_deref() {
        // Errors raised inside an imported module point into that file.
        Some(path) => match std::fs::read_to_string(path) {
            Ok(module_source) => error.report(&normalize_code(&module_source), Some(path)),
            Err(_) => eprintln!("[የኮድ ስህተት ሪፖርት] {}", error),
        },
        None => error.report(&normalize_code(source), filename),
    }
}
