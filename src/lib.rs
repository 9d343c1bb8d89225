// AbyssLang interpreter library
//
// A small scripting language whose keywords are Amharic words. The pipeline
// is lexer -> parser -> tree-walking evaluator, all driven from `runner`.

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

pub use ast::{Expr, Program, Stmt};
pub use builtins::{BuiltinError, Builtins, Callable, NativeFunction};
pub use environment::Environment;
pub use error::{AbyssError, ErrorKind, Reporter, Span};
pub use evaluator::Evaluator;
pub use lexer::{normalize_code, tokenize, Lexer, Token, TokenKind};
pub use parser::Parser;
pub use value::Value;

pub use repl::start as start_repl;
pub use runner::{execute, run};
