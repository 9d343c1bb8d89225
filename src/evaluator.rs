use crate::ast::{BinaryOp, Callee, Expr, FunctionDef, LogicalOp, UnaryOp};
use crate::builtins::Builtins;
use crate::environment::Environment;
use crate::error::{AbyssError, Span};
use crate::value::Value;
use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

pub(crate) type SharedInput = Rc<RefCell<dyn BufRead>>;
pub(crate) type SharedOutput = Rc<RefCell<dyn Write>>;

/// One interpreter instance: its environment, the built-in registry and
/// the streams `አሳይ` and `ጠይቅ` talk to.
///
/// Statement execution lives in `executor.rs`.
pub struct Evaluator {
    pub(crate) environment: Environment,
    pub(crate) builtins: Rc<Builtins>,
    pub(crate) input: SharedInput,
    pub(crate) output: SharedOutput,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Standard built-ins, stdin and stdout.
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), io::stdout())
    }

    pub fn with_io<R, W>(input: R, output: W) -> Self
    where
        R: BufRead + 'static,
        W: Write + 'static,
    {
        Self::with_shared(
            Rc::new(Builtins::standard()),
            Rc::new(RefCell::new(input)),
            Rc::new(RefCell::new(output)),
        )
    }

    pub fn with_builtins(mut self, builtins: Builtins) -> Self {
        self.builtins = Rc::new(builtins);
        self
    }

    pub(crate) fn with_shared(
        builtins: Rc<Builtins>,
        input: SharedInput,
        output: SharedOutput,
    ) -> Self {
        Self {
            environment: Environment::new(),
            builtins,
            input,
            output,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Reads one line from this interpreter's input stream.
    pub fn read_line(&self, buf: &mut String) -> io::Result<usize> {
        self.input.borrow_mut().read_line(buf)
    }

    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, AbyssError> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Variable { name, span } => self.resolve_name(name, span),
            Expr::List { items, .. } => {
                let values = items
                    .iter()
                    .map(|item| self.evaluate_expression(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(values))
            }
            Expr::Index { name, index, span } => {
                let target = self.environment.get(name).ok_or_else(|| {
                    let message = format!("Undefined list '{}'", name);
                    AbyssError::runtime_error(Some(span.clone()), message)
                })?;
                let index = self.evaluate_expression(index)?;
                index_value(&target, &index, name, span)
            }
            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                binary_op(*operator, left, right, span)
            }
            Expr::Logical {
                left, operator, right, ..
            } => {
                let left = self.evaluate_expression(left)?;

                // The right operand only runs when the left one doesn't decide.
                match operator {
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate_expression(right),
                }
            }
            Expr::Unary {
                operator: UnaryOp::Negate,
                operand,
                span,
            } => match self.evaluate_expression(operand)? {
                Value::Int(n) => n.checked_neg().map(Value::Int).ok_or_else(|| {
                    AbyssError::runtime_error(Some(span.clone()), "Integer overflow".to_string())
                }),
                Value::Float(n) => Ok(Value::Float(-n)),
                other => Err(AbyssError::runtime_error(
                    Some(span.clone()),
                    format!("Cannot negate {}", other.type_name()),
                )),
            },
            Expr::Input { prompt, span } => {
                let prompt = match prompt {
                    Some(prompt) => Some(self.evaluate_expression(prompt)?),
                    None => None,
                };
                self.read_input(prompt, span)
            }
            Expr::Call { callee, args, span } => {
                let (function, display_name) = match callee {
                    Callee::Named(name) => (self.resolve_name(name, span)?, name.clone()),
                    Callee::Qualified(access) => {
                        (self.evaluate_expression(access)?, qualified_name(access))
                    }
                };

                let args = args
                    .iter()
                    .map(|arg| self.evaluate_expression(arg))
                    .collect::<Result<Vec<_>, _>>()?;

                self.call_value(function, &display_name, args, span)
            }
            Expr::ModuleAccess {
                module,
                member,
                span,
            } => self.resolve_member(module, member, span),
            Expr::ClassCall { name, members, span } => {
                let (first, rest) = members.split_first().ok_or_else(|| {
                    AbyssError::internal_error(Some(span.clone()), "Empty member path".to_string())
                })?;

                let mut current = self.resolve_member(name, first, span)?;
                let mut owner = first.as_str();
                for member in rest {
                    current = match &current {
                        Value::Class(def) => def.member(member).ok_or_else(|| {
                            AbyssError::runtime_error(
                                Some(span.clone()),
                                format!("Class '{}' has no member '{}'", def.name, member),
                            )
                        })?,
                        other => {
                            let message = format!(
                                "'{}' is a {} and has no member '{}'",
                                owner,
                                other.type_name(),
                                member
                            );
                            return Err(AbyssError::runtime_error(Some(span.clone()), message));
                        }
                    };
                    owner = member.as_str();
                }
                Ok(current)
            }
        }
    }

    /// Bare identifier lookup: program variables, then user functions, then
    /// built-in globals.
    fn resolve_name(&self, name: &str, span: &Span) -> Result<Value, AbyssError> {
        if let Some(value) = self.environment.get(name) {
            return Ok(value);
        }
        if let Some(def) = self.environment.function(name) {
            return Ok(Value::Function(def));
        }
        self.builtins.global(name).ok_or_else(|| {
            let message = format!("Undefined identifier '{}'", name);
            AbyssError::runtime_error(Some(span.clone()), message)
        })
    }

    /// `module.member`: built-in namespaces first, then imported modules,
    /// then classes defined in this program.
    fn resolve_member(&self, module: &str, member: &str, span: &Span) -> Result<Value, AbyssError> {
        let missing = |kind: &str| {
            AbyssError::runtime_error(
                Some(span.clone()),
                format!("{} '{}' has no member '{}'", kind, module, member),
            )
        };

        if self.builtins.is_namespace(module) {
            return self.builtins.member(module, member).ok_or_else(|| missing("Module"));
        }
        if let Some(contents) = self.environment.module(module) {
            return contents.get(member).cloned().ok_or_else(|| missing("Module"));
        }
        if let Some(class) = self.environment.class(module) {
            return class.member(member).ok_or_else(|| missing("Class"));
        }

        Err(AbyssError::runtime_error(
            Some(span.clone()),
            format!("Module '{}' is not imported", module),
        )
        .with_help(format!("Import it first: አስገባ \"{}.aby\"", module)))
    }

    fn call_value(
        &mut self,
        function: Value,
        name: &str,
        args: Vec<Value>,
        span: &Span,
    ) -> Result<Value, AbyssError> {
        match function {
            Value::Builtin(builtin) => builtin
                .invoke(args)
                .map_err(|error| AbyssError::runtime_error(Some(span.clone()), error.to_string())),
            Value::Function(def) => self.invoke_function(&def, args, span),
            other => Err(AbyssError::runtime_error(
                Some(span.clone()),
                format!("'{}' is not callable ({})", name, other.type_name()),
            )),
        }
    }

    pub(crate) fn check_arity(
        def: &FunctionDef,
        found: usize,
        span: &Span,
    ) -> Result<(), AbyssError> {
        if def.params.len() == found {
            return Ok(());
        }
        Err(AbyssError::runtime_error(
            Some(span.clone()),
            format!(
                "Function '{}' expects {} arguments but got {}",
                def.name,
                def.params.len(),
                found
            ),
        ))
    }

    /// Runs a user function body in a swapped-in scope. Calls have no return
    /// value, so the result is always `None`.
    pub(crate) fn invoke_function(
        &mut self,
        def: &FunctionDef,
        args: Vec<Value>,
        span: &Span,
    ) -> Result<Value, AbyssError> {
        Self::check_arity(def, args.len(), span)?;
        log::trace!("calling '{}' with {} argument(s)", def.name, args.len());

        let saved = self
            .environment
            .enter_call(def.params.iter().cloned().zip(args));
        let result = self.execute_block(&def.body);
        self.environment.leave_call(saved);

        // Errors raised inside an imported function point into its file.
        result.map(|_| Value::None).map_err(|error| match &def.file {
            Some(file) if error.filename.is_none() => error.with_filename(file.as_str()),
            _ => error,
        })
    }

    fn read_input(&mut self, prompt: Option<Value>, span: &Span) -> Result<Value, AbyssError> {
        let io_error = |error: io::Error| {
            AbyssError::internal_error(Some(span.clone()), format!("I/O error: {}", error))
        };

        if let Some(prompt) = prompt {
            let mut output = self.output.borrow_mut();
            write!(output, "{}", prompt).map_err(io_error)?;
            output.flush().map_err(io_error)?;
        }

        let mut line = String::new();
        let read = self.input.borrow_mut().read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(AbyssError::runtime_error(
                Some(span.clone()),
                "End of input while reading".to_string(),
            ));
        }

        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Value::Str(trimmed.to_string()))
    }
}

fn qualified_name(access: &Expr) -> String {
    match access {
        Expr::ModuleAccess { module, member, .. } => format!("{}.{}", module, member),
        Expr::ClassCall { name, members, .. } => format!("{}.{}", name, members.join(".")),
        _ => "<expression>".to_string(),
    }
}

/// Maps a possibly negative index onto `0..len`.
pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

pub(crate) fn index_of(index: &Value, span: &Span) -> Result<i64, AbyssError> {
    match index {
        Value::Int(i) => Ok(*i),
        other => Err(AbyssError::runtime_error(
            Some(span.clone()),
            format!("Indices must be integers, got {}", other.type_name()),
        )),
    }
}

fn index_value(
    target: &Value,
    index: &Value,
    name: &str,
    span: &Span,
) -> Result<Value, AbyssError> {
    let index = index_of(index, span)?;
    let out_of_range = || {
        AbyssError::runtime_error(
            Some(span.clone()),
            format!("Index {} out of range for '{}'", index, name),
        )
    };

    match target {
        Value::List(items) => {
            let items = items.borrow();
            let pos = resolve_index(index, items.len()).ok_or_else(out_of_range)?;
            Ok(items[pos].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let pos = resolve_index(index, chars.len()).ok_or_else(out_of_range)?;
            Ok(Value::Str(chars[pos].to_string()))
        }
        other => Err(AbyssError::runtime_error(
            Some(span.clone()),
            format!("'{}' is a {} and cannot be indexed", name, other.type_name()),
        )),
    }
}

/// Longest string (in bytes) or list `*` may produce.
const MAX_REPEAT_LEN: usize = 1 << 28;

/// How many copies `unit_len * times` repetition makes, or an error when the
/// result would exceed [`MAX_REPEAT_LEN`]. Negative counts give no copies.
fn repeat_count(unit_len: usize, times: i64, span: &Span) -> Result<usize, AbyssError> {
    let times = usize::try_from(times).unwrap_or(0);
    if unit_len == 0 {
        return Ok(0);
    }
    match unit_len.checked_mul(times) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(times),
        _ => Err(AbyssError::runtime_error(
            Some(span.clone()),
            "Repetition too large".to_string(),
        )),
    }
}

fn repeat(items: &[Value], times: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend(items.iter().cloned());
    }
    out
}

fn binary_op(
    operator: BinaryOp,
    left: Value,
    right: Value,
    span: &Span,
) -> Result<Value, AbyssError> {
    let mismatch = |verb: &str, left: &Value, right: &Value| {
        AbyssError::runtime_error(
            Some(span.clone()),
            format!("Cannot {} {} and {}", verb, left.type_name(), right.type_name()),
        )
    };
    let overflow = || AbyssError::runtime_error(Some(span.clone()), "Integer overflow".to_string());

    match operator {
        BinaryOp::Add => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => {
                l.checked_add(*r).map(Value::Int).ok_or_else(overflow)
            }
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{}{}", l, r))),
            (Value::List(l), Value::List(r)) => {
                let mut items = l.borrow().clone();
                items.extend(r.borrow().iter().cloned());
                Ok(Value::list(items))
            }
            _ => match (left.as_f64(), right.as_f64()) {
                (Some(l), Some(r)) => Ok(Value::Float(l + r)),
                _ => Err(mismatch("add", &left, &right)),
            },
        },
        BinaryOp::Subtract => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => {
                l.checked_sub(*r).map(Value::Int).ok_or_else(overflow)
            }
            _ => match (left.as_f64(), right.as_f64()) {
                (Some(l), Some(r)) => Ok(Value::Float(l - r)),
                _ => Err(mismatch("subtract", &left, &right)),
            },
        },
        BinaryOp::Multiply => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => {
                l.checked_mul(*r).map(Value::Int).ok_or_else(overflow)
            }
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                let times = repeat_count(s.len(), *n, span)?;
                Ok(Value::Str(s.repeat(times)))
            }
            (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
                let items = items.borrow();
                let times = repeat_count(items.len(), *n, span)?;
                Ok(Value::list(repeat(&items, times)))
            }
            _ => match (left.as_f64(), right.as_f64()) {
                (Some(l), Some(r)) => Ok(Value::Float(l * r)),
                _ => Err(mismatch("multiply", &left, &right)),
            },
        },
        BinaryOp::Divide => match (left.as_f64(), right.as_f64()) {
            (Some(_), Some(r)) if r == 0.0 => Err(AbyssError::runtime_error(
                Some(span.clone()),
                "Division by zero".to_string(),
            )),
            (Some(l), Some(r)) => Ok(Value::Float(l / r)),
            _ => Err(mismatch("divide", &left, &right)),
        },
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOp::Greater | BinaryOp::GreaterEqual | BinaryOp::Less | BinaryOp::LessEqual => {
            let ordering = match (&left, &right) {
                (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
                (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
                _ => match (left.as_f64(), right.as_f64()) {
                    (Some(l), Some(r)) => l.partial_cmp(&r),
                    _ => return Err(mismatch("compare", &left, &right)),
                },
            };

            // NaN compares false on every side.
            let result = ordering.is_some_and(|ordering| match operator {
                BinaryOp::Greater => ordering.is_gt(),
                BinaryOp::GreaterEqual => ordering.is_ge(),
                BinaryOp::Less => ordering.is_lt(),
                _ => ordering.is_le(),
            });
            Ok(Value::Bool(result))
        }
    }
}
