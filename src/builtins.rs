//! The built-in library.
//!
//! The interpreter only relies on [`Callable`] and on [`Builtins`] lookups;
//! everything else here is the standard set of functions installed by
//! [`Builtins::standard`].

use crate::value::Value;
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{name}() takes {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("{name}(): {message}")]
    InvalidArgument { name: String, message: String },
    #[error("{name}(): {message}")]
    Domain { name: String, message: String },
    #[error("{name}(): cannot access '{path}': {source}")]
    Io {
        name: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Anything the interpreter can invoke with an argument list.
pub trait Callable {
    fn name(&self) -> &str;
    fn invoke(&self, args: Vec<Value>) -> Result<Value, BuiltinError>;
}

pub type NativeFn = fn(&str, &[Value]) -> Result<Value, BuiltinError>;

pub struct NativeFunction {
    name: String,
    /// `None` accepts any number of arguments.
    arity: Option<usize>,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &str, arity: Option<usize>, func: NativeFn) -> Self {
        Self {
            name: name.to_string(),
            arity,
            func,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Builtin(Rc::new(self))
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: Vec<Value>) -> Result<Value, BuiltinError> {
        if let Some(expected) = self.arity {
            if args.len() != expected {
                return Err(BuiltinError::Arity {
                    name: self.name.clone(),
                    expected,
                    found: args.len(),
                });
            }
        }
        (self.func)(&self.name, &args)
    }
}

/// Global names and namespaces (`ሂሳብ.sqrt`) the interpreter falls back to
/// when a name is not bound by the program.
#[derive(Default)]
pub struct Builtins {
    globals: HashMap<String, Value>,
    namespaces: HashMap<String, HashMap<String, Value>>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut builtins = Self::new();

        let math: [(&str, Option<usize>, NativeFn); 12] = [
            ("abs", Some(1), math_abs),
            ("round", Some(2), math_round),
            ("sqrt", Some(1), math_sqrt),
            ("pow", Some(2), math_pow),
            ("max", None, math_max),
            ("min", None, math_min),
            ("sin", Some(1), |name, args| unary_float(name, args, f64::sin)),
            ("cos", Some(1), |name, args| unary_float(name, args, f64::cos)),
            ("tan", Some(1), |name, args| unary_float(name, args, f64::tan)),
            ("asin", Some(1), |name, args| unary_float(name, args, f64::asin)),
            ("acos", Some(1), |name, args| unary_float(name, args, f64::acos)),
            ("atan", Some(1), |name, args| unary_float(name, args, f64::atan)),
        ];
        for (name, arity, func) in math {
            let function = NativeFunction::new(name, arity, func);
            builtins.register_member("ሂሳብ", name, function.into_value());
        }

        let members: [(&str, &str, Option<usize>, NativeFn); 6] = [
            ("ጽሁፍ", "ርዝመት", Some(1), text_length),
            ("ጽሁፍ", "ተካ", Some(3), text_replace),
            ("ጽሁፍ", "ክፈል", Some(2), text_split),
            ("ዝርዝር", "ጨምር", Some(2), list_append),
            ("ፋይል", "አንብብ", Some(1), file_read),
            ("ፋይል", "ጻፍ", Some(2), file_write),
        ];
        for (namespace, name, arity, func) in members {
            let function = NativeFunction::new(name, arity, func);
            builtins.register_member(namespace, name, function.into_value());
        }

        let globals: [(&str, NativeFn); 3] = [
            ("ወደጽሁፍ", to_text),
            ("ወደቁጥር", to_int),
            ("ወደነጥብቁጥር", to_float),
        ];
        for (name, func) in globals {
            let function = NativeFunction::new(name, Some(1), func);
            builtins.register_global(name, function.into_value());
        }

        builtins
    }

    pub fn register_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    pub fn register_member(&mut self, namespace: &str, name: &str, value: Value) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub fn member(&self, namespace: &str, name: &str) -> Option<Value> {
        self.namespaces.get(namespace)?.get(name).cloned()
    }
}

fn invalid(name: &str, message: impl Into<String>) -> BuiltinError {
    BuiltinError::InvalidArgument {
        name: name.to_string(),
        message: message.into(),
    }
}

fn number_arg(name: &str, value: &Value) -> Result<f64, BuiltinError> {
    value
        .as_f64()
        .ok_or_else(|| invalid(name, format!("expected a number, got {}", value.type_name())))
}

fn text_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, BuiltinError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(invalid(name, format!("expected a string, got {}", other.type_name()))),
    }
}

fn unary_float(name: &str, args: &[Value], op: fn(f64) -> f64) -> Result<Value, BuiltinError> {
    let result = op(number_arg(name, &args[0])?);
    if result.is_nan() {
        return Err(BuiltinError::Domain {
            name: name.to_string(),
            message: "math domain error".to_string(),
        });
    }
    Ok(Value::Float(result))
}

fn math_abs(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    match &args[0] {
        Value::Int(n) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| invalid(name, "integer overflow")),
        other => Ok(Value::Float(number_arg(name, other)?.abs())),
    }
}

fn math_round(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    let x = number_arg(name, &args[0])?;
    let digits = match &args[1] {
        Value::Int(n) => i32::try_from(*n).map_err(|_| invalid(name, "too many digits"))?,
        other => {
            let message = format!("digits must be an int, got {}", other.type_name());
            return Err(invalid(name, message));
        }
    };
    let factor = 10f64.powi(digits);
    Ok(Value::Float((x * factor).round() / factor))
}

fn math_sqrt(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    unary_float(name, args, f64::sqrt)
}

fn math_pow(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    if let (Value::Int(base), Value::Int(exp)) = (&args[0], &args[1]) {
        if let Ok(exp) = u32::try_from(*exp) {
            return base
                .checked_pow(exp)
                .map(Value::Int)
                .ok_or_else(|| invalid(name, "integer overflow"));
        }
    }
    let base = number_arg(name, &args[0])?;
    let exp = number_arg(name, &args[1])?;
    Ok(Value::Float(base.powf(exp)))
}

/// Accepts either several numbers or a single list of numbers.
fn extremum(
    name: &str,
    args: &[Value],
    pick_left: fn(f64, f64) -> bool,
) -> Result<Value, BuiltinError> {
    let items: Vec<Value> = match args {
        [Value::List(items)] => items.borrow().clone(),
        _ => args.to_vec(),
    };

    let mut best: Option<(f64, Value)> = None;
    for item in items {
        let n = number_arg(name, &item)?;
        best = match best {
            Some((current, value)) if !pick_left(n, current) => Some((current, value)),
            _ => Some((n, item)),
        };
    }

    best.map(|(_, value)| value)
        .ok_or_else(|| invalid(name, "expected at least one argument"))
}

fn math_max(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    extremum(name, args, |candidate, current| candidate > current)
}

fn math_min(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    extremum(name, args, |candidate, current| candidate < current)
}

fn text_length(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Int(items.borrow().len() as i64)),
        other => Err(invalid(name, format!("{} has no length", other.type_name()))),
    }
}

fn text_replace(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    let text = text_arg(name, &args[0])?;
    let old = text_arg(name, &args[1])?;
    let new = text_arg(name, &args[2])?;
    Ok(Value::Str(text.replace(old, new)))
}

fn text_split(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    let text = text_arg(name, &args[0])?;
    let separator = text_arg(name, &args[1])?;
    if separator.is_empty() {
        return Err(invalid(name, "empty separator"));
    }
    Ok(Value::list(
        text.split(separator)
            .map(|part| Value::Str(part.to_string()))
            .collect(),
    ))
}

/// `ጨምር(value, list)` appends in place and returns the same list.
fn list_append(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    match &args[1] {
        Value::List(items) => {
            items.borrow_mut().push(args[0].clone());
            Ok(args[1].clone())
        }
        Value::None => Ok(Value::list(vec![args[0].clone()])),
        other => Err(invalid(name, format!("expected a list, got {}", other.type_name()))),
    }
}

fn file_read(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    let path = text_arg(name, &args[0])?;
    fs::read_to_string(path)
        .map(Value::Str)
        .map_err(|source| BuiltinError::Io {
            name: name.to_string(),
            path: path.to_string(),
            source,
        })
}

fn file_write(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    let path = text_arg(name, &args[0])?;
    fs::write(path, args[1].to_string()).map_err(|source| BuiltinError::Io {
        name: name.to_string(),
        path: path.to_string(),
        source,
    })?;
    Ok(Value::None)
}

fn to_text(_name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    Ok(Value::Str(args[0].to_string()))
}

fn to_int(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Float(n) if n.is_finite() => Ok(Value::Int(n.trunc() as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| invalid(name, format!("invalid integer literal: '{}'", s))),
        other => Err(invalid(name, format!("cannot convert {} to int", other.type_name()))),
    }
}

fn to_float(name: &str, args: &[Value]) -> Result<Value, BuiltinError> {
    match &args[0] {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| invalid(name, format!("invalid float literal: '{}'", s))),
        Value::Bool(b) => Ok(Value::Float(*b as i64 as f64)),
        other => Ok(Value::Float(number_arg(name, other)?)),
    }
}
