use crate::ast::{ClassDef, FunctionDef};
use crate::builtins::Callable;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Lists are shared: every binding that holds the same list sees element
/// assignments made through any of them.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

type ListPtr = *const RefCell<Vec<Value>>;

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(ListRef),
    Builtin(Rc<dyn Callable>),
    Function(Rc<FunctionDef>),
    Class(Rc<ClassDef>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Builtin(_) | Value::Function(_) | Value::Class(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Builtin(_) => "builtin",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Structural equality. `seen` holds the list pairs already being
    /// compared further up, which count as equal so cycles terminate.
    fn equals(&self, other: &Value, seen: &mut Vec<(ListPtr, ListPtr)>) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Float(l), Value::Float(r)) => l == r,
            (Value::Int(l), Value::Float(r)) => (*l as f64) == *r,
            (Value::Float(l), Value::Int(r)) => *l == (*r as f64),
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::List(l), Value::List(r)) => {
                if Rc::ptr_eq(l, r) {
                    return true;
                }
                let pair = (Rc::as_ptr(l), Rc::as_ptr(r));
                if seen.contains(&pair) {
                    return true;
                }

                seen.push(pair);
                let (l, r) = (l.borrow(), r.borrow());
                let equal = l.len() == r.len()
                    && l.iter().zip(r.iter()).all(|(a, b)| a.equals(b, seen));
                seen.pop();
                equal
            }
            (Value::Builtin(l), Value::Builtin(r)) => Rc::ptr_eq(l, r),
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::Class(l), Value::Class(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }

    /// Writes the printed form. A list already on `path` renders as `[...]`.
    fn render(&self, f: &mut fmt::Formatter, path: &mut Vec<ListPtr>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                // Always show at least one decimal place for floats
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                let ptr = Rc::as_ptr(items);
                if path.contains(&ptr) {
                    return write!(f, "[...]");
                }

                path.push(ptr);
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.render(f, path)?;
                }
                path.pop();
                write!(f, "]")
            }
            Value::Builtin(callable) => write!(f, "<builtin {}>", callable.name()),
            Value::Function(def) => write!(f, "<function {}>", def.name),
            Value::Class(def) => write!(f, "<class {}>", def.name),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.render(f, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_like_print_expects() {
        assert_eq!(Value::Int(8).to_string(), "8");
        assert_eq!(Value::Float(8.0).to_string(), "8.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::None.to_string(), "None");
        let list = Value::list(vec![Value::Int(1), Value::Str("a".to_string())]);
        assert_eq!(list.to_string(), "[1, a]");
    }

    #[test]
    fn lists_are_shared_between_clones() {
        let list = Value::list(vec![Value::Int(1)]);
        let alias = list.clone();
        if let Value::List(items) = &alias {
            items.borrow_mut().push(Value::Int(2));
        }
        assert_eq!(list.to_string(), "[1, 2]");
    }

    #[test]
    fn self_containing_lists_render_and_compare() {
        let a = Value::list(vec![Value::Int(1)]);
        let b = Value::list(vec![Value::Int(1)]);
        for list in [&a, &b] {
            if let Value::List(items) = list {
                items.borrow_mut()[0] = list.clone();
            }
        }

        assert_eq!(a.to_string(), "[[...]]");
        assert!(a == b);
        assert!(a != Value::list(vec![Value::Int(1)]));
    }
}
