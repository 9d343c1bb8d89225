use crate::error::Span;
use crate::value::Value;
use std::rc::Rc;

/// A parsed program: the top-level statements in source order.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
    /// Source file of an imported definition; `None` for the running program.
    pub file: Option<String>,
}

impl FunctionDef {
    /// Copy of this definition tagged with the file it was imported from.
    /// Definitions that already carry a file keep it.
    pub fn from_file(self: &Rc<Self>, file: &str) -> Rc<Self> {
        if self.file.is_some() {
            return Rc::clone(self);
        }
        Rc::new(FunctionDef {
            file: Some(file.to_string()),
            ..(**self).clone()
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl ClassDef {
    /// Finds a function or nested class declared directly in the class body.
    pub fn member(&self, name: &str) -> Option<Value> {
        self.body.iter().find_map(|stmt| match stmt {
            Stmt::FunctionDef(def) if def.name == name => Some(Value::Function(Rc::clone(def))),
            Stmt::ClassDef(def) if def.name == name => Some(Value::Class(Rc::clone(def))),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression {
        expr: Expr,
        span: Span,
    },
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },
    ListAssign {
        name: String,
        items: Vec<Expr>,
        span: Span,
    },
    ListElementAssign {
        name: String,
        index: Expr,
        value: Expr,
        span: Span,
    },
    Print {
        expr: Expr,
        span: Span,
    },
    /// Only one `else-if` arm is part of the grammar.
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        elseif_branch: Option<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    /// `start` inclusive, `end` exclusive.
    For {
        var: String,
        start: Expr,
        end: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    FunctionDef(Rc<FunctionDef>),
    ClassDef(Rc<ClassDef>),
    Import {
        path: String,
        alias: Option<String>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Expression { span, .. } => span,
            Stmt::Assign { span, .. } => span,
            Stmt::ListAssign { span, .. } => span,
            Stmt::ListElementAssign { span, .. } => span,
            Stmt::Print { span, .. } => span,
            Stmt::If { span, .. } => span,
            Stmt::While { span, .. } => span,
            Stmt::For { span, .. } => span,
            Stmt::FunctionDef(def) => &def.span,
            Stmt::ClassDef(def) => &def.span,
            Stmt::Import { span, .. } => span,
        }
    }
}

/// What a call expression names.
#[derive(Debug, Clone)]
pub enum Callee {
    Named(String),
    /// A `ModuleAccess` or `ClassCall` expression.
    Qualified(Box<Expr>),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: Value,
        span: Span,
    },
    Variable {
        name: String,
        span: Span,
    },
    List {
        items: Vec<Expr>,
        span: Span,
    },
    Index {
        name: String,
        index: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Logical {
        left: Box<Expr>,
        operator: LogicalOp,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Input {
        prompt: Option<Box<Expr>>,
        span: Span,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
        span: Span,
    },
    ModuleAccess {
        module: String,
        member: String,
        span: Span,
    },
    /// `Name.a.b...`, at least two members deep.
    ClassCall {
        name: String,
        members: Vec<String>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::List { span, .. } => span,
            Expr::Index { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Logical { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Input { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::ModuleAccess { span, .. } => span,
            Expr::ClassCall { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}
