//! Statement execution for [`Evaluator`].

use crate::ast::{Callee, Expr, Program, Stmt};
use crate::environment::ModuleContents;
use crate::error::{AbyssError, Span};
use crate::evaluator::{index_of, resolve_index, Evaluator};
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::value::Value;
use std::fs;
use std::rc::Rc;

impl Evaluator {
    pub fn evaluate_program(&mut self, program: &Program) -> Result<(), AbyssError> {
        log::debug!("executing {} statements", program.statements.len());
        self.execute_block(&program.statements)
    }

    pub(crate) fn execute_block(&mut self, statements: &[Stmt]) -> Result<(), AbyssError> {
        for statement in statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    pub fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), AbyssError> {
        log::trace!("statement at line {}", stmt.span().line);
        match stmt {
            Stmt::Expression { expr, .. } => {
                if let Expr::Call {
                    callee: Callee::Named(name),
                    args,
                    span,
                } = expr
                {
                    return self.call_statement(name, args, expr, span);
                }
                self.evaluate_expression(expr)?;
                Ok(())
            }
            Stmt::Assign { name, value, .. } => {
                let value = self.evaluate_expression(value)?;
                self.environment.assign(name, value);
                Ok(())
            }
            Stmt::ListAssign { name, items, .. } => {
                let values = items
                    .iter()
                    .map(|item| self.evaluate_expression(item))
                    .collect::<Result<Vec<_>, _>>()?;
                self.environment.assign(name, Value::list(values));
                Ok(())
            }
            Stmt::ListElementAssign {
                name,
                index,
                value,
                span,
            } => {
                let index = self.evaluate_expression(index)?;
                let value = self.evaluate_expression(value)?;
                self.assign_element(name, &index, value, span)
            }
            Stmt::Print { expr, span } => {
                let value = self.evaluate_expression(expr)?;
                writeln!(self.output.borrow_mut(), "{}", value).map_err(|error| {
                    AbyssError::internal_error(Some(span.clone()), format!("I/O error: {}", error))
                })
            }
            Stmt::If {
                condition,
                then_branch,
                elseif_branch,
                else_branch,
                ..
            } => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    return self.execute_block(then_branch);
                }
                if let Some((condition, body)) = elseif_branch {
                    if self.evaluate_expression(condition)?.is_truthy() {
                        return self.execute_block(body);
                    }
                }
                match else_branch {
                    Some(body) => self.execute_block(body),
                    None => Ok(()),
                }
            }
            Stmt::While { condition, body, .. } => {
                while self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_block(body)?;
                }
                Ok(())
            }
            Stmt::For {
                var,
                start,
                end,
                body,
                span,
            } => {
                let start = self.loop_bound(start, span)?;
                let end = self.loop_bound(end, span)?;

                // The loop variable lives in the enclosing mapping.
                for i in start..end {
                    self.environment.assign(var, Value::Int(i));
                    self.execute_block(body)?;
                }
                Ok(())
            }
            Stmt::FunctionDef(def) => {
                self.environment.define_function(Rc::clone(def));
                Ok(())
            }
            Stmt::ClassDef(def) => {
                self.environment.define_class(Rc::clone(def));
                Ok(())
            }
            Stmt::Import { path, alias, span } => self.import_module(path, alias.as_deref(), span),
        }
    }

    /// A call in statement position: functions defined here, then functions
    /// exported by imported modules, then ordinary expression evaluation.
    fn call_statement(
        &mut self,
        name: &str,
        args: &[Expr],
        call: &Expr,
        span: &Span,
    ) -> Result<(), AbyssError> {
        let def = self
            .environment
            .function(name)
            .or_else(|| self.environment.module_function(name));

        let Some(def) = def else {
            self.evaluate_expression(call)?;
            return Ok(());
        };

        // Arity is checked before any argument runs.
        Self::check_arity(&def, args.len(), span)?;
        let values = args
            .iter()
            .map(|arg| self.evaluate_expression(arg))
            .collect::<Result<Vec<_>, _>>()?;
        self.invoke_function(&def, values, span)?;
        Ok(())
    }

    fn assign_element(
        &mut self,
        name: &str,
        index: &Value,
        value: Value,
        span: &Span,
    ) -> Result<(), AbyssError> {
        let target = self.environment.get(name).ok_or_else(|| {
            AbyssError::runtime_error(Some(span.clone()), format!("Undefined list '{}'", name))
        })?;

        let items = match target {
            Value::List(items) => items,
            other => {
                return Err(AbyssError::runtime_error(
                    Some(span.clone()),
                    format!("'{}' is a {}, not a list", name, other.type_name()),
                ))
            }
        };

        let index = index_of(index, span)?;
        let mut items = items.borrow_mut();
        let pos = resolve_index(index, items.len()).ok_or_else(|| {
            AbyssError::runtime_error(
                Some(span.clone()),
                format!("List assignment index {} out of range for '{}'", index, name),
            )
        })?;
        items[pos] = value;
        Ok(())
    }

    fn loop_bound(&mut self, bound: &Expr, span: &Span) -> Result<i64, AbyssError> {
        match self.evaluate_expression(bound)? {
            Value::Int(n) => Ok(n),
            other => Err(AbyssError::runtime_error(
                Some(span.clone()),
                format!("Loop bounds must be integers, got {}", other.type_name()),
            )),
        }
    }

    /// Reads, parses and runs `path` in a fresh environment that shares this
    /// interpreter's built-ins and streams, then installs its top-level
    /// bindings as a module. Nothing is cached: importing twice runs the
    /// file twice.
    fn import_module(
        &mut self,
        path: &str,
        alias: Option<&str>,
        span: &Span,
    ) -> Result<(), AbyssError> {
        let module_name = match alias {
            Some(alias) => alias,
            None => path.split('.').next().unwrap_or(path),
        };
        log::info!("importing module '{}' from {}", module_name, path);

        let source = fs::read_to_string(path).map_err(|error| {
            AbyssError::runtime_error(
                Some(span.clone()),
                format!("Cannot import '{}': {}", path, error),
            )
        })?;
        let source = source.strip_prefix('\u{feff}').unwrap_or(&source);

        // Errors from nested imports keep the innermost filename.
        let in_module = |error: AbyssError| {
            if error.filename.is_some() {
                error
            } else {
                error.with_filename(path)
            }
        };

        let tokens = tokenize(source).map_err(in_module)?;
        let program = Parser::new(tokens).parse().map_err(in_module)?;

        let mut module = Evaluator::with_shared(
            Rc::clone(&self.builtins),
            Rc::clone(&self.input),
            Rc::clone(&self.output),
        );
        module.evaluate_program(&program).map_err(in_module)?;

        self.environment
            .install_module(module_name, module.into_module_contents(path));
        Ok(())
    }

    fn into_module_contents(self, path: &str) -> ModuleContents {
        let mut contents: ModuleContents = self
            .environment
            .variables()
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::Function(def) => Value::Function(def.from_file(path)),
                    other => other.clone(),
                };
                (name.clone(), value)
            })
            .collect();
        for (name, def) in self.environment.functions() {
            contents.insert(name.clone(), Value::Function(def.from_file(path)));
        }
        contents
    }
}
