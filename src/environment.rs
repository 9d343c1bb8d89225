use crate::ast::{ClassDef, FunctionDef};
use crate::value::Value;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

/// Top-level bindings of an imported file: variables as their values,
/// functions as `Value::Function`.
pub type ModuleContents = HashMap<String, Value>;

/// Mutable runtime state of one interpreter instance.
///
/// There is exactly one active variable mapping. Blocks and loops write
/// straight into it; only a function call swaps it out (see
/// [`Environment::enter_call`]).
#[derive(Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
    functions: HashMap<String, Rc<FunctionDef>>,
    modules: HashMap<String, ModuleContents>,
    classes: HashMap<String, Rc<ClassDef>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Binds or overwrites `name` in the active mapping.
    pub fn assign(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn define_function(&mut self, def: Rc<FunctionDef>) {
        self.functions.insert(def.name.clone(), def);
    }

    pub fn function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(name).cloned()
    }

    pub fn functions(&self) -> &HashMap<String, Rc<FunctionDef>> {
        &self.functions
    }

    pub fn define_class(&mut self, def: Rc<ClassDef>) {
        self.classes.insert(def.name.clone(), def);
    }

    pub fn class(&self, name: &str) -> Option<Rc<ClassDef>> {
        self.classes.get(name).cloned()
    }

    pub fn install_module(&mut self, name: &str, contents: ModuleContents) {
        self.modules.insert(name.to_string(), contents);
    }

    pub fn module(&self, name: &str) -> Option<&ModuleContents> {
        self.modules.get(name)
    }

    /// First function named `name` exported by any imported module.
    pub fn module_function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.modules.values().find_map(|module| match module.get(name) {
            Some(Value::Function(def)) => Some(Rc::clone(def)),
            _ => None,
        })
    }

    /// Starts a call frame: the callee sees the caller's whole mapping with
    /// the parameters bound over it. Returns the caller's mapping, which must
    /// be handed back to [`Environment::leave_call`].
    ///
    /// Values are shared, not deep-copied, so a list reachable from the
    /// caller can be mutated by the callee; plain rebinding is discarded on
    /// return.
    pub fn enter_call(
        &mut self,
        bindings: impl IntoIterator<Item = (String, Value)>,
    ) -> HashMap<String, Value> {
        let mut frame = self.variables.clone();
        frame.extend(bindings);
        mem::replace(&mut self.variables, frame)
    }

    pub fn leave_call(&mut self, saved: HashMap<String, Value>) {
        self.variables = saved;
    }
}
