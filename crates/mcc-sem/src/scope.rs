//! A stack of scopes, searched from the top down.

use rustc_hash::FxHashMap;

use mcc_par::ast::Type;

pub struct ScopeStack {
    scopes: Vec<FxHashMap<String, Type>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// `false` if `name` is already bound in the *current* (innermost)
    /// scope; the caller treats that as a redeclaration error.
    pub fn declare(&mut self, name: &str, ty: Type) -> bool {
        let top = self.scopes.last_mut().expect("no active scope");
        if top.contains_key(name) {
            return false;
        }
        top.insert(name.to_string(), ty);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
