#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Names of every registered RPC method, kept sorted for `system.help`.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    names: Arc<Mutex<BTreeSet<&'static str>>>,
}

impl MethodRegistry {
    pub fn track(&self, name: &'static str) {
        let mut names = self.names.lock().unwrap_or_else(|e| e.into_inner());
        names.insert(name);
    }

    pub fn list(&self) -> Vec<String> {
        let names = self.names.lock().unwrap_or_else(|e| e.into_inner());
        names.iter().map(|name| name.to_string()).collect()
    }
}
