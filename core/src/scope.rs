use std::collections::BTreeMap;

/// A stack of string tables, looked up from the innermost layer outwards.
///
/// Semantic actions use it for block-scoped names. The root layer is never popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTable {
    layers: Vec<BTreeMap<String, String>>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self {
            layers: vec![BTreeMap::default()],
        }
    }
}

impl ScopeTable {
    pub fn push_layer(&mut self) {
        self.layers.push(BTreeMap::default());
    }

    /// Drops the innermost layer, returning its bindings.
    ///
    /// Returns None when only the root layer is left.
    pub fn pop_layer(&mut self) -> Option<BTreeMap<String, String>> {
        if self.layers.len() > 1 {
            self.layers.pop()
        } else {
            None
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(key))
            .map(String::as_str)
    }

    pub fn put(&mut self, key: &str, value: &str) {
        if let Some(layer) = self.layers.last_mut() {
            layer.insert(key.to_owned(), value.to_owned());
        }
    }

    /// Bindings of the innermost layer only.
    pub fn current(&self) -> BTreeMap<String, String> {
        self.layers.last().cloned().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
