/// How staged synthesized attributes are handed to reductions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AttributeScope {
    /// Attributes staged under a non-terminal name are moved into the next reduction of
    /// that name and cleared.
    #[default]
    Instance,
    /// Attributes live for the whole parse and are copied into every reduction of the
    /// non-terminal, later writes overwriting earlier ones.
    Global,
}

/// Parse-session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub attribute_scope: AttributeScope,
    /// Number of spaces a tab expands to in diagnostics.
    pub tab_width: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            attribute_scope: AttributeScope::default(),
            tab_width: 4,
        }
    }
}

impl ContextConfig {
    pub fn with_attribute_scope(mut self, scope: AttributeScope) -> Self {
        self.attribute_scope = scope;
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }
}
