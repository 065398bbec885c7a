//! Model options

/// Options controlling a [`Model`](super::Model).
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Append [`ModelEvent`](super::ModelEvent)s to the change journal.
    /// Off by default; a recording consumer drains the journal with
    /// `take_events` or `journal_mut().clear()`.
    pub record_events: bool,
    /// Hard stop for chain and heritage recursion in inference queries
    pub max_inference_depth: usize,
    /// Separator between qualified name segments
    pub qualified_name_separator: &'static str,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            record_events: false,
            max_inference_depth: 256,
            qualified_name_separator: "::",
        }
    }
}

impl ModelConfig {
    /// Join an owner's qualified name and a member name
    pub fn qualify(&self, prefix: Option<&str>, name: &str) -> String {
        match prefix {
            Some(prefix) => format!("{prefix}{}{name}", self.qualified_name_separator),
            None => name.to_string(),
        }
    }
}
