/// Limits applied when loading a schema table from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of message entries accepted from one table.
    pub max_entries: usize,
    /// Maximum bytes read from a schema table file.
    pub max_file_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            max_file_size: 256 * 1024,
        }
    }
}
