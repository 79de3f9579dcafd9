/// Errors that can occur while building a schema registry.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema entry has an unusable field layout.
    #[error("invalid layout for message {name}: {reason}")]
    InvalidLayout { name: String, reason: String },

    /// Two entries claim the same message id.
    #[error("duplicate message id {0}")]
    DuplicateId(u16),

    /// The schema table could not be loaded.
    #[error("failed to load schema table: {0}")]
    LoadFailed(String),

    /// The schema table is not valid JSON.
    #[error("schema table is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
