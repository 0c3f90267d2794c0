use thiserror::Error;

/// Result type for jmmc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort the current stage.
///
/// Recoverable problems in the user's program are never reported through this
/// type; they are collected as [`Diagnostic`](super::diagnostic::Diagnostic)s.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("AST decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed AST at node {node}: {message}")]
    MalformedAst { node: u32, message: String },

    #[error("Malformed IR in method {method}: {message}")]
    MalformedIr { method: String, message: String },

    #[error("Unknown type '{name}' cannot be mapped to a descriptor")]
    UnknownType { name: String },

    #[error("Unsupported construct: {feature}")]
    Unsupported { feature: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a malformed-tree error pointing at a node index
    pub fn malformed(node: u32, message: impl Into<String>) -> Self {
        Self::MalformedAst {
            node,
            message: message.into(),
        }
    }

    pub fn malformed_ir(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedIr {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
