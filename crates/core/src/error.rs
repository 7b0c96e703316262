use thiserror::Error;

use crate::jsonrpc::{JsonRpcError, codes};

/// Tool lookup and argument validation failures.
///
/// These are raised before any upstream request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument '{name}': expected {expected}")]
    InvalidArgument {
        name: &'static str,
        expected: &'static str,
    },

    #[error("Arguments must be a JSON object")]
    ArgumentsNotObject,
}

impl ToolError {
    /// Name of the offending argument, if the error concerns one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ToolError::MissingArgument(name) | ToolError::InvalidArgument { name, .. } => {
                Some(*name)
            }
            _ => None,
        }
    }
}

impl From<&ToolError> for JsonRpcError {
    fn from(err: &ToolError) -> Self {
        let code = match err {
            ToolError::UnknownTool(_) => codes::METHOD_NOT_FOUND,
            _ => codes::INVALID_PARAMS,
        };
        let rpc = JsonRpcError::new(code, err.to_string());
        match err.field() {
            Some(field) => rpc.with_data(serde_json::json!({ "field": field })),
            None => rpc,
        }
    }
}
