//! fhir-mcp-core: Shared types for the FHIR MCP bridge
//!
//! This crate provides the transport-independent pieces of the bridge:
//! JSON-RPC envelopes, the tool catalog with its argument validation,
//! the FHIR request model, and the lenient Bundle, OperationOutcome and
//! CapabilityStatement shapes used when normalizing upstream responses.

pub mod bundle;
pub mod capability;
pub mod error;
pub mod jsonrpc;
pub mod outcome;
pub mod request;
pub mod summary;
pub mod tool;

pub use bundle::{Bundle, BundleEntry, BundleType};
pub use capability::CapabilityStatement;
pub use error::ToolError;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use outcome::OperationOutcome;
pub use request::{FhirMethod, FhirRequest};
pub use tool::{ArgKind, ArgSpec, OutputFormat, Tool, ToolCall, ToolInvocation};
