//! Visible signature stamping
//!
//! Validates a signing request, normalizes its placement against the
//! document's pages and hands the cryptographic work to an external
//! signing backend (pyHanko by default).

pub mod backend;
pub mod error;
pub mod tool;
pub mod workflow;

pub use backend::{PyHankoBackend, SignerCredentials, SigningBackend, StampRequest};
pub use error::{SignError, ToolError};
pub use tool::{ExternalTool, ProcessTool, ToolCommand, ToolOutput, DEFAULT_TOOL_TIMEOUT};
pub use workflow::{sign_document, SignConfig, SignJob, SignOutcome};
