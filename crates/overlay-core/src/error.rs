//! Error types.
//!
//! The overlay itself never fails: every bad input degrades to a hidden panel or an inert
//! link target. Errors only exist at the two edges where something outside the overlay can
//! refuse a request: the document engine rejecting a command, and a host handing over an
//! unusable configuration.

use thiserror::Error;

use crate::engine::NodeKey;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors reported by a [`DocumentEngine`](crate::engine::DocumentEngine) command.
pub enum EngineError {
    #[error("no selection to apply the command to")]
    /// The command needs a range selection and there is none.
    NoSelection,

    #[error("unknown node {0:?}")]
    /// A node key no longer resolves (the document changed underneath the caller).
    UnknownNode(NodeKey),

    #[error("node {0:?} is not a link")]
    /// A link-only command was aimed at another node type.
    NotALink(NodeKey),

    #[error("editor is read-only")]
    /// The editor is not editable.
    ReadOnly,

    #[error("{0}")]
    /// Engine-specific failure.
    Other(String),
}

#[derive(Debug, Error)]
/// Errors produced while loading a [`GeometryConfig`](crate::config::GeometryConfig).
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    /// The configuration document is not valid JSON for the config schema.
    Json(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {value}")]
    /// A numeric field is negative or not finite.
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}
