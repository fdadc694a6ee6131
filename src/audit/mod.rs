//! Structured audit logging.
//!
//! This module provides functions for emitting structured analysis
//! events using the `tracing` crate. Events can be captured by any
//! tracing subscriber (JSON file, OpenTelemetry, etc.); the
//! presentation layer stays free to persist or format them as needed.

mod events;

pub use events::{
    emit_file_scan, emit_url_analysis, file_audit_event, url_audit_event, AuditEvent,
    FileAuditEvent, UrlAuditEvent,
};
