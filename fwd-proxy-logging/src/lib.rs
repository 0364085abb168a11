pub mod audit;

pub use audit::{AuditLogger, LogEntry};
