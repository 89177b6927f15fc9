//! Logging facilities for Horizon Bind.
//!
//! Horizon Bind uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_bind=debug,horizon_bind_core=trace")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_bind_core::signal";
    /// Observable field (property interception) target.
    pub const PROPERTY: &str = "horizon_bind_core::property";
    /// Model target.
    pub const MODEL: &str = "horizon_bind_core::model";
    /// Observable list target.
    pub const LIST: &str = "horizon_bind_core::list";
}
