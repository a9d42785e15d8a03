//! Logging facilities for the rig outliner.
//!
//! The outliner uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("rig_outliner::store=debug")
//!     .init();
//! ```
//!
//! Every log statement in the workspace names one of the [`targets`]
//! explicitly, so hosts can filter per subsystem.

/// Span names used throughout the outliner for tracing.
pub mod span_names {
    /// Drop resolution span.
    pub const DROP: &str = "rig_outliner::drop";
    /// Reconciliation against the payload owner.
    pub const SYNC: &str = "rig_outliner::sync";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Structural mutations of the outline store.
    pub const STORE: &str = "rig_outliner::store";
    /// Selection changes.
    pub const SELECTION: &str = "rig_outliner::selection";
    /// Drop resolution.
    pub const DROP: &str = "rig_outliner::drop";
    /// Reconciliation against the payload owner.
    pub const SYNC: &str = "rig_outliner::sync";
    /// Signal/slot system.
    pub const SIGNAL: &str = "rig_outliner_core::signal";
}
