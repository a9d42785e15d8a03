//! Core systems for the rig outliner.
//!
//! This crate provides the foundational pieces shared by the outline model:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Logging**: `tracing` targets and span names per subsystem
//!
//! # Signal/Slot Example
//!
//! ```
//! use rig_outliner_core::Signal;
//!
//! let structure_changed = Signal::<()>::new();
//!
//! let conn_id = structure_changed.connect(|_| {
//!     println!("re-read the display order");
//! });
//!
//! structure_changed.emit(());
//! structure_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
