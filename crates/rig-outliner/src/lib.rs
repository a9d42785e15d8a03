//! Ordered hierarchical outline model for rig modules.
//!
//! An outline is a forest of labelled items shown as a flat, indented list.
//! Items can be reparented by dragging, and selected with plain, ctrl and
//! shift clicks. Each item carries a caller-owned payload (usually a handle to
//! the module it represents) that the outline never inspects.
//!
//! # Core Types
//!
//! - [`OutlineStore`]: the single-threaded model: items, display order, selection
//! - [`Outliner`]: the store behind a lock, with change signals
//! - [`ItemId`]: generational item identifier
//! - [`OutlineRow`]: what a view needs to draw one row
//! - [`DropIntent`]: a completed drag gesture, resolved by `resolve_drop`
//! - [`SyncEntry`]: one module as the payload owner sees it, for `reconcile`
//!
//! # Display order
//!
//! The store keeps one ordered sequence of ids in which every item is
//! immediately followed by all of its descendants. Views draw exactly that
//! sequence, indenting each row by its depth. Every structural operation
//! moves whole subtree blocks, so the sequence stays contiguous.
//!
//! # Example
//!
//! ```
//! use rig_outliner::{ClickModifier, DropIntent, DropZone, OutlineStore};
//!
//! let mut store = OutlineStore::new();
//! let root = store.add_item("root", None, 0);
//! let spine = store.add_item("spine", None, 1);
//! let arm = store.add_item("arm", None, 2);
//!
//! // Drag spine onto root, then arm onto the bottom of spine.
//! store.resolve_drop(&DropIntent::onto(vec![spine], root, DropZone::Top)).unwrap();
//! store.resolve_drop(&DropIntent::onto(vec![arm], spine, DropZone::Bottom)).unwrap();
//!
//! let rows: Vec<(String, usize)> =
//!     store.rows().into_iter().map(|row| (row.label, row.depth)).collect();
//! assert_eq!(rows[1], ("spine".to_string(), 1));
//! assert_eq!(rows[2], ("arm".to_string(), 1));
//!
//! store.click(Some(root), ClickModifier::None).unwrap();
//! assert_eq!(store.selected_ids(true), vec![root, spine, arm]);
//! ```

pub mod config;
pub mod debug;
mod drop;
pub mod error;
mod item;
pub mod naming;
mod outliner;
pub mod selection;
mod store;
mod sync;

pub use config::{IconSize, OutlinerConfig};
pub use drop::{BOTTOM_ZONE_FRACTION, DropIntent, DropOutcome, DropTarget, DropZone, MovedItem};
pub use error::{InvariantViolation, OutlineError, Result};
pub use item::{Item, ItemId, OutlineRow};
pub use outliner::{OutlineSignals, Outliner};
pub use selection::{ClickModifier, Selection};
pub use store::OutlineStore;
pub use sync::{SyncEntry, SyncReport};

pub use rig_outliner_core::{ConnectionGuard, ConnectionId, Signal};
