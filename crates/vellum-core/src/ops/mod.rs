//! Document operations.
//!
//! Every public operation here is one editing gesture: all the writes it
//! makes land in a single commit, so the undo manager treats them as one
//! step. Lookups are tolerant, acting on a missing record is a silent
//! no-op; only caller bugs and missing precondition entities return
//! errors.

mod containers;
mod objects;
mod styles;
mod templates;
mod views;

use loro::{LoroList, LoroValue, ValueOrContainer};

pub use objects::DUPLICATE_OFFSET;

/// What happens to the instances of a prototype or template when their
/// source goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstancePolicy {
    /// Remove the instances along with the source.
    Delete,
    /// Keep the instances as concrete objects, with the inherited fields
    /// copied in.
    Detach,
}

/// Vertical gap between a new view and the previous one when no rectangle
/// is given.
pub(crate) const VIEW_GUTTER: f64 = 120.0;

/// Position of a plain string entry within a list.
pub(crate) fn string_index(list: &LoroList, value: &str) -> Option<usize> {
    for i in 0..list.len() {
        if let Some(ValueOrContainer::Value(LoroValue::String(s))) = list.get(i) {
            if s.as_ref() == value {
                return Some(i);
            }
        }
    }
    None
}
