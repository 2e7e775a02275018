//! Font registry service for the pictor canvas engine.
//!
//! The registry owns a `fontdb::Database` plus an explicit bidirectional
//! index: slots identify registered fonts by content hash, and every
//! name or alias edge pointing at a slot is owned by that slot's entry.
//! Removal unlinks all of a slot's edges in one step, so no stale alias
//! can survive a later rebuild, and freed slots are reused
//! deterministically so re-registration cannot collide with a displaced
//! entry's identity.

mod registry;

pub use registry::{
    FamilyStyles, FontKey, FontRegistry, FontStyleEntry, RegistryError, VariationAxis,
};

use std::sync::Mutex;

lazy_static::lazy_static! {
    /// Process-wide font registry shared by canvas contexts.
    pub static ref GLOBAL_FONTS: Mutex<FontRegistry> = Mutex::new(FontRegistry::new());
}

/// Run a closure against the process-wide registry.
pub fn with_global_fonts<R>(f: impl FnOnce(&mut FontRegistry) -> R) -> R {
    let mut guard = GLOBAL_FONTS.lock().unwrap_or_else(|poisoned| {
        // A panicked registrar leaves the registry usable; the data is
        // plain maps with no invariants that can tear.
        poisoned.into_inner()
    });
    f(&mut guard)
}
