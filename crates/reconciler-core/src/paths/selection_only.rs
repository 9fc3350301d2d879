//! `DirtyType::None`: nothing in the tree changed, only the selection
//! might have. No buffer mutation, no RangeIndex update; the caller's
//! `reconcile` entry point does the actual selection projection once the
//! path dispatch returns.

use crate::context::PathContext;
use crate::error::ReconcileError;

pub fn apply(_ctx: &mut PathContext) -> Result<(), ReconcileError> {
    Ok(())
}
