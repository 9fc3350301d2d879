//! Error kinds for the reconciler (spec §7).

/// Errors the reconciler can surface to callers.
///
/// Classification-time precondition failures are never represented here —
/// a fast path that doesn't apply simply returns `Ok(false)` and the
/// classifier tries the next one. Only genuine failures reach this type.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// A location or offset exceeded the buffer or a node's range.
    #[error("location {location} out of bounds (buffer length {buffer_len})")]
    OutOfBounds { location: usize, buffer_len: usize },

    /// A dirty-set key is not present in either state.
    #[error("unknown key referenced during reconcile")]
    UnknownKey,

    /// An internal consistency check failed. Only raised in debug builds;
    /// release builds prefer falling back to the slow path.
    #[error("range index invariant violated: {0}")]
    InvariantViolation(String),

    /// A reconcile was invoked while another was still in progress.
    #[error("reconcile called re-entrantly")]
    BufferEditReentry,
}
