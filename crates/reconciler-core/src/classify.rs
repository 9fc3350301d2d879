//! The classifier dispatch ladder (spec §4.2): cheap preconditions before
//! expensive ones, first match wins, silent fall-through on mismatch, a
//! correct slow path as the final fallback. No exceptions for control
//! flow (spec §9) — every fast path returns a plain "did-handle" bool.

use crate::composition;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::frontend::Frontend;
use crate::model::DirtyType;
use crate::paths;

/// Which path handled the reconcile, and whether it owns selection for
/// this call (composition suppresses selection projection regardless of
/// `ReconcileOptions::reconcile_selection`).
pub struct Dispatch {
    pub path_label: &'static str,
    pub suppress_selection: bool,
}

pub fn dispatch(ctx: &mut PathContext, frontend: &mut dyn Frontend) -> Result<Dispatch, ReconcileError> {
    if let Some(op) = ctx.options.marked_text_op.clone() {
        if op.create_marked {
            let outcome = composition::apply(ctx, frontend)?;
            log::debug!("reconcile: dispatched composition (node {})", outcome.node);
            return Ok(Dispatch {
                path_label: "composition",
                suppress_selection: outcome.suppress_selection,
            });
        }
    }

    if ctx.next.dirty_type() == DirtyType::FullRebuild {
        paths::slow_path::apply(ctx)?;
        log::debug!("reconcile: dispatched slow_path (full_rebuild signal)");
        return Ok(Dispatch {
            path_label: "slow_path",
            suppress_selection: false,
        });
    }

    if ctx.range_index.is_empty() {
        if paths::fresh_hydration::try_apply(ctx)? {
            log::debug!("reconcile: dispatched fresh_hydration");
            return Ok(Dispatch {
                path_label: "fresh_hydration",
                suppress_selection: false,
            });
        }
    }

    if ctx.next.dirty_type() == DirtyType::None {
        paths::selection_only::apply(ctx)?;
        return Ok(Dispatch {
            path_label: "selection_only",
            suppress_selection: false,
        });
    }

    macro_rules! try_fast_path {
        ($module:ident, $label:literal) => {
            if paths::$module::try_apply(ctx)? {
                log::debug!(concat!("reconcile: dispatched ", $label));
                return Ok(Dispatch {
                    path_label: $label,
                    suppress_selection: false,
                });
            }
        };
    }

    try_fast_path!(multi_insert, "multi_insert");
    try_fast_path!(paragraph_split, "paragraph_split");
    try_fast_path!(single_insert, "single_insert");
    try_fast_path!(text_only, "text_only");
    try_fast_path!(reorder, "reorder");
    try_fast_path!(delete_blocks, "delete_blocks");
    try_fast_path!(attribute_only, "attribute_only");

    paths::slow_path::apply(ctx)?;
    log::debug!("reconcile: dispatched slow_path (no fast path matched)");
    Ok(Dispatch {
        path_label: "slow_path",
        suppress_selection: false,
    })
}
