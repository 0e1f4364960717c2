//! Traits shared across the signal chain.

use serde::{Deserialize, Serialize};

/// Reset kind.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub enum ResetKind {
    /// Restore defaults; keep accumulated signal and filter design intact.
    #[default]
    Soft,
    /// Power cycle: additionally clear signal buffers and generator state.
    Hard,
}

/// Trait for types that reset between scan lines, fields, or power cycles.
pub trait Reset {
    fn reset(&mut self, kind: ResetKind);
}
