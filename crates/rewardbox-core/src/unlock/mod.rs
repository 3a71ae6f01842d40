mod hold;
mod intensity;

pub use hold::{CancelReason, HoldInteraction, HoldState, PointerId, TickHandle, TickOutcome};
pub use intensity::HoldIntensity;

pub(crate) use hold::duration_ms;
