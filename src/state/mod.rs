// ============================================================================
// STATE MODULE - Estado privado del tracker + notificaciones
// ============================================================================

pub mod reactivity;
pub mod tracker_state;

pub use reactivity::*;
pub use tracker_state::*;
