pub mod error;
pub mod mode;

pub use error::{Error, FaultKind, Result};
pub use mode::{Mode, ModeState};
