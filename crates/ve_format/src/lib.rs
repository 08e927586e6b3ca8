//! Hardware-oriented asset structures shared between the asset tooling and the engine.

pub mod error;
pub mod mesh;

pub use error::{FormatError, Result};
