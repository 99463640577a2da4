//! General-purpose minimizers.

pub mod nelder_mead;

pub use nelder_mead::{minimize, Minimum, NelderMeadOptions};
