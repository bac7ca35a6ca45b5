mod core;
pub mod filter;

pub use core::*;
pub use filter::{SkipReason, skip_reason};
