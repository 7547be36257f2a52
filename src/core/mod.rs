//! Core types for mixed-integer SVM training

pub mod error;
pub mod types;

pub use self::error::*;
pub use self::types::*;
