//! Instruction handlers

pub mod admin;
pub mod arena;
pub mod chassis;

pub use admin::*;
pub use arena::*;
pub use chassis::*;
