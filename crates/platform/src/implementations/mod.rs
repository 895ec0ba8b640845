//! Platform implementations

pub mod system;
