//! Command implementations for the measlog CLI

pub mod read;
pub mod record;
