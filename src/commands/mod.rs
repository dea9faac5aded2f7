//! Command implementations for the graft CLI

pub mod apply;
pub mod completions;
pub mod helpers;
pub mod resolve;
pub mod status;
pub mod upgrade;
pub mod validate;
pub mod version;
