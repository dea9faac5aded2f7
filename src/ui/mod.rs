//! Presentation layer
//!
//! Rendering of operation outcomes for the terminal. Progress spinners
//! live in `crate::progress`.

pub mod display;
