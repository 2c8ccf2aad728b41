//! Answer and report rendering.

pub mod console;
