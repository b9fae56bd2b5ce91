//! fontbuild CLI library.

pub mod clean;
pub mod cli;
