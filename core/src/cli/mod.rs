//! Command-line argument parsing for the `johanna` binary.

pub mod parse;

pub use parse::parse_args;
