//! On-disk state. The only persisted document is the settings file.

pub mod settings;
