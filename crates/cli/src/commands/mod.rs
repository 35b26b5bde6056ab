// Path: crates/cli/src/commands/mod.rs

pub mod deploy;
pub mod dry_run;
pub mod generate;
pub mod validate;
