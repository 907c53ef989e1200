//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
mod parsers;


pub(crate) use cli::CliArgs;
