//! Command line for the mail archive navigation tools.

pub mod cli;
