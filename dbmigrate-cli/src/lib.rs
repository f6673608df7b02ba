//! dbmigrate CLI - Command-line interface for the dbmigrate runner.
//!
//! This crate provides the `dbmigrate` binary, which applies a directory of
//! SQL or CQL migration files to PostgreSQL or ScyllaDB.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
