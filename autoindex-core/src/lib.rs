#![doc = "autoindex-core: core logic library for autoindex."]

//! Rebuilds a browsable directory listing for the objects of a storage bucket.
//!
//! Object stores only know flat keys. This crate lists a bucket, infers its directories from
//! the `/`-delimited keys, assigns every file and subdirectory to its parent level, and writes
//! one listing page per level. Storage access and templating sit behind the traits in
//! [`contract`], so the pipeline runs against mocks in tests and against S3 in the CLI.

pub mod autoindex;
pub mod classify;
pub mod config;
pub mod contract;
pub mod listing;
pub mod render;
pub mod structure;
