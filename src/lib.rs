pub mod accession;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod lineage;
pub mod output;
pub mod propagate;
pub mod sanitize;
pub mod taxa;
pub mod tree;
pub mod writer;
