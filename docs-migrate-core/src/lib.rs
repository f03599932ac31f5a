#![doc = "docs-migrate-core: record mapping and batched writes for documentation versions."]

//! This crate holds the data model, the submodule classifier, the record mapper,
//! the batch writer and the two orchestrators (`migrate`, `publish`).
//! Store clients live in the CLI crate and plug in through [`contract`].

pub mod config;
pub mod contract;
pub mod error;
pub mod mapper;
pub mod migrate;
pub mod model;
pub mod publish;
pub mod source;
pub mod submodules;
pub mod writer;
