// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! agg-catalog: handle-based in-memory catalog for aggregated datasets.
//!
//! An aggregated dataset presents many external data sources as one logical,
//! array-oriented dataset. The catalog records how that dataset is assembled:
//! a tree of [`Container`]s, each holding named [`Dimension`]s and
//! [`Variable`]s, with every variable carrying a [`FragmentLocation`] that
//! says where its underlying fragments physically live.
//!
//! All rows live in append-only [`GrowableStore`]s and are addressed by plain
//! integer handles ([`ContainerId`], [`DimensionId`], [`VariableId`]). Rows
//! are never removed individually: [`Catalog::free_container`] tombstones a
//! container together with its whole subtree, and the container store itself
//! is released only once no live container remains anywhere.
//!
//! # Handle Stability
//!
//! A handle names the same slot for the lifetime of its store. Tombstoned
//! slots keep their position, so handles are never reused until the store is
//! released as a whole.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod catalog;
/// Configuration port and catalog tuning knobs.
pub mod config;
mod dimension;
mod error;
mod fragment;
mod ident;
mod status;
mod store;
mod teardown;
mod variable;

/// Caller-owned catalog and the container rows it hands out.
pub use catalog::{Catalog, Container};
/// Configuration loaded through the config port.
pub use config::CatalogConfig;
/// Named axis rows.
pub use dimension::Dimension;
/// Error taxonomy shared by every catalog operation.
pub use error::{CatalogError, RowKind};
/// Where a variable's data fragments live.
pub use fragment::{FragmentField, FragmentLocation};
/// Integer handles into the catalog's stores.
pub use ident::{ContainerId, DimensionId, Handle, VariableId};
/// Integer status codes for the flat operation surface.
pub use status::Status;
/// Append-only row storage.
pub use store::{GrowableStore, RowState, Tombstone};
/// Summary of a cascading teardown.
pub use teardown::TeardownReport;
/// Named field rows.
pub use variable::Variable;
