// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! The datastore layer: turns CSV files and SQL into typed, paginated tables
//! on top of an [`Engine`](sheetdb_engine::Engine).
//!
//! [`Session`] runs on the caller's thread, [`DatastoreWorker`] hosts one on a
//! dedicated thread. Both implement [`Datastore`].

pub mod config;
pub mod copy;
pub mod datastore;
pub mod detect;
pub mod lifecycle;
pub mod materialize;
pub mod normalize;
pub mod registry;
pub mod session;
pub mod worker;

pub use config::{DatastoreConfig, EngineConfig};
pub use datastore::{AddCsv, Datastore};
pub use session::Session;
pub use worker::DatastoreWorker;
