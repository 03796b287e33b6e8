//! # Van Directory
//!
//! A directory of camper-van conversion builders: searchable by name,
//! state, city, service, and van type, and by distance from a point, a zip
//! code, or a city. Builders that share a location are spread out around it
//! so every one gets its own map marker.
//!
//! The pure logic (distance, coordinate resolution, marker offsets,
//! proximity search, and the record store) lives in `van-directory-core`.
//! This crate adds configuration, the JSON and SQLite backends, HTTP
//! geocoding, the `vandir` CLI, and the REST server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────┐   ┌──────────────┐
//! │ JSON import  │──▶│ Directory (core)    │──▶│ JSON file or │
//! │ CLI / REST   │   │ records + by-state  │   │ SQLite store │
//! └──────────────┘   └─────────┬───────────┘   └──────────────┘
//!                              │
//!               ┌──────────────┼──────────────┐
//!               ▼              ▼              ▼
//!          ┌─────────┐   ┌───────────┐   ┌──────────┐
//!          │ search  │   │ proximity │   │ markers  │
//!          └─────────┘   └───────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! vandir init                          # create the store
//! vandir import builders.json          # load records
//! vandir search --state nj             # attribute search
//! vandir near --zip 08540 --radius 25  # proximity search
//! vandir serve                         # start the REST server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`backend`] | Opens the configured store |
//! | [`json_store`] | JSON document backend |
//! | [`sqlite_store`] | SQLite backend |
//! | [`geocode`] | Nominatim-compatible HTTP geocoder |
//! | [`search`] | Attribute and proximity search commands |
//! | [`server`] | REST server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod backend;
pub mod backup;
pub mod config;
pub mod db;
pub mod export;
pub mod geocode;
pub mod get;
pub mod import;
pub mod json_store;
pub mod locate;
pub mod migrate;
pub mod records;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod stats;
