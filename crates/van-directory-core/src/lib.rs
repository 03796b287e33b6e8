//! # Van Directory Core
//!
//! Shared logic for the Van Directory: builder models, great-circle
//! distance, coordinate resolution, marker placement, proximity search,
//! the persistence trait, and the record store that keeps the flat builder
//! collection and its per-state index in sync.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or HTTP client
//! dependencies. Storage backends and geocoding providers live in the
//! application crate and plug in through the [`store::Store`] and
//! [`resolver::Geocoder`] traits.

pub mod directory;
pub mod error;
pub mod geo;
pub mod index;
pub mod markers;
pub mod models;
pub mod offset;
pub mod proximity;
pub mod resolver;
pub mod store;
mod tables;
