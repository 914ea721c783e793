//! Melonbooks Tracker - artist catalog curation and product listing
//!
//! Tracks product listings scraped from an online retailer, grouped by
//! artist. Operators curate which artists are tracked and which title
//! patterns are suppressed; the query engine serves filtered, deterministic
//! listings out of SQLite.

pub mod curation;
pub mod database;
pub mod error;
pub mod models;
pub mod query;
pub mod web;

pub use curation::{Curation, CurationForm, CurationOutcome, CurationRequest};
pub use database::init_schema;
pub use error::{Result, TrackerError};
pub use models::{Availability, Product};
pub use query::{list_products, partition_into_rows, ProductFilter};
