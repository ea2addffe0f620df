//! Embedded catalog of media, tags, ratings and view history.
//!
//! Upload and moderation live elsewhere; this crate reads the catalog and
//! writes only the feedback records (views and ratings).

pub mod db;
mod media;
pub mod models;
mod ratings;
mod tables;
mod views;

pub use db::{Database, DatabaseError};
pub use models::*;
pub use tables::*;
