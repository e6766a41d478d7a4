//! Bike-share station server.
//!
//! Answers "where are the bikes near here?" across several bike-share
//! operators: each provider wraps one operator's API behind a cache and
//! serves bounded spatial queries over its stations.

pub mod app;
pub mod backend;
pub mod definitions;
pub mod domain;
pub mod geo;
pub mod provider;
pub mod web;
