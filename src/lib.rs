//! agrisite - Catalog, content and lead pipeline for an agricultural exporter
//!
//! This library provides the HTTP API, services and in-memory storage behind
//! the public marketing site and the staff CRM.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
