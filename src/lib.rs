//! ShopNest: REST backend for a storefront.
//!
//! Catalog browsing, reviews, checkout orders with a fulfillment-boundary
//! stock model, cookie-session authentication, and an admin back-office.

pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
