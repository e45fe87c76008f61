//! PhotoBoost real-estate photo enhancement backend
//!
//! This library provides the core functionality for the photoboost service:
//! vision-model analysis of listing photos, local pixel enhancement, and
//! asynchronous upscale predictions driven to completion by a polling loop.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
