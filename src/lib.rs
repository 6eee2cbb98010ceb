//! Vidgate - a video landing short-link service
//!
//! This library provides the core functionality for the Vidgate service:
//! slug resolution, visit/session tracking and the redirect decision
//! pipeline (lucky, smart and timed strategies).
//!
//! # Architecture
//! - `redirect`: bot gate and the redirect decision pipeline
//! - `tracking`: buffered view counting and online presence
//! - `storage`: SeaORM storage backend and data access
//! - `cache`: short-TTL page read caches
//! - `services`: visit orchestration and housekeeping
//! - `api`: HTTP services
//! - `config`: configuration management
//! - `runtime`: server startup
//! - `system`: logging and platform utilities

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod redirect;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod tracking;
pub mod utils;
