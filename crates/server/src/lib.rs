//! HTTP service for problem difficulty estimation

pub mod api;
pub mod config;
