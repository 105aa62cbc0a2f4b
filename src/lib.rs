//! hnetdb - HNET node registry
//!
//! A REST backend that records network nodes and user accounts in Neo4j
//! and issues short-lived login tokens.

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod models;
pub mod repositories;
pub mod security;
