//! Trip planner server.
//!
//! A web application for browsing public transport routes between two
//! places, remembering recent searches and keeping a list of saved routes
//! that survives restarts.

pub mod config;
pub mod dataset;
pub mod domain;
pub mod storage;
pub mod store;
pub mod web;
