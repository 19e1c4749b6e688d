//! coinwatch — crypto price watcher with threshold alerts.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`], stateful wiring in
//! [`services`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
pub mod services;
