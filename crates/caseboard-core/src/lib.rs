//! Core of the Caseboard client task tracker: the task record model
//! over a fixed 17-column sheet layout, write-time derived fields,
//! the hosted-spreadsheet backend, and the freshness-window cache.

pub mod cache;
pub mod config;
pub mod datetime;
pub mod error;
pub mod record;
pub mod rest;
pub mod sheet;
