//! Local-first project records for field crews.
//!
//! Every read and write goes through [`sync::SyncFacade`], which keeps a
//! local cache authoritative for the device and mirrors changes to a remote
//! store when one is reachable.

pub mod app;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod logging;
pub mod model;
pub mod query;
pub mod remote;
pub mod suggest;
pub mod sync;

#[cfg(test)]
mod http_stub;
