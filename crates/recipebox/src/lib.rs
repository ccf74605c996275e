//! Read-through cached, optimistically updated repositories for recipebox.
//!
//! Every repository operation returns a [`ResourceStream`](recipebox_core::resource::ResourceStream):
//! `Loading`, then the cached value if there is one, then the remote value if
//! it differs. Writes update the cache first and roll it back when the remote
//! write fails.

pub mod auth;
pub mod cache;
pub mod config;
pub mod feed;
pub mod holder;
pub mod mock_data;
pub mod remote;
pub mod repository;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;
