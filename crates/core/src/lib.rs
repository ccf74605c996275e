//! Core types and contracts for recipebox.
//!
//! This crate holds everything that does not perform I/O: the domain model,
//! the [`resource::Resource`] envelope returned by every repository
//! operation, the collaborator traits (cache, document store, blob store,
//! auth provider) and the repository capability traits implemented by the
//! `recipebox` crate.

pub mod cache;
pub mod repository;
pub mod resource;
pub mod social;
pub mod storage;
