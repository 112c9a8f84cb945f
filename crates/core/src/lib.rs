//! Domain types and contracts shared by the taskadmin crates.
//!
//! Everything in here is free of I/O. Storage backends, cache backends and
//! the identity service client live in the `taskadmin` binary crate and plug
//! in through the traits defined in [`storage`], [`cache`] and [`identity`].

pub mod cache;
pub mod identity;
pub mod storage;
pub mod task;
pub mod user;
