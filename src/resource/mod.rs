//! Resource module
//!
//! The caller-facing surface every REST collection shares.
//!
//! A [`Collection`] is a list endpoint: it creates records and reads them
//! through a [`PagedCollectionReader`](crate::pagination::PagedCollectionReader).
//! An [`ItemContext`] addresses one record by id and reaches its nested
//! collections. Both talk to the server through a [`ResourceTransport`].

mod collection;
mod params;
mod transport;

pub use collection::{Collection, ItemContext};
pub use params::Params;
pub use transport::ResourceTransport;

#[cfg(test)]
mod tests;
