//! Adapters behind the domain ports.

pub mod authority;
pub mod checkout;
pub mod clock;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
