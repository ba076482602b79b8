#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod factory;
pub mod setup;
pub mod sqlite_server_store;

pub use factory::StoreFactory;
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
pub use sqlite_server_store::SqliteServerStore;
