//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `taskadmin_core::storage`, selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): tasks and runs held in process memory
//! - `sqlite`: tasks and runs in SQLite via `rusqlite` and `tokio-rusqlite`
//! - `dynamodb`: artifacts in AWS DynamoDB. Without it, artifacts live in
//!   the relational backend.
//!
//! `inmemory` and `sqlite` are mutually exclusive.
//!
//! # Examples
//!
//! ```bash
//! cargo build -p taskadmin --no-default-features --features sqlite,memory
//! cargo build -p taskadmin --no-default-features --features sqlite,dynamodb,redis,auth0
//! ```

#[cfg(all(feature = "inmemory", feature = "sqlite"))]
compile_error!(
    "Features 'inmemory' and 'sqlite' are mutually exclusive. \
    Enable only one relational backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!(
    "No relational backend selected. Enable 'inmemory' or 'sqlite' feature. \
    Example: cargo build -p taskadmin --features sqlite"
);

#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbArtifactRepository;
