//! GitHub repository metadata sync for folio sites.
//!
//! Resolves the repositories a site lists (explicit slugs plus everything owned by the
//! listed users), fetches their metadata and stores it in `_data/repositories.yml`,
//! where [`folio_core::data::DataProvider`] picks it up on the next build.

pub mod client;
pub mod error;
pub mod sync;

pub use client::GitHubClient;
pub use error::{Result, SyncError};
pub use sync::{sync_repositories, SyncOutcome};
