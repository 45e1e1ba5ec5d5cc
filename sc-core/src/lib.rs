#![warn(
    // Noisy on purpose: findings get fixed or get an inline allow that a reviewer can see.
    clippy::nursery,
    clippy::pedantic,
)]

//! Shared plumbing for scrapeconf: errors, credential references, and the collaborator traits
//! through which the compiler talks to the outside world.

pub mod errors;
pub mod k8s;
pub mod store;

#[cfg(feature = "testutils")]
pub mod testutils;

pub use errors::StoreError;

pub mod prelude {
    pub use sc_api::{
        ScrapeKind,
        ScrapeResource,
    };

    pub use crate::errors::StoreError;
    pub use crate::store::{
        AgentRef,
        ConfigPersister,
        CredentialKind,
        CredentialRef,
        CredentialStore,
        KindSelectors,
        ScrapeLister,
        ScrapeSelectors,
    };
}
