#![warn(
    // Noisy on purpose: findings get fixed or get an inline allow that a reviewer can see.
    clippy::nursery,
    clippy::pedantic,
)]

//! # sc-compiler: scrape configuration compiler
//!
//! Turns a snapshot of scrape resources (service, pod, probe, node and static scrapes) plus the
//! credentials they reference into the single scrape configuration document a metrics agent
//! loads.
//!
//! ## Pipeline overview
//! 1. Enumeration ([`enumerate`](crate::enumerate::enumerate)): order the candidates by kind, then
//!    namespace, then name.
//! 2. Synthesis ([`synthesize`](crate::synth::synthesize)): expand each resource into one job per
//!    endpoint, with a discovery stanza and the automatic relabel stages of its kind, followed by
//!    the user's own (normalized) rules.
//! 3. Resolution ([`CredentialResolver`]): inline basic-auth, bearer and OAuth2 secrets and map TLS
//!    references to mounted file paths. An endpoint whose credentials cannot be found is dropped;
//!    the rest of the resource is unaffected.
//! 4. Assembly ([`CompiledDocument`]): number the surviving jobs, prepend the global section and
//!    serialize with a fixed key order.
//!
//! [`ScrapeConfigCompiler::run_pass`] drives all of this against the lister, credential store and
//! persister collaborators from `sc-core`, and is instrumented with [`tracing`] spans.

pub mod assemble;
pub mod compile;
pub mod config;
pub mod enumerate;
pub mod errors;
pub mod job;
pub mod relabel;
pub mod resolve;
pub mod selector;
pub mod synth;
pub mod yaml;

pub use assemble::{
    CompiledDocument,
    GlobalSection,
};
pub use compile::{
    compile,
    Compilation,
    ScrapeConfigCompiler,
};
pub use config::CompilerConfig;
pub use enumerate::ScrapeLists;
pub use errors::CompileError;
pub use job::CompiledJob;
pub use resolve::{
    CredentialResolver,
    ResolveError,
    TlsAssets,
};
pub use synth::DroppedEndpoint;
