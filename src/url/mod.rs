//! URL resolution and probing.
//!
//! The resolver walks redirect chains and captures response metadata;
//! the probes contribute independent, side-effect-free signals (TLS
//! reachability, shortener targets, domain-age estimates) that the
//! analyzer fans out concurrently.

pub mod probes;
pub mod resolver;

pub use resolver::{ResolverConfig, UrlResolver, USER_AGENT};
