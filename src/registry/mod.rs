//! HTTP clients for package registries.
//!
//! [`npm::NpmRegistry`] implements [`MetadataSource`](crate::source::MetadataSource)
//! against the npm registry, as an alternative to running `yarn info` once
//! per package.

pub mod npm;
