//! The library code for `rutherford`, an Atom feed extension for a static
//! blog generator, along with a minimal host that drives it. The extension
//! does two things:
//!
//! 1. It adds a `summary` directive ([`crate::directive`]) which stores a
//!    free-text summary in a post's metadata without rendering anything.
//! 2. When the build finishes, it derives a feed from the most recent posts
//!    ([`crate::feed`]), mints stable `tag:` URIs for the feed and its entries
//!    ([`crate::tag_uri`]), and renders it through an Atom template into
//!    `feed.atom` ([`crate::write`]).
//!
//! The extension only sees the host through the [`crate::extension::Extension`]
//! hooks and the [`crate::env::BuildEnv`] passed to them. The host itself
//! (configuration, post parsing and the build lifecycle) lives in
//! [`crate::config`], [`crate::document`] and [`crate::build`]. If the build
//! fails, the feed is skipped rather than written from partial data.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod directive;
pub mod document;
pub mod env;
pub mod extension;
pub mod feed;
pub mod tag_uri;
pub mod value;
pub mod write;
