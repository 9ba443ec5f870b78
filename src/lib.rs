//! # filterkit
//!
//! A small photo-filter engine: pick an image, apply named filters one after
//! another, undo, and export the result. The same filters can be applied to
//! a whole directory in one batch.
//!
//! # Data Model
//!
//! ```text
//! FilterCatalog ──owns──▶ FilterDescriptor ◀──borrows── ImageRecord
//!                          (name, key, text)             (handle, path, time)
//! ```
//!
//! - A [`catalog::FilterDescriptor`] is what the user picks: a display name,
//!   a backend key such as `find_edges`, and a description.
//! - The [`catalog::FilterCatalog`] owns the descriptors in a fixed order and
//!   resolves backend keys. It is built once and passed to whoever needs it.
//! - An [`record::ImageRecord`] is one image in an edit history. It refers to
//!   the descriptor that produced it (or to none, for the original) without
//!   owning it, so a record can never outlive its catalog.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Filter descriptors, the closed set of filter kinds, key lookup |
//! | [`record`] | Image records, their display labels, the record clock |
//! | [`session`] | Select / apply / undo / export over a history of records |
//! | [`batch`] | One filter over every image in a directory tree, in parallel |
//! | [`imaging`] | Pure-Rust pixel operations behind the [`imaging::ImageBackend`] trait |
//! | [`naming`] | Names of every file the crate writes |
//! | [`config`] | `config.toml` loading, validation, and merging with stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Keys Are a Closed Set
//!
//! Backend keys are strings at the edges (CLI arguments, config, JSON) but
//! [`catalog::FilterKind`] inside. The string ↔ kind mapping lives in exactly
//! one place, so an unknown key is rejected when a descriptor is built or a
//! lookup is made, never halfway through decoding an image.
//!
//! ## The Catalog Is Passed, Not Global
//!
//! There is no process-wide filter list. [`catalog::FilterCatalog::standard`]
//! builds the stock catalog and callers hold on to it. Tests build their own.
//!
//! ## Pure-Rust Imaging
//!
//! All filters run on the `image` crate's buffers: per-pixel passes for tone
//! filters, 3×3 convolution for detail filters. No system libraries, so the
//! binary works anywhere it can be copied to.
//!
//! ## Records Are Immutable
//!
//! Applying a filter never modifies a record; it pushes a new one whose file
//! is the filter's output. Undo drops the newest record. Timestamps come from
//! a strictly increasing clock, so output names within a process never
//! collide.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod record;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
