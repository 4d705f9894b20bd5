/* src/lib.rs */

//!
//! A hot-reloading key-value configuration store.
//!
//! An [`Engine`] holds the current configuration tree loaded from a
//! [`Source`], answers path lookups such as `"server.http.port"` through an
//! LRU cache, and swaps in a new tree whenever the source reports a change.
//! Reloads are atomic: a lookup sees either the old tree or the new one,
//! and a failed reload leaves the last good tree in place.
//!
//! - **engine**: loading, lookups, typed accessors, decoding, reload task.
//! - **cache**: the bounded LRU lookup cache.
//! - **source**: the [`Source`] contract plus [`FileSource`] and [`MemorySource`].
//! - **format**: JSON, TOML and YAML parsing into [`Map`] trees.
//! - **value**: the tree model, coercions, and a serde deserializer.
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `fs`: File source with a `notify` watcher.
//! - `json`, `toml`, `yaml`: Content formats.
//! - `events`: Broadcasts a [`ReloadEvent`] for every reload attempt.
//! - `stream`: Exposes reload events as a `futures` stream.
//! - `validate`: `Engine::decode_validated` via the `validator` crate.
//!
//! ## Basic Usage
//!
//! ```no_run
//! # #[cfg(all(feature = "fs", feature = "toml"))]
//! # async fn run() -> Result<(), confreload::ConfError> {
//! use confreload::{Engine, FileSource, Options};
//!
//! let engine = Engine::load(FileSource::new("config.toml")?, Options::default()).await?;
//! let port = engine.get_int("server.http.port");
//! # let _ = port;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod engine;
mod error;
pub mod format;
pub mod source;
pub mod value;

pub use cache::LruCache;
pub use engine::{Engine, Options};
#[cfg(feature = "events")]
pub use engine::ReloadEvent;
pub use error::ConfError;
pub use format::{AnyFormat, Format};
#[cfg(feature = "fs")]
pub use source::FileSource;
pub use source::{MemorySource, Notifications, Notifier, Source};
pub use value::{Map, Value};
