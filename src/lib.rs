//! # dog-env: typed environment & configuration value casting
//!
//! `dog-env` turns raw string configuration values (environment variables,
//! dotenv-style key/value files) into typed Rust values through a single
//! cast dispatcher and an explicit, injectable constructor registry. It is
//! the typed-settings counterpart of `DogConfig`'s string store: the host
//! loads raw pairs however it likes, `dog-env` owns the conversion.
//!
//! ## Key Features
//!
//! - **One dispatcher**: `cast(value, tag, options)` covers scalars,
//!   temporal types, JSON, URLs, UUIDs, paths and delimited lists
//! - **Explicit registry**: bare constructors (`int`, `float`, `str`,
//!   `decimal`, host-registered) are looked up in a registry you build,
//!   never in ambient global state
//! - **Recursive lists**: `subcast` applies a constructor to every split
//!   element; one bad element fails the whole cast, no partial results
//! - **Typed errors**: unknown tags, reserved tags, malformed values and
//!   subcast failures are distinct error variants, not stringly guesses
//! - **Composition, not patching**: [`DogEnv`] wraps the loader's result
//!   behind explicit per-tag accessors
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use dog_env::{CastOptions, DogEnv};
//!
//! # fn main() -> dog_env::CastResult<()> {
//! let mut vars = HashMap::new();
//! vars.insert("DEBUG".to_string(), "no".to_string());
//! vars.insert("WORKERS".to_string(), "4".to_string());
//! vars.insert("ORIGINS".to_string(), "a.example, b.example".to_string());
//!
//! let env = DogEnv::new(vars);
//! assert!(!env.bool("DEBUG")?);
//! assert_eq!(env.int("WORKERS")?, 4);
//!
//! let origins = env.list("ORIGINS", &CastOptions::default())?;
//! assert_eq!(origins.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │      DogEnv      │  ← explicit per-tag accessors over a snapshot
//! ├──────────────────┤
//! │      Caster      │  ← one dispatch function, pure and Sync
//! ├──────────────────┤
//! │   CastRegistry   │  ← bare constructors by name, host-extensible
//! └──────────────────┘
//! ```
//!
//! Locating configuration files, parsing dotenv syntax and deciding
//! environment override precedence are deliberately *not* part of this
//! crate; pair it with whatever loader your application already uses.

pub mod caster;
pub mod env;
pub mod error;
pub mod options;
pub mod registry;
pub mod tag;
pub mod value;

pub use caster::Caster;
pub use env::DogEnv;
pub use error::{CastError, CastResult};
pub use options::{CastOptions, Subcast, DEFAULT_DELIMITER};
pub use registry::{CastRegistry, ScalarCtor};
pub use tag::TypeTag;
pub use value::CastValue;
