//! `ksp-confignode` reads, edits and writes the ConfigNode (`.cfg`) files of
//! Kerbal Space Program and searches them with a small boolean query
//! language.
//!
//! The crate has three layers:
//!
//! * [`ConfigNode`], an untyped tree of ordered, duplicate-friendly
//!   `name = value` entries and named child nodes, with a lenient parser
//!   and a canonical serializer.
//! * [`NamedObject`], a typed mirror of a node whose [`ObjectKind`] is
//!   resolved through a [`Registry`]. Typed views such as [`Part`] read
//!   their fields straight from the values, and unknown node types
//!   round-trip untouched.
//! * [`SearchTerm`] and [`SearchQuery`], path-and-pattern predicates over
//!   either layer.
//!
//! ## Example
//!
//! ```rust
//! use ksp_confignode::{ConfigNode, Registry, SearchQuery, ValueStore};
//!
//! let text = "
//! PART
//! {
//!     name = fuelTank
//!     mass = 0.5
//!     RESOURCE
//!     {
//!         name = LiquidFuel
//!         amount = 90
//!     }
//! }
//! PART
//! {
//!     name = strut
//!     mass = 0.05
//! }
//! ";
//!
//! let root = ConfigNode::from_text(text);
//! assert_eq!(root.get_nodes("PART").len(), 2);
//!
//! let registry = Registry::standard();
//! let parts = registry.objects_in_node(&root, "PART");
//! assert_eq!(parts[0].as_part().and_then(|p| p.mass()), Some(0.5));
//!
//! let query = SearchQuery::parse("RESOURCE/name:LiquidFuel || name:strut", Some("PART"))?;
//! let found = query
//!     .filter(&parts)
//!     .filter_map(|part| part.name())
//!     .collect::<Vec<_>>();
//! assert_eq!(found, ["fuelTank", "strut"]);
//!
//! // Objects save back to the same text they were loaded from.
//! let mut tank = parts[0].to_node();
//! tank.set_value("mass", 0.75, 0);
//! assert!(tank.to_string().contains("mass = 0.75"));
//! # Ok::<(), ksp_confignode::CfgError>(())
//! ```
//!
//! ## Loading game data
//!
//! [`Registry::load_from_path`] walks a directory tree lazily, parsing one
//! file at a time. Files that cannot be read are reported through
//! [`tracing`](https://docs.rs/tracing) at `warn` level and skipped; the
//! crate installs no subscriber of its own.
//!
//! ```no_run
//! use ksp_confignode::{LoadOptions, Registry};
//!
//! let registry = Registry::standard();
//! for part in registry.load_from_path("GameData", "PART", &LoadOptions::default()) {
//!     println!("{}", part.name().unwrap_or_default());
//! }
//! ```
//!
//! ## Error Reporting
//!
//! [`CfgError`] implements [`miette::Diagnostic`], so malformed queries can
//! be shown with the offending brace highlighted. Enable the `"fancy"`
//! feature of `miette` in your application to get the graphical report.
//!
//! ## Minimum Supported Rust Version
//!
//! You must be at least `1.70.0` tall to get on this ride.
//!
//! ## License
//!
//! The code in this repository is covered by the MIT License.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub, rust_2018_idioms)]

pub use collection::*;
pub use entry::*;
pub use error::*;
pub use loader::*;
pub use multimap::*;
pub use node::*;
pub use object::*;
pub use objects::*;
pub use query::*;
pub use registry::*;
pub use term::*;
pub use value::*;

mod collection;
mod entry;
mod error;
mod loader;
mod multimap;
mod node;
mod object;
mod objects;
mod parser;
mod query;
mod query_parser;
mod registry;
mod term;
mod value;
