//! # arbor-urls
//!
//! Path pattern engine for the arbor navigation router.
//!
//! ## Features
//!
//! - **Pattern compilation**: `:name`, `:name?` and `*` tokens compiled to
//!   anchored matchers, memoized per literal pattern
//! - **Parameter extraction and injection**: [`extract_params`] and its
//!   inverse [`inject_params`]
//! - **Query strings**: [`extract_query`], [`with_query`] and friends, with
//!   repeated keys folded into sequences
//!
//! ## Example
//!
//! ```
//! use arbor_urls::{extract_params, extract_query, inject_params, merge_params, params_from};
//!
//! let path = inject_params("account/:id/edit", &params_from([("id", "42")])).unwrap();
//! assert_eq!(path, "account/42/edit");
//!
//! let params = extract_params("item/:id", "item/5").unwrap().unwrap();
//! let merged = merge_params(params, extract_query("item/5?id=9&tab=notes"));
//! assert_eq!(merged["id"], "5");
//! assert_eq!(merged["tab"], "notes");
//! ```

pub mod error;
pub mod params;
pub mod path;
pub mod pattern;
pub mod query;

pub use error::{PathError, PathResult};
pub use params::{ParamValue, Params, merge_params, params_from};
pub use path::{ensure_leading_slash, join_segments, split_segments};
pub use pattern::{CompiledPattern, SPLAT, compile, extract_params, inject_params, is_compiled};
pub use query::{extract_query, parse_query, stringify_query, with_query, without_query};
