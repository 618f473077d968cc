//! # Arbor
//!
//! Nested client-side navigation for Rust applications.
//!
//! Arbor maps a path such as `/mail/inbox/42` onto a tree of routers. Each
//! level of the tree owns a controller for the segment it matched, so moving
//! from `/mail/inbox/42` to `/mail/inbox/43` only reloads the innermost
//! controller.
//!
//! ## Crates
//!
//! - [`urls`] (`arbor-urls`) - path patterns with `:name`, `:name?` and `*`
//!   tokens, parameter extraction and injection, query strings
//! - [`router`] (`arbor-router`) - routes, routers, controllers, the hash
//!   location adaptor and the [`Location`](router::Location) facade
//!
//! ## Feature Flags
//!
//! - `testing` - recording controllers for driving routers in tests
//!
//! ## Quick Example
//!
//! ```
//! use arbor::prelude::*;
//!
//! struct Page;
//!
//! impl Controller for Page {
//!     fn load(&mut self, request: LoadRequest) {
//!         request.done.complete();
//!     }
//!     fn unload(&mut self) {}
//! }
//!
//! let root = Router::new()
//!     .route(Route::new("/", || Page))
//!     .route(Route::new("docs/*", || Page));
//!
//! let history = MemoryHistory::new();
//! let location = Location::new(HashLocation::new(history.clone()), root.clone());
//! location.start();
//! assert_eq!(root.active_route().as_deref(), Some("/"));
//!
//! location.go("/docs/guide/routing", None);
//! assert_eq!(root.active_route().as_deref(), Some("docs/*"));
//! assert_eq!(history.current(), "/docs/guide/routing");
//! ```

pub use arbor_router as router;
pub use arbor_urls as urls;

pub use arbor_router::{
	Controller, HashLocation, LoadCompletion, LoadRequest, Location, MemoryHistory, Route,
	Router, RouterError, RouterSettings,
};
pub use arbor_urls::{ParamValue, Params, PathError};

pub mod prelude {
	pub use arbor_router::{
		Controller, ControllerData, HashLocation, LoadCompletion, LoadRequest, Location,
		LocationAdaptor, MemoryHistory, NavigationEvent, RedirectMode, RenderTarget, Route,
		Router, RouterError, RouterSettings,
	};
	pub use arbor_urls::{ParamValue, Params, params_from};
}
