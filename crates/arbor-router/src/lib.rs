//! # arbor-router
//!
//! Nested client-side navigation for arbor.
//!
//! A tree of [`Router`]s mirrors the path: each router owns an ordered list of
//! [`Route`]s, at most one of them active. Activating a route builds its
//! [`Controller`] and loads it; once the controller completes, the rest of
//! the path goes to the route's child router. Navigating within the same
//! subtree keeps the controllers above the change alive.
//!
//! A [`Location`] ties the root router to a [`LocationAdaptor`] such as
//! [`HashLocation`], and queues all routing work so that controllers and
//! observers may navigate freely.
//!
//! ## Example
//!
//! ```
//! use arbor_router::{Controller, HashLocation, LoadRequest, Location, MemoryHistory, Route, Router};
//!
//! #[derive(Default)]
//! struct Page;
//!
//! impl Controller for Page {
//!     fn load(&mut self, request: LoadRequest) {
//!         request.done.complete();
//!     }
//!     fn unload(&mut self) {}
//! }
//!
//! let mail = Router::new()
//!     .route(Route::new("inbox", Page::default))
//!     .route(Route::new("message/:id", Page::default))
//!     .with_default_route("inbox");
//! let root = Router::new()
//!     .route(Route::new("mail", Page::default).with_child(mail.clone()))
//!     .with_default_route("mail");
//!
//! let history = MemoryHistory::new();
//! let location = Location::new(HashLocation::new(history.clone()), root.clone());
//! location.start();
//!
//! assert_eq!(history.current(), "/mail/inbox");
//! assert_eq!(mail.active_route().as_deref(), Some("inbox"));
//!
//! location.go("/mail/message/7", None);
//! assert_eq!(mail.active_route().as_deref(), Some("message/:id"));
//! ```

pub mod controller;
pub mod error;
pub mod events;
pub mod location;
pub mod route;
pub mod router;
pub mod settings;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use controller::{
	Controller, ControllerData, ControllerFactory, LoadCompletion, LoadRequest, LoadTicket,
	RenderTarget,
};
pub use error::{RouterError, RouterResult, SettingsError};
pub use events::{NavigationEvent, NavigationObserver};
pub use location::{
	ChangeListener, HashLocation, HashPrimitive, Location, LocationAction, LocationAdaptor,
	LocationChange, MemoryHistory,
};
pub use route::{Route, RouteMatch};
pub use router::Router;
pub use settings::{RedirectMode, RouterSettings};

pub use arbor_urls::{ParamValue, Params, params_from};
