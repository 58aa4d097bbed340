//! Active-state navigation links for Leptos.
//!
//! A [`NavMenuLink`] renders an `<a>` element and keeps an `active` CSS class
//! in sync with the browser location. The crate splits into three layers:
//!
//! - [`matcher`]: the pure URI-matching rules (exact with trailing-slash
//!   equivalence, or prefix with a separator boundary),
//! - [`nav_link`]: the lifecycle controller owning the resolved target, the
//!   active flag, and the location subscription,
//! - [`navigation`]: the seam to the browser ([`LocationSource`]), so the
//!   controller is testable without one.

pub mod components;
pub mod matcher;
pub mod nav_link;
pub mod navigation;

#[cfg(test)]
mod link_lifecycle_tests;

pub use components::NavMenuLink;
pub use matcher::{should_match, NavLinkMatch};
pub use nav_link::{AttrValue, AttributeBag, NavLink, NavLinkParams, ACTIVE_CLASS};
pub use navigation::{
    BrowserLocation, LocationCallback, LocationSource, ResolveError, SubscriptionId,
};
