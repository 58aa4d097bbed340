//! Seam to the host's navigation machinery.
//!
//! The link component never navigates; it only observes. [`LocationSource`]
//! is everything it needs from the outside world: the current absolute
//! location, relative-to-absolute resolution, and a way to hear about
//! location changes. [`BrowserLocation`] is the production implementation
//! over the browser history; tests substitute their own source.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Invoked on every navigation with `(new_location, intercepted)`.
/// `intercepted` is true when the navigation was handled client-side rather
/// than by a full browser load.
pub type LocationCallback = Rc<dyn Fn(&str, bool)>;

/// Identifies one subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A target href could not be turned into an absolute URI. This is a caller
/// configuration bug, not a runtime condition: it propagates unrecovered.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not determine the document base URI")]
    MissingBase,
    #[error("`{href}` cannot be resolved against `{base}`")]
    Invalid { href: String, base: String },
}

/// The navigation collaborator: synchronous reads of the current location,
/// href resolution, and location-change notifications.
pub trait LocationSource {
    /// The current absolute location.
    fn current(&self) -> String;

    /// Resolve a possibly-relative href into an absolute URI against the
    /// current base URI.
    fn resolve(&self, href: &str) -> Result<String, ResolveError>;

    /// Register `handler` to run on every location change.
    fn subscribe(&self, handler: LocationCallback) -> SubscriptionId;

    /// Remove a previously registered handler. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// [`LocationSource`] backed by the browser.
///
/// Handlers are kept in a registry; a single `popstate` DOM listener is
/// attached when the registry becomes non-empty and detached again when the
/// last handler unsubscribes, so an idle source holds no browser resources.
#[derive(Default)]
pub struct BrowserLocation {
    handlers: Rc<RefCell<HashMap<SubscriptionId, LocationCallback>>>,
    next_id: Cell<u64>,
    listener: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>>,
}

impl BrowserLocation {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach_listener(&self) {
        let handlers = Rc::clone(&self.handlers);
        let closure = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let Some(location) = current_href() else {
                log::warn!("popstate fired but the window location is unreadable");
                return;
            };
            // popstate means the browser itself moved through history.
            dispatch(&handlers, &location, false);
        }) as Box<dyn FnMut(web_sys::Event)>);

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }
        *self.listener.borrow_mut() = Some(closure);
    }

    fn detach_listener(&self) {
        if let Some(closure) = self.listener.borrow_mut().take() {
            if let Some(window) = web_sys::window() {
                let _ = window.remove_event_listener_with_callback(
                    "popstate",
                    closure.as_ref().unchecked_ref(),
                );
            }
        }
    }
}

impl LocationSource for BrowserLocation {
    fn current(&self) -> String {
        current_href().unwrap_or_default()
    }

    fn resolve(&self, href: &str) -> Result<String, ResolveError> {
        let base = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.base_uri().ok().flatten())
            .ok_or(ResolveError::MissingBase)?;

        match web_sys::Url::new_with_base(href, &base) {
            Ok(url) => Ok(url.href()),
            Err(_) => Err(ResolveError::Invalid {
                href: href.to_owned(),
                base,
            }),
        }
    }

    fn subscribe(&self, handler: LocationCallback) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.get());
        self.next_id.set(id.raw() + 1);

        let was_empty = {
            let mut handlers = self.handlers.borrow_mut();
            let was_empty = handlers.is_empty();
            handlers.insert(id, handler);
            was_empty
        };
        if was_empty {
            self.attach_listener();
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let now_empty = {
            let mut handlers = self.handlers.borrow_mut();
            handlers.remove(&id);
            handlers.is_empty()
        };
        if now_empty {
            self.detach_listener();
        }
    }
}

/// Deliver one notification to every registered handler. The registry is
/// snapshotted before any handler runs: a handler may subscribe or
/// unsubscribe on this same source mid-notification (a link tearing itself
/// down from its refresh callback, say), which takes a mutable borrow of the
/// registry.
fn dispatch(
    handlers: &Rc<RefCell<HashMap<SubscriptionId, LocationCallback>>>,
    location: &str,
    intercepted: bool,
) {
    let snapshot: Vec<LocationCallback> = handlers.borrow().values().cloned().collect();
    for handler in snapshot {
        handler(location, intercepted);
    }
}

fn current_href() -> Option<String> {
    web_sys::window().and_then(|w| w.location().href().ok())
}
