//! Controller scenarios against a fake location source: subscription
//! lifecycle, refresh coalescing, and the end-to-end activation flow.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::matcher::NavLinkMatch;
use crate::nav_link::{AttrValue, AttributeBag, NavLink, NavLinkParams};
use crate::navigation::{LocationCallback, LocationSource, ResolveError, SubscriptionId};

/// In-memory stand-in for the browser: a base URI, a mutable current
/// location, and synchronous delivery of navigation notifications.
struct FakeLocation {
    base: String,
    current: RefCell<String>,
    handlers: RefCell<HashMap<SubscriptionId, LocationCallback>>,
    next_id: Cell<u64>,
    subscribes: Cell<usize>,
    unsubscribes: Cell<usize>,
    fail_resolve: Cell<bool>,
}

impl FakeLocation {
    fn new(base: &str, current: &str) -> Rc<Self> {
        Rc::new(Self {
            base: base.to_owned(),
            current: RefCell::new(current.to_owned()),
            handlers: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            subscribes: Cell::new(0),
            unsubscribes: Cell::new(0),
            fail_resolve: Cell::new(false),
        })
    }

    fn navigate(&self, to: &str) {
        *self.current.borrow_mut() = to.to_owned();
        let handlers: Vec<LocationCallback> = self.handlers.borrow().values().cloned().collect();
        for handler in handlers {
            handler(to, false);
        }
    }

    fn active_subscriptions(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl LocationSource for FakeLocation {
    fn current(&self) -> String {
        self.current.borrow().clone()
    }

    fn resolve(&self, href: &str) -> Result<String, ResolveError> {
        if self.fail_resolve.get() {
            return Err(ResolveError::Invalid {
                href: href.to_owned(),
                base: self.base.clone(),
            });
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            return Ok(href.to_owned());
        }
        Ok(format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            href.trim_start_matches('/')
        ))
    }

    fn subscribe(&self, handler: LocationCallback) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.get());
        self.next_id.set(id.raw() + 1);
        self.handlers.borrow_mut().insert(id, handler);
        self.subscribes.set(self.subscribes.get() + 1);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().remove(&id);
        self.unsubscribes.set(self.unsubscribes.get() + 1);
    }
}

fn counted_link(source: &Rc<FakeLocation>) -> (Rc<NavLink>, Rc<Cell<usize>>) {
    let refreshes = Rc::new(Cell::new(0));
    let counter = Rc::clone(&refreshes);
    let link = Rc::new(NavLink::new(
        Rc::clone(source) as Rc<dyn LocationSource>,
        move || counter.set(counter.get() + 1),
    ));
    (link, refreshes)
}

fn params(href: &str, mode: NavLinkMatch) -> NavLinkParams {
    NavLinkParams {
        match_mode: mode,
        attributes: AttributeBag::new().with("href", AttrValue::Text(href.to_owned())),
    }
}

#[test]
fn prefix_link_tracks_navigation_end_to_end() {
    let source = FakeLocation::new("http://site/", "http://site/home");
    let (link, refreshes) = counted_link(&source);

    link.mount();
    link.set_params(&params("/docs", NavLinkMatch::Prefix)).unwrap();
    assert!(!link.is_active());
    assert_eq!(refreshes.get(), 0);

    source.navigate("http://site/docs");
    assert!(link.is_active());
    assert_eq!(refreshes.get(), 1);

    // Nested location: still active, no redundant refresh.
    source.navigate("http://site/docs/intro");
    assert!(link.is_active());
    assert_eq!(refreshes.get(), 1);

    // Boundary miss: deactivates with exactly one refresh.
    source.navigate("http://site/docsx");
    assert!(!link.is_active());
    assert_eq!(refreshes.get(), 2);

    link.dispose();
}

#[test]
fn target_is_resolved_against_the_base() {
    let source = FakeLocation::new("http://site/", "http://site/docs");
    let (link, _refreshes) = counted_link(&source);

    link.mount();
    link.set_params(&params("/docs", NavLinkMatch::Exact)).unwrap();
    assert_eq!(link.target().as_deref(), Some("http://site/docs"));
    assert!(link.is_active());
}

#[test]
fn mount_and_dispose_pair_exactly_once() {
    let source = FakeLocation::new("http://site/", "http://site/a");
    let (link, _refreshes) = counted_link(&source);

    link.mount();
    link.mount(); // second mount is a no-op
    for step in 0..5 {
        source.navigate(&format!("http://site/step/{step}"));
    }
    link.dispose();
    link.dispose(); // double dispose is a no-op

    assert_eq!(source.subscribes.get(), 1);
    assert_eq!(source.unsubscribes.get(), 1);
    assert_eq!(source.active_subscriptions(), 0);
}

#[test]
fn dispose_without_mount_is_a_no_op() {
    let source = FakeLocation::new("http://site/", "http://site/a");
    let (link, _refreshes) = counted_link(&source);

    link.dispose();
    assert_eq!(source.unsubscribes.get(), 0);

    // Disposed links stay out of the source for good.
    link.mount();
    assert_eq!(source.subscribes.get(), 0);
}

#[test]
fn notifications_stop_after_dispose() {
    let source = FakeLocation::new("http://site/", "http://site/home");
    let (link, refreshes) = counted_link(&source);

    link.mount();
    link.set_params(&params("/docs", NavLinkMatch::Exact)).unwrap();
    link.dispose();

    source.navigate("http://site/docs");
    assert!(!link.is_active());
    assert_eq!(refreshes.get(), 0);
}

#[test]
fn repeated_param_updates_request_at_most_one_refresh() {
    let source = FakeLocation::new("http://site/", "http://site/docs");
    let (link, refreshes) = counted_link(&source);

    link.mount();
    let p = params("/docs", NavLinkMatch::Exact);
    link.set_params(&p).unwrap();
    assert!(link.is_active());
    assert_eq!(refreshes.get(), 1);

    // Same parameters, same location: recomputed, unchanged, no refresh.
    link.set_params(&p).unwrap();
    assert_eq!(refreshes.get(), 1);
}

#[test]
fn param_update_re_resolves_against_current_location() {
    let source = FakeLocation::new("http://site/", "http://site/blog/post");
    let (link, _refreshes) = counted_link(&source);

    link.mount();
    link.set_params(&params("/docs", NavLinkMatch::Prefix)).unwrap();
    assert!(!link.is_active());

    // Retargeting the link picks up the location it was already at.
    link.set_params(&params("/blog", NavLinkMatch::Prefix)).unwrap();
    assert!(link.is_active());
}

#[test]
fn missing_href_is_never_active() {
    let source = FakeLocation::new("http://site/", "http://site/docs");
    let (link, refreshes) = counted_link(&source);

    link.mount();
    link.set_params(&NavLinkParams::default()).unwrap();
    assert!(!link.is_active());

    source.navigate("http://site/anything");
    assert!(!link.is_active());
    assert_eq!(refreshes.get(), 0);
}

#[test]
fn resolve_failure_propagates() {
    let source = FakeLocation::new("http://site/", "http://site/docs");
    let (link, _refreshes) = counted_link(&source);
    source.fail_resolve.set(true);

    link.mount();
    let err = link.set_params(&params("::bad::", NavLinkMatch::Exact));
    assert!(matches!(err, Err(ResolveError::Invalid { .. })));
}

#[test]
fn active_token_merges_with_caller_class() {
    let source = FakeLocation::new("http://site/", "http://site/docs");
    let (link, _refreshes) = counted_link(&source);

    link.mount();
    let p = NavLinkParams {
        match_mode: NavLinkMatch::Exact,
        attributes: AttributeBag::new()
            .with("href", AttrValue::Text("/docs".to_owned()))
            .with("class", AttrValue::Text("nav-item".to_owned())),
    };
    link.set_params(&p).unwrap();
    assert_eq!(link.css_class().as_deref(), Some("nav-item active"));

    source.navigate("http://site/home");
    assert_eq!(link.css_class().as_deref(), Some("nav-item"));
}

#[test]
fn bare_link_gets_only_the_active_token() {
    let source = FakeLocation::new("http://site/", "http://site/docs");
    let (link, _refreshes) = counted_link(&source);

    link.mount();
    link.set_params(&params("/docs", NavLinkMatch::Exact)).unwrap();
    assert_eq!(link.css_class().as_deref(), Some("active"));

    source.navigate("http://site/home");
    assert_eq!(link.css_class(), None);
}

#[test]
fn dropped_controller_does_not_break_notification_delivery() {
    let source = FakeLocation::new("http://site/", "http://site/home");
    let (link, refreshes) = counted_link(&source);

    link.mount();
    link.set_params(&params("/docs", NavLinkMatch::Exact)).unwrap();
    drop(link);

    // The weak handler is still registered but upgrades to nothing.
    source.navigate("http://site/docs");
    assert_eq!(refreshes.get(), 0);
}
