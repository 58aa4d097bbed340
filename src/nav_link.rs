//! Lifecycle controller for an active-state navigation link.
//!
//! [`NavLink`] owns the derived state (resolved target URI, active flag) and
//! the subscription to the [`LocationSource`]. It moves through three phases,
//! Unmounted → Mounted → Disposed, and asks the host for a visual refresh
//! only when the computed active state actually changes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::matcher::{self, NavLinkMatch};
use crate::navigation::{LocationSource, ResolveError, SubscriptionId};

/// CSS class token merged into the rendered element while the link is active.
pub const ACTIVE_CLASS: &str = "active";

/// A single pass-through attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Flag(bool),
}

/// Open-ended attribute bag forwarded from the caller to the rendered
/// element. Two keys are well-known and extracted by the controller: `href`
/// (the link target) and `class` (merged with [`ACTIVE_CLASS`]); the rest is
/// opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag(BTreeMap<String, AttrValue>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.insert(name, value);
        self
    }

    /// The value of a text attribute, if present.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(AttrValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Caller-supplied parameters for one link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavLinkParams {
    pub match_mode: NavLinkMatch,
    pub attributes: AttributeBag,
}

impl NavLinkParams {
    /// The target href, if the caller supplied one. A link without an href
    /// can never be active.
    pub fn href(&self) -> Option<&str> {
        self.attributes.text("href")
    }
}

#[derive(Debug)]
enum Phase {
    Unmounted,
    Mounted { subscription: SubscriptionId },
    Disposed,
}

struct LinkState {
    phase: Phase,
    /// Absolute target URI, re-resolved on every parameter update; `None`
    /// when no href was supplied.
    target: Option<String>,
    mode: NavLinkMatch,
    /// Caller-supplied `class` attribute, kept verbatim for merging.
    css_class: Option<String>,
    active: bool,
}

/// The link's lifecycle controller. Create with [`NavLink::new`], hold behind
/// an [`Rc`], and drive it with [`mount`](NavLink::mount),
/// [`set_params`](NavLink::set_params), and [`dispose`](NavLink::dispose).
pub struct NavLink {
    source: Rc<dyn LocationSource>,
    on_refresh: Box<dyn Fn()>,
    state: RefCell<LinkState>,
}

impl NavLink {
    /// `on_refresh` is invoked whenever the active state flips and the host
    /// should re-render.
    pub fn new(source: Rc<dyn LocationSource>, on_refresh: impl Fn() + 'static) -> Self {
        Self {
            source,
            on_refresh: Box::new(on_refresh),
            state: RefCell::new(LinkState {
                phase: Phase::Unmounted,
                target: None,
                mode: NavLinkMatch::default(),
                css_class: None,
                active: false,
            }),
        }
    }

    /// Subscribe to location changes. Only the first call on an unmounted
    /// link does anything; the subscription lives until [`dispose`].
    ///
    /// The handler holds a weak reference, so a controller dropped without a
    /// dispose cannot be called back into.
    ///
    /// [`dispose`]: NavLink::dispose
    pub fn mount(self: &Rc<Self>) {
        if !matches!(self.state.borrow().phase, Phase::Unmounted) {
            return;
        }

        let weak = Rc::downgrade(self);
        let subscription = self.source.subscribe(Rc::new(move |location, intercepted| {
            if let Some(link) = weak.upgrade() {
                link.on_location_changed(location, intercepted);
            }
        }));
        self.state.borrow_mut().phase = Phase::Mounted { subscription };
    }

    /// Apply caller parameters: re-resolve the target against the current
    /// base URI, re-extract the caller's `class`, and recompute the active
    /// state against the current location.
    pub fn set_params(&self, params: &NavLinkParams) -> Result<(), ResolveError> {
        let target = match params.href() {
            Some(href) => Some(self.source.resolve(href)?),
            None => None,
        };

        {
            let mut state = self.state.borrow_mut();
            state.target = target;
            state.mode = params.match_mode;
            state.css_class = params.attributes.text("class").map(str::to_owned);
        }

        // Same path as an external navigation event, so the two triggers can
        // never diverge.
        self.recompute(&self.source.current());
        Ok(())
    }

    /// Unsubscribe from the location source. Idempotent: calling this twice,
    /// or without a prior mount, is a no-op. A disposed link cannot be
    /// mounted again.
    pub fn dispose(&self) {
        let subscription = {
            let mut state = self.state.borrow_mut();
            match std::mem::replace(&mut state.phase, Phase::Disposed) {
                Phase::Mounted { subscription } => Some(subscription),
                Phase::Unmounted | Phase::Disposed => None,
            }
        };
        if let Some(subscription) = subscription {
            self.source.unsubscribe(subscription);
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    /// The resolved absolute target, if any.
    pub fn target(&self) -> Option<String> {
        self.state.borrow().target.clone()
    }

    /// The class string to render: the caller's `class` attribute with
    /// [`ACTIVE_CLASS`] merged in while the link is active.
    pub fn css_class(&self) -> Option<String> {
        let state = self.state.borrow();
        match (state.css_class.as_deref(), state.active) {
            (Some(class), true) => Some(format!("{class} {ACTIVE_CLASS}")),
            (Some(class), false) => Some(class.to_owned()),
            (None, true) => Some(ACTIVE_CLASS.to_owned()),
            (None, false) => None,
        }
    }

    fn on_location_changed(&self, location: &str, _intercepted: bool) {
        self.recompute(location);
    }

    /// Recompute the active state for `location` and request a visual
    /// refresh only when it changed. Active state is a pure function of
    /// (target, mode, location); nothing else feeds it.
    fn recompute(&self, location: &str) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let active = matcher::should_match(location, state.target.as_deref(), state.mode);
            if active == state.active {
                false
            } else {
                state.active = active;
                true
            }
        };
        // The borrow is released before the callback runs: the host may read
        // `css_class` or `is_active` from inside it.
        if changed {
            (self.on_refresh)();
        }
    }
}
