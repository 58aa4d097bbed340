use std::rc::Rc;

use leptos::*;

use crate::matcher::NavLinkMatch;
use crate::nav_link::{AttrValue, AttributeBag, NavLink, NavLinkParams};
use crate::navigation::{BrowserLocation, LocationSource};

/// A navigation link that highlights itself while the browser is at (or, in
/// `Prefix` mode, under) its target.
///
/// The target and any display attributes arrive through the attribute bag;
/// `class` is merged with the `active` token, everything else is forwarded
/// verbatim to the `<a>` element. `attr:href` and `attr:class` must be
/// static strings: a dynamic value still renders on the element, but the
/// matcher never sees it.
///
/// ```rust,ignore
/// view! {
///     <NavMenuLink
///         attr:href="/docs"
///         attr:class="nav-item"
///         match_mode=NavLinkMatch::Prefix
///         is_desktop=true
///         icon=Callback::new(|(desktop, active)| doc_icon(desktop, active))
///     >
///         "Documentation"
///     </NavMenuLink>
/// }
/// ```
#[component]
pub fn NavMenuLink(
    /// How the target is compared against the current location.
    #[prop(optional)]
    match_mode: NavLinkMatch,
    /// Passed through to the icon callback, untouched by the core.
    #[prop(optional)]
    is_desktop: bool,
    /// Plain-text label, used when no children are given.
    #[prop(optional, into)]
    label_text: Option<String>,
    /// Renders icon/decoration content for `(is_desktop, is_active)`.
    #[prop(optional)]
    icon: Option<Callback<(bool, bool), View>>,
    #[prop(attrs)] attrs: Vec<(&'static str, Attribute)>,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    let bag = bag_from_attrs(&attrs);

    let refresh = create_trigger();
    let source: Rc<dyn LocationSource> = Rc::new(BrowserLocation::new());
    let link = Rc::new(NavLink::new(source, move || refresh.notify()));

    link.mount();
    // An href that cannot be resolved is a configuration bug in the caller's
    // markup, not a runtime condition.
    link.set_params(&NavLinkParams {
        match_mode,
        attributes: bag,
    })
    .expect("nav link href must resolve against the document base URI");

    on_cleanup({
        let link = Rc::clone(&link);
        move || link.dispose()
    });

    let class = {
        let link = Rc::clone(&link);
        move || {
            refresh.track();
            link.css_class()
        }
    };

    let label = match (children, label_text) {
        (Some(children), _) => Some(children().into_view()),
        (None, Some(text)) => Some(text.into_view()),
        (None, None) => None,
    };

    let mut el = html::a();
    for (name, value) in attrs {
        if name != "class" {
            el = el.attr(name, value);
        }
    }
    let el = el.attr("class", class);
    let el = match icon {
        Some(icon) => {
            let link = Rc::clone(&link);
            el.child(move || {
                refresh.track();
                icon.call((is_desktop, link.is_active()))
            })
        }
        None => el,
    };
    el.child(label)
}

/// Build the typed bag from the forwarded attributes. Dynamic values are
/// rendered on the element but cannot feed the matcher; for the two keys the
/// controller reads, dropping one silently would look like a link that never
/// activates, so it is logged.
fn bag_from_attrs(attrs: &[(&'static str, Attribute)]) -> AttributeBag {
    let mut bag = AttributeBag::new();
    for (name, value) in attrs {
        match value {
            Attribute::String(text) => bag.insert(*name, AttrValue::Text(text.to_string())),
            Attribute::Option(Some(text)) => bag.insert(*name, AttrValue::Text(text.to_string())),
            Attribute::Option(None) => {}
            Attribute::Bool(flag) => bag.insert(*name, AttrValue::Flag(*flag)),
            _ => {
                if matches!(*name, "href" | "class") {
                    log::warn!(
                        "NavMenuLink `{name}` must be a static string; \
                         a dynamic value renders but is ignored for active-state matching"
                    );
                }
            }
        }
    }
    bag
}
