/// How a link's target URI is compared against the current location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavLinkMatch {
    /// Active only when the location is the target itself (allowing for an
    /// added trailing slash on the target).
    #[default]
    Exact,
    /// Active for the target itself and for any location nested under it.
    Prefix,
}

/// Decide whether a link should be considered active.
///
/// `current_uri` is the absolute location reported by the navigation source;
/// `target_uri` is the link's absolute target, or `None` when the link has no
/// href (such a link can never be active).
///
/// Matching is case-insensitive in the ordinal sense: characters are compared
/// one by one under simple case folding, with no normalization and no locale.
/// The prefix boundary check uses Unicode letter/digit classification, so
/// `/caf\u{e9}` is not treated as a prefix of `/caf\u{e9}s`.
pub fn should_match(current_uri: &str, target_uri: Option<&str>, mode: NavLinkMatch) -> bool {
    let Some(target) = target_uri else {
        return false;
    };

    if equals_or_trailing_slash_added(current_uri, target) {
        return true;
    }

    mode == NavLinkMatch::Prefix && is_strict_prefix_with_boundary(current_uri, target)
}

/// True when `current` equals `target`, or when the target carries a trailing
/// slash the current location lacks: servers commonly serve the same content
/// for `.../path` and `.../path/`, so a link to `http://host/dir/` must still
/// highlight while the user sits at `http://host/dir`. Only the
/// current-shorter-by-one direction qualifies.
fn equals_or_trailing_slash_added(current: &str, target: &str) -> bool {
    if eq_ignore_case(current, target) {
        return true;
    }

    target.ends_with('/')
        && current.chars().count() + 1 == target.chars().count()
        && starts_with_ignore_case(target, current)
}

/// True when `value` extends `prefix` past a separator. `/abc` is a prefix of
/// `/abc/def` but not of `/abcdef`: the match requires a non-alphanumeric
/// character either at the end of the prefix or immediately after it.
fn is_strict_prefix_with_boundary(value: &str, prefix: &str) -> bool {
    let mut rest = value.chars();
    for expected in prefix.chars() {
        match rest.next() {
            Some(found) if fold(found) == fold(expected) => {}
            _ => return false,
        }
    }

    // `rest` now holds whatever follows the prefix; equal length is not a
    // strict extension.
    match rest.next() {
        None => false,
        Some(next) => match prefix.chars().last() {
            None => true,
            Some(last) => !last.is_alphanumeric() || !next.is_alphanumeric(),
        },
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().map(fold).eq(b.chars().map(fold))
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    let mut rest = value.chars();
    prefix
        .chars()
        .all(|expected| matches!(rest.next(), Some(found) if fold(found) == fold(expected)))
}

/// Single-character simple case folding. `to_lowercase` never yields an empty
/// iterator; multi-character expansions do not occur in URI comparisons, so
/// only the first folded character matters.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
