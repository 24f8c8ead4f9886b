//! Route Builder: handler identifier -> canonical path

use crate::naming::underscored;
use crate::INDEX;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except RFC 3986 unreserved characters
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the path for `handler` followed by `params`
///
/// The result has no leading `/`, except for the root index route which is
/// always `"/"`. A trailing `index` segment is dropped when there are no
/// parameters, so a group index handler maps to its group path. No lookup is
/// performed, the identifier is not checked for existence.
///
/// # Example
/// ```
/// use tollgate_router::build_route;
///
/// assert_eq!(build_route("app.GetIndex", "app", ".", &[] as &[&str]), "/");
/// assert_eq!(build_route("app.Foo.Bar.GetBaz", "app", ".", &["bla blub"]), "foo/bar/baz/bla%20blub");
/// ```
pub fn build_route<S: AsRef<str>>(
    handler: &str,
    namespace_root: &str,
    separator: &str,
    params: &[S],
) -> String {
    let prefix = format!("{namespace_root}{separator}");
    let relative = handler.strip_prefix(prefix.as_str()).unwrap_or(handler);

    let mut names: Vec<&str> = relative.split(separator).collect();
    if let Some(last) = names.last_mut() {
        *last = strip_method(*last);
    }
    let mut parts: Vec<String> = names.into_iter().map(underscored).collect();

    if params.is_empty() && parts.len() > 1 && parts.last().map(String::as_str) == Some(INDEX) {
        parts.pop();
    }

    parts.extend(params.iter().map(|p| p.as_ref().to_string()));

    if matches!(parts.as_slice(), [only] if only == INDEX) {
        return "/".to_string();
    }

    parts
        .iter()
        .map(|p| utf8_percent_encode(p, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Drop the leading method word: `GetFooBar` -> `FooBar`, `Get2Fa` -> `2Fa`
///
/// Runs before underscoring, so a digit right after the method stays with
/// the segment. Snake-case names (`get_foo_bar`) are accepted too.
fn strip_method(name: &str) -> &str {
    let name = name.trim_start_matches('_');
    let mut chars = name.char_indices();
    if chars.next().is_none() {
        return "";
    }
    let end = chars
        .find(|(_, c)| !c.is_lowercase())
        .map_or(name.len(), |(i, _)| i);
    name[end..].trim_start_matches('_')
}
