//! Static table of backend endpoints and who may call them.

use reqwest::Method;

/// Whether an endpoint needs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Never carries a credential (login, register)
    Public,
    /// Readable anonymously; carries the credential when signed in
    Optional,
    /// Requires a session
    Protected,
}

/// (method, path pattern, access). `{id}` matches one numeric segment.
const ENDPOINTS: &[(&str, &str, Access)] = &[
    ("POST", "/users/login", Access::Public),
    ("POST", "/users/register", Access::Public),
    ("GET", "/users/me", Access::Protected),
    ("GET", "/skills/", Access::Optional),
    ("POST", "/skills/", Access::Protected),
    ("GET", "/skills/my-skills", Access::Protected),
    ("GET", "/skills/{id}", Access::Optional),
    ("PUT", "/skills/{id}", Access::Protected),
    ("DELETE", "/skills/{id}", Access::Protected),
    ("GET", "/exchanges/", Access::Protected),
    ("POST", "/exchanges/", Access::Protected),
    ("GET", "/exchanges/{id}", Access::Protected),
    ("PUT", "/exchanges/{id}", Access::Protected),
    ("DELETE", "/exchanges/{id}", Access::Protected),
    ("GET", "/notifications/", Access::Protected),
    ("GET", "/notifications/unread-count", Access::Protected),
    ("PUT", "/notifications/{id}/read", Access::Protected),
];

/// Look up the access class for a request. Unknown endpoints are `Protected`.
pub fn access_for(method: &Method, path: &str) -> Access {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    ENDPOINTS
        .iter()
        .find(|(m, pattern, _)| *m == method.as_str() && matches_pattern(pattern, path))
        .map(|(_, _, access)| *access)
        .unwrap_or(Access::Protected)
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let mut pattern_parts = pattern.split('/');
    let mut path_parts = path.split('/');
    loop {
        match (pattern_parts.next(), path_parts.next()) {
            (None, None) => return true,
            (Some("{id}"), Some(segment)) => {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return false;
                }
            }
            (Some(expected), Some(segment)) if expected == segment => {}
            _ => return false,
        }
    }
}
