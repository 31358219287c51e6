//! Client identity: the session table key derived from the source address.

/// Strip the port from a source address.
///
/// `"10.0.0.7:51234"` → `"10.0.0.7"`, `"10.0.0.7"` → `"10.0.0.7"`.
/// Bracketed IPv6 (`"[fe80::1]:443"`) yields the address inside the brackets;
/// cutting at the first colon would give every IPv6 client the same identity.
pub fn client_identity(remote: &str) -> &str {
    if let Some(rest) = remote.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return &rest[..end];
        }
    }
    match remote.find(':') {
        Some(index) => &remote[..index],
        None => remote,
    }
}
