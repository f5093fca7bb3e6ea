//! Caller identity resolution.
//!
//! # Invariants
//! - Header names are matched case-insensitively in fixed priority order.
//! - Blank header values are skipped.
//! - A request without identity falls back to a single default owner; this
//!   suits single-tenant deployments only.

/// Identity used when a request carries no owner header.
pub const DEFAULT_OWNER_ID: &str = "dify_http_user";

/// Owner headers, highest priority first.
pub const OWNER_HEADERS: [&str; 3] = ["x-dify-user-id", "x-user-id", "user-id"];

/// Picks the owner id from request headers, or `default_owner` when absent.
pub fn owner_id_from_headers<'a, I>(headers: I, default_owner: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let headers: Vec<(&str, &str)> = headers.into_iter().collect();

    OWNER_HEADERS
        .iter()
        .find_map(|wanted| {
            headers
                .iter()
                .filter(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
                .map(|(_, value)| value.trim())
                .find(|value| !value.is_empty())
        })
        .unwrap_or(default_owner)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{owner_id_from_headers, DEFAULT_OWNER_ID};

    #[test]
    fn dify_header_wins_over_generic_ones() {
        let headers = [("User-Id", "generic"), ("X-Dify-User-Id", "dify")];
        assert_eq!(owner_id_from_headers(headers, DEFAULT_OWNER_ID), "dify");
    }

    #[test]
    fn blank_values_fall_through_to_next_header() {
        let headers = [("x-dify-user-id", "  "), ("x-user-id", "bob")];
        assert_eq!(owner_id_from_headers(headers, DEFAULT_OWNER_ID), "bob");
    }

    #[test]
    fn missing_identity_uses_default() {
        let headers = [("content-type", "application/json")];
        assert_eq!(
            owner_id_from_headers(headers, DEFAULT_OWNER_ID),
            DEFAULT_OWNER_ID
        );
    }
}
