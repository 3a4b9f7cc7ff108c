//! Prefixed record identifiers.

/// Length of the random part of an id.
const ID_LEN: usize = 12;

pub const USER_PREFIX: &str = "usr_";
pub const BEER_PREFIX: &str = "beer_";
pub const BREWERY_PREFIX: &str = "brw_";

/// Generate a new id with `prefix`.
pub fn generate(prefix: &str) -> String {
    format!("{prefix}{}", nanoid::nanoid!(ID_LEN))
}

/// Whether `id` has the shape of an id generated with `prefix`.
///
/// Lets handlers turn an obviously bogus path segment into a 400 without a
/// database round trip.
pub fn is_well_formed(prefix: &str, id: &str) -> bool {
    id.strip_prefix(prefix).is_some_and(|rest| {
        rest.len() == ID_LEN
            && rest
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    })
}
