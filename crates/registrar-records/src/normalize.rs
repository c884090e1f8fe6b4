// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reference normalization.
//
// Stored image references sometimes carry the backend host twice, either as a
// second absolute URL glued onto the first (`http://h/http://h/storage/x.tiff`)
// or as a bare authority segment (`http://h/h/storage/x.tiff`). Both collapse
// to `http://h/storage/x.tiff`. The transform is pure and idempotent.

const SCHEME_SEPARATOR: &str = "://";

/// Canonical form of an image reference, used as the cache key.
pub fn normalize(reference: &str) -> String {
    let trimmed = reference.trim();

    // Query and fragment are carried through untouched.
    let split_at = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
    let (location, suffix) = trimmed.split_at(split_at);

    let location = last_absolute(location);
    let Some((scheme, rest)) = location.split_once(SCHEME_SEPARATOR) else {
        return format!("{location}{suffix}");
    };
    let (authority, mut path) = match rest.find('/') {
        Some(slash) => rest.split_at(slash),
        None => (rest, ""),
    };

    while let Some(tail) = strip_authority_segment(path, authority) {
        path = tail;
    }

    format!("{scheme}{SCHEME_SEPARATOR}{authority}{path}{suffix}")
}

/// The substring starting at the last embedded absolute URL, if any.
fn last_absolute(location: &str) -> &str {
    let Some(separator) = location.rfind(SCHEME_SEPARATOR) else {
        return location;
    };
    let scheme_start = location[..separator]
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        .map_or(0, |boundary| boundary + 1);
    if scheme_start == separator {
        // "://" with no scheme before it; leave the reference alone.
        return location;
    }
    &location[scheme_start..]
}

/// `path` without its leading `/<authority>` segment, when it has one.
fn strip_authority_segment<'a>(path: &'a str, authority: &str) -> Option<&'a str> {
    if authority.is_empty() {
        return None;
    }
    let after_slash = path.strip_prefix('/')?;
    let segment_end = after_slash.find('/').unwrap_or(after_slash.len());
    after_slash[..segment_end]
        .eq_ignore_ascii_case(authority)
        .then(|| &after_slash[segment_end..])
}
