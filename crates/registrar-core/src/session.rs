// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session state consumed by the submit step.

use serde_json::Value;

/// Extract the user id from the stored session user JSON.
///
/// The login flow stores the user object verbatim; its `id` may be a string or
/// a number. Anything missing or malformed yields an empty id, which the
/// backend accepts as "unknown submitter".
pub fn user_id_from_session(session_user: Option<&str>) -> String {
    let Some(raw) = session_user.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return String::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(user) => match user.get("id") {
            Some(Value::String(id)) => id.trim().to_string(),
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        },
        Err(err) => {
            tracing::warn!(error = %err, "stored session user is not valid JSON");
            String::new()
        }
    }
}
