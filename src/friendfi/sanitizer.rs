//! Outgoing-text filter for usernames and message bodies.
//!
//! A fixed blocklist is matched token by token: punctuation is ignored,
//! matching is case-insensitive, and matched tokens are replaced with a
//! mask of equal length. The filter is pure and keeps no state, so the
//! same input always classifies the same way.

use alloy_primitives::Address;

use crate::friendfi::utils;

const MASK_CHAR: char = '*';

static BLOCKLIST: &[&str] = &[
    "ass", "asshole", "bastard", "bitch", "bullshit", "crap", "cunt", "damn", "dick", "dumbass",
    "fuck", "hell", "piss", "prick", "shit", "slut", "whore",
];

/// Result of passing text through the blocklist filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// Whether the text contained no blocklisted tokens
    pub is_clean: bool,

    /// The text with each blocklisted token masked, equal length preserved
    pub sanitized_text: String,

    /// The input, untouched
    pub original_text: String,
}

/// Checks text against the blocklist and masks any matches.
///
/// Tokens are maximal alphabetic runs, so `"damn!"` masks to `"****!"`
/// while `"password"` passes untouched even though it contains a
/// blocklisted term as a substring.
pub fn sanitize(text: &str) -> Sanitized {
    let mut sanitized_text = String::with_capacity(text.len());
    let mut is_clean = true;
    let mut run = String::new();

    for ch in text.chars() {
        if ch.is_alphabetic() {
            run.push(ch);
        } else {
            flush_token(&mut sanitized_text, &mut run, &mut is_clean);
            sanitized_text.push(ch);
        }
    }
    flush_token(&mut sanitized_text, &mut run, &mut is_clean);

    Sanitized {
        is_clean,
        sanitized_text,
        original_text: text.to_string(),
    }
}

/// Display name for a user: the registered username when it is present
/// and passes the filter, otherwise the truncated address. A blocklisted
/// name falls back the same way a missing one does, never to its mask.
pub fn display_username(address: &Address, username: Option<&str>) -> String {
    match username {
        Some(name) if !name.trim().is_empty() && sanitize(name).is_clean => name.to_string(),
        _ => utils::truncate_address(address),
    }
}

fn flush_token(output: &mut String, run: &mut String, is_clean: &mut bool) {
    if run.is_empty() {
        return;
    }
    let lowered = run.to_lowercase();
    if BLOCKLIST.contains(&lowered.as_str()) {
        for _ in run.chars() {
            output.push(MASK_CHAR);
        }
        *is_clean = false;
    } else {
        output.push_str(run);
    }
    run.clear();
}
