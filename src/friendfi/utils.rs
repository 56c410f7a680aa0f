use alloy_primitives::{Address, U256};
use chrono::DateTime;

use crate::{FriendFiError, Result};

pub(crate) fn to_ethers_u256(value: U256) -> ethers::types::U256 {
    ethers::types::U256::from_big_endian(&value.to_be_bytes::<32>())
}

pub(crate) fn from_ethers_u256(value: ethers::types::U256) -> U256 {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    U256::from_be_bytes(buf)
}

/// Shortens an address to the `0x1234...abcd` form used everywhere a
/// full 42-character address would not fit.
pub fn truncate_address(address: &Address) -> String {
    let full = format!("{address:#x}");
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Formats a wei amount as a decimal XFI string with trailing zeros
/// trimmed, e.g. `1500000000000000000` becomes `"1.5"`.
pub fn format_native_amount(wei: U256) -> String {
    match ethers::utils::format_units(to_ethers_u256(wei), ethers::utils::Units::Ether.as_num()) {
        Ok(formatted) => trim_trailing_zeros(&formatted),
        Err(_) => wei.to_string(),
    }
}

/// Parses a decimal XFI string into wei. Rejects negative amounts and
/// amounts with more than 18 fractional digits.
pub fn parse_native_amount(text: &str) -> Result<U256> {
    let trimmed = text.trim();
    if trimmed.starts_with('-') {
        return Err(FriendFiError::InvalidAmount(
            "amount cannot be negative".to_string(),
        ));
    }
    let parsed = ethers::utils::parse_units(trimmed, ethers::utils::Units::Ether.as_num())
        .map_err(|e| FriendFiError::InvalidAmount(e.to_string()))?;
    Ok(from_ethers_u256(ethers::types::U256::from(parsed)))
}

/// Compact display form for dashboard token amounts: billions, millions
/// and thousands get a suffix, everything else keeps up to four decimals.
pub fn format_token_amount(value: f64) -> String {
    if value.is_nan() || value <= 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return "\u{221e}".to_string();
    }
    if value >= 1e9 {
        return format!("{:.2}B", value / 1e9);
    }
    if value >= 1e6 {
        return format!("{:.2}M", value / 1e6);
    }
    if value >= 1e3 {
        return format!("{:.2}K", value / 1e3);
    }
    trim_trailing_zeros(&format!("{value:.4}"))
}

/// First two characters of a display name, uppercased, for avatar
/// badges. Short names yield what they have; empty names yield `"?"`.
pub fn avatar_initials(name: &str) -> String {
    let initials: String = name.trim().chars().take(2).collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials.to_uppercase()
    }
}

/// Calendar date for a contract timestamp, e.g. `"8/22/2026"`.
pub fn format_date(timestamp_seconds: u64) -> String {
    DateTime::from_timestamp(timestamp_seconds as i64, 0)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

/// Wall-clock time for a contract timestamp, e.g. `"3:04:05 PM"`.
pub fn format_time(timestamp_seconds: u64) -> String {
    DateTime::from_timestamp(timestamp_seconds as i64, 0)
        .map(|dt| dt.format("%-I:%M:%S %p").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

fn trim_trailing_zeros(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((int_part, frac_part)) => {
            let frac_trimmed = frac_part.trim_end_matches('0');
            if frac_trimmed.is_empty() {
                int_part.to_string()
            } else {
                format!("{int_part}.{frac_trimmed}")
            }
        }
        None => formatted.to_string(),
    }
}
