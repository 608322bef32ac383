//! Lore token codec
//!
//! A lore line is a base label optionally followed by a roman numeral tier,
//! e.g. `"Lightning III"` is the label `"Lightning "` at tier 3. The base label
//! keeps its trailing space so that `encode` is a plain concatenation.

use crate::error::CodecError;

/// Highest tier a token can carry
pub const MAX_TOKEN_TIER: u8 = 10;

const NUMERALS: [&str; MAX_TOKEN_TIER as usize] =
    ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// Roman numeral for 1..=10
pub fn numeral(tier: u8) -> Option<&'static str> {
    match tier {
        1..=MAX_TOKEN_TIER => Some(NUMERALS[tier as usize - 1]),
        _ => None,
    }
}

fn numeral_value(text: &str) -> Option<u8> {
    NUMERALS
        .iter()
        .position(|&n| n == text)
        .map(|i| i as u8 + 1)
}

/// A decoded lore token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub base: &'a str,
    pub tier: u8,
}

/// Split a token into its base label and tier (0 when it carries none)
pub fn decode(token: &str) -> Token<'_> {
    if let Some(space) = token.rfind(' ') {
        let suffix = &token[space + 1..];
        if let Some(tier) = numeral_value(suffix) {
            return Token {
                base: &token[..=space],
                tier,
            };
        }
    }
    Token {
        base: token,
        tier: 0,
    }
}

/// Base label of a token
pub fn base_label(token: &str) -> &str {
    decode(token).base
}

/// Join a base label and tier into a lore token
pub fn encode(base: &str, tier: u8) -> Result<String, CodecError> {
    if tier == 0 {
        return Ok(base.to_string());
    }
    let suffix = numeral(tier).ok_or(CodecError::TierOutOfRange(tier))?;
    Ok(format!("{base}{suffix}"))
}
