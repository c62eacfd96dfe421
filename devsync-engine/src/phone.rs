//! Phone number normalization.
//!
//! Device history and contact records spell the same number in many ways
//! (`"(555) 123-4567"`, `"+1 555 123 4567"`, `"011 1 555 123 4567"`). Both
//! sides are reduced to an E.164 key with `phonenumber` before they are
//! compared.
//!
//! Normalization is pure and never fails loudly: anything that cannot be
//! turned into a plausible international number yields `None`, and callers
//! drop the record from matching.

use phonenumber::{country, Mode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// E.164 allows at most 15 digits including the country code.
const MAX_E164_DIGITS: usize = 15;
/// Shortest international numbers in service (small island plans).
const MIN_E164_DIGITS: usize = 7;

/// Canonical, comparable form of a phone number: `+` followed by the
/// country code and national significant number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedPhoneKey(String);

impl NormalizedPhoneKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, without the leading `+`.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for NormalizedPhoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dialing region used to interpret numbers written without a country code.
///
/// Any ISO 3166-1 alpha-2 code known to the numbering metadata is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region([u8; 2]);

impl Region {
    pub const US: Region = Region(*b"US");
    pub const CA: Region = Region(*b"CA");
    pub const GB: Region = Region(*b"GB");
    pub const AU: Region = Region(*b"AU");
    pub const DE: Region = Region(*b"DE");
    pub const FR: Region = Region(*b"FR");
    pub const IN: Region = Region(*b"IN");
    pub const MX: Region = Region(*b"MX");

    /// Looks up a region by its ISO code, case-insensitively.
    pub fn new(code: &str) -> Result<Self, UnknownRegion> {
        let upper = code.trim().to_ascii_uppercase();
        let bytes: [u8; 2] = upper
            .as_bytes()
            .try_into()
            .map_err(|_| UnknownRegion(code.to_string()))?;
        let region = Region(bytes);
        match region.country() {
            Some(_) => Ok(region),
            None => Err(UnknownRegion(code.to_string())),
        }
    }

    /// ISO 3166-1 alpha-2 code.
    #[must_use]
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("ZZ")
    }

    fn country(&self) -> Option<country::Id> {
        self.code().parse().ok()
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::US
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported region code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported region: {0}")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::new(s)
    }
}

impl TryFrom<String> for Region {
    type Error = UnknownRegion;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Region::new(&code)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.code().to_string()
    }
}

/// Normalizes a device-supplied phone string.
///
/// Separators, a leading `tel:` scheme, international exit codes, trunk
/// prefixes and trailing extensions (`x12`, `ext. 3`, `#5`, `;ext=9`) do
/// not affect the result. Numbers without an explicit `+` are read in
/// `default_region`; without a region only explicit international numbers
/// normalize.
///
/// Numbers are parsed against the numbering metadata but not validated
/// against allocated ranges, so fictional and newly issued numbers still
/// match.
#[must_use]
pub fn normalize(raw: &str, default_region: Option<Region>) -> Option<NormalizedPhoneKey> {
    let significant = significant_part(raw);
    let digits: String = significant.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let candidate = if significant.trim_start().starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    };

    let country = default_region.and_then(|r| r.country());
    let number = phonenumber::parse(country, &candidate).ok()?;
    let e164 = number.format().mode(Mode::E164).to_string();

    let digit_count = e164.chars().filter(char::is_ascii_digit).count();
    let plausible = e164.starts_with('+')
        && (MIN_E164_DIGITS..=MAX_E164_DIGITS).contains(&digit_count)
        && !e164[1..].starts_with('0');
    plausible.then(|| NormalizedPhoneKey(e164))
}

/// Drops a `tel:` scheme and everything from the first extension marker on.
fn significant_part(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_scheme = match trimmed.get(..4) {
        Some(scheme) if scheme.eq_ignore_ascii_case("tel:") => &trimmed[4..],
        _ => trimmed,
    };
    let end = without_scheme
        .find(|c: char| c.is_alphabetic() || matches!(c, '#' | ';' | ','))
        .unwrap_or(without_scheme.len());
    &without_scheme[..end]
}

/// A normalizer bound to a default region.
#[derive(Debug, Clone, Copy)]
pub struct PhoneNormalizer {
    default_region: Option<Region>,
}

impl PhoneNormalizer {
    #[must_use]
    pub const fn new(default_region: Region) -> Self {
        Self {
            default_region: Some(default_region),
        }
    }

    /// A normalizer that only accepts explicit international numbers.
    #[must_use]
    pub const fn without_region() -> Self {
        Self {
            default_region: None,
        }
    }

    #[must_use]
    pub const fn default_region(&self) -> Option<Region> {
        self.default_region
    }

    #[must_use]
    pub fn normalize(&self, raw: &str) -> Option<NormalizedPhoneKey> {
        normalize(raw, self.default_region)
    }
}
