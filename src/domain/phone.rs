//! Phone-number normalization into a `+<country code><digits>` form.

use std::fmt;

use crate::domain::validation::ValidationError;

/// Regional numbering convention applied to numbers written without a country code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    calling_code: &'static str,
    national_digits: usize,
}

impl Region {
    /// Ghana: `+233`, nine digit national significant numbers (`0XX XXX XXXX` locally).
    pub const GHANA: Region = Region::new("233", 9);

    /// `calling_code` must be ASCII digits without a leading `+`.
    pub const fn new(calling_code: &'static str, national_digits: usize) -> Self {
        Self {
            calling_code,
            national_digits,
        }
    }

    pub fn calling_code(&self) -> &'static str {
        self.calling_code
    }

    pub fn national_digits(&self) -> usize {
        self.national_digits
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::GHANA
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Output of [`normalize`].
///
/// Not necessarily valid; check [`NormalizedPhone::is_valid`] before sending. An input
/// without digits normalizes to an empty value.
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Normalized value, `+` included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, as expected by APIs that reject a leading `+`.
    pub fn digits(&self) -> &str {
        self.0.strip_prefix('+').unwrap_or(&self.0)
    }

    /// See [`is_valid`].
    pub fn is_valid(&self) -> bool {
        is_valid(&self.0)
    }

    /// Validate, consuming `self`.
    pub fn validated(self) -> Result<Self, ValidationError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ValidationError::InvalidPhoneNumber { input: self.0 })
        }
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How strictly recipients are checked before a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneValidation {
    /// Shape only, see [`is_valid`].
    #[default]
    Pattern,
    /// Shape, then libphonenumber metadata: the country code must exist and the number must
    /// fit that country's plan.
    NumberingPlan,
}

impl PhoneValidation {
    pub fn check(self, phone: NormalizedPhone) -> Result<NormalizedPhone, ValidationError> {
        let phone = phone.validated()?;
        match self {
            Self::Pattern => Ok(phone),
            Self::NumberingPlan => {
                let fits_plan = phonenumber::parse(None, phone.as_str())
                    .is_ok_and(|parsed| phonenumber::is_valid(&parsed));
                if fits_plan {
                    Ok(phone)
                } else {
                    Err(ValidationError::InvalidPhoneNumber { input: phone.0 })
                }
            }
        }
    }
}

/// Normalize with the default region ([`Region::GHANA`]).
pub fn normalize(raw: &str) -> NormalizedPhone {
    normalize_in(Region::default(), raw)
}

/// Normalize `raw` into `+<country code><digits>`.
///
/// Local forms of `region` are rewritten: a trunk `0` followed by the national number
/// (`0241234567`) and a bare national number (`241234567`) both gain the calling code.
/// Input that already starts with `+` only has its formatting stripped.
pub fn normalize_in(region: Region, raw: &str) -> NormalizedPhone {
    let trimmed = raw.trim();
    let international = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return NormalizedPhone(String::new());
    }

    if international {
        return NormalizedPhone(format!("+{digits}"));
    }

    let national = region.national_digits;
    let trunk = digits.starts_with('0');
    let rewritten = if trunk && digits.len() == national + 1 {
        format!("{}{}", region.calling_code, &digits[1..])
    } else if !trunk && digits.len() == national {
        format!("{}{digits}", region.calling_code)
    } else {
        digits
    };

    NormalizedPhone(format!("+{rewritten}"))
}

/// `true` for `+` followed by a non-zero digit and 8 to 14 more digits, or for `+233`
/// followed by exactly nine digits.
pub fn is_valid(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let ghana = Region::GHANA;
    if let Some(national) = digits.strip_prefix(ghana.calling_code)
        && national.len() == ghana.national_digits
    {
        return true;
    }

    digits.len() >= 9 && digits.len() <= 15 && !digits.starts_with('0')
}
