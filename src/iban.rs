use rand::Rng;
use thiserror::Error;

/// Total length of every identifier issued by this ledger.
pub const IBAN_LENGTH: usize = 28;

const CHECK_DIGITS_PLACEHOLDER: &str = "00";

pub const DEFAULT_COUNTRY_PREFIX: &str = "BY";

pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IbanError {
    #[error("Character {0:?} is not allowed in IBAN")]
    InvalidCharacter(char),
    #[error("Country prefix {0:?} must consist of two uppercase latin letters")]
    InvalidCountryCode(String),
    #[error("No unique valid IBAN was generated after {attempts} attempts")]
    GenerationExhausted { attempts: u64 },
}

/// Removes formatting whitespace, e.g. `"BY17 ALFA 1000 ..."` becomes `"BY17ALFA1000..."`.
pub fn normalize(iban: &str) -> String {
    iban.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Checks the identifier length, alphabet and mod-97 checksum.
///
/// Never fails: anything malformed is simply not valid.
pub fn validate(iban: &str) -> bool {
    let iban = normalize(iban);
    if iban.len() != IBAN_LENGTH {
        return false;
    }
    match numeric_form(&iban) {
        Ok(digits) => mod97(&digits) == 1,
        Err(_) => false,
    }
}

/// Converts letters to their two-digit form (`A` = 10 ... `Z` = 35), digits are kept as is.
pub fn numeric_form(iban: &str) -> Result<String, IbanError> {
    let mut digits = String::with_capacity(iban.len() * 2);
    for c in iban.chars() {
        match c {
            'A'..='Z' => {
                let value = c as u32 - 'A' as u32 + 10;
                digits.push_str(&value.to_string());
            }
            '0'..='9' => digits.push(c),
            _ => return Err(IbanError::InvalidCharacter(c)),
        }
    }
    Ok(digits)
}

/// Remainder of an arbitrarily long decimal string divided by 97.
///
/// Non-digit characters are skipped; callers pass the output of [`numeric_form`].
pub fn mod97(digits: &str) -> u32 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0, |remainder, digit| (remainder * 10 + digit) % 97)
}

pub fn compute_check_digits(digits: &str) -> String {
    format!("{:02}", 98 - mod97(digits))
}

/// Builds a candidate identifier: prefix, check digits and random digits.
///
/// Check digits are computed over the candidate holding the placeholder, so the
/// result is not guaranteed to pass [`validate`].
pub fn generate_candidate<R>(country_prefix: &str, rng: &mut R) -> Result<String, IbanError>
where
    R: Rng,
{
    if country_prefix.len() != 2 || !country_prefix.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(IbanError::InvalidCountryCode(country_prefix.to_string()));
    }
    let bban_length = IBAN_LENGTH - country_prefix.len() - CHECK_DIGITS_PLACEHOLDER.len();
    let bban: String = (0..bban_length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect();

    let placeholder = format!("{country_prefix}{CHECK_DIGITS_PLACEHOLDER}{bban}");
    let check_digits = compute_check_digits(&numeric_form(&placeholder)?);
    Ok(format!("{country_prefix}{check_digits}{bban}"))
}

/// Issues identifiers that are valid and not yet taken.
#[derive(Debug, Clone)]
pub struct IbanGenerator {
    country_prefix: String,
    max_attempts: u64,
}

impl Default for IbanGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_PREFIX, DEFAULT_MAX_ATTEMPTS)
    }
}

impl IbanGenerator {
    pub fn new(country_prefix: impl Into<String>, max_attempts: u64) -> Self {
        Self {
            country_prefix: country_prefix.into(),
            max_attempts,
        }
    }

    pub fn country_prefix(&self) -> &str {
        &self.country_prefix
    }

    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    /// Generates candidates until one validates and `exists` reports it as free.
    ///
    /// The caller must hold whatever lock protects the set `exists` looks at until
    /// the returned identifier is inserted.
    pub fn generate_unique<F>(&self, exists: F) -> Result<String, IbanError>
    where
        F: Fn(&str) -> bool,
    {
        self.generate_unique_with(&mut rand::rng(), exists)
    }

    pub fn generate_unique_with<R, F>(&self, rng: &mut R, exists: F) -> Result<String, IbanError>
    where
        R: Rng,
        F: Fn(&str) -> bool,
    {
        for _ in 0..self.max_attempts {
            let candidate = generate_candidate(&self.country_prefix, rng)?;
            if validate(&candidate) && !exists(&candidate) {
                return Ok(candidate);
            }
        }
        Err(IbanError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn validate_known_identifiers() {
        assert!(validate("BY17ALFA10000000000000000000"));
        assert!(validate("BY17 ALFA 1000 0000 0000 0000 0000"));
        assert!(validate("BY90 ALFA 1000 0000 0000 0000 0001"));

        // wrong checksum
        assert!(!validate("BY84 ALFA 1000 0000 0000 0000 0000"));
        // wrong length
        assert!(!validate("BY17ALFA1000000000000000000"));
        assert!(!validate(""));
        // lowercase and punctuation are rejected, not normalized
        assert!(!validate("by17alfa10000000000000000000"));
        assert!(!validate("BY17-ALFA-1000-0000-0000-0000"));
    }

    #[test]
    fn numeric_form_converts_letters() {
        assert_eq!(numeric_form("AZ09").unwrap(), "103509");
        assert_eq!(numeric_form("BY00").unwrap(), "113400");
        assert_eq!(
            numeric_form("BY-1").unwrap_err(),
            IbanError::InvalidCharacter('-')
        );
    }

    #[test]
    fn mod97_of_long_numbers() {
        assert_eq!(mod97("0"), 0);
        assert_eq!(mod97("97"), 0);
        assert_eq!(mod97("98"), 1);
        // 10^30 mod 97 computed independently
        assert_eq!(mod97(&format!("1{}", "0".repeat(30))), 85);
    }

    #[test]
    fn check_digits_are_zero_padded() {
        // 97 mod 97 = 0 -> 98
        assert_eq!(compute_check_digits("97"), "98");
        // 96 mod 97 = 96 -> 02
        assert_eq!(compute_check_digits("96"), "02");
    }

    #[test]
    fn candidates_have_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let candidate = generate_candidate("BY", &mut rng).unwrap();
            assert_eq!(candidate.len(), IBAN_LENGTH);
            assert!(candidate.starts_with("BY"));
            assert!(candidate[2..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn reject_bad_country_prefix() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            generate_candidate("by", &mut rng),
            Err(IbanError::InvalidCountryCode(_))
        ));
        assert!(matches!(
            generate_candidate("BYX", &mut rng),
            Err(IbanError::InvalidCountryCode(_))
        ));
    }

    #[test]
    fn generated_identifiers_validate() {
        let generator = IbanGenerator::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut issued = HashSet::new();
        for _ in 0..50 {
            let iban = generator
                .generate_unique_with(&mut rng, |iban| issued.contains(iban))
                .unwrap();
            assert!(validate(&iban));
            assert!(issued.insert(iban));
        }
    }

    #[test]
    fn generation_skips_taken_identifiers() {
        let generator = IbanGenerator::default();
        let first = generator
            .generate_unique_with(&mut StdRng::seed_from_u64(1), |_| false)
            .unwrap();
        // same seed would yield the same identifier unless it is reported as taken
        let second = generator
            .generate_unique_with(&mut StdRng::seed_from_u64(1), |iban| iban == first)
            .unwrap();
        assert_ne!(first, second);
        assert!(validate(&second));
    }

    #[test]
    fn generation_gives_up() {
        let generator = IbanGenerator::new("BY", 10);
        let err = generator.generate_unique(|_| true).unwrap_err();
        assert_eq!(err, IbanError::GenerationExhausted { attempts: 10 });

        let err = IbanGenerator::new("BY", 0)
            .generate_unique(|_| false)
            .unwrap_err();
        assert_eq!(err, IbanError::GenerationExhausted { attempts: 0 });
    }
}
