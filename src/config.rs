use crate::{
    iban::{DEFAULT_COUNTRY_PREFIX, DEFAULT_MAX_ATTEMPTS, IbanGenerator},
    locale::Locale,
};

pub const DEFAULT_EMISSION_IBAN: &str = "BY17 ALFA 1000 0000 0000 0000 0000";
pub const DEFAULT_DESTRUCTION_IBAN: &str = "BY90 ALFA 1000 0000 0000 0000 0001";

/// Settings a ledger is created with.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// IBAN of the account money is emitted to.
    pub emission_iban: String,
    /// IBAN of the account destructed money is moved to.
    pub destruction_iban: String,
    /// Country prefix of opened accounts.
    pub country_prefix: String,
    /// Upper bound of IBAN generation attempts per opened account.
    pub max_generation_attempts: u64,
    /// Language of status labels in account listings.
    pub locale: Locale,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            emission_iban: DEFAULT_EMISSION_IBAN.to_string(),
            destruction_iban: DEFAULT_DESTRUCTION_IBAN.to_string(),
            country_prefix: DEFAULT_COUNTRY_PREFIX.to_string(),
            max_generation_attempts: DEFAULT_MAX_ATTEMPTS,
            locale: Locale::default(),
        }
    }
}

impl LedgerConfig {
    pub fn iban_generator(&self) -> IbanGenerator {
        IbanGenerator::new(self.country_prefix.clone(), self.max_generation_attempts)
    }
}
