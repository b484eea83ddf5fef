use std::{fmt, str::FromStr};

use crate::{account::AccountStatus, ledger::ErrorKind};

/// Language of user facing texts. Only used when presenting results, the ledger
/// itself works with [`ErrorKind`] and [`AccountStatus`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    Russian,
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported locale {0:?}, expected one of: en, ru")]
pub struct UnknownLocale(String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ru" | "russian" => Ok(Self::Russian),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::English => write!(f, "en"),
            Locale::Russian => write!(f, "ru"),
        }
    }
}

impl Locale {
    pub fn status_label(self, status: AccountStatus) -> &'static str {
        match (self, status) {
            (Locale::English, AccountStatus::Active) => "Active",
            (Locale::English, AccountStatus::Blocked) => "Blocked",
            (Locale::Russian, AccountStatus::Active) => "Активный",
            (Locale::Russian, AccountStatus::Blocked) => "Заблокированный",
        }
    }

    fn error_text(self, kind: ErrorKind) -> &'static str {
        match self {
            Locale::English => match kind {
                ErrorKind::AccountNotFound => "Requested account does not exist",
                ErrorKind::AccountBlocked => "Account is blocked",
                ErrorKind::InsufficientBalance => "Insufficient account balance",
                ErrorKind::AccountTypeMismatch => "Account has the wrong type",
                ErrorKind::IbanMismatch => "Account has the wrong IBAN",
                ErrorKind::NegativeAmount => "Amount cannot be negative",
                ErrorKind::InvalidIban => "IBAN is not valid",
                ErrorKind::AccountCreationFailed => "Impossible to create account",
                ErrorKind::SerializationFailed => "Cannot represent accounts as JSON",
                ErrorKind::MalformedRequest => "Cannot parse JSON",
                ErrorKind::DuplicateIban => "IBAN is already in use",
                ErrorKind::AmountOverflow => "Amount exceeds the maximum account balance",
            },
            Locale::Russian => match kind {
                ErrorKind::AccountNotFound => "Запрашиваемый аккаунт не существует",
                ErrorKind::AccountBlocked => "Аккаунт заблокирован",
                ErrorKind::InsufficientBalance => "Недостаточно средств на балансе",
                ErrorKind::AccountTypeMismatch => "Некорректный тип аккаунта",
                ErrorKind::IbanMismatch => "Некорректный IBAN аккаунта",
                ErrorKind::NegativeAmount => "Сумма не может быть отрицательной",
                ErrorKind::InvalidIban => "IBAN не является валидным",
                ErrorKind::AccountCreationFailed => "Невозможно создать аккаунт",
                ErrorKind::SerializationFailed => "Невозможно преобразить аккаунты в JSON",
                ErrorKind::MalformedRequest => "Невозможно обработать JSON",
                ErrorKind::DuplicateIban => "IBAN уже используется",
                ErrorKind::AmountOverflow => "Сумма превышает максимальный баланс аккаунта",
            },
        }
    }

    /// Message shown to the end user, prefixed with the numeric error code.
    pub fn error_message(self, kind: ErrorKind) -> String {
        let text = self.error_text(kind);
        match self {
            Locale::English => format!("Error code: {}. Message: {text}", kind.code()),
            Locale::Russian => format!("Код ошибки: {}. Сообщение: {text}", kind.code()),
        }
    }
}
