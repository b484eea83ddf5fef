use rust_decimal::{Decimal, RoundingStrategy};

pub type Iban = String;

const CENTS_SCALE: u32 = 2;

/// Largest balance that is still exact to the cent.
pub const MAX_BALANCE: Decimal =
    Decimal::from_parts(u32::MAX, u32::MAX, u32::MAX, false, CENTS_SCALE);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountStatus {
    Active,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Ordinary,
    Emission,
    Destruction,
}

/// Rounds to whole cents, halves away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENTS_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Splits an amount into its cent-rounded part and the sub-cent remainder.
pub fn split_cents(amount: Decimal) -> (Decimal, Decimal) {
    let rounded = round_cents(amount);
    (rounded, amount - rounded)
}

/// Balance and sub-cent remainder of an account, computed before it is changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Holdings {
    balance: Decimal,
    fractions: Decimal,
}

impl Holdings {
    fn checked(balance: Decimal, fractions: Decimal) -> Option<Self> {
        if balance.abs() > MAX_BALANCE {
            return None;
        }
        Some(Self {
            balance: round_cents(balance),
            fractions,
        })
    }
}

/// Money holder. The balance is kept in cents, whatever does not fit into a cent
/// is accumulated in `fractions`, so `balance + fractions` is always exact.
///
/// Only the ledger mutates accounts, after it has validated the amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    iban: Iban,
    status: AccountStatus,
    kind: AccountKind,
    balance: Decimal,
    fractions: Decimal,
}

impl Account {
    pub(crate) fn new(iban: Iban, kind: AccountKind) -> Self {
        Self {
            iban,
            status: AccountStatus::Active,
            kind,
            balance: Decimal::ZERO,
            fractions: Decimal::ZERO,
        }
    }

    pub fn iban(&self) -> &str {
        &self.iban
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn fractions(&self) -> Decimal {
        self.fractions
    }

    /// Balance including the sub-cent remainder.
    pub fn exact_balance(&self) -> Decimal {
        self.balance + self.fractions
    }

    pub fn is_blocked(&self) -> bool {
        self.status == AccountStatus::Blocked
    }

    /// Whether the cent-rounded `amount` can be deducted without going below zero.
    pub fn covers(&self, amount: Decimal) -> bool {
        self.balance >= round_cents(amount)
    }

    /// Holdings after receiving `amount`, `None` if the balance would exceed [`MAX_BALANCE`].
    pub(crate) fn credited(&self, amount: Decimal) -> Option<Holdings> {
        let (cents, remainder) = split_cents(amount);
        Holdings::checked(
            self.balance.checked_add(cents)?,
            self.fractions.checked_add(remainder)?,
        )
    }

    /// Holdings after paying out `amount`. Affordability is checked by [`Account::covers`].
    pub(crate) fn debited(&self, amount: Decimal) -> Option<Holdings> {
        let (cents, remainder) = split_cents(amount);
        Holdings::checked(
            self.balance.checked_sub(cents)?,
            self.fractions.checked_sub(remainder)?,
        )
    }

    pub(crate) fn apply(&mut self, holdings: Holdings) {
        self.balance = holdings.balance;
        self.fractions = holdings.fractions;
    }

    pub(crate) fn block(&mut self) {
        self.status = AccountStatus::Blocked;
    }

    pub(crate) fn activate(&mut self) {
        self.status = AccountStatus::Active;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn add(acc: &mut Account, amount: &str) {
        let holdings = acc.credited(dec(amount)).unwrap();
        acc.apply(holdings);
    }

    fn deduct(acc: &mut Account, amount: &str) {
        let holdings = acc.debited(dec(amount)).unwrap();
        acc.apply(holdings);
    }

    #[test]
    fn round_and_split() {
        assert_eq!(round_cents(dec("1.005")), dec("1.01"));
        assert_eq!(round_cents(dec("-1.005")), dec("-1.01"));
        assert_eq!(round_cents(dec("1.004")), dec("1.00"));
        assert_eq!(split_cents(dec("23.456")), (dec("23.46"), dec("-0.004")));
        assert_eq!(split_cents(dec("10")), (dec("10"), Decimal::ZERO));
    }

    #[test]
    fn new_account_is_active_and_empty() {
        let acc = Account::new("BY17ALFA10000000000000000000".into(), AccountKind::Ordinary);
        assert_eq!(acc.status(), AccountStatus::Active);
        assert_eq!(acc.kind(), AccountKind::Ordinary);
        assert_eq!(acc.balance(), Decimal::ZERO);
        assert_eq!(acc.fractions(), Decimal::ZERO);
        assert!(!acc.covers(dec("0.01")));
        assert!(acc.covers(Decimal::ZERO));
        // rounds down to zero cents
        assert!(acc.covers(dec("0.004")));
    }

    #[test]
    fn fractions_accumulate() {
        let mut acc = Account::new("BY17ALFA10000000000000000000".into(), AccountKind::Ordinary);
        for _ in 0..3 {
            add(&mut acc, "0.333");
        }
        assert_eq!(acc.balance(), dec("0.99"));
        assert_eq!(acc.fractions(), dec("0.009"));
        assert_eq!(acc.exact_balance(), dec("0.999"));

        deduct(&mut acc, "0.505");
        assert_eq!(acc.balance(), dec("0.48"));
        assert_eq!(acc.fractions(), dec("0.014"));
        assert_eq!(acc.exact_balance(), dec("0.494"));
    }

    #[test]
    fn add_then_deduct_restores_state() {
        let mut acc = Account::new("BY17ALFA10000000000000000000".into(), AccountKind::Emission);
        add(&mut acc, "250");
        let before = acc.clone();
        add(&mut acc, "17.4567");
        deduct(&mut acc, "17.4567");
        assert_eq!(acc, before);
    }

    #[test]
    fn balance_is_capped() {
        let mut acc = Account::new("BY17ALFA10000000000000000000".into(), AccountKind::Emission);
        let full = acc.credited(MAX_BALANCE).unwrap();
        acc.apply(full);
        assert_eq!(acc.balance(), MAX_BALANCE);
        assert_eq!(acc.credited(dec("0.01")), None);
        assert_eq!(acc.credited(Decimal::MAX), None);
        // sub-cent amounts round away and still fit
        assert!(acc.credited(dec("0.004")).is_some());

        let empty = Account::new("BY17ALFA10000000000000000000".into(), AccountKind::Ordinary);
        assert_eq!(empty.credited(Decimal::MAX), None);
        assert_eq!(empty.credited(MAX_BALANCE).map(|h| h.balance), Some(MAX_BALANCE));
    }

    #[test]
    fn block_and_activate() {
        let mut acc = Account::new("BY17ALFA10000000000000000000".into(), AccountKind::Ordinary);
        acc.block();
        assert!(acc.is_blocked());
        acc.block();
        assert!(acc.is_blocked());
        acc.activate();
        assert_eq!(acc.status(), AccountStatus::Active);
    }
}
