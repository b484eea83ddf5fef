//! Demonstration of the ledger: a fixed sequence of use cases, some of them
//! executed from many threads at once.

use std::{
    fmt::Write as _,
    io::Write,
    panic,
    thread::{self, ScopedJoinHandle},
};

use anyhow::Result;
use rand::{Rng, seq::SliceRandom};
use rust_decimal::Decimal;

use crate::{
    envelope::{AccountDetails, TransferRequest},
    ledger::{AccountRepository, LedgerError},
    locale::Locale,
    service::AccountService,
};

pub const PARALLEL_OPENINGS: usize = 20;
pub const PARALLEL_TRANSFERS: usize = 100;

struct Report {
    text: String,
    locale: Locale,
}

impl Report {
    fn new(locale: Locale, title: &str) -> Self {
        Self {
            text: format!("{title}\n"),
            locale,
        }
    }

    fn line(&mut self, line: impl std::fmt::Display) {
        let _ = writeln!(self.text, "{line}");
    }

    fn error(&mut self, err: &LedgerError) {
        let message = self.locale.error_message(err.kind());
        self.line(format_args!("Error: {message}"));
    }

    fn finish(self) -> String {
        self.text
    }
}

/// Report of a use case run on its own thread. A panic in the use case is
/// propagated to the caller instead of losing the report.
fn joined(handle: ScopedJoinHandle<'_, String>) -> String {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}

/// Random amount in `[0, max)` with sub-cent precision.
fn random_amount<R: Rng>(rng: &mut R, max: u32) -> Decimal {
    Decimal::new(rng.random_range(0..i64::from(max) * 1000), 3)
}

pub fn run_demo<R, W>(service: &AccountService<R>, output: &mut W, locale: Locale) -> Result<()>
where
    R: AccountRepository,
    W: Write,
{
    let emission = service.emission_iban()?;
    let destruction = service.destruction_iban()?;

    let mut reports = vec![
        special_iban(locale, "Use case 1: emission account IBAN", service.emission_iban()),
        special_iban(
            locale,
            "Use case 2: destruction account IBAN",
            service.destruction_iban(),
        ),
        failed_top_up(service, locale, &emission),
    ];

    let sender = emission.as_str();
    reports.extend(thread::scope(|s| {
        let handles: Vec<_> = (0..PARALLEL_OPENINGS)
            .map(|_| s.spawn(move || successful_top_up(service, locale, sender)))
            .collect();
        handles.into_iter().map(joined).collect::<Vec<_>>()
    }));

    reports.push(zero_balance_opening(service, locale));
    reports.push(failed_destruction(service, locale, &emission));
    reports.push(successful_emission(service, locale));
    reports.push(successful_destruction(service, locale, &emission));
    reports.push(successful_transfer(service, locale, &emission, &destruction));
    reports.push(blocked_transfer(service, locale, &emission, &destruction));

    reports.extend(thread::scope(|s| {
        let handles: Vec<_> = (0..PARALLEL_TRANSFERS)
            .map(|_| s.spawn(move || random_envelope_transfer(service, locale)))
            .collect();
        handles.into_iter().map(joined).collect::<Vec<_>>()
    }));

    reports.push(listing(service, locale));

    for report in reports {
        writeln!(output, "{report}")?;
    }
    Ok(())
}

fn special_iban(locale: Locale, title: &str, iban: Result<String, LedgerError>) -> String {
    let mut report = Report::new(locale, title);
    match iban {
        Ok(iban) => report.line(format_args!("IBAN: {iban}")),
        Err(err) => report.error(&err),
    }
    report.finish()
}

fn failed_top_up<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
    emission: &str,
) -> String {
    let mut report = Report::new(
        locale,
        "Use case 3: opening an account and topping it up with a negative amount",
    );
    let result = service.open_account().and_then(|acc| {
        service.transfer_money(emission, acc.iban(), Decimal::new(-2348, 2))
    });
    if let Err(err) = result {
        report.error(&err);
    }
    report.finish()
}

fn successful_top_up<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
    emission: &str,
) -> String {
    let mut report = Report::new(locale, "Use case 4: opening an account and topping it up");
    let amount = random_amount(&mut rand::rng(), 1000);
    let result = service.open_account().and_then(|acc| {
        service.emit_money(amount)?;
        service.transfer_money(emission, acc.iban(), amount)?;
        Ok(acc)
    });
    match result {
        Ok(acc) => report.line(format_args!("IBAN {}: {:.2}", acc.iban(), amount)),
        Err(err) => report.error(&err),
    }
    report.finish()
}

fn zero_balance_opening<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
) -> String {
    let mut report = Report::new(locale, "Use case 5: opening an account with zero balance");
    match service.open_account() {
        Ok(acc) => report.line(format_args!("IBAN {}: {:.2}", acc.iban(), acc.balance())),
        Err(err) => report.error(&err),
    }
    report.finish()
}

fn failed_destruction<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
    emission: &str,
) -> String {
    let mut report = Report::new(locale, "Use case 6: destructing a negative amount");
    if let Err(err) = service.destruct_money(emission, Decimal::from(-10000)) {
        report.error(&err);
    }
    report.finish()
}

fn successful_emission<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
) -> String {
    let mut report = Report::new(locale, "Use case 7: emitting money");
    let amount = Decimal::from(250);
    match service.emit_money(amount) {
        Ok(()) => report.line(format_args!("Money emitted: {amount:.2}")),
        Err(err) => report.error(&err),
    }
    report.finish()
}

fn successful_destruction<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
    emission: &str,
) -> String {
    let mut report = Report::new(locale, "Use case 8: destructing money");
    let amount = Decimal::from(10);
    match service.destruct_money(emission, amount) {
        Ok(()) => report.line(format_args!("Money destructed from {emission}: {amount:.2}")),
        Err(err) => report.error(&err),
    }
    report.finish()
}

fn successful_transfer<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
    sender: &str,
    recipient: &str,
) -> String {
    let mut report = Report::new(locale, "Use case 9: transferring money between accounts");
    let amount = Decimal::from(50);
    match service.transfer_money(sender, recipient, amount) {
        Ok(()) => report.line(format_args!(
            "Money transfer from {sender} to {recipient}: {amount:.2}"
        )),
        Err(err) => report.error(&err),
    }
    report.finish()
}

fn blocked_transfer<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
    sender: &str,
    recipient: &str,
) -> String {
    let mut report = Report::new(
        locale,
        "Use case 10: transferring money from a blocked account",
    );
    if let Err(err) = service.block_account(sender) {
        report.error(&err);
        return report.finish();
    }
    if let Err(err) = service.transfer_money(sender, recipient, Decimal::from(50)) {
        report.error(&err);
    }
    // lift the block so that later use cases are not affected
    if let Err(err) = service.activate_account(sender) {
        report.error(&err);
    }
    report.finish()
}

fn random_envelope_transfer<R: AccountRepository>(
    service: &AccountService<R>,
    locale: Locale,
) -> String {
    let mut report = Report::new(
        locale,
        "Use case 11: transferring money between two random accounts",
    );
    let listing = service.list_accounts_envelope().and_then(|json| {
        serde_json::from_str::<Vec<AccountDetails>>(&json).map_err(LedgerError::MalformedRequest)
    });
    let mut accounts = match listing {
        Ok(accounts) => accounts,
        Err(err) => {
            report.error(&err);
            return report.finish();
        }
    };
    if accounts.len() < 4 {
        report.line("Error: not enough ordinary accounts");
        return report.finish();
    }

    let mut rng = rand::rng();
    let ordinary = &mut accounts[2..];
    ordinary.shuffle(&mut rng);
    let request = TransferRequest {
        sender: ordinary[0].iban.clone(),
        recipient: ordinary[1].iban.clone(),
        amount: random_amount(&mut rng, 100),
    };
    let json = match serde_json::to_string(&request) {
        Ok(json) => json,
        Err(err) => {
            report.line(format_args!("Error: {err}"));
            return report.finish();
        }
    };
    report.line(format_args!("JSON: {json}"));

    match service.transfer_money_from_envelope(&json) {
        Ok(()) => report.line(format_args!(
            "Money transfer from {} to {}: {:.2}",
            request.sender, request.recipient, request.amount
        )),
        Err(err) => report.error(&err),
    }
    report.finish()
}

fn listing<R: AccountRepository>(service: &AccountService<R>, locale: Locale) -> String {
    let mut report = Report::new(locale, "Use case 12: all accounts");
    match service.list_accounts_envelope() {
        Ok(json) => report.line(json),
        Err(err) => report.error(&err),
    }
    report.finish()
}
