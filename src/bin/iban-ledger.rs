use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iban_ledger::{
    bin_utils::{OutputFormat, ScriptError, Service, scenario::run_demo},
    config::{DEFAULT_DESTRUCTION_IBAN, DEFAULT_EMISSION_IBAN, LedgerConfig},
    iban::{DEFAULT_COUNTRY_PREFIX, DEFAULT_MAX_ATTEMPTS},
    ledger::in_memory::InMemoryLedger,
    locale::Locale,
    service::AccountService,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// In-memory payments ledger with IBAN identified accounts
#[derive(Parser, Debug)]
#[command(name = "iban-ledger")]
struct Args {
    /// Language of status labels and error messages (en, ru)
    #[arg(long, default_value = "en")]
    locale: Locale,

    /// IBAN of the money emission account
    #[arg(long, default_value = DEFAULT_EMISSION_IBAN)]
    emission_iban: String,

    /// IBAN of the money destruction account
    #[arg(long, default_value = DEFAULT_DESTRUCTION_IBAN)]
    destruction_iban: String,

    /// Country prefix of opened accounts
    #[arg(long, default_value = DEFAULT_COUNTRY_PREFIX)]
    country_prefix: String,

    /// Maximum IBAN generation attempts per opened account
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_generation_attempts: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute an operation script (CSV) and print the resulting accounts
    Run {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Replay the demonstration use cases
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let locale = args.locale;
    let config = LedgerConfig {
        emission_iban: args.emission_iban,
        destruction_iban: args.destruction_iban,
        country_prefix: args.country_prefix,
        max_generation_attempts: args.max_generation_attempts,
        locale,
    };

    match args.command {
        Command::Run { file, format } => {
            let input = File::open(&file)
                .with_context(|| format!("Failed to open `{}`", file.display()))?;
            info!(file = %file.display(), "running script");

            let service = Service {
                input,
                output: &mut std::io::stdout(),
                config,
                format,
                error_printer: Box::new(move |line, err| match err {
                    ScriptError::LedgerErr(err) => {
                        eprintln!("Error at line {line}: {}", locale.error_message(err.kind()))
                    }
                    err => eprintln!("Error at line {line}: {err}"),
                }),
            };
            service.run()
        }
        Command::Demo => {
            let ledger = InMemoryLedger::new(&config).context("Failed to create the ledger")?;
            run_demo(&AccountService::new(ledger), &mut std::io::stdout(), locale)
        }
    }
}
