// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::{ListRuntime, SharedBackend, render_page};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vitrine_api::{Client, ExportFormat};
use vitrine_app::{AppSession, ListColumn, ListKind, ScreenCommand, ScreenController};
use vitrine_testkit::DemoCatalog;

const LOG_ENV: &str = "VITRINE_LOG";
const DEMO_SEED: u64 = 42;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `vitrine --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_level())?;

    let today = OffsetDateTime::now_utc().date();
    let mut session = AppSession::start(config.current_user(), config.features());
    session.select_offerer(config.offerer());

    let backend: SharedBackend = if options.demo {
        let catalog = DemoCatalog::seeded(DEMO_SEED, today);
        if options.check_only {
            session.end();
            return Ok(());
        }
        let venues = match session.selected_offerer() {
            Some(offerer) => catalog.venues_of(offerer),
            None => catalog.venue_summaries(),
        };
        session.set_venues(venues);
        Arc::new(catalog)
    } else {
        let token = config.api_token();
        let client = Client::new(config.api_base_url(), config.api_timeout()?, token.as_deref())
            .with_context(|| {
                format!(
                    "invalid [api] config in {}; fix base_url/timeout values",
                    options.config_path.display()
                )
            })?;
        if options.check_only {
            session.end();
            return Ok(());
        }
        match client.list_venues(session.selected_offerer()) {
            Ok(venues) => session.set_venues(venues),
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "venue directory unavailable");
            }
        }
        Arc::new(client)
    };

    let mut screen = ScreenController::open(&session, options.list, &options.query, today)
        .with_page_size(config.page_size());
    ListRuntime::new(backend).load(&mut screen, session.venues())?;

    if let Some((column, descending)) = options.sort {
        screen.dispatch(ScreenCommand::SortBy(column));
        if descending {
            screen.dispatch(ScreenCommand::SortBy(column));
        }
    }
    if let Some(page) = options.page {
        screen.dispatch(ScreenCommand::GotoPage(page));
    }

    print!("{}", render_page(&screen));
    if let Some(format) = options.export {
        println!(
            "export: {}",
            vitrine_api::export_url(
                config.api_base_url(),
                screen.list(),
                format,
                &screen.export_query()
            )
        );
    }
    let failure = screen.last_error().cloned();
    session.end();

    match failure {
        Some(error) => bail!("{} list unavailable: {error}", screen.list().as_str()),
        None => Ok(()),
    }
}

/// `VITRINE_LOG` wins over the configured level; logs go to stderr so the
/// table on stdout stays clean.
fn init_logging(level: &str) -> Result<()> {
    let filter = match env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("parse {LOG_ENV}={directives:?}"))?,
        _ => EnvFilter::try_new(level).with_context(|| format!("parse log level {level:?}"))?,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("initialize logging")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    list: ListKind,
    query: String,
    page: Option<usize>,
    sort: Option<(ListColumn, bool)>,
    export: Option<ExportFormat>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        list: ListKind::IndividualOffers,
        query: String::new(),
        page: None,
        sort: None,
        export: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow!("--list requires offers, collective, templates or bookings")
                })?;
                options.list = ListKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown list {:?}; expected offers, collective, templates or bookings",
                        value.as_ref()
                    )
                })?;
            }
            "--query" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--query requires a query string"))?;
                options.query = value.as_ref().to_owned();
            }
            "--page" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--page requires a page number"))?;
                let page = value
                    .as_ref()
                    .parse::<usize>()
                    .ok()
                    .filter(|page| *page >= 1)
                    .ok_or_else(|| {
                        anyhow!("--page expects a number >= 1, got {:?}", value.as_ref())
                    })?;
                options.page = Some(page);
            }
            "--sort" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--sort requires a column"))?;
                options.sort = Some(parse_sort(value.as_ref())?);
            }
            "--export" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--export requires csv or xlsx"))?;
                options.export = Some(ExportFormat::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!("unknown export format {:?}; expected csv or xlsx", value.as_ref())
                })?);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

/// `column` or `column:desc`.
fn parse_sort(raw: &str) -> Result<(ListColumn, bool)> {
    let (name, descending) = match raw.split_once(':') {
        Some((name, "desc")) => (name, true),
        Some((name, "asc")) => (name, false),
        Some((_, direction)) => {
            bail!("unknown sort direction {direction:?}; use asc or desc")
        }
        None => (raw, false),
    };
    let column = ListColumn::parse(name).ok_or_else(|| {
        anyhow!(
            "unknown sort column {name:?}; use name, venue, event_date, stock, status or booked_at"
        )
    })?;
    Ok((column, descending))
}

fn print_help() {
    println!("vitrine");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against a seeded in-memory catalog");
    println!("  --check                  Validate config + API client setup");
    println!("  --list <kind>            offers (default), collective, templates or bookings");
    println!("  --query <qs>             Console query string, e.g. 'lieu=3&statut=active'");
    println!("  --page <n>               Page to show");
    println!("  --sort <col>[:desc]      Sort by name, venue, event_date, stock, status, booked_at");
    println!("  --export <csv|xlsx>      Also print the export link for the applied filters");
    println!("  --help                   Show this help");
}
