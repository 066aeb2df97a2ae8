use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hc_cli::commands::util::{date_or_today, load_services, parse_date};
use hc_cli::commands::{check, day, month, reschedule, week, year};
use hc_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let services = load_services(&config.services_path)?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Day { date, json } => {
            let date = date_or_today(date.as_deref())?;
            day::run(&mut stdout, &services, &config, date, *json)?;
        }
        Commands::Week { date, json } => {
            let date = date_or_today(date.as_deref())?;
            week::run(&mut stdout, &services, &config, date, *json)?;
        }
        Commands::Month { date, json } => {
            let date = date_or_today(date.as_deref())?;
            month::run(&mut stdout, &services, &config, date, *json)?;
        }
        Commands::Year { year: target, json } => {
            let target = target.unwrap_or_else(|| Local::now().year());
            year::run(&mut stdout, &services, target, *json)?;
        }
        Commands::Check => check::run(&mut stdout, &services)?,
        Commands::Move {
            id,
            date,
            hour,
            scope,
            apply,
        } => {
            let date = parse_date(date)?;
            reschedule::run(
                &mut stdout,
                &services,
                &config.services_path,
                id,
                date,
                *hour,
                *scope,
                *apply,
            )?;
        }
    }

    stdout.flush()?;
    Ok(())
}
