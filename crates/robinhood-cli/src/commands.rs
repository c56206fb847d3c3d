//! Subcommand handlers.
//!
//! Data commands print their result as pretty JSON on stdout. Commands that
//! need an account log in first, reusing the saved token when it is valid.

use anyhow::{Context, Result};
use robinhood_core::utils::round_price;
use robinhood_core::{LoginOptions, PriceType, RobinhoodClient};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Commands, PriceArg};
use crate::config::Config;

pub async fn run(cli: Cli, client: RobinhoodClient, mut config: Config) -> Result<()> {
    let profile = cli.profile.clone().unwrap_or_else(|| config.profile.clone());
    let info = cli.info.as_deref();

    match cli.command {
        Commands::Login {
            email,
            by_email,
            no_store,
            expires_in,
        } => {
            let username = email.or_else(|| config.last_username.clone());
            let options = LoginOptions {
                username: username.clone(),
                password: std::env::var("ROBINHOOD_PASSWORD").ok(),
                mfa_code: std::env::var("ROBINHOOD_MFA_CODE").ok(),
                by_sms: config.by_sms && !by_email,
                store_session: !no_store,
                expires_in,
                profile: profile.clone(),
                ..LoginOptions::default()
            };
            let response = client.login(&options).await.context("Login failed")?;
            eprintln!("{}", response.detail);

            if username.is_some() {
                config.last_username = username;
            }
            config.profile = profile;
            config.save().context("Failed to save config")?;
        }
        Commands::Logout => {
            let store = client.credential_store();
            if store.exists(&profile) {
                store.delete(&profile).context("Failed to delete token file")?;
                info!(profile = %profile, "Deleted token file");
                eprintln!("Logged out.");
            } else {
                eprintln!("Not logged in.");
            }
        }
        Commands::Quotes { symbols } => {
            print_json(&client.get_quotes(&symbols, info).await)?;
        }
        Commands::Price {
            symbols,
            kind,
            extended,
            round,
        } => {
            let price_type = match kind {
                PriceArg::Ask => PriceType::Ask,
                PriceArg::Bid => PriceType::Bid,
                PriceArg::Last => PriceType::LastTrade {
                    include_extended_hours: extended,
                },
            };
            let prices = client.get_latest_price(&symbols, price_type).await;
            if round {
                let rounded: Vec<Option<f64>> = prices
                    .iter()
                    .map(|p| p.as_deref().and_then(|p| p.parse().ok()).map(round_price))
                    .collect();
                print_json(&rounded)?;
            } else {
                print_json(&prices)?;
            }
        }
        Commands::Instruments { symbols } => {
            print_json(&client.get_instruments_by_symbols(&symbols, info).await)?;
        }
        Commands::Markets => {
            print_json(&client.get_markets(info).await)?;
        }
        Commands::Hours { mic, date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            print_json(&client.get_market_hours(&mic.to_uppercase(), date, info).await)?;
        }
        Commands::Movers { direction } => {
            print_json(&client.get_top_movers_sp500(direction.as_str(), info).await)?;
        }
        Commands::Positions => {
            login_for_data(&client, &config, &profile).await?;
            print_json(&client.get_open_stock_positions(info).await?)?;
        }
        Commands::Account => {
            login_for_data(&client, &config, &profile).await?;
            print_json(&client.load_account_profile(info).await?)?;
        }
    }

    Ok(())
}

/// Log in with the saved token, falling back to the environment and prompts.
async fn login_for_data(client: &RobinhoodClient, config: &Config, profile: &str) -> Result<()> {
    let options = LoginOptions {
        username: std::env::var("ROBINHOOD_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone()),
        password: std::env::var("ROBINHOOD_PASSWORD").ok(),
        mfa_code: std::env::var("ROBINHOOD_MFA_CODE").ok(),
        by_sms: config.by_sms,
        profile: profile.to_string(),
        ..LoginOptions::default()
    };
    client.login(&options).await.context("Login failed")?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
