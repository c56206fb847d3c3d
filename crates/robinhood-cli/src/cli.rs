//! CLI argument definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

/// Query the Robinhood API from the command line.
#[derive(Parser, Debug)]
#[command(name = "robinhood")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to a file in the cache directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Token file profile
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Pick a single field out of each record
    #[arg(long, global = true)]
    pub info: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and save the access token
    Login {
        /// Account email; prompted for when missing
        #[arg(long, env = "ROBINHOOD_USERNAME")]
        email: Option<String>,

        /// Send verification codes by email instead of SMS
        #[arg(long)]
        by_email: bool,

        /// Do not reuse or save the token file
        #[arg(long)]
        no_store: bool,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = 86400)]
        expires_in: u64,
    },
    /// Delete the saved token for the profile
    Logout,
    /// Quotes for one or more tickers
    Quotes {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// Latest price for one or more tickers
    Price {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[arg(long, value_enum, default_value_t = PriceArg::Last)]
        kind: PriceArg,

        /// Use the extended-hours trade price when there is one
        #[arg(long)]
        extended: bool,

        /// Print rounded numbers instead of the API's decimal strings
        #[arg(long)]
        round: bool,
    },
    /// Instrument records for one or more tickers
    Instruments {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
    /// All markets
    Markets,
    /// Market hours for a day
    Hours {
        /// Market identifier code, e.g. XNYS
        mic: String,

        /// Day as YYYY-MM-DD, today when omitted
        date: Option<NaiveDate>,
    },
    /// Top S&P 500 movers
    Movers {
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Open stock positions
    Positions,
    /// Account profile
    Account,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceArg {
    Ask,
    Bid,
    Last,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}
