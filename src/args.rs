//! These structs provide the CLI interface for the shop CLI.
//!
//! Quantities and prices are taken as raw strings and validated by the command handlers, so that
//! a bad value is reported as invalid input with the offending text rather than a clap error.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// shop: A command-line tool for tracking a small shop's stock and sales.
///
/// Record incoming stock with `shop add`, record sales with `shop sell`, and look at what is left
/// and what sold each day with `shop report`. The data lives in a SQLite file in the shop home
/// directory, which you create once with `shop init`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty ledger.
    ///
    /// This is the first command you should run. Decide where the data should live and pass it
    /// as --shop-home (default $HOME/shop). The passphrase you give here is the one `shop clear`
    /// asks for.
    Init(InitArgs),
    /// Record incoming stock, optionally with the price it was bought at.
    Add(AddArgs),
    /// Record a sale. Fails if there is not enough stock.
    Sell(SellArgs),
    /// Show the stock on hand and total quantity sold for one commodity.
    Search(SearchArgs),
    /// Show every commodity and its stock on hand.
    Unsold,
    /// Show sales per commodity for each day, most recent first.
    Progress,
    /// Show both the unsold listing and the daily sales progress.
    Report,
    /// Print a WhatsApp link that opens a chat with the full report pre-filled.
    Share,
    /// Delete every sales record on the most recent day in the log. Stock is not restored.
    Clear(ClearArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the shop data and configuration is held. Defaults to ~/shop
    #[arg(long, env = "SHOP_HOME", default_value_t = default_shop_home())]
    shop_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, shop_home: PathBuf) -> Self {
        Self {
            log_level,
            shop_home: shop_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn shop_home(&self) -> &DisplayPath {
        &self.shop_home
    }
}

/// Args for the `shop init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The name shown at the top of shared reports.
    #[arg(long)]
    shop_name: Option<String>,

    /// The passphrase required to clear a report. Defaults to 1234.
    #[arg(long)]
    passphrase: Option<String>,
}

impl InitArgs {
    pub fn new(shop_name: Option<String>, passphrase: Option<String>) -> Self {
        Self {
            shop_name,
            passphrase,
        }
    }

    pub fn shop_name(&self) -> Option<&str> {
        self.shop_name.as_deref()
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }
}

/// Args for the `shop add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The commodity name. Names are case-sensitive.
    name: String,

    /// How many units arrived. A whole number.
    quantity: String,

    /// The order price per unit. If it is not a valid number it is ignored and the stock is still
    /// added.
    #[arg(long)]
    price: Option<String>,
}

impl AddArgs {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        price: Option<impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            price: price.map(Into::into),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn price(&self) -> Option<&str> {
        self.price.as_deref()
    }
}

/// Args for the `shop sell` command.
#[derive(Debug, Parser, Clone)]
pub struct SellArgs {
    /// The commodity name.
    name: String,

    /// How many units were sold. A whole number.
    quantity: String,

    /// The price per unit.
    price: String,
}

impl SellArgs {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn price(&self) -> &str {
        &self.price
    }
}

/// Args for the `shop search` command.
#[derive(Debug, Parser, Clone)]
pub struct SearchArgs {
    /// The commodity name to look up.
    name: String,
}

impl SearchArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Args for the `shop clear` command.
#[derive(Debug, Parser, Clone)]
pub struct ClearArgs {
    /// The passphrase set in config.json.
    #[arg(long, env = "SHOP_PASSPHRASE", hide_env_values = true)]
    passphrase: String,
}

impl ClearArgs {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

fn default_shop_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("shop"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --shop-home or SHOP_HOME instead of relying on the default \
                shop home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("shop")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
