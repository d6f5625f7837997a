//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Database connection.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Journal posting configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Well-known ledger account codes.
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Document number prefixes.
    #[serde(default)]
    pub numbering: NumberingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite:...`).
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_database_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

impl DatabaseConfig {
    /// A private in-memory SQLite database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Returns true when the URL names an in-memory SQLite database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite:") && self.url.contains(":memory:")
    }

    /// Pool size to open. An in-memory database exists per connection, so it gets one.
    #[must_use]
    pub fn pool_size(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}

/// Journal posting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Username recorded on postings made without an interactive user.
    #[serde(default = "default_system_user")]
    pub system_user: String,
    /// Prefix of posted journal numbers.
    #[serde(default = "default_journal_prefix")]
    pub journal_prefix: String,
    /// Zero-padded width of the journal sequence.
    #[serde(default = "default_journal_width")]
    pub journal_width: usize,
}

fn default_system_user() -> String {
    "System".to_string()
}

fn default_journal_prefix() -> String {
    "JV".to_string()
}

fn default_journal_width() -> usize {
    6
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            system_user: default_system_user(),
            journal_prefix: default_journal_prefix(),
            journal_width: default_journal_width(),
        }
    }
}

/// Account codes the inventory adjustment posting resolves at post time.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// Inventory asset account.
    #[serde(default = "default_inventory_account")]
    pub inventory: String,
    /// Income account credited by stock surpluses.
    #[serde(default = "default_adjustment_income_account")]
    pub adjustment_income: String,
    /// Expense account debited by stock shortages.
    #[serde(default = "default_adjustment_expense_account")]
    pub adjustment_expense: String,
}

fn default_inventory_account() -> String {
    "1131".to_string()
}

fn default_adjustment_income_account() -> String {
    "4112".to_string()
}

fn default_adjustment_expense_account() -> String {
    "5112".to_string()
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            inventory: default_inventory_account(),
            adjustment_income: default_adjustment_income_account(),
            adjustment_expense: default_adjustment_expense_account(),
        }
    }
}

/// Document number prefixes, one per document type.
#[derive(Debug, Clone, Deserialize)]
pub struct NumberingConfig {
    /// Cash payment prefix.
    #[serde(default = "default_cash_payment_prefix")]
    pub cash_payment: String,
    /// Cash receipt prefix.
    #[serde(default = "default_cash_receipt_prefix")]
    pub cash_receipt: String,
    /// Cash transfer prefix.
    #[serde(default = "default_cash_transfer_prefix")]
    pub cash_transfer: String,
    /// Inventory adjustment prefix.
    #[serde(default = "default_adjustment_prefix")]
    pub inventory_adjustment: String,
}

fn default_cash_payment_prefix() -> String {
    "CP".to_string()
}

fn default_cash_receipt_prefix() -> String {
    "CR".to_string()
}

fn default_cash_transfer_prefix() -> String {
    "CT".to_string()
}

fn default_adjustment_prefix() -> String {
    "ADJ".to_string()
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            cash_payment: default_cash_payment_prefix(),
            cash_receipt: default_cash_receipt_prefix(),
            cash_transfer: default_cash_transfer_prefix(),
            inventory_adjustment: default_adjustment_prefix(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tally=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default.toml`,
    /// `config/{RUN_MODE}.toml`, then `TALLY__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
