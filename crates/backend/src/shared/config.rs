use contracts::shared::branch_scope::{BranchInfo, BranchRegistry};
use contracts::shared::stock_status::StockPolicies;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub branches: Vec<BranchInfo>,
    #[serde(default)]
    pub stock_status: StockPolicies,
    #[serde(default)]
    pub rental: RentalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RentalConfig {
    /// Contracts ending within this many days are reported as expiring
    pub expiry_notice_days: i64,
}

impl Default for RentalConfig {
    fn default() -> Self {
        Self {
            expiry_notice_days: 30,
        }
    }
}

impl Config {
    /// Checks what serde cannot: registry consistency and policy cutoffs
    pub fn validate(&self) -> anyhow::Result<()> {
        self.branch_registry()?;
        self.stock_status
            .validate()
            .map_err(|e| anyhow::anyhow!("[stock_status] {}", e))?;
        if self.rental.expiry_notice_days < 0 {
            anyhow::bail!("[rental] expiry_notice_days must not be negative");
        }
        Ok(())
    }

    pub fn branch_registry(&self) -> anyhow::Result<BranchRegistry> {
        BranchRegistry::new(self.branches.clone()).map_err(|e| anyhow::anyhow!("[branches] {}", e))
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3000

[database]
path = "target/db/app.db"

[[branches]]
id = 1
name = "Bang Na"
province = "Bangkok"

[[branches]]
id = 2
name = "Rangsit"
province = "Pathum Thani"

[[branches]]
id = 3
name = "Korat"
province = "Nakhon Ratchasima"

[stock_status.default]
critical_percent = 20.0
warning_percent = 50.0
expiry_warning_days = 7

[stock_status.shops.quick_service]
critical_percent = 15.0
warning_percent = 50.0

[rental]
expiry_notice_days = 30
"#;

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    let db_path = Path::new(&config.database.path);

    if db_path.is_absolute() {
        return db_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(db_path);
        }
    }

    PathBuf::from(&config.database.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::enums::ShopKind;
    use contracts::shared::branch_scope::BranchRef;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.branches.len(), 3);
        assert_eq!(config.rental.expiry_notice_days, 30);
    }

    #[test]
    fn test_workspace_config_loads() {
        let config = parse_config(include_str!("../../../../config.toml")).unwrap();
        assert_eq!(config.branches.len(), 3);
        assert_eq!(
            config.stock_status.for_shop(ShopKind::QuickService).critical_percent,
            15.0
        );
    }

    #[test]
    fn test_numeric_and_string_branch_ids_resolve() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        let registry = config.branch_registry().unwrap();
        assert_eq!(registry.name_of(&BranchRef::parse("02").unwrap()), Some("Rangsit"));
    }

    #[test]
    fn test_shop_override_is_read() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        let policies = &config.stock_status;
        assert_eq!(policies.for_shop(ShopKind::QuickService).critical_percent, 15.0);
        assert_eq!(policies.for_shop(ShopKind::QuickService).expiry_warning_days, None);
        assert_eq!(policies.for_shop(ShopKind::Convenience).critical_percent, 20.0);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("[database]\npath = \"x.db\"\n").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.branches.is_empty());
        assert_eq!(config.stock_status.default.warning_percent, 50.0);
    }

    #[test]
    fn test_inverted_cutoffs_are_rejected() {
        let bad = r#"
[database]
path = "x.db"

[stock_status.default]
critical_percent = 60.0
warning_percent = 50.0
"#;
        assert!(parse_config(bad).is_err());
    }

    #[test]
    fn test_duplicate_branches_are_rejected() {
        let bad = r#"
[database]
path = "x.db"

[[branches]]
id = 1
name = "A"

[[branches]]
id = "01"
name = "B"
"#;
        assert!(parse_config(bad).is_err());
    }
}
