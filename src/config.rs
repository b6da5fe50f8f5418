use crate::error::RelayError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub admin_id: i64,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub store_path: Option<PathBuf>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_file_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            RelayError::ConfigInvalid(format!(
                "Cannot read config at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            RelayError::ConfigInvalid(format!("Invalid TOML in {}: {}", config_path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.telegram_bot_token.is_empty() {
            anyhow::bail!("telegram_bot_token must not be empty");
        }
        if self.admin_id == 0 {
            anyhow::bail!("admin_id must be set to the administrator's chat id");
        }
        self.webhook_addr()?;
        if let Some(ref path) = self.store_path
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            anyhow::bail!(
                "store_path parent directory does not exist: {}",
                parent.display()
            );
        }
        Ok(())
    }

    pub fn webhook_addr(&self) -> Result<SocketAddr, RelayError> {
        self.listen_addr.parse().map_err(|e| {
            RelayError::ConfigInvalid(format!(
                "listen_addr {:?} is not a valid socket address: {}",
                self.listen_addr, e
            ))
        })
    }
}

fn config_file_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RelayError::ConfigInvalid("Cannot determine home directory".to_string()))?;
    Ok(home
        .join(".config")
        .join("alert-relay")
        .join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &std::path::Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_valid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "123:ABC"
            admin_id = 12345
            listen_addr = "127.0.0.1:9090"
            "#,
        );
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.telegram_bot_token, "123:ABC");
        assert_eq!(config.admin_id, 12345);
        assert_eq!(config.listen_addr, "127.0.0.1:9090");
        assert!(config.store_path.is_none());
    }

    #[test]
    fn listen_addr_defaults_to_port_8080() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "tok"
            admin_id = 1
            "#,
        );
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.webhook_addr().is_ok());
    }

    #[test]
    fn empty_token_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = ""
            admin_id = 1
            "#,
        );
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn zero_admin_id_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "tok"
            admin_id = 0
            "#,
        );
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("admin_id"));
    }

    #[test]
    fn unparseable_listen_addr_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "tok"
            admin_id = 1
            listen_addr = "not-an-address"
            "#,
        );
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("listen_addr"));
    }

    #[test]
    fn store_path_with_existing_parent_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = tmp.path().join("chats.json");
        let path = write_config(
            tmp.path(),
            &format!(
                "telegram_bot_token = \"tok\"\nadmin_id = 1\nstore_path = \"{}\"",
                store.display()
            ),
        );
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.store_path, Some(store));
    }

    #[test]
    fn store_path_with_nonexistent_parent_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
            telegram_bot_token = "tok"
            admin_id = 1
            store_path = "/nonexistent/dir/chats.json"
            "#,
        );
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("store_path parent directory"));
    }

    #[test]
    fn missing_config_file_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.toml");
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Cannot read config"));
    }
}
