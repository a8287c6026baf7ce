use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::remote::ssh::{KeySource, MysqlLogin, SshTarget};

/// `[ssh]` block from config.toml: the jump host the mysql client runs on.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct SshConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub private_key_path: Option<PathBuf>,
    pub private_key_command: Option<String>,
}

/// `[mysql]` block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct MysqlConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub database: Option<String>,
    pub password: Option<String>,
    pub password_command: Option<String>,
}

/// Top-level castsearch config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct CastConfig {
    pub genre_map: Option<PathBuf>,
    pub ssh: Option<SshConfig>,
    pub mysql: Option<MysqlConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required settings: {} (set them in the environment or ~/.castsearch/config.toml)", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {setting}: {message}")]
    Invalid {
        setting: &'static str,
        message: String,
    },

    #[error("{setting} command failed: {message}")]
    Command {
        setting: &'static str,
        message: String,
    },
}

impl CastConfig {
    /// Load config from ~/.castsearch/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(CastConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: CastConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Display config with secrets redacted.
    pub fn display_redacted(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref path) = self.genre_map {
            lines.push(format!("genre_map = \"{}\"", path.display()));
        }
        if let Some(ref ssh) = self.ssh {
            lines.push("[ssh]".to_string());
            push_opt(&mut lines, "host", ssh.host.as_deref());
            push_opt(&mut lines, "user", ssh.user.as_deref());
            if let Some(port) = ssh.port {
                lines.push(format!("  port = {port}"));
            }
            if let Some(ref path) = ssh.private_key_path {
                lines.push(format!("  private_key_path = \"{}\"", path.display()));
            }
            push_opt(&mut lines, "private_key_command", ssh.private_key_command.as_deref());
        }
        if let Some(ref mysql) = self.mysql {
            lines.push("[mysql]".to_string());
            push_opt(&mut lines, "host", mysql.host.as_deref());
            push_opt(&mut lines, "user", mysql.user.as_deref());
            push_opt(&mut lines, "database", mysql.database.as_deref());
            if let Some(ref password) = mysql.password {
                lines.push(format!("  password = \"{}\"", redact(password)));
            }
            push_opt(&mut lines, "password_command", mysql.password_command.as_deref());
        }
        if lines.is_empty() {
            lines.push("(no settings configured)".to_string());
        }
        lines.join("\n")
    }
}

fn push_opt(lines: &mut Vec<String>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        lines.push(format!("  {key} = \"{v}\""));
    }
}

fn redact(secret: &str) -> String {
    if secret.chars().count() > 8 {
        let head: String = secret.chars().take(2).collect();
        format!("{head}...")
    } else {
        "****".to_string()
    }
}

/// Connection values given on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub ssh_host: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_port: Option<u16>,
    pub ssh_key_path: Option<PathBuf>,
    pub mysql_host: Option<String>,
    pub mysql_user: Option<String>,
    pub mysql_database: Option<String>,
}

/// Everything needed to reach the database over SSH.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub target: SshTarget,
    pub login: MysqlLogin,
}

impl ConnectionSettings {
    /// Resolve from flags, the process environment and the config file.
    pub fn resolve(cli: &ConnectionOverrides, config: &CastConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(cli, config, |name| std::env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup. Every missing value is
    /// reported in one error so the user can fix them all at once.
    pub fn resolve_with<E>(cli: &ConnectionOverrides, config: &CastConfig, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let ssh = config.ssh.clone().unwrap_or_default();
        let mysql = config.mysql.clone().unwrap_or_default();
        let mut missing = Vec::new();

        let mut required = |name: &'static str, value: Option<String>| -> String {
            value.unwrap_or_else(|| {
                missing.push(name);
                String::new()
            })
        };

        let mysql_host = required(
            "MYSQL_HOST",
            resolve_setting(cli.mysql_host.as_deref(), "MYSQL_HOST", &env, mysql.host.as_deref(), None)?,
        );
        let mysql_user = required(
            "MYSQL_USER",
            resolve_setting(cli.mysql_user.as_deref(), "MYSQL_USER", &env, mysql.user.as_deref(), None)?,
        );
        let mysql_password = required(
            "MYSQL_PASSWORD",
            resolve_setting(
                None,
                "MYSQL_PASSWORD",
                &env,
                mysql.password.as_deref(),
                mysql.password_command.as_deref(),
            )?,
        );
        let mysql_database = required(
            "MYSQL_DATABASE",
            resolve_setting(
                cli.mysql_database.as_deref(),
                "MYSQL_DATABASE",
                &env,
                mysql.database.as_deref(),
                None,
            )?,
        );
        let ssh_host = required(
            "EC2_HOSTNAME",
            resolve_setting(cli.ssh_host.as_deref(), "EC2_HOSTNAME", &env, ssh.host.as_deref(), None)?,
        );
        let ssh_user = required(
            "EC2_USERNAME",
            resolve_setting(cli.ssh_user.as_deref(), "EC2_USERNAME", &env, ssh.user.as_deref(), None)?,
        );

        // Key: flag path > inline key in env > key path in env/config > key command
        let key = if let Some(ref path) = cli.ssh_key_path {
            Some(KeySource::Path(path.clone()))
        } else if let Some(material) = non_empty(env("EC2_PRIVATE_KEY")) {
            Some(KeySource::Inline(material))
        } else if let Some(path) = non_empty(env("EC2_PRIVATE_KEY_PATH"))
            .map(PathBuf::from)
            .or_else(|| ssh.private_key_path.clone())
        {
            Some(KeySource::Path(path))
        } else if let Some(ref cmd) = ssh.private_key_command {
            Some(KeySource::Inline(run_secret_command("EC2_PRIVATE_KEY", cmd)?))
        } else {
            None
        };

        // Port: flag > EC2_PORT > config
        let port = match cli.ssh_port {
            Some(p) => Some(p),
            None => match non_empty(env("EC2_PORT")) {
                Some(raw) => Some(raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                    setting: "EC2_PORT",
                    message: e.to_string(),
                })?),
                None => ssh.port,
            },
        };

        let Some(key) = key else {
            missing.push("EC2_PRIVATE_KEY");
            return Err(ConfigError::Missing(missing));
        };
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(ConnectionSettings {
            target: SshTarget {
                host: ssh_host,
                user: ssh_user,
                port,
                key,
            },
            login: MysqlLogin {
                host: mysql_host,
                user: mysql_user,
                password: mysql_password,
                database: mysql_database,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Resolve one setting through the chain: CLI flag > env var > config key > config command.
pub fn resolve_setting<E>(
    cli_flag: Option<&str>,
    env_var_name: &'static str,
    env: &E,
    config_value: Option<&str>,
    config_command: Option<&str>,
) -> Result<Option<String>, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    // 1. CLI flag
    if let Some(v) = cli_flag.filter(|v| !v.is_empty()) {
        return Ok(Some(v.to_string()));
    }

    // 2. Environment variable
    if let Some(v) = non_empty(env(env_var_name)) {
        return Ok(Some(v));
    }

    // 3. Config file value
    if let Some(v) = config_value.filter(|v| !v.is_empty()) {
        return Ok(Some(v.to_string()));
    }

    // 4. External command
    if let Some(cmd) = config_command.filter(|c| !c.is_empty()) {
        return run_secret_command(env_var_name, cmd).map(Some);
    }

    Ok(None)
}

/// Run a secret-manager command through `sh -c` and return its trimmed stdout.
fn run_secret_command(setting: &'static str, cmd: &str) -> Result<String, ConfigError> {
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .output()
        .map_err(|e| ConfigError::Command {
            setting,
            message: format!("failed to run `{cmd}`: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConfigError::Command {
            setting,
            message: format!(
                "exit {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        });
    }

    let secret = String::from_utf8(output.stdout)
        .map_err(|_| ConfigError::Command {
            setting,
            message: "output is not valid UTF-8".to_string(),
        })?
        .trim()
        .to_string();

    if secret.is_empty() {
        return Err(ConfigError::Command {
            setting,
            message: "command printed nothing".to_string(),
        });
    }
    Ok(secret)
}

/// Directory holding config and the default genre mapping: ~/.castsearch
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".castsearch"))
}

/// Path to the config file: ~/.castsearch/config.toml
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Genre mapping path: flag/env > config file > ~/.castsearch/product_genre_mapping.json.
/// The flag is `true` when the path was chosen explicitly.
pub fn genre_map_path(cli: Option<&Path>, config: &CastConfig) -> Result<(PathBuf, bool)> {
    if let Some(path) = cli {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(ref path) = config.genre_map {
        return Ok((path.clone(), true));
    }
    Ok((config_dir()?.join("product_genre_mapping.json"), false))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.castsearch/config.toml
# Resolution order: CLI flag > env var > value here > *_command here

# genre_map = "/path/to/product_genre_mapping.json"

[ssh]
# host = "bastion.example.com"          # EC2_HOSTNAME
# user = "ec2-user"                     # EC2_USERNAME
# private_key_path = "~/.ssh/casting.pem"  # EC2_PRIVATE_KEY_PATH (or key text in EC2_PRIVATE_KEY)
# private_key_command = "your-secrets-manager-command-here"

[mysql]
# host = "db.internal"                  # MYSQL_HOST
# user = "readonly"                     # MYSQL_USER
# database = "handy_casting"            # MYSQL_DATABASE
# password_command = "your-secrets-manager-command-here"  # or MYSQL_PASSWORD
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}
