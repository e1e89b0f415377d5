use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{DEFAULT_HEADERS, DEFAULT_TIMESTAMP_FORMAT};
use crate::message::DEFAULT_LEAD_EMOJI;
use crate::recognition::{Recognition, RecognitionCatalog};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub slack: SlackConfig,
    pub server: ServerConfig,
    pub sheets: SheetsConfig,
    pub recognition: RecognitionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: SecretString,
    pub signing_secret: SecretString,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub enabled: bool,
    pub spreadsheet_id: Option<String>,
    pub credentials_path: PathBuf,
    pub auto_create_headers: bool,
    pub headers: Vec<String>,
    pub timestamp_format: String,
}

impl SheetsConfig {
    /// The sheet id when logging is switched on and configured.
    pub fn active_spreadsheet_id(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.spreadsheet_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct RecognitionConfig {
    pub default_emoji: String,
    pub catalog: RecognitionCatalog,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub slack_bot_token: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub server_port: Option<u16>,
    pub sheets_enabled: Option<bool>,
    pub sheets_spreadsheet_id: Option<String>,
    pub sheets_credentials_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack: SlackConfig {
                bot_token: String::new().into(),
                signing_secret: String::new().into(),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                graceful_shutdown_secs: 15,
            },
            sheets: SheetsConfig {
                enabled: true,
                spreadsheet_id: None,
                credentials_path: PathBuf::from("credentials.json"),
                auto_create_headers: true,
                headers: DEFAULT_HEADERS.iter().map(|header| header.to_string()).collect(),
                timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            },
            recognition: RecognitionConfig {
                default_emoji: DEFAULT_LEAD_EMOJI.to_string(),
                catalog: RecognitionCatalog::default(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("kudos.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(slack) = patch.slack {
            if let Some(bot_token) = slack.bot_token {
                self.slack.bot_token = secret_value(bot_token);
            }
            if let Some(signing_secret) = slack.signing_secret {
                self.slack.signing_secret = secret_value(signing_secret);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(sheets) = patch.sheets {
            if let Some(enabled) = sheets.enabled {
                self.sheets.enabled = enabled;
            }
            if let Some(spreadsheet_id) = sheets.spreadsheet_id {
                self.sheets.spreadsheet_id = Some(spreadsheet_id);
            }
            if let Some(credentials_path) = sheets.credentials_path {
                self.sheets.credentials_path = credentials_path;
            }
            if let Some(auto_create_headers) = sheets.auto_create_headers {
                self.sheets.auto_create_headers = auto_create_headers;
            }
            if let Some(headers) = sheets.headers {
                self.sheets.headers = headers;
            }
            if let Some(timestamp_format) = sheets.timestamp_format {
                self.sheets.timestamp_format = timestamp_format;
            }
        }

        if let Some(recognition) = patch.recognition {
            if let Some(default_emoji) = recognition.default_emoji {
                self.recognition.default_emoji = default_emoji;
            }
            if let Some(types) = recognition.types {
                self.recognition.catalog = RecognitionCatalog::new(types);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("KUDOS_SLACK_BOT_TOKEN").or_else(|| read_env("SLACK_BOT_TOKEN"))
        {
            self.slack.bot_token = secret_value(value);
        }
        let signing_secret =
            read_env("KUDOS_SLACK_SIGNING_SECRET").or_else(|| read_env("SLACK_SIGNING_SECRET"));
        if let Some(value) = signing_secret {
            self.slack.signing_secret = secret_value(value);
        }

        if let Some(value) = read_env("KUDOS_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("KUDOS_SERVER_PORT") {
            self.server.port = parse_u16("KUDOS_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("KUDOS_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("KUDOS_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("KUDOS_SHEETS_ENABLED") {
            self.sheets.enabled = parse_bool("KUDOS_SHEETS_ENABLED", &value)?;
        }
        let spreadsheet_id =
            read_env("KUDOS_SHEETS_SPREADSHEET_ID").or_else(|| read_env("GOOGLE_SHEET_ID"));
        if let Some(value) = spreadsheet_id {
            self.sheets.spreadsheet_id = Some(value);
        }
        let credentials_path =
            read_env("KUDOS_SHEETS_CREDENTIALS_PATH").or_else(|| read_env("GOOGLE_CREDENTIALS_PATH"));
        if let Some(value) = credentials_path {
            self.sheets.credentials_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("KUDOS_SHEETS_AUTO_CREATE_HEADERS") {
            self.sheets.auto_create_headers = parse_bool("KUDOS_SHEETS_AUTO_CREATE_HEADERS", &value)?;
        }
        if let Some(value) = read_env("KUDOS_SHEETS_TIMESTAMP_FORMAT") {
            self.sheets.timestamp_format = value;
        }

        if let Some(value) = read_env("KUDOS_RECOGNITION_DEFAULT_EMOJI") {
            self.recognition.default_emoji = value;
        }

        let log_level = read_env("KUDOS_LOGGING_LEVEL").or_else(|| read_env("KUDOS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("KUDOS_LOGGING_FORMAT").or_else(|| read_env("KUDOS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bot_token) = overrides.slack_bot_token {
            self.slack.bot_token = secret_value(bot_token);
        }
        if let Some(signing_secret) = overrides.slack_signing_secret {
            self.slack.signing_secret = secret_value(signing_secret);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(enabled) = overrides.sheets_enabled {
            self.sheets.enabled = enabled;
        }
        if let Some(spreadsheet_id) = overrides.sheets_spreadsheet_id {
            self.sheets.spreadsheet_id = Some(spreadsheet_id);
        }
        if let Some(credentials_path) = overrides.sheets_credentials_path {
            self.sheets.credentials_path = credentials_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_slack(&self.slack)?;
        validate_server(&self.server)?;
        validate_sheets(&self.sheets)?;
        validate_recognition(&self.recognition)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("kudos.toml"), PathBuf::from("config/kudos.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    let bot_token = slack.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.bot_token is required. Get it from https://api.slack.com/apps > Your App > OAuth & Permissions > Bot User OAuth Token".to_string()
        ));
    }
    if !bot_token.starts_with("xoxb-") {
        let hint = if bot_token.starts_with("xapp-") {
            " (hint: you may have used the app-level token instead of the bot token)"
        } else {
            ""
        };
        return Err(ConfigError::Validation(format!(
            "slack.bot_token must start with `xoxb-`{hint}. Get it from https://api.slack.com/apps"
        )));
    }

    if slack.signing_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.signing_secret is required. Get it from https://api.slack.com/apps > Your App > Basic Information > Signing Secret".to_string()
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_sheets(sheets: &SheetsConfig) -> Result<(), ConfigError> {
    if !sheets.enabled {
        return Ok(());
    }

    if sheets.headers.is_empty() {
        return Err(ConfigError::Validation(
            "sheets.headers must list at least one column when sheets logging is enabled"
                .to_string(),
        ));
    }

    let invalid_format = sheets.timestamp_format.trim().is_empty()
        || StrftimeItems::new(&sheets.timestamp_format).any(|item| matches!(item, Item::Error));
    if invalid_format {
        return Err(ConfigError::Validation(format!(
            "sheets.timestamp_format `{}` is not a valid strftime format",
            sheets.timestamp_format
        )));
    }

    Ok(())
}

fn validate_recognition(recognition: &RecognitionConfig) -> Result<(), ConfigError> {
    if recognition.default_emoji.trim().is_empty() {
        return Err(ConfigError::Validation(
            "recognition.default_emoji must not be empty".to_string(),
        ));
    }

    if recognition.catalog.is_empty() {
        return Err(ConfigError::Validation(
            "recognition.types must define at least one recognition type".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in recognition.catalog.entries() {
        if entry.key.trim().is_empty() || entry.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "recognition.types entries need a non-empty key and title".to_string(),
            ));
        }
        if !seen.insert(entry.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "recognition.types contains duplicate key `{}`",
                entry.key
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    slack: Option<SlackPatch>,
    server: Option<ServerPatch>,
    sheets: Option<SheetsPatch>,
    recognition: Option<RecognitionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    bot_token: Option<String>,
    signing_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetsPatch {
    enabled: Option<bool>,
    spreadsheet_id: Option<String>,
    credentials_path: Option<PathBuf>,
    auto_create_headers: Option<bool>,
    headers: Option<Vec<String>>,
    timestamp_format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RecognitionPatch {
    default_emoji: Option<String>,
    types: Option<Vec<Recognition>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
