use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use kudos_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

/// One inspected setting: its dotted key, rendered value, and the env vars
/// that can set it, highest precedence first.
struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let sheets = &config.sheets;
    vec![
        Field {
            key: "slack.bot_token",
            value: redact_token(config.slack.bot_token.expose_secret()),
            env_keys: &["KUDOS_SLACK_BOT_TOKEN", "SLACK_BOT_TOKEN"],
        },
        Field {
            key: "slack.signing_secret",
            value: redact_secret(config.slack.signing_secret.expose_secret()),
            env_keys: &["KUDOS_SLACK_SIGNING_SECRET", "SLACK_SIGNING_SECRET"],
        },
        Field {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["KUDOS_SERVER_BIND_ADDRESS"],
        },
        Field {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["KUDOS_SERVER_PORT"],
        },
        Field {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["KUDOS_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Field {
            key: "sheets.enabled",
            value: sheets.enabled.to_string(),
            env_keys: &["KUDOS_SHEETS_ENABLED"],
        },
        Field {
            key: "sheets.spreadsheet_id",
            value: sheets.spreadsheet_id.clone().unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["KUDOS_SHEETS_SPREADSHEET_ID", "GOOGLE_SHEET_ID"],
        },
        Field {
            key: "sheets.credentials_path",
            value: sheets.credentials_path.display().to_string(),
            env_keys: &["KUDOS_SHEETS_CREDENTIALS_PATH", "GOOGLE_CREDENTIALS_PATH"],
        },
        Field {
            key: "sheets.auto_create_headers",
            value: sheets.auto_create_headers.to_string(),
            env_keys: &["KUDOS_SHEETS_AUTO_CREATE_HEADERS"],
        },
        Field { key: "sheets.headers", value: sheets.headers.join(", "), env_keys: &[] },
        Field {
            key: "sheets.timestamp_format",
            value: sheets.timestamp_format.clone(),
            env_keys: &["KUDOS_SHEETS_TIMESTAMP_FORMAT"],
        },
        Field {
            key: "recognition.default_emoji",
            value: config.recognition.default_emoji.clone(),
            env_keys: &["KUDOS_RECOGNITION_DEFAULT_EMOJI"],
        },
        Field {
            key: "recognition.types",
            value: config
                .recognition
                .catalog
                .entries()
                .iter()
                .map(|entry| entry.key.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            env_keys: &[],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["KUDOS_LOGGING_LEVEL", "KUDOS_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["KUDOS_LOGGING_FORMAT", "KUDOS_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

fn redact_secret(secret: &str) -> String {
    if secret.trim().is_empty() {
        "<empty>".to_string()
    } else {
        "<redacted>".to_string()
    }
}
