use std::env;
use std::time::Duration;

use log::{debug, warn};

/// Connection and send timeout applied per delivery attempt
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Resolved SMTP settings.
///
/// Fields stay raw strings until use so a partially configured deployment
/// degrades to a descriptive outcome instead of a startup failure. Absence
/// of any configuration is a valid, handled state.
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub tls: Option<String>,
}

impl SmtpConfig {
    /// Resolves configuration from one source at a time: environment
    /// variables win when `SMTP_USER` and `SMTP_PASS` are both set,
    /// otherwise the TOML secrets file supplies every key, otherwise the
    /// dispatcher is unconfigured.
    pub fn resolve() -> Self {
        let env_user = env_value("SMTP_USER");
        let env_pass = env_value("SMTP_PASS");
        if env_user.is_some() && env_pass.is_some() {
            debug!("SMTP configuration resolved from the environment");
            return SmtpConfig {
                user: env_user,
                password: env_pass,
                host: env_value("SMTP_HOST"),
                port: env_value("SMTP_PORT"),
                tls: env_value("SMTP_TLS"),
            };
        }

        match secrets_table() {
            Some(table) => SmtpConfig::from_secrets(&table),
            None => SmtpConfig::default(),
        }
    }

    fn from_secrets(table: &toml::Value) -> Self {
        let user = secret_value(table, "SMTP_USER");
        let password = secret_value(table, "SMTP_PASS");
        if user.is_none() || password.is_none() {
            return SmtpConfig::default();
        }
        debug!("SMTP configuration resolved from the secrets file");
        SmtpConfig {
            user,
            password,
            host: secret_value(table, "SMTP_HOST"),
            port: secret_value(table, "SMTP_PORT"),
            tls: secret_value(table, "SMTP_TLS"),
        }
    }

    /// Username and password when both are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }

    /// Host and parsed port when both are usable; an unparseable port
    /// counts as missing
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        let host = self.host.as_deref()?;
        let port = self.port.as_deref()?.trim().parse::<u16>().ok()?;
        Some((host, port))
    }

    /// STARTTLS is on unless `SMTP_TLS` is explicitly `false`
    pub fn use_tls(&self) -> bool {
        self.tls
            .as_deref()
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true)
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secrets_table() -> Option<toml::Value> {
    let path = env::var("SECRETS_FILE").unwrap_or_else(|_| DEFAULT_SECRETS_FILE.to_string());
    let raw = std::fs::read_to_string(&path).ok()?;
    match raw.parse::<toml::Value>() {
        Ok(table) => Some(table),
        Err(e) => {
            warn!("Unreadable secrets file {}: {}", path, e);
            None
        }
    }
}

fn secret_value(table: &toml::Value, key: &str) -> Option<String> {
    match table.get(key) {
        Some(toml::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(toml::Value::Integer(i)) => Some(i.to_string()),
        _ => None,
    }
}
