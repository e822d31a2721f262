use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_FRONTEND_DIR: &str = "frontend";
const DEFAULT_MAX_UPLOAD_MB: u64 = 25;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMTP_FROM: &str = "no-reply@institute-portal.local";

/// Process configuration, read from the environment once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub upload_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub mail: Option<MailConfig>,
}

/// SMTP settings. Only present when `SMTP_HOST` is set; without it the
/// service runs with notifications disabled.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = parse_or(env::var("PORT").ok(), DEFAULT_PORT).context("invalid PORT")?;
        let upload_dir =
            PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.into()));
        let frontend_dir =
            PathBuf::from(env::var("FRONTEND_DIR").unwrap_or_else(|_| DEFAULT_FRONTEND_DIR.into()));
        let max_upload_mb: u64 = parse_or(env::var("MAX_UPLOAD_MB").ok(), DEFAULT_MAX_UPLOAD_MB)
            .context("invalid MAX_UPLOAD_MB")?;

        let mail = mail_from_parts(
            env::var("SMTP_HOST").ok(),
            env::var("SMTP_PORT").ok(),
            env::var("SMTP_USER").ok(),
            env::var("SMTP_PASS").ok(),
            env::var("SMTP_FROM").ok(),
        )?;

        Ok(Self {
            port,
            upload_dir,
            frontend_dir,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            mail,
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw.parse().map_err(Into::into),
        None => Ok(default),
    }
}

fn mail_from_parts(
    host: Option<String>,
    port: Option<String>,
    username: Option<String>,
    password: Option<String>,
    from: Option<String>,
) -> Result<Option<MailConfig>> {
    let Some(host) = host else {
        return Ok(None);
    };

    let port = parse_or(port, DEFAULT_SMTP_PORT).context("invalid SMTP_PORT")?;

    Ok(Some(MailConfig {
        host,
        port,
        username,
        password,
        from: from.unwrap_or_else(|| DEFAULT_SMTP_FROM.into()),
    }))
}
