use roofline_core::photo::DEFAULT_MAX_PHOTO_BYTES;
use roofline_core::share::DEFAULT_EXPIRY_DAYS;

use crate::auth::identity::IdentityConfig;
use crate::pdf::PdfConfig;
use crate::storage::StorageConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// identity-provider secret, which must always be supplied.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to stop after shutdown (default: `10`).
    pub shutdown_timeout_secs: u64,
    /// Largest accepted photo upload in bytes.
    pub max_upload_bytes: usize,
    /// Base URL used to build links sent to external recipients.
    pub public_base_url: String,
    /// Share expiry applied when the caller does not specify one.
    pub share_default_expiry_days: i64,
    /// Licensing-board inbox for LBP complaint submissions.
    pub lbp_board_email: Option<String>,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub pdf: PdfConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `10`                       |
    /// | `MAX_UPLOAD_BYTES`           | `26214400` (25 MiB)        |
    /// | `PUBLIC_BASE_URL`            | `http://localhost:5173`    |
    /// | `SHARE_DEFAULT_EXPIRY_DAYS`  | `14`                       |
    /// | `LBP_BOARD_EMAIL`            | unset (no board email)     |
    ///
    /// Sub-configurations are documented on [`IdentityConfig`],
    /// [`StorageConfig`] and [`PdfConfig`].
    ///
    /// # Panics
    ///
    /// Panics on unparseable values or a missing `IDP_JWT_SECRET`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_PHOTO_BYTES);

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let share_default_expiry_days: i64 = std::env::var("SHARE_DEFAULT_EXPIRY_DAYS")
            .map(|v| {
                v.parse()
                    .expect("SHARE_DEFAULT_EXPIRY_DAYS must be a valid i64")
            })
            .unwrap_or(DEFAULT_EXPIRY_DAYS);

        let lbp_board_email = std::env::var("LBP_BOARD_EMAIL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            max_upload_bytes,
            public_base_url,
            share_default_expiry_days,
            lbp_board_email,
            identity: IdentityConfig::from_env(),
            storage: StorageConfig::from_env(),
            pdf: PdfConfig::from_env(),
        }
    }

    /// Public link for a share token.
    pub fn share_link(&self, token: &str) -> String {
        format!("{}/shared/{token}", self.public_base_url)
    }
}
