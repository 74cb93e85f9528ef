use std::env;
use std::path::PathBuf;

/// Credentials for the remote media host. Absent when `FTP_HOST` is unset.
#[derive(Clone, Debug)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub base_dir: String,
    pub public_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub public_uploads_url: String,
    pub ftp: Option<FtpConfig>,
    pub admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let public_uploads_url = env::var("PUBLIC_UPLOADS_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("{}/api/media/image", public_base_url));

        let ftp = env::var("FTP_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .map(|host| FtpConfig {
                port: env::var("FTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(21),
                user: env::var("FTP_USER").unwrap_or_default(),
                password: env::var("FTP_PASSWORD").unwrap_or_default(),
                base_dir: env::var("FTP_DIR")
                    .unwrap_or_else(|_| "/public_html/uploads".to_string()),
                public_url: env::var("FTP_PUBLIC_URL")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| format!("https://{}/uploads", host)),
                host,
            });

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://dealhub.db?mode=rwc".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public/uploads")),
            public_base_url,
            public_uploads_url,
            ftp,
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Configuration for tests and embedding: local uploads under `upload_dir`,
    /// no FTP, no admin token.
    pub fn for_uploads(database_url: &str, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: database_url.to_string(),
            port: 0,
            cors_allowed_origins: Vec::new(),
            upload_dir: upload_dir.into(),
            public_base_url: "http://localhost:8000".to_string(),
            public_uploads_url: "http://localhost:8000/api/media/image".to_string(),
            ftp: None,
            admin_token: None,
        }
    }
}
