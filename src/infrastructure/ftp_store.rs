//! FTP implementation of the remote media store

use std::io::Cursor;

use async_trait::async_trait;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};

use crate::config::FtpConfig;
use crate::domain::{DomainError, RemoteStore, StoredFile};

/// Uploads over plain FTP. One session per upload.
pub struct FtpStore {
    config: Option<FtpConfig>,
}

impl FtpStore {
    pub fn new(config: Option<FtpConfig>) -> Self {
        if config.is_none() {
            tracing::info!("FTP_HOST not set, remote uploads disabled");
        }
        Self { config }
    }
}

#[async_trait]
impl RemoteStore for FtpStore {
    async fn put(
        &self,
        category: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<StoredFile, DomainError> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| DomainError::Storage("Remote storage is not configured".into()))?;

        let key = format!("{}/{}", category, filename);
        let url = format!("{}/{}", config.public_url, key);

        let category = category.to_string();
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || upload_blocking(&config, &category, &filename, data))
            .await
            .map_err(|e| DomainError::Storage(format!("FTP task failed: {}", e)))?
            .map_err(|e| DomainError::Storage(format!("FTP upload failed: {}", e)))?;

        Ok(StoredFile { url, key })
    }
}

fn upload_blocking(
    config: &FtpConfig,
    category: &str,
    filename: &str,
    data: Vec<u8>,
) -> Result<(), FtpError> {
    let mut ftp = FtpStream::connect((config.host.as_str(), config.port))?;

    let result = transfer(&mut ftp, config, category, filename, data);

    // The session is closed on every path.
    if let Err(e) = ftp.quit() {
        tracing::warn!("FTP quit failed: {}", e);
    }

    result
}

fn transfer(
    ftp: &mut FtpStream,
    config: &FtpConfig,
    category: &str,
    filename: &str,
    data: Vec<u8>,
) -> Result<(), FtpError> {
    ftp.login(config.user.as_str(), config.password.as_str())?;
    ftp.transfer_type(FileType::Binary)?;

    let base = config.base_dir.trim_end_matches('/');
    if !base.is_empty() {
        ftp.cwd(base)?;
    }

    for segment in category.split('/').filter(|s| !s.is_empty()) {
        if ftp.cwd(segment).is_err() {
            ftp.mkdir(segment)?;
            ftp.cwd(segment)?;
        }
    }

    let size = data.len();
    let mut reader = Cursor::new(data);
    ftp.put_file(filename, &mut reader)?;

    tracing::info!(
        "FTP upload {}/{} complete ({} bytes) to {}",
        category,
        filename,
        size,
        config.host
    );
    Ok(())
}
