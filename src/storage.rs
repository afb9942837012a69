use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Environment variable checked before the token file.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Abstract token persistence interface
pub trait TokenStorage {
    /// Return the stored token. If none is stored, returns Ok(None)
    fn load(&self) -> Result<Option<String>>;
    /// Persist the token
    fn save(&self, token: &str) -> Result<()>;
    /// Delete the token
    fn delete(&self) -> Result<()>;
}

/// File-based token persistence implementation
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage at `~/.issuekeeper/token`
    pub fn new() -> Result<Self> {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .context("HOME environment variable not set")?;
        Ok(Self::at(home.join(".issuekeeper").join("token")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        FileTokenStorage { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).context("Failed to read token file")?;
        let token = content.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }
        let mut file = File::create(&self.path).context("Failed to open token file for writing")?;
        file.write_all(token.as_bytes())
            .context("Failed to write token to file")?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete token file")?;
        }
        Ok(())
    }
}

/// The token from `env_token` if set and non-empty, otherwise from `storage`.
pub fn resolve_token(env_token: Option<String>, storage: &dyn TokenStorage) -> Result<Option<String>> {
    match env_token.filter(|token| !token.trim().is_empty()) {
        Some(token) => Ok(Some(token.trim().to_string())),
        None => storage.load(),
    }
}
