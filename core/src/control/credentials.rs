use crate::prelude::SondeResult;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Remembers the last password entered for privileged requests.
pub trait CredentialCache {
    fn load(&self) -> SondeResult<Option<String>>;
    fn store(&mut self, password: &str) -> SondeResult<()>;
}

/// Keeps the password in a single file.
pub struct FileCredentialCache {
    path: PathBuf,
}

impl FileCredentialCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialCache for FileCredentialCache {
    fn load(&self) -> SondeResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim_end_matches(['\r', '\n']).to_string())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&mut self, password: &str) -> SondeResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, password)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialCache {
    value: Option<String>,
}

impl CredentialCache for MemoryCredentialCache {
    fn load(&self) -> SondeResult<Option<String>> {
        Ok(self.value.clone())
    }

    fn store(&mut self, password: &str) -> SondeResult<()> {
        self.value = Some(password.to_string());
        Ok(())
    }
}

/// Picks the password for a request: typed input first, then the cached
/// value, then empty. The choice is written back to the cache.
pub fn resolve_password<C: CredentialCache + ?Sized>(
    input: &str,
    cache: &mut C,
) -> SondeResult<String> {
    let password = if input.is_empty() {
        cache.load()?.unwrap_or_default()
    } else {
        input.to_string()
    };
    cache.store(&password)?;
    Ok(password)
}
