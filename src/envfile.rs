//! Environment file discovery for the command-line tools
//!
//! A working directory may hold a real `.env` and a `.mockenv` template.
//! `.env` always wins when both exist, unless the caller asks to refresh
//! `.env` from `.mockenv` first.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const REAL_ENV_FILE: &str = ".env";
pub const MOCK_ENV_FILE: &str = ".mockenv";

#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} not found")]
    MissingMock(PathBuf),
}

/// How the environment file is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvMode {
    /// Use `.env` if present, otherwise `.mockenv`
    #[default]
    PreferReal,
    /// Overwrite `.env` with `.mockenv`, then use `.env`
    SyncFromMock,
}

/// Which file supplied the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvSource {
    Real(PathBuf),
    Mock(PathBuf),
}

impl EnvSource {
    pub fn path(&self) -> &Path {
        match self {
            EnvSource::Real(p) | EnvSource::Mock(p) => p,
        }
    }
}

/// Values read from an environment file
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    pub source: Option<EnvSource>,
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Locate the environment file in `dir` without reading it
    pub fn discover(dir: &Path) -> Option<EnvSource> {
        let real = dir.join(REAL_ENV_FILE);
        if real.is_file() {
            return Some(EnvSource::Real(real));
        }

        let mock = dir.join(MOCK_ENV_FILE);
        if mock.is_file() {
            return Some(EnvSource::Mock(mock));
        }

        None
    }

    /// Resolve and read the environment file for `dir` according to `mode`.
    ///
    /// Having no file at all is not an error; the result is simply empty.
    pub fn load(dir: &Path, mode: EnvMode) -> Result<Self, EnvFileError> {
        if mode == EnvMode::SyncFromMock {
            sync_from_mock(dir)?;
        }

        let Some(source) = Self::discover(dir) else {
            tracing::info!(dir = %dir.display(), "No .env or .mockenv file found, using process environment");
            return Ok(Self::default());
        };

        let values = read_values(source.path())?;
        tracing::info!(path = %source.path().display(), variables = values.len(), "Loaded environment file");

        Ok(Self {
            source: Some(source),
            values,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look a variable up in the process environment first, then in the file
    pub fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| self.get(key).map(str::to_string))
    }
}

fn sync_from_mock(dir: &Path) -> Result<(), EnvFileError> {
    let mock = dir.join(MOCK_ENV_FILE);
    let real = dir.join(REAL_ENV_FILE);

    if !mock.is_file() {
        return Err(EnvFileError::MissingMock(mock));
    }

    fs::copy(&mock, &real).map_err(|source| EnvFileError::Copy {
        from: mock.clone(),
        to: real.clone(),
        source,
    })?;

    tracing::info!(from = %mock.display(), to = %real.display(), "Copied mock environment over .env");
    Ok(())
}

fn read_values(path: &Path) -> Result<HashMap<String, String>, EnvFileError> {
    let to_error = |source| EnvFileError::Parse {
        path: path.to_path_buf(),
        source,
    };

    dotenvy::from_path_iter(path)
        .map_err(to_error)?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_real_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), REAL_ENV_FILE, "POSTGRES_DB=real_db\n");
        write(dir.path(), MOCK_ENV_FILE, "POSTGRES_DB=mock_db\n");

        let env = EnvFile::load(dir.path(), EnvMode::PreferReal).unwrap();
        assert!(matches!(env.source, Some(EnvSource::Real(_))));
        assert_eq!(env.get("POSTGRES_DB"), Some("real_db"));
    }

    #[test]
    fn test_falls_back_to_mock() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), MOCK_ENV_FILE, "POSTGRES_DB=mock_db\nPOSTGRES_PORT=5433\n");

        let env = EnvFile::load(dir.path(), EnvMode::PreferReal).unwrap();
        assert!(matches!(env.source, Some(EnvSource::Mock(_))));
        assert_eq!(env.get("POSTGRES_PORT"), Some("5433"));
        assert!(!dir.path().join(REAL_ENV_FILE).exists());
    }

    #[test]
    fn test_sync_overwrites_real_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), REAL_ENV_FILE, "POSTGRES_DB=real_db\n");
        write(dir.path(), MOCK_ENV_FILE, "POSTGRES_DB=mock_db\n");

        let env = EnvFile::load(dir.path(), EnvMode::SyncFromMock).unwrap();
        assert!(matches!(env.source, Some(EnvSource::Real(_))));
        assert_eq!(env.get("POSTGRES_DB"), Some("mock_db"));

        let copied = fs::read_to_string(dir.path().join(REAL_ENV_FILE)).unwrap();
        assert_eq!(copied, "POSTGRES_DB=mock_db\n");
    }

    #[test]
    fn test_sync_requires_mock() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), REAL_ENV_FILE, "POSTGRES_DB=real_db\n");
        let err = EnvFile::load(dir.path(), EnvMode::SyncFromMock).unwrap_err();
        assert!(matches!(err, EnvFileError::MissingMock(_)));
    }

    #[test]
    fn test_no_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let env = EnvFile::load(dir.path(), EnvMode::PreferReal).unwrap();
        assert!(env.source.is_none());
        assert_eq!(env.get("POSTGRES_DB"), None);
    }

    #[test]
    fn test_lookup_prefers_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), REAL_ENV_FILE, "DSST_ENVFILE_TEST_PATH=from_file\nDSST_ENVFILE_TEST_ONLY_FILE=file\n");
        let env = EnvFile::load(dir.path(), EnvMode::PreferReal).unwrap();

        std::env::set_var("DSST_ENVFILE_TEST_PATH", "from_process");
        assert_eq!(env.lookup("DSST_ENVFILE_TEST_PATH").as_deref(), Some("from_process"));
        assert_eq!(env.lookup("DSST_ENVFILE_TEST_ONLY_FILE").as_deref(), Some("file"));
        std::env::remove_var("DSST_ENVFILE_TEST_PATH");
    }
}
