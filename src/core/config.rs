use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{IndexError, IndexResult};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_REPO: &str = "QuestPackageManager/bsqmods";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_MODS_DIR: &str = "mods";

/// Default cache TTL (10 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

const CACHE_FILE_NAME: &str = "bsqmods.json";
const INDEX_FILE_NAME: &str = "index.json";
const SETTINGS_DIR_NAME: &str = "modindex";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Everything one run needs, resolved once at startup and handed to each
/// component's constructor.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Bearer credential attached to every remote request.
    pub token: String,
    pub api_base: String,
    pub raw_base: String,
    /// `owner/name` of the repository holding the mods tree.
    pub repo: String,
    pub branch: String,
    pub mods_dir: String,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub cache_ttl: Duration,
    /// Parallel mod fetches within one version.
    pub fetch_concurrency: usize,
    /// Versions processed at the same time.
    pub version_concurrency: usize,
    /// Ceiling on mod fetches in flight across all versions.
    pub max_in_flight: usize,
    pub request_timeout: Duration,
    /// Ignore a fresh cache and rebuild from the remote.
    pub force_refresh: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_API_BASE.into(),
            raw_base: DEFAULT_RAW_BASE.into(),
            repo: DEFAULT_REPO.into(),
            branch: DEFAULT_BRANCH.into(),
            mods_dir: DEFAULT_MODS_DIR.into(),
            cache_dir: PathBuf::from("scripts").join("cache"),
            output_dir: PathBuf::from("public").join("mods"),
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_concurrency: 8,
            version_concurrency: 4,
            max_in_flight: 16,
            request_timeout: Duration::from_secs(30),
            force_refresh: false,
        }
    }
}

impl IndexerConfig {
    /// GitHub contents endpoint for the mods root.
    pub fn root_listing_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            self.repo,
            self.mods_dir
        )
    }

    /// Raw-content prefix under which `<version>/<file>` resolves.
    pub fn raw_mods_base(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.raw_base.trim_end_matches('/'),
            self.repo,
            self.branch,
            self.mods_dir
        )
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(INDEX_FILE_NAME)
    }

    /// Overlay the values present in a settings file.
    pub fn apply_settings(&mut self, settings: IndexerSettings) {
        if let Some(v) = settings.api_base {
            self.api_base = v;
        }
        if let Some(v) = settings.raw_base {
            self.raw_base = v;
        }
        if let Some(v) = settings.repo {
            self.repo = v;
        }
        if let Some(v) = settings.branch {
            self.branch = v;
        }
        if let Some(v) = settings.mods_dir {
            self.mods_dir = v;
        }
        if let Some(v) = settings.cache_dir {
            self.cache_dir = v;
        }
        if let Some(v) = settings.output_dir {
            self.output_dir = v;
        }
        if let Some(secs) = settings.cache_ttl_secs {
            self.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(v) = settings.fetch_concurrency {
            self.fetch_concurrency = v;
        }
        if let Some(v) = settings.version_concurrency {
            self.version_concurrency = v;
        }
        if let Some(v) = settings.max_in_flight {
            self.max_in_flight = v;
        }
        if let Some(secs) = settings.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
    }

    pub fn validate(&self) -> IndexResult<()> {
        if self.token.trim().is_empty() {
            return Err(IndexError::Config(
                "GITHUB_TOKEN not set (pass --token, export GITHUB_TOKEN or add it to .env)"
                    .into(),
            ));
        }
        for (name, value) in [
            ("fetch_concurrency", self.fetch_concurrency),
            ("version_concurrency", self.version_concurrency),
            ("max_in_flight", self.max_in_flight),
        ] {
            if value == 0 {
                return Err(IndexError::Config(format!("{name} must be at least 1")));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(IndexError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.repo.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(IndexError::Config(format!(
                "repo must look like owner/name, got '{}'",
                self.repo
            )));
        }
        Ok(())
    }
}

/// Optional on-disk settings. Every field may be omitted; the credential is
/// only taken from the command line or environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerSettings {
    pub api_base: Option<String>,
    pub raw_base: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub mods_dir: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub cache_ttl_secs: Option<u64>,
    pub fetch_concurrency: Option<usize>,
    pub version_concurrency: Option<usize>,
    pub max_in_flight: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

/// Load `KEY=value` pairs from `path`, or from the first `.env` found in the
/// working directory or its parents. Variables already present in the
/// environment keep their value. Returns the file that was read.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

impl IndexerSettings {
    /// `<config dir>/modindex/settings.json`, picked up when no explicit
    /// settings file is given.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    pub fn load(path: &Path) -> IndexResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            IndexError::Config(format!("cannot parse settings {:?}: {}", path, e))
        })
    }
}
