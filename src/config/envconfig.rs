use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Configuration read from `PREFIX_SECTION__KEY` environment variables,
/// e.g. `APP_DATABASE__URL` for `database.url`.
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        load_dotenv()?;
        Self::from_vars(None)
    }

    /// Reads `vars` instead of the process environment when given.
    fn from_vars(vars: Option<HashMap<String, String>>) -> Result<Self> {
        let source = config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
            .source(vars);
        let cfg = config_rs::Config::builder()
            .add_source(source)
            .build()
            .context("failed to read environment variables for config")?
            .try_deserialize::<Self>()
            .context("failed to deserialize environment into config")?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Loads `.env` from the crate directory, falling back to the working
/// directory. No file is fine; a file that does not parse is an error.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if load_dotenv_file(&manifest_env)? {
        return Ok(Some(manifest_env));
    }
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(err).context("failed to load .env from the working directory"),
    }
}

fn load_dotenv_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(err) if err.not_found() => Ok(false),
        Err(err) => Err(err).with_context(|| format!("failed to load {}", path.display())),
    }
}
