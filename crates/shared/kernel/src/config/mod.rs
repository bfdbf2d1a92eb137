use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default config file looked up in the working directory (any supported extension).
pub const DEFAULT_CONFIG_FILE: &str = "plaza";
/// Prefix of environment overrides, e.g. `PLAZA__SCENES__LOAD_RADIUS=2`.
pub const ENV_PREFIX: &str = "PLAZA";

/// Custom error type for config loading.
#[plaza_derive::plaza_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file overlaid with environment variables.
///
/// 1. **Base File**: an explicit `path` must exist. Without one, `plaza.{toml,json,yaml}` in the
///    working directory is used when present.
/// 2. **Environment Overrides**: variables prefixed with `PLAZA__`, nested with `__`
///    (e.g. `PLAZA__SETTLEMENT__MAX_WAIT_MS` maps to `settlement.max_wait_ms`).
///
/// Every section of the client configuration has defaults, so an empty source is valid.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing or the merged sources do not
/// deserialize into `T`.
///
/// # Example
/// ```rust
/// use plaza_kernel::config::load_config;
/// use plaza_kernel::domain::config::ClientConfig;
///
/// let cfg: ClientConfig = load_config(None::<&str>).unwrap_or_default();
/// assert_eq!(cfg.scenes.load_radius, 4);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_domain::config::{ClientConfig, TimeoutPolicy};
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn loads_file_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[scenes]\nload_radius = 1\n\n[settlement]\non_timeout = \"wait\"\n\n[debug]\neditor = true"
        )
        .unwrap();

        let cfg: ClientConfig = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.scenes.load_radius, 1);
        assert_eq!(cfg.settlement.on_timeout, TimeoutPolicy::Wait);
        assert_eq!(cfg.settlement.max_wait_ms, 15_000);
        assert!(cfg.debug.editor);
    }

    #[test]
    #[serial]
    fn missing_explicit_file_is_an_error() {
        let err = load_config::<ClientConfig>(Some("does/not/exist.toml")).unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("Failed to build config"));
    }
}
