use anyhow::Context;
use akta_config::AktaConfig;

use crate::cli::GlobalFlags;

/// Load and validate configuration. `.env` in the working directory is read
/// first, so `AKTA_*` variables can live there.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<AktaConfig> {
    let config = match &flags.config {
        Some(path) => {
            let _ = dotenvy::dotenv();
            AktaConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
        }
        None => AktaConfig::load_with_dotenv().context("failed to load configuration")?,
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}
