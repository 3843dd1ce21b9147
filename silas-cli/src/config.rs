use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "silas.toml";

/// Build settings merged from CLI args, env vars, the settings file and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SilasConfig {
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Content root holding the site's config.json
    pub source: String,
    /// Output directory for generated site
    pub output: String,
    /// Theme directory overriding the built-in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Replace an existing output directory
    pub overwrite: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            output: silas_core::builder::DEFAULT_EXPORT_PATH.to_string(),
            theme: None,
            overwrite: true,
        }
    }
}

impl SilasConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (SILAS_*)
    /// 3. Settings file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .try_get_one::<String>("config")
            .unwrap_or(None)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add settings file if it exists
        builder = builder.add_source(File::from(Path::new(&config_file)).required(false));

        // 3. Add environment variables with SILAS_ prefix
        builder = builder.add_source(
            Environment::with_prefix("SILAS")
                .prefix_separator("_")
                .separator("__") // Use double underscore for nested keys
                .try_parsing(true),
        );

        // 4. Override with CLI arguments (highest priority)
        if let Some(source) = args.try_get_one::<String>("source").unwrap_or(None) {
            builder = builder.set_override("build.source", source.clone())?;
        }
        if let Some(output) = args.try_get_one::<String>("output").unwrap_or(None) {
            builder = builder.set_override("build.output", output.clone())?;
        }
        if let Some(theme) = args.try_get_one::<String>("theme").unwrap_or(None) {
            builder = builder.set_override("build.theme", theme.clone())?;
        }
        if args
            .try_get_one::<bool>("no-overwrite")
            .unwrap_or(None)
            .copied()
            .unwrap_or(false)
        {
            builder = builder.set_override("build.overwrite", false)?;
        }

        let config = builder.build()?;
        let silas_config: SilasConfig = config.try_deserialize()?;

        Ok(silas_config)
    }

    pub fn build_options(&self) -> silas_core::BuildOptions {
        let build = &self.build;
        let options = silas_core::BuildOptions::new(&build.source)
            .export_path(&build.output)
            .overwrite(build.overwrite);

        match &build.theme {
            Some(theme) => options.theme_dir(PathBuf::from(theme)),
            None => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("source").long("source").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("theme").long("theme").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"))
            .arg(
                Arg::new("no-overwrite")
                    .long("no-overwrite")
                    .action(ArgAction::SetTrue),
            )
    }

    #[test]
    fn test_default_config() {
        let config = SilasConfig::default();
        assert_eq!(config.build.source, ".");
        assert_eq!(config.build.output, "generated");
        assert_eq!(config.build.theme, None);
        assert!(config.build.overwrite);
    }

    #[test]
    fn test_cli_args_override() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("missing.toml");
        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--source",
                "/custom/source",
                "--output",
                "/custom/output",
                "--no-overwrite",
                "--config",
                settings.to_str().unwrap(),
            ])
            .unwrap();

        let config = SilasConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, "/custom/source");
        assert_eq!(config.build.output, "/custom/output");
        assert!(!config.build.overwrite);
        // Should still have defaults for non-overridden values
        assert_eq!(config.build.theme, None);
    }

    #[test]
    fn test_settings_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("silas.toml");
        std::fs::write(&settings, "[build]\noutput = \"public\"\ntheme = \"mytheme\"\n").unwrap();

        let matches = command()
            .try_get_matches_from(vec!["test", "--config", settings.to_str().unwrap()])
            .unwrap();

        let config = SilasConfig::load(&matches).unwrap();
        assert_eq!(config.build.output, "public");
        assert_eq!(config.build.theme.as_deref(), Some("mytheme"));
        assert_eq!(config.build.source, ".");
        assert!(config.build.overwrite);
    }
}
