use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use threadline::BackdropConfig;

use crate::cli::Cli;

/// On-disk layout: every key lives under `[backdrop]` and may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PreviewFile {
    backdrop: BackdropConfig,
}

pub fn load_file(path: &Path) -> Result<BackdropConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let file: PreviewFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(file.backdrop)
}

/// Defaults, then the config file, then command-line flags.
pub fn resolve(cli: &Cli) -> Result<BackdropConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => load_file(path)?,
        None => BackdropConfig::default(),
    };
    if let Some(color) = cli.color {
        config = config.with_color(color);
    }
    if let Some(amplitude) = cli.amplitude {
        config = config.with_amplitude(amplitude);
    }
    if let Some(distance) = cli.distance {
        config = config.with_distance(distance);
    }
    if let Some(enabled) = cli.interaction() {
        config = config.with_mouse_interaction(enabled);
    }
    config
        .validate()
        .context("invalid backdrop configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;
    use threadline::{DEFAULT_AMPLITUDE, DEFAULT_COLOR};

    use super::*;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["threadline-preview"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_config("[backdrop]\ndistance = 0.4\n");
        let config = load_file(file.path()).expect("load");
        assert_eq!(config.distance, 0.4);
        assert_eq!(config.color, DEFAULT_COLOR);
        assert_eq!(config.amplitude, DEFAULT_AMPLITUDE);
        assert!(!config.enable_mouse_interaction);
    }

    #[test]
    fn empty_file_is_default() {
        let file = write_config("");
        assert_eq!(load_file(file.path()).expect("load"), BackdropConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let file = write_config(
            "[backdrop]\ncolor = [1.0, 0.0, 0.0]\namplitude = 2.0\nenable_mouse_interaction = true\n",
        );
        let path = file.path().to_string_lossy().into_owned();
        let config = resolve(&cli(&["--config", &path, "--amplitude", "0.5", "--static"]))
            .expect("resolve");
        assert_eq!(config.color, [1.0, 0.0, 0.0]);
        assert_eq!(config.amplitude, 0.5);
        assert!(!config.enable_mouse_interaction);
    }

    #[test]
    fn malformed_file_reports_path() {
        let file = write_config("[backdrop]\namplitude = \"loud\"\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let file = write_config("[backdrop]\ncolor = [0.0, 3.0, 0.0]\n");
        let path = file.path().to_string_lossy().into_owned();
        assert!(resolve(&cli(&["--config", &path])).is_err());
        assert!(resolve(&cli(&["--config", &path, "--color", "0,1,0"])).is_ok());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        assert!(load_file(&missing).is_err());
    }
}
