use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "triage-sim")]
pub struct Args {
    /// Path to the message dataset (JSON).
    #[arg(long, default_value = "data/messages.json")]
    pub dataset: PathBuf,
    /// Optional run-config file (toml or json); flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Speed multiplier for the simulated clock.
    #[arg(long)]
    pub speed: Option<f64>,
    #[arg(long, help = "Use near-uniform arrival spacing instead of bursty bands")]
    pub uniform_arrivals: bool,
    /// Synthetic wall-clock interval per frame, in milliseconds.
    #[arg(long)]
    pub frame_ms: Option<f64>,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

/// Values loadable from a `--config` file. All optional; flags win.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub burst_mode: Option<bool>,
    #[serde(default)]
    pub frame_ms: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub dataset: PathBuf,
    pub speed: f64,
    pub burst_mode: bool,
    pub frame_ms: f64,
    pub format: FormatArg,
}

pub fn parse_args() -> Result<Args> {
    Args::try_parse().map_err(|e| Error::Cli(e.to_string()))
}

pub fn build_config(args: Args) -> Result<RunConfig> {
    let file = match &args.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let speed = args.speed.or(file.speed).unwrap_or(1.0);
    if !speed.is_finite() || speed <= 0.0 {
        return Err(Error::InvalidSpeed(speed));
    }
    let burst_mode = if args.uniform_arrivals {
        false
    } else {
        file.burst_mode.unwrap_or(true)
    };
    let frame_ms = args.frame_ms.or(file.frame_ms).unwrap_or(16.0);
    if !frame_ms.is_finite() || frame_ms <= 0.0 {
        return Err(Error::InvalidFrameInterval(frame_ms));
    }

    Ok(RunConfig {
        dataset: args.dataset,
        speed,
        burst_mode,
        frame_ms,
        format: args.format,
    })
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            dataset: PathBuf::from("data/messages.json"),
            config: None,
            speed: None,
            uniform_arrivals: false,
            frame_ms: None,
            format: FormatArg::Human,
        }
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let config = build_config(args()).unwrap();
        assert_eq!(config.speed, 1.0);
        assert!(config.burst_mode);
        assert_eq!(config.frame_ms, 16.0);
    }

    #[test]
    fn flags_override_defaults() {
        let mut a = args();
        a.speed = Some(8.0);
        a.uniform_arrivals = true;
        a.frame_ms = Some(32.0);
        let config = build_config(a).unwrap();
        assert_eq!(config.speed, 8.0);
        assert!(!config.burst_mode);
        assert_eq!(config.frame_ms, 32.0);
    }

    #[test]
    fn zero_or_nonfinite_speed_is_rejected() {
        let mut a = args();
        a.speed = Some(0.0);
        assert!(build_config(a).is_err());

        let mut a = args();
        a.speed = Some(f64::NAN);
        assert!(build_config(a).is_err());
    }

    #[test]
    fn zero_frame_interval_is_rejected() {
        let mut a = args();
        a.frame_ms = Some(0.0);
        assert!(build_config(a).is_err());
    }

    #[test]
    fn unsupported_config_extension_errors() {
        let err = load_file_config(Path::new("run.yaml")).unwrap_err();
        // Extension check happens after the read; a missing file reports IO.
        assert!(matches!(err, Error::ConfigIo(_)));
    }
}
