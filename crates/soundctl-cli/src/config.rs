//! Optional TOML configuration file.
//!
//! ```toml
//! [stream]
//! rate = 48000
//! format = "S16_LE"
//!
//! [inspect]
//! open_streams = false
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use soundctl_inspect::InspectOptions;
use soundctl_types::StreamParams;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parameters for opened PCM streams.
    pub stream: StreamParams,

    pub inspect: InspectConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub open_streams: bool,
    pub include_capture: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            open_streams: true,
            include_capture: true,
        }
    }
}

impl Config {
    /// Load the file at `path`. No path, or a path that does not exist,
    /// gives the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
        debug!(path = %path.display(), ?config, "Config loaded");
        Ok(config)
    }

    pub fn inspect_options(&self) -> InspectOptions {
        InspectOptions {
            open_streams: self.inspect.open_streams,
            include_capture: self.inspect.include_capture,
            stream_params: self.stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use soundctl_types::SampleFormat;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stream]\nrate = 48000\nformat = \"S32_LE\"\n\n[inspect]\nopen_streams = false").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.stream.rate, 48000);
        assert_eq!(config.stream.format, SampleFormat::S32Le);
        assert_eq!(config.stream.channels, 2);

        let options = config.inspect_options();
        assert!(!options.open_streams);
        assert!(options.include_capture);
        assert_eq!(options.stream_params.rate, 48000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stream]\nformat = \"S20\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("parse config"));
    }
}
