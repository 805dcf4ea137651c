use std::fmt;

/// Errors returned by the file-facing surfaces (state files, WAV output).
#[derive(Debug)]
pub enum HiveError {
    /// Reading or writing a file failed.
    Io { path: String, source: std::io::Error },
    /// A state file is not JSON at all.
    StateParse(serde_json::Error),
    /// A config file could not be parsed.
    ConfigParse(toml::de::Error),
    /// The WAV writer failed.
    Wav(hound::Error),
}

impl fmt::Display for HiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HiveError::Io { path, source } => write!(f, "io error on {path}: {source}"),
            HiveError::StateParse(err) => write!(f, "invalid state json: {err}"),
            HiveError::ConfigParse(err) => write!(f, "invalid config toml: {err}"),
            HiveError::Wav(err) => write!(f, "wav output failed: {err}"),
        }
    }
}

impl std::error::Error for HiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HiveError::Io { source, .. } => Some(source),
            HiveError::StateParse(err) => Some(err),
            HiveError::ConfigParse(err) => Some(err),
            HiveError::Wav(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for HiveError {
    fn from(err: serde_json::Error) -> Self {
        HiveError::StateParse(err)
    }
}

impl From<toml::de::Error> for HiveError {
    fn from(err: toml::de::Error) -> Self {
        HiveError::ConfigParse(err)
    }
}

impl From<hound::Error> for HiveError {
    fn from(err: hound::Error) -> Self {
        HiveError::Wav(err)
    }
}
