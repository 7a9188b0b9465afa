use std::path::PathBuf;

/// Failures surfaced by the radio's collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    #[error("no stations available")]
    NoStations,
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl RadioError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}
