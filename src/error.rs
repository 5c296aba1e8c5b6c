use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("invalid hex color `{0}` (expected #RRGGBB or #AARRGGBB)")]
    InvalidHex(String),
    #[error("unknown color name `{0}`")]
    UnknownName(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse attribute file")]
    Toml(#[from] toml::de::Error),
    #[error("attribute `{attribute}` has an invalid color `{value}`")]
    InvalidColor {
        attribute: &'static str,
        value: String,
        #[source]
        source: ColorParseError,
    },
    #[error("gradient color `{attribute}` is invalid: `{value}`")]
    InvalidGradientColor {
        attribute: &'static str,
        value: String,
        #[source]
        source: ColorParseError,
    },
    #[error("maxProgress must not be negative (got {0})")]
    NegativeMaxProgress(i32),
    #[error("font at {} could not be loaded", .0.display())]
    FontLoad(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("event loop error")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed")]
    Window(#[from] winit::error::OsError),
    #[error("pixel surface error")]
    Pixels(#[from] pixels::Error),
}
