use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    ConfigParse(String),
    DataSource(String),
    TemplateNotFound(PathBuf),
    PageWrite { path: PathBuf, source: std::io::Error },
    InvalidData(String),
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigParse(msg) => write!(f, "Configuration parse error: {}", msg),
            Error::DataSource(msg) => write!(f, "Data source error: {}", msg),
            Error::TemplateNotFound(path) => {
                write!(f, "Template not found: {}", path.display())
            }
            Error::PageWrite { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            Error::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            Error::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
