use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// The registry answered 404 for a package. Fatal for the whole install.
    #[error("Cannot find '{package}' on {registry}.")]
    PackageNotFound { package: String, registry: String },

    /// Any other non-success registry response, or a transport failure.
    #[error("{0}")]
    Registry(String),

    #[error("Invalid package archive: {0}")]
    InvalidArchive(String),

    #[error("There doesn't seem to be a KnightOS project here. Did you run `knightos init`?")]
    NoProject,

    #[error("{0}")]
    Other(String),
}
