use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cascade cache error: {0}")]
    Cache(#[from] bincode::Error),

    #[error("malformed cascade: {0}")]
    MalformedCascade(String),

    #[error("bad image dimensions: {rows}x{cols} with stride {stride} does not fit a {len}-byte buffer")]
    BadImageDim {
        rows: usize,
        cols: usize,
        stride: usize,
        len: usize,
    },

    #[error("bad scan parameters: {0}")]
    BadParams(String),
}

pub type Result<T> = std::result::Result<T, Error>;
