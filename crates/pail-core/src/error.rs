use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported presign method: {0}")]
    UnsupportedMethod(String),

    #[error("key has no file name component: {0:?}")]
    NoFileName(String),
}
