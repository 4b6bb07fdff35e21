use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// An operation was issued against a key holding a different kind of value,
    /// e.g. a set command on a string key.
    #[error("Operation against key '{key}' holding the wrong kind of value")]
    WrongType {
        /// The key the operation targeted
        key: String,
    },
}
