use thiserror::Error;

/// Boxed error returned by a user-supplied fence plugin.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`parse`](crate::parse).
///
/// Ambiguous or malformed Markdown is never an error; it falls back to
/// literal text. The only failure that reaches the caller is a fence plugin
/// that returned `Err`, and that error is kept intact as the `source()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("fence plugin failed: {0}")]
    FencePlugin(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn plugin_error_keeps_source() {
        let err = Error::FencePlugin("boom".into());
        assert_eq!(err.to_string(), "fence plugin failed: boom");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("boom"));
    }
}
