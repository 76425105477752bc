use super::Error;

/// Error when a backend operation fails.
///
/// This wraps errors reported by the client libraries (rusqlite, mysql_async,
/// scylla): connection failures, statement preparation, and execution errors.
#[derive(Debug)]
pub(super) struct DriverOperationFailed {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for DriverOperationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for DriverOperationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a backend operation failure.
    pub fn driver_operation_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::DriverOperationFailed(
            DriverOperationFailed {
                inner: Box::new(err),
            },
        ))
    }

    /// Returns `true` if this error is a backend operation failure.
    pub fn is_driver_operation_failed(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::DriverOperationFailed(_)))
    }

    /// Returns `true` if the backend rejected a write because of a duplicate
    /// or unique-constraint violation.
    ///
    /// Backends do not share an error code for this, so the rendered message
    /// is inspected.
    pub fn is_duplicate_key(&self) -> bool {
        if !self.is_driver_operation_failed() {
            return false;
        }
        let message = self.to_string().to_ascii_lowercase();
        message.contains("unique") || message.contains("duplicate")
    }
}
