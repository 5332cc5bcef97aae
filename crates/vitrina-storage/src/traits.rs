use vitrina_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete {path}: {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => AppError::NotFound(path),
            StorageError::InvalidPath(msg) => AppError::invalid("path", msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_not_found() {
        let err: AppError = StorageError::NotFound("/uploads/x.png".to_string()).into();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn io_failures_map_to_storage_fault() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = StorageError::WriteFailed {
            path: "/uploads/x.png".to_string(),
            source: io,
        }
        .into();
        assert_eq!(err.error_code(), "STORAGE_FAULT");
        assert!(err.to_string().contains("/uploads/x.png"));
    }
}
