//! Mapping of publish errors to stored failure kinds.

use crate::error::Error;
use crate::store::FailureKind;

/// Classify a publish-side error.
///
/// Oversize files are terminal; everything else (HTTP, API rejections, rate
/// limiting, batch count mismatches, unreadable staged files) is an API
/// error that heals by re-downloading and retrying on a later run.
pub fn classify(error: &Error) -> FailureKind {
    match error {
        Error::FileTooLarge { .. } => FailureKind::FileTooLarge,
        _ => FailureKind::ApiError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MediaKind;

    #[test]
    fn test_file_too_large() {
        let err = Error::FileTooLarge {
            kind: MediaKind::Video,
            size_mib: 60,
            limit_mib: 50,
        };
        assert_eq!(classify(&err), FailureKind::FileTooLarge);
    }

    #[test]
    fn test_everything_else_is_api_error() {
        assert_eq!(classify(&Error::Api("Bad Request".into())), FailureKind::ApiError);
        assert_eq!(classify(&Error::RateLimited(30)), FailureKind::ApiError);
        assert_eq!(
            classify(&Error::BatchMismatch {
                submitted: 3,
                received: 2
            }),
            FailureKind::ApiError
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(classify(&Error::Io(io)), FailureKind::ApiError);
    }
}
