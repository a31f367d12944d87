// HTTP routes of the control server

use rocket::http::Status;
use rocket::response::status::Custom;
use log::warn;

use crate::helpers::{GuardError, RelayError};

pub mod control;
pub mod server;
pub mod spotify;

/// 401 for a missing login, 500 for everything else the guard reports
pub(crate) fn guard_failure(error: GuardError) -> Custom<String> {
    match error {
        GuardError::Unauthorized => Custom(Status::Unauthorized, error.to_string()),
        other => {
            warn!("Access guard failed: {}", other);
            Custom(Status::InternalServerError, other.to_string())
        }
    }
}

pub(crate) fn relay_failure(error: RelayError) -> Custom<String> {
    Custom(Status::InternalServerError, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::spotify::OAuthError;

    #[test]
    fn test_guard_failure_status() {
        let Custom(status, body) = guard_failure(GuardError::Unauthorized);
        assert_eq!(status, Status::Unauthorized);
        assert_eq!(body, "Not authorized");

        let Custom(status, _) = guard_failure(GuardError::RefreshFailed(OAuthError::NoRefreshToken));
        assert_eq!(status, Status::InternalServerError);
    }

    #[test]
    fn test_relay_failure_message() {
        let Custom(status, body) = relay_failure(RelayError::CommandExecutionFailed {
            command: "next".to_string(),
            stderr: "no window".to_string(),
        });
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(body, "Failed to execute command: next: no window");
    }
}
