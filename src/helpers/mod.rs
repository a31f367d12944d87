pub mod access_guard;
pub mod control_relay;
pub mod credential_store;
pub mod http_client;
pub mod process_helper;
pub mod session;
pub mod spotify;

pub use access_guard::{AccessGuard, GuardError};
pub use control_relay::{CommandRunner, ExecutableRelay, RelayError};
pub use credential_store::CredentialStore;
pub use session::Session;
