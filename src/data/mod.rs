// Data structures for SpotControl

pub mod control_command;
pub mod credentials;

pub use control_command::ControlCommand;
pub use credentials::CredentialRecord;
