mod change_password;
mod mfa_disable;
mod mfa_setup;
mod mfa_status;
mod mfa_verify;

pub use change_password::*;
pub use mfa_disable::*;
pub use mfa_setup::*;
pub use mfa_status::*;
pub use mfa_verify::*;
