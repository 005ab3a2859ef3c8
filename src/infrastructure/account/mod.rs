//! Account lifecycle: sign-up confirmation and password reset
//!
//! Both flows are stateless between steps. Everything a later step needs
//! travels inside the encrypted token handed to the user.

mod password_reset;
mod service;
mod sign_up;

pub use service::AccountLifecycleService;
pub use sign_up::SignUpCredentials;
