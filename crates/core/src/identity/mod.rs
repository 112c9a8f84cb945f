mod error;
mod traits;

pub use error::{identity_error_to_status_code, IdentityError, Result};
pub use traits::IdentityProvider;
