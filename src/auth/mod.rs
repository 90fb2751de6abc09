pub mod authorize;
pub mod password;
pub mod token;

pub use authorize::{admin_only, owner_or_admin, owner_or_admin_indirect, owner_or_user, AuthError, OwnedResource};
pub use password::PasswordError;
pub use token::{Claims, TokenCodec, TokenError};
