// Providers layer - Reusable domain components
pub mod account_validator;
pub mod credential_codec;
pub mod crypto_provider;
pub mod login_guard_provider;
pub mod password_policy_provider;
pub mod permission_provider;
pub mod session_provider;

pub use credential_codec::CredentialCodec;
pub use crypto_provider::CryptoProvider;
pub use login_guard_provider::LoginGuardProvider;
pub use password_policy_provider::PasswordPolicyProvider;
pub use permission_provider::{PermissionMap, PermissionProvider};
pub use session_provider::SessionProvider;
