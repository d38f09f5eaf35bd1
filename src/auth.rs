//! Auth-domain request/response models, validated identifiers, and redacted secrets.

pub mod id;
pub mod request;
pub mod response;
pub mod secret;

pub use id::*;
pub use request::*;
pub use response::*;
pub use secret::*;
