//! Types shared between the database and API representations.

mod post;
mod status;

pub use post::{Post, UnknownPost};
pub use status::{ElectionStatus, IdentityDocumentType, VerificationStatus};
