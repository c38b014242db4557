//! The three claim protocol phases: issuance, validation, resolution.

pub mod issuer;
pub mod resolver;
pub mod validator;

pub use issuer::{ClaimIssuer, DEFAULT_TOKEN_LIFETIME};
pub use resolver::{PrincipalResolver, Resolution, ResolutionFailure};
pub use validator::{ClaimValidator, RejectionReason, ValidationOutcome};
