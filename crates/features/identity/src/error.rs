use std::borrow::Cow;

/// A specialized [`IdentityError`] enum of this crate.
#[toggles_derive::toggles_error]
pub enum IdentityError {
    /// The identity service URL cannot be used.
    #[error("Identity config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Transport failures talking to the identity service.
    #[error("Identity service transport error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },
    /// The identity service rejected the credential.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Any other unexpected answer from the identity service.
    #[error("Identity service returned {status}{}: {message}", format_context(.context))]
    Status { status: u16, message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// The user document could not be decoded.
    #[error("Malformed user profile{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
