use std::borrow::Cow;

/// A specialized [`ToggleError`] enum of this crate.
///
/// Evaluation never fails; these only surface while wiring up or talking to the flag server.
#[toggles_derive::toggles_error]
pub enum ToggleError {
    /// The flag server URL cannot be used.
    #[error("Invalid flag server URL{}: {message}", format_context(.context))]
    InvalidUrl { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Transport failures, including building the HTTP client.
    #[error("Flag server transport error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },
    /// The flag server answered with an unexpected status.
    #[error("Flag server returned {status}{}", format_context(.context))]
    Status { status: u16, context: Option<Cow<'static, str>> },
    /// Feature definitions could not be decoded.
    #[error("Malformed feature definitions{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal toggles error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
