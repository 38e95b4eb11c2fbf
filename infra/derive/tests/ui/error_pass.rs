use std::borrow::Cow;
use toggles_derive::toggles_error;

#[toggles_error]
pub enum PollError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: PollError = "boom".into();
    let _ = Err::<(), _>(err).context("while polling");
}
