use std::borrow::Cow;
use toggles_derive::toggles_error;

#[toggles_error]
pub enum SyncError {
    #[error("Read failure{}: {source}", format_context(.context))]
    Read { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Unknown strategy{}: {message}", format_context(.context))]
    UnknownStrategy { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal sync error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_snapshot() -> Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "snapshot.json"))
}

#[test]
fn source_errors_gain_context() {
    let err = read_snapshot().context("loading bootstrap snapshot").unwrap_err();
    assert!(matches!(err, SyncError::Read { .. }));
    assert_eq!(
        err.to_string(),
        "Read failure (loading bootstrap snapshot): snapshot.json"
    );
}

#[test]
fn question_mark_converts_sources() {
    fn run() -> Result<(), SyncError> {
        read_snapshot()?;
        Ok(())
    }

    let err = run().unwrap_err();
    assert_eq!(err.to_string(), "Read failure: snapshot.json");
}

#[test]
fn own_errors_accept_context() {
    let res: Result<(), SyncError> = Err(SyncError::UnknownStrategy {
        message: "gradualRolloutRandom".into(),
        context: None,
    });

    let err = res.context("feature foo.bar").unwrap_err();
    assert_eq!(err.to_string(), "Unknown strategy (feature foo.bar): gradualRolloutRandom");
}

#[test]
fn strings_become_internal_errors() {
    let from_static: SyncError = "snapshot swap failed".into();
    let from_owned: SyncError = String::from("poller stopped").into();

    assert!(matches!(from_static, SyncError::Internal { .. }));
    assert_eq!(from_owned.to_string(), "Internal sync error: poller stopped");
}
