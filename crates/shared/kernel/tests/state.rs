#![cfg(feature = "server")]

use toggles_kernel::domain::config::ApiConfig;
use toggles_kernel::domain::registry::InitializedSlice;
use toggles_kernel::server::{ApiState, ApiStateError};

#[toggles_derive::toggles_slice]
pub struct Probe {
    pub label: &'static str,
}

#[toggles_derive::toggles_slice]
pub struct Unregistered {}

#[test]
fn build_requires_config() {
    let err = ApiState::builder().build().expect_err("config is mandatory");
    assert!(matches!(err, ApiStateError::Validation { .. }));
}

#[test]
fn registered_slices_are_retrievable_by_type() {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(InitializedSlice::new(Probe::new(ProbeInner { label: "probe" })))
        .build()
        .expect("state");

    assert_eq!(state.try_get_slice::<Probe>().expect("probe").label, "probe");
    assert!(state.get_slice::<Unregistered>().is_none());
    assert!(matches!(
        state.try_get_slice::<Unregistered>(),
        Err(ApiStateError::MissingSlice { .. })
    ));
    assert_eq!(state.slice_ids().count(), 1);
}
