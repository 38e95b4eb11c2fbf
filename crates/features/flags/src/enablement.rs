use crate::feature::Feature;
use crate::level::Level;
use crate::strategy::{LEVEL_PARAMETER, Strategy};

/// Minimum tier advertised for `feature` to a user.
///
/// Only `enableByLevel` strategies count; the most open configured tier wins.
/// Internal-only features are reported as [`Level::Unknown`] to external users.
#[must_use]
pub fn compute_enablement_level(feature: &Feature, internal_user: bool) -> Level {
    if !feature.enabled {
        return Level::Unknown;
    }

    let best = feature
        .strategies
        .iter()
        .filter(|definition| definition.name == Strategy::ByLevel.name())
        .filter_map(|definition| definition.parameter(LEVEL_PARAMETER))
        .map(|raw| Level::parse_or(raw, Level::Unknown))
        .max()
        .unwrap_or(Level::Unknown);

    if best == Level::Internal && !internal_user { Level::Unknown } else { best }
}
