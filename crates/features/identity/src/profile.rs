use serde::{Deserialize, Serialize};

/// What the identity service tells us about the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: Option<String>,
    pub email_verified: bool,
    /// Opt-in tier claimed by the user, as stored by the identity service.
    pub feature_level: Option<String>,
    pub cohort: Option<String>,
}

/// `GET /api/user` response: a JSON:API single resource document.
#[derive(Debug, Deserialize)]
pub(crate) struct UserDocument {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    #[serde(default)]
    attributes: UserAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserAttributes {
    email: Option<String>,
    email_verified: Option<bool>,
    feature_level: Option<String>,
    cohort: Option<String>,
}

impl From<UserDocument> for UserProfile {
    fn from(document: UserDocument) -> Self {
        let UserAttributes { email, email_verified, feature_level, cohort } = document.data.attributes;
        Self {
            email,
            email_verified: email_verified.unwrap_or(false),
            feature_level: feature_level.filter(|level| !level.trim().is_empty()),
            cohort,
        }
    }
}
