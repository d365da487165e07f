use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub handle: String,
    pub custom_handle: Option<String>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub banner_image_url: Option<String>,
    pub link_share_eligible: i64,
    pub vip_code_used: Option<String>,
    pub crystal_balance: i64,
    pub is_subscribed: i64,
    pub subscription_expires_at: Option<String>,
    pub created_at: String,
}

impl User {
    /// The handle shown in the UI: custom handle when claimed, otherwise the
    /// auto-generated one.
    pub fn display_handle(&self) -> &str {
        self.custom_handle.as_deref().unwrap_or(&self.handle)
    }
}

/// Authenticated requester, resolved from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub handle: String,
}

/// Like [`AuthUser`] but tolerates missing credentials; anonymous viewers get
/// the unpersonalized feed.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub handle: String,
    pub custom_handle: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub crystal_balance: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
