//! Authentication response value object returned by login and refresh.

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::domain::value_objects::UserProfile;

/// Authentication response containing tokens and the sanitized user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// JWT access token for API authentication
    pub access_token: String,

    /// JWT refresh token for obtaining a new pair
    pub refresh_token: String,

    /// Access token expiration time in seconds
    pub expires_in: i64,

    /// Present on login, absent on refresh
    pub user: Option<UserProfile>,
}

impl AuthResponse {
    /// Creates an authentication response from a freshly issued token pair
    pub fn from_token_pair(token_pair: TokenPair, user: Option<UserProfile>) -> Self {
        Self {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            expires_in: token_pair.access_expires_in,
            user,
        }
    }
}
