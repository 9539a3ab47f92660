//! Principal extraction
//!
//! Authentication lives upstream: a trusted auth proxy verifies the session
//! and injects `x-user-id` / `x-user-role` headers. The extractor trusts
//! those headers as given and only enforces role gates.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, AppResult, ErrorCode};
use std::str::FromStr;

use crate::core::ServerState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Caller role as asserted by the auth proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Provider,
    Admin,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "provider" => Ok(Self::Provider),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn require_customer(&self) -> AppResult<()> {
        match self.role {
            Role::Customer | Role::Admin => Ok(()),
            Role::Provider => Err(AppError::new(ErrorCode::CustomerRequired)),
        }
    }

    pub fn require_provider(&self) -> AppResult<()> {
        match self.role {
            Role::Provider | Role::Admin => Ok(()),
            Role::Customer => Err(AppError::new(ErrorCode::ProviderRequired)),
        }
    }
}

impl FromRequestParts<ServerState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(AppError::not_authenticated)?
            .to_string();

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Role::from_str(s).ok())
            .ok_or_else(AppError::not_authenticated)?;

        let principal = Principal { user_id, role };
        parts.extensions.insert(principal.clone());
        Ok(principal)
    }
}
