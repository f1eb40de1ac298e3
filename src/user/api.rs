// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # User API
//!
//! External identities observed through the issuers. The users are scoped by
//! the issuer, so their permission checks use the tenant owning the issuer.
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::error::ApiError;
use crate::issuer::IssuerApi;
use crate::service::ServiceState;

mod list;
mod show;
pub mod types;
mod upsert;

/// OpenApi specification for the users.
#[derive(OpenApi)]
#[openapi(
    tags(
        (name="users", description=r#"Users API.

A user is an identity of the external issuer, keyed by the issuer and the `sub` claim."#),
    )
)]
pub struct ApiDoc;

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list::list, upsert::upsert))
        .routes(routes!(show::show))
}

/// Tenant owning the issuer.
async fn issuer_owner(state: &ServiceState, issuer_id: &str) -> Result<String, ApiError> {
    Ok(state
        .provider
        .get_issuer_provider()
        .get_issuer(state, issuer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("issuer", issuer_id))?
        .owner_id)
}
