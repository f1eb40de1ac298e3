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
//! # Issuer management API
//!
//! Trusted token issuers of the tenants and their claim mappings.
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::service::ServiceState;

mod create;
mod delete;
mod list;
mod show;
pub mod types;
mod update;

/// OpenApi specification for the issuers.
#[derive(OpenApi)]
#[openapi(
    tags(
        (name="issuers", description=r#"Trusted token issuers API.

An issuer is an external identity provider whose JWTs are accepted as subject tokens of the token
exchange. The issuer defines how the claims of the exchanged token are computed from the claims of
the subject token, and optionally a condition the subject token must satisfy."#),
    )
)]
pub struct ApiDoc;

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list::list, create::create))
        .routes(routes!(show::show, update::update, delete::remove))
}
