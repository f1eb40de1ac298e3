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
//! # OAuth client management API
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::service::ServiceState;

mod create;
mod delete;
mod show;
pub mod types;

/// OpenApi specification for the OAuth clients.
#[derive(OpenApi)]
#[openapi(
    tags(
        (name="clients", description=r#"OAuth clients API.

OAuth clients authenticate at the token endpoint with the generated secret. The secret is returned
only once on registration, the service keeps its hash."#),
    )
)]
pub struct ApiDoc;

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create::create))
        .routes(routes!(show::show, delete::remove))
}
