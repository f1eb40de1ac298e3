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
//! # Group management API
//!
//! - Group
//! - Group members
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::service::ServiceState;

mod create;
mod delete;
mod list;
mod member;
mod show;
pub mod types;
mod update;

/// OpenApi specification for the groups.
#[derive(OpenApi)]
#[openapi(
    tags(
        (name="groups", description=r#"Groups API.

Groups collect the subjects of a tenant. The owner and the members of every group are mirrored into
the authorization-relationship service."#),
        (name="group_members", description=r#"Group membership API.

Members are identified by prefixed IDs (`user:<id>`). Replacing the membership publishes the
relationship events only for the members that actually changed."#),
    )
)]
pub struct ApiDoc;

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list::list, create::create))
        .routes(routes!(show::show, update::update, delete::remove))
        .routes(routes!(member::list, member::add, member::replace))
        .routes(routes!(member::remove))
}
