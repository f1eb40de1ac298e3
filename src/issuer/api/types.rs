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
//! Issuer API types.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::common::double_option;
use crate::issuer::types;
use crate::pagination::Page;

/// Trusted token issuer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct Issuer {
    /// Issuer ID.
    pub id: String,

    /// Tenant owning the issuer.
    pub owner_id: String,

    pub name: String,

    /// Value of the `iss` claim of the subject tokens.
    pub uri: String,

    /// Location of the JSON Web Key Set verifying the subject tokens.
    pub jwks_uri: String,

    /// Claim name to the expression computing it.
    pub claim_mappings: BTreeMap<String, String>,

    /// Expression the subject token claims must satisfy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_conditions: Option<String>,
}

/// Issuer response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct IssuerResponse {
    pub issuer: Issuer,
}

/// New issuer data.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct IssuerCreate {
    /// Optional issuer ID. Generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub owner_id: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(url, length(max = 255))]
    pub uri: String,

    #[validate(url, length(max = 255))]
    pub jwks_uri: String,

    #[serde(default)]
    pub claim_mappings: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    pub claim_conditions: Option<String>,
}

/// Issuer create request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct IssuerCreateRequest {
    #[validate(nested)]
    pub issuer: IssuerCreate,
}

/// Issuer changes. Absent fields are kept.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct IssuerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 255))]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 255))]
    pub jwks_uri: Option<String>,

    /// Replaces all the mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_mappings: Option<BTreeMap<String, String>>,

    /// New condition. `null` removes it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub claim_conditions: Option<Option<String>>,
}

/// Issuer update request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct IssuerUpdateRequest {
    #[validate(nested)]
    pub issuer: IssuerUpdate,
}

/// Page of issuers.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct IssuerList {
    pub issuers: Vec<Issuer>,

    /// Cursor of the following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl From<types::Issuer> for Issuer {
    fn from(value: types::Issuer) -> Self {
        Self {
            claim_mappings: value.claim_mapping_sources(),
            claim_conditions: value.claim_conditions.map(|x| x.source),
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            uri: value.uri,
            jwks_uri: value.jwks_uri,
        }
    }
}

impl From<IssuerCreateRequest> for types::IssuerCreate {
    fn from(value: IssuerCreateRequest) -> Self {
        let issuer = value.issuer;
        Self {
            id: issuer.id,
            owner_id: issuer.owner_id,
            name: issuer.name,
            uri: issuer.uri,
            jwks_uri: issuer.jwks_uri,
            claim_mappings: issuer.claim_mappings,
            claim_conditions: issuer.claim_conditions,
        }
    }
}

impl From<IssuerUpdateRequest> for types::IssuerUpdate {
    fn from(value: IssuerUpdateRequest) -> Self {
        let issuer = value.issuer;
        Self {
            name: issuer.name,
            uri: issuer.uri,
            jwks_uri: issuer.jwks_uri,
            claim_mappings: issuer.claim_mappings,
            claim_conditions: issuer.claim_conditions,
        }
    }
}

impl From<Page<types::Issuer>> for IssuerList {
    fn from(value: Page<types::Issuer>) -> Self {
        let page = value.map(Issuer::from);
        Self {
            issuers: page.items,
            next: page.next.map(|x| x.to_string()),
        }
    }
}

impl IntoResponse for types::Issuer {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(IssuerResponse {
                issuer: Issuer::from(self),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for IssuerList {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
