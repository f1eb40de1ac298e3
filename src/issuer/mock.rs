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
use async_trait::async_trait;
use mockall::mock;

use crate::config::Config;
use crate::issuer::IssuerProviderError;
use crate::issuer::types::{
    ClaimsMapper, Issuer, IssuerApi, IssuerCreate, IssuerUpdate, JsonClaims,
};
use crate::pagination::{Page, PageRequest};
use crate::service::ServiceState;

mock! {
    pub IssuerProvider {
        pub fn new(cfg: &Config) -> Result<Self, IssuerProviderError>;
    }

    #[async_trait]
    impl ClaimsMapper for IssuerProvider {
        async fn map_claims(
            &self,
            state: &ServiceState,
            subject_claims: &JsonClaims,
        ) -> Result<JsonClaims, IssuerProviderError>;

        async fn eval_claim_conditions(
            &self,
            state: &ServiceState,
            subject_claims: &JsonClaims,
        ) -> Result<bool, IssuerProviderError>;

        async fn map_admitted_claims(
            &self,
            state: &ServiceState,
            subject_claims: &JsonClaims,
        ) -> Result<Option<JsonClaims>, IssuerProviderError>;
    }

    #[async_trait]
    impl IssuerApi for IssuerProvider {
        async fn create_issuer(
            &self,
            state: &ServiceState,
            issuer: IssuerCreate,
        ) -> Result<Issuer, IssuerProviderError>;

        async fn delete_issuer<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
        ) -> Result<(), IssuerProviderError>;

        async fn get_issuer<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
        ) -> Result<Option<Issuer>, IssuerProviderError>;

        async fn get_issuer_by_uri<'a>(
            &self,
            state: &ServiceState,
            uri: &'a str,
        ) -> Result<Option<Issuer>, IssuerProviderError>;

        async fn get_issuer_jwks_uri<'a>(
            &self,
            state: &ServiceState,
            uri: &'a str,
        ) -> Result<String, IssuerProviderError>;

        async fn list_issuers<'a>(
            &self,
            state: &ServiceState,
            owner_id: &'a str,
            page: &PageRequest,
        ) -> Result<Page<Issuer>, IssuerProviderError>;

        async fn update_issuer<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
            update: IssuerUpdate,
        ) -> Result<Issuer, IssuerProviderError>;
    }

    impl Clone for IssuerProvider {
        fn clone(&self) -> Self;
    }
}
