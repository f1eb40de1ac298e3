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

use crate::pagination::{Page, PageRequest};
use crate::service::ServiceState;
use crate::user::UserProviderError;
use crate::user::types::*;

#[async_trait]
pub trait UserApi: Send + Sync {
    /// Find the user by the issuer and the subject.
    async fn find_user_info<'a>(
        &self,
        state: &ServiceState,
        issuer_id: &'a str,
        subject: &'a str,
    ) -> Result<Option<UserInfo>, UserProviderError>;

    async fn get_user_info<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<UserInfo>, UserProviderError>;

    /// Owner of the issuer the user comes from.
    async fn get_user_owner_id<'a>(
        &self,
        state: &ServiceState,
        id: &'a str,
    ) -> Result<Option<String>, UserProviderError>;

    async fn list_user_info<'a>(
        &self,
        state: &ServiceState,
        issuer_id: &'a str,
        page: &PageRequest,
    ) -> Result<Page<UserInfo>, UserProviderError>;

    /// Insert or update the user keyed by the issuer and the subject.
    async fn store_user_info(
        &self,
        state: &ServiceState,
        user: UserInfoCreate,
    ) -> Result<UserInfo, UserProviderError>;
}
