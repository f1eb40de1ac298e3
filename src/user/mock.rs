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
use crate::pagination::{Page, PageRequest};
use crate::service::ServiceState;
use crate::user::UserProviderError;
use crate::user::types::{UserApi, UserInfo, UserInfoCreate};

mock! {
    pub UserProvider {
        pub fn new(cfg: &Config) -> Result<Self, UserProviderError>;
    }

    #[async_trait]
    impl UserApi for UserProvider {
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

        async fn store_user_info(
            &self,
            state: &ServiceState,
            user: UserInfoCreate,
        ) -> Result<UserInfo, UserProviderError>;
    }

    impl Clone for UserProvider {
        fn clone(&self) -> Self;
    }
}
