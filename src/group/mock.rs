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
use crate::group::GroupProviderError;
use crate::group::types::{Group, GroupApi, GroupCreate, GroupUpdate, MembershipChange};
use crate::pagination::{Page, PageRequest};
use crate::service::ServiceState;

mock! {
    pub GroupProvider {
        pub fn new(cfg: &Config) -> Result<Self, GroupProviderError>;
    }

    #[async_trait]
    impl GroupApi for GroupProvider {
        async fn add_group_members<'a>(
            &self,
            state: &ServiceState,
            group_id: &'a str,
            members: Vec<String>,
        ) -> Result<MembershipChange, GroupProviderError>;

        async fn create_group(
            &self,
            state: &ServiceState,
            group: GroupCreate,
        ) -> Result<Group, GroupProviderError>;

        async fn delete_group<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
        ) -> Result<(), GroupProviderError>;

        async fn get_group<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
        ) -> Result<Option<Group>, GroupProviderError>;

        async fn list_group_members<'a>(
            &self,
            state: &ServiceState,
            group_id: &'a str,
            page: &PageRequest,
        ) -> Result<Page<String>, GroupProviderError>;

        async fn list_groups<'a>(
            &self,
            state: &ServiceState,
            owner_id: &'a str,
            page: &PageRequest,
        ) -> Result<Page<Group>, GroupProviderError>;

        async fn remove_group_member<'a>(
            &self,
            state: &ServiceState,
            group_id: &'a str,
            member_id: &'a str,
        ) -> Result<(), GroupProviderError>;

        async fn replace_group_members<'a>(
            &self,
            state: &ServiceState,
            group_id: &'a str,
            members: Vec<String>,
        ) -> Result<MembershipChange, GroupProviderError>;

        async fn update_group<'a>(
            &self,
            state: &ServiceState,
            id: &'a str,
            update: GroupUpdate,
        ) -> Result<Group, GroupProviderError>;
    }

    impl Clone for GroupProvider {
        fn clone(&self) -> Self;
    }
}
