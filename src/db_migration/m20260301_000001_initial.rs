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
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issuer::Table)
                    .if_not_exists()
                    .col(string_len(Issuer::Id, 64).primary_key())
                    .col(string_len(Issuer::OwnerId, 255))
                    .col(string_len(Issuer::Name, 255))
                    .col(string_len(Issuer::Uri, 1024))
                    .col(string_len(Issuer::JwksUri, 1024))
                    .col(text(Issuer::ClaimMappings))
                    .col(text_null(Issuer::ClaimConditions))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx-issuer-uri")
                    .table(Issuer::Table)
                    .col(Issuer::Uri)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-issuer-owner")
                    .table(Issuer::Table)
                    .col(Issuer::OwnerId)
                    .col(Issuer::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserInfo::Table)
                    .if_not_exists()
                    .col(string_len(UserInfo::Id, 64).primary_key())
                    .col(string_len(UserInfo::IssuerId, 64))
                    .col(string_len(UserInfo::Subject, 255))
                    .col(string_len_null(UserInfo::Name, 255))
                    .col(string_len_null(UserInfo::Email, 255))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user-info-issuer")
                            .from(UserInfo::Table, UserInfo::IssuerId)
                            .to(Issuer::Table, Issuer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx-user-info-issuer-subject")
                    .table(UserInfo::Table)
                    .col(UserInfo::IssuerId)
                    .col(UserInfo::Subject)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Group::Table)
                    .if_not_exists()
                    .col(string_len(Group::Id, 64).primary_key())
                    .col(string_len(Group::OwnerId, 255))
                    .col(string_len(Group::Name, 255))
                    .col(text_null(Group::Description))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx-group-owner-name")
                    .table(Group::Table)
                    .col(Group::OwnerId)
                    .col(Group::Name)
                    .to_owned(),
            )
            .await?;

        // Groups are only deleted when empty, so the membership is not
        // cascaded.
        manager
            .create_table(
                Table::create()
                    .table(GroupMember::Table)
                    .if_not_exists()
                    .col(string_len(GroupMember::GroupId, 64))
                    .col(string_len(GroupMember::MemberId, 255))
                    .primary_key(
                        Index::create()
                            .col(GroupMember::GroupId)
                            .col(GroupMember::MemberId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group-member-group")
                            .from(GroupMember::Table, GroupMember::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OauthClient::Table)
                    .if_not_exists()
                    .col(string_len(OauthClient::Id, 64).primary_key())
                    .col(string_len(OauthClient::OwnerId, 255))
                    .col(string_len(OauthClient::Name, 255))
                    .col(string_len(OauthClient::SecretHash, 255))
                    .col(text(OauthClient::Audience))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OauthClient::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Group::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserInfo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Issuer::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Issuer {
    Table,
    Id,
    OwnerId,
    Name,
    Uri,
    JwksUri,
    ClaimMappings,
    ClaimConditions,
}

#[derive(DeriveIden)]
enum UserInfo {
    Table,
    Id,
    IssuerId,
    Subject,
    Name,
    Email,
}

#[derive(DeriveIden)]
enum Group {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum GroupMember {
    Table,
    GroupId,
    MemberId,
}

#[derive(DeriveIden)]
enum OauthClient {
    Table,
    Id,
    OwnerId,
    Name,
    SecretHash,
    Audience,
}
