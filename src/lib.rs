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
//! # Token exchange security token service
//!
//! A multi-tenant OAuth 2.0 Security Token Service implementing the RFC 8693
//! token exchange grant. A caller presents a JWT minted by an external,
//! per-tenant configured identity provider (the *subject token*). The service
//! verifies it against the keys the provider publishes, remaps its claims with
//! tenant-defined expressions and answers with a freshly signed JWT asserting
//! the mapped identity for downstream services.
//!
//! The crate is organized around providers, each exposing an API trait with a
//! mockable implementation:
//!
//! - [`issuer`] - trusted identity providers and their claim mappings.
//! - [`group`] - tenant groups and their membership, mirrored into the
//!   authorization-relationship service.
//! - [`user`] - external identities observed during token exchange.
//! - [`oauth_client`] - the OAuth clients allowed to call the token endpoint.
//! - [`keys`] - remote JWKS resolution and the local signing keys.
//! - [`token_exchange`] - the RFC 8693 grant state machine.
//!
//! All persisted state goes through the transactional [`storage`] engine,
//! which has SQL and in-memory implementations. Claim mappings are written in
//! a small typed [`expression`] language. Listings use opaque cursors from
//! [`pagination`].

pub mod api;
pub mod config;
pub mod db;
pub mod db_migration;
pub mod error;
pub mod expression;
pub mod group;
pub mod issuer;
pub mod keys;
pub mod oauth2;
pub mod oauth_client;
pub mod pagination;
pub mod policy;
pub mod provider;
pub mod relationship;
pub mod service;
pub mod storage;
pub mod token_exchange;
pub mod user;

#[cfg(test)]
mod tests;
