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
//! Client secret generation and hashing.
use rand::distr::{Alphanumeric, SampleString};
use secrecy::{ExposeSecret, SecretString};
use tokio::task;

use crate::oauth_client::error::OAuthClientProviderError;

/// Length of the generated client secrets.
pub const SECRET_LENGTH: usize = 48;

/// Cheapest cost bcrypt accepts.
#[cfg(test)]
pub(crate) const TEST_HASH_COST: u32 = 4;

/// Generate a random client secret.
pub fn generate_secret() -> SecretString {
    Alphanumeric
        .sample_string(&mut rand::rng(), SECRET_LENGTH)
        .into()
}

/// Calculate the bcrypt hash of the secret.
pub async fn hash_secret(
    secret: &SecretString,
    cost: u32,
) -> Result<String, OAuthClientProviderError> {
    let secret_bytes = secret.expose_secret().as_bytes().to_owned();
    let hash = task::spawn_blocking(move || bcrypt::hash(secret_bytes, cost)).await??;
    Ok(hash)
}

/// Verify the secret matches the hashed value.
pub async fn verify_secret<H: AsRef<str>>(
    secret: &str,
    hash: H,
) -> Result<bool, OAuthClientProviderError> {
    let secret_bytes = secret.as_bytes().to_owned();
    let secret_hash = hash.as_ref().to_string();
    // Do not block the runtime with the long running call.
    let verify =
        task::spawn_blocking(move || bcrypt::verify(secret_bytes, &secret_hash)).await??;
    Ok(verify)
}
