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
//! # Claim mapping
//!
//! Compilation of the configured expressions and their evaluation against the
//! claims of the verified subject token.
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

use crate::expression::{
    CompiledExpr, Environment, EvalError, ExpressionError, Value, compile, evaluate,
};
use crate::issuer::error::IssuerProviderError;
use crate::issuer::types::{
    ClaimMappings, Issuer, IssuerCreate, IssuerPatch, IssuerUpdate, JsonClaims,
};

/// Name under which the condition errors are reported.
pub const CLAIM_CONDITIONS: &str = "claim_conditions";

fn compile_named(name: &str, source: &str) -> Result<CompiledExpr, IssuerProviderError> {
    compile(source).map_err(|err| match err {
        ExpressionError::Parse(source) => IssuerProviderError::ExpressionParse {
            name: name.into(),
            source,
        },
        ExpressionError::Eval(source) => IssuerProviderError::ExpressionEval {
            name: name.into(),
            source,
        },
    })
}

/// Compile every mapping. A single failure rejects the whole set.
pub fn compile_mappings(
    sources: &BTreeMap<String, String>,
) -> Result<ClaimMappings, IssuerProviderError> {
    sources
        .iter()
        .map(|(name, source)| Ok((name.clone(), compile_named(name, source)?)))
        .collect()
}

/// Compile the condition. A blank source means no condition.
pub fn compile_condition(
    source: Option<&str>,
) -> Result<Option<CompiledExpr>, IssuerProviderError> {
    match source.map(str::trim) {
        Some(source) if !source.is_empty() => {
            Ok(Some(compile_named(CLAIM_CONDITIONS, source)?))
        }
        _ => Ok(None),
    }
}

fn validate_url(attr: &str, value: &str) -> Result<(), IssuerProviderError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|err| IssuerProviderError::InvalidIssuer(format!("{attr}: {err}")))
}

/// Validate the request and compile its expressions.
pub fn build_issuer(id: String, req: IssuerCreate) -> Result<Issuer, IssuerProviderError> {
    if req.name.trim().is_empty() {
        return Err(IssuerProviderError::InvalidIssuer("name must not be empty".into()));
    }
    validate_url("uri", &req.uri)?;
    validate_url("jwks_uri", &req.jwks_uri)?;
    Ok(Issuer {
        id,
        owner_id: req.owner_id,
        name: req.name,
        uri: req.uri,
        jwks_uri: req.jwks_uri,
        claim_mappings: compile_mappings(&req.claim_mappings)?,
        claim_conditions: compile_condition(req.claim_conditions.as_deref())?,
    })
}

/// Validate the update and compile its expressions.
pub fn build_patch(req: IssuerUpdate) -> Result<IssuerPatch, IssuerProviderError> {
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(IssuerProviderError::InvalidIssuer("name must not be empty".into()));
        }
    }
    if let Some(uri) = &req.uri {
        validate_url("uri", uri)?;
    }
    if let Some(jwks_uri) = &req.jwks_uri {
        validate_url("jwks_uri", jwks_uri)?;
    }
    Ok(IssuerPatch {
        claim_mappings: req
            .claim_mappings
            .as_ref()
            .map(compile_mappings)
            .transpose()?,
        claim_conditions: req
            .claim_conditions
            .as_ref()
            .map(|x| compile_condition(x.as_deref()))
            .transpose()?,
        name: req.name,
        uri: req.uri,
        jwks_uri: req.jwks_uri,
    })
}

/// Non empty string claim of the subject token.
pub fn required_claim<'a>(
    claims: &'a JsonClaims,
    name: &str,
) -> Result<&'a str, IssuerProviderError> {
    claims
        .get(name)
        .and_then(serde_json::Value::as_str)
        .filter(|x| !x.is_empty())
        .ok_or_else(|| IssuerProviderError::MissingClaim { claim: name.into() })
}

/// Lowercase hex SHA-256 digest of the subject.
pub fn sub_sha256(sub: &str) -> String {
    hex::encode(Sha256::digest(sub.as_bytes()))
}

/// Evaluation environment of the subject token claims.
pub fn environment(claims: &JsonClaims) -> Result<Environment, IssuerProviderError> {
    let sub = required_claim(claims, "sub")?;
    Ok(Environment::from_json_claims(claims, sub_sha256(sub)))
}

fn eval_named(
    name: &str,
    expr: &CompiledExpr,
    env: &Environment,
) -> Result<Value, IssuerProviderError> {
    evaluate(expr, env).map_err(|err| IssuerProviderError::ExpressionEval {
        name: name.into(),
        source: match err {
            ExpressionError::Eval(source) => source,
            ExpressionError::Parse(source) => EvalError::Conversion(source.to_string()),
        },
    })
}

/// Evaluate every mapping of the issuer. The first failure aborts the mapping.
pub fn apply_mappings(
    issuer: &Issuer,
    env: &Environment,
) -> Result<JsonClaims, IssuerProviderError> {
    let mut mapped = JsonClaims::new();
    for (name, expr) in &issuer.claim_mappings {
        let value = eval_named(name, expr, env)?;
        let json = value
            .to_json()
            .map_err(|source| IssuerProviderError::ExpressionEval {
                name: name.clone(),
                source,
            })?;
        mapped.insert(name.clone(), json);
    }
    debug!(issuer_id = %issuer.id, claims = mapped.len(), "claims mapped");
    Ok(mapped)
}

/// Evaluate the condition of the issuer. Absent condition admits.
pub fn admit(issuer: &Issuer, env: &Environment) -> Result<bool, IssuerProviderError> {
    let Some(expr) = &issuer.claim_conditions else {
        return Ok(true);
    };
    match eval_named(CLAIM_CONDITIONS, expr, env)? {
        Value::Bool(admitted) => Ok(admitted),
        other => Err(IssuerProviderError::ExpressionEval {
            name: CLAIM_CONDITIONS.into(),
            source: EvalError::Conversion(format!(
                "condition evaluated to {} instead of bool",
                other.type_name()
            )),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn claims(val: serde_json::Value) -> JsonClaims {
        val.as_object().unwrap().clone()
    }

    fn issuer(mappings: &[(&str, &str)], condition: Option<&str>) -> Issuer {
        build_issuer(
            "i1".into(),
            IssuerCreate {
                owner_id: "o1".into(),
                name: "idp".into(),
                uri: "https://example.com/".into(),
                jwks_uri: "https://example.com/jwks".into(),
                claim_mappings: mappings
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                claim_conditions: condition.map(Into::into),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_plus_one() {
        let current = issuer(&[("plusone", "1 + claims.num")], None);
        let env = environment(&claims(json!({"sub": "foo", "num": 2}))).unwrap();
        assert_eq!(
            claims(json!({"plusone": 3})),
            apply_mappings(&current, &env).unwrap()
        );

        let env = environment(&claims(json!({"sub": "foo"}))).unwrap();
        assert!(matches!(
            apply_mappings(&current, &env),
            Err(IssuerProviderError::ExpressionEval { name, .. }) if name == "plusone"
        ));
    }

    #[test]
    fn test_sub_sha256() {
        let current = issuer(&[("h", "subSHA256")], None);
        let env = environment(&claims(json!({"sub": "foo"}))).unwrap();
        assert_eq!(
            json!("2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"),
            apply_mappings(&current, &env).unwrap()["h"]
        );
    }

    #[test]
    fn test_condition() {
        let current = issuer(&[], Some(r#"has(claims.hello) && claims.hello == "world""#));
        for (input, expected) in [
            (json!({"sub": "x", "hello": "world"}), true),
            (json!({"sub": "x", "hello": "nope"}), false),
            (json!({"sub": "x"}), false),
        ] {
            let env = environment(&claims(input)).unwrap();
            assert_eq!(expected, admit(&current, &env).unwrap());
        }
    }

    #[test]
    fn test_condition_absent_admits() {
        let current = issuer(&[], Some("  "));
        assert!(current.claim_conditions.is_none());
        let env = environment(&claims(json!({"sub": "x"}))).unwrap();
        assert!(admit(&current, &env).unwrap());
    }

    #[test]
    fn test_condition_error_surfaces() {
        let current = issuer(&[], Some("claims.missing == 'x'"));
        let env = environment(&claims(json!({"sub": "x"}))).unwrap();
        assert!(matches!(
            admit(&current, &env),
            Err(IssuerProviderError::ExpressionEval { .. })
        ));

        let non_bool = issuer(&[], Some("claims.sub"));
        assert!(admit(&non_bool, &env).is_err());
    }

    #[test]
    fn test_compile_rejects_whole_set() {
        let mut sources = BTreeMap::new();
        sources.insert("good".to_string(), "'y'".to_string());
        sources.insert("bad".to_string(), "1 +".to_string());
        assert!(matches!(
            compile_mappings(&sources),
            Err(IssuerProviderError::ExpressionParse { name, .. }) if name == "bad"
        ));
    }

    #[test]
    fn test_missing_sub() {
        assert!(matches!(
            environment(&claims(json!({"iss": "x"}))),
            Err(IssuerProviderError::MissingClaim { claim }) if claim == "sub"
        ));
        assert!(matches!(
            required_claim(&claims(json!({"iss": ""})), "iss"),
            Err(IssuerProviderError::MissingClaim { claim }) if claim == "iss"
        ));
    }

    #[test]
    fn test_build_validation() {
        assert!(matches!(
            build_issuer(
                "i".into(),
                IssuerCreate {
                    name: "n".into(),
                    uri: "not a url".into(),
                    jwks_uri: "https://x/jwks".into(),
                    ..Default::default()
                }
            ),
            Err(IssuerProviderError::InvalidIssuer(_))
        ));
        let patch = build_patch(IssuerUpdate {
            claim_conditions: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(Some(None), patch.claim_conditions);
    }
}
