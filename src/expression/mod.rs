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
//! # Claim mapping expressions
//!
//! A small CEL-like language used to compute the claims of the issued token and
//! to decide whether the subject token is admitted at all. Every expression is
//! evaluated against exactly two variables:
//!
//! - `claims`: the claims of the verified subject token.
//! - `subSHA256`: the lowercase hex SHA-256 digest of the subject token `sub`.
//!
//! ```
//! use token_exchange_sts::expression::{Environment, Value, compile, evaluate};
//!
//! let expr = compile("claims.email.endsWith('@example.com')").unwrap();
//! let env = Environment::from_json_claims(
//!     serde_json::json!({"email": "jane@example.com"}).as_object().unwrap(),
//!     "",
//! );
//! assert_eq!(Value::Bool(true), evaluate(&expr, &env).unwrap());
//! ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod ast;
mod checker;
pub mod error;
mod eval;
mod lexer;
mod parser;
mod value;

pub use ast::Expr;
pub use checker::{CLAIMS, SUB_SHA256};
pub use error::{EvalError, ExpressionError, ParseError};
pub use parser::MAX_DEPTH;
pub use value::Value;

/// Maximal length of the expression source in bytes.
pub const MAX_SOURCE_LENGTH: usize = 8192;

/// Checked expression together with its source text.
///
/// The syntax tree is what gets evaluated; the source is retained for display
/// and editing. Both are persisted so loading does not require parsing again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledExpr {
    pub source: String,
    pub ast: Expr,
}

impl CompiledExpr {
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Evaluation input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Environment {
    claims: BTreeMap<String, Value>,
    sub_sha256: String,
}

impl Environment {
    pub fn new<S: Into<String>>(claims: BTreeMap<String, Value>, sub_sha256: S) -> Self {
        Self {
            claims,
            sub_sha256: sub_sha256.into(),
        }
    }

    /// Build the environment from the decoded JWT claims.
    pub fn from_json_claims<S: Into<String>>(
        claims: &serde_json::Map<String, serde_json::Value>,
        sub_sha256: S,
    ) -> Self {
        Self::new(
            claims
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
            sub_sha256,
        )
    }
}

/// Parse and check the expression.
pub fn compile<S: AsRef<str>>(source: S) -> Result<CompiledExpr, ExpressionError> {
    let source = source.as_ref();
    if source.len() > MAX_SOURCE_LENGTH {
        return Err(ParseError::TooLong {
            max: MAX_SOURCE_LENGTH,
        }
        .into());
    }
    let ast = parser::parse(source)?;
    checker::check(&ast)?;
    Ok(CompiledExpr {
        source: source.to_string(),
        ast,
    })
}

/// Evaluate the compiled expression.
pub fn evaluate(expr: &CompiledExpr, env: &Environment) -> Result<Value, ExpressionError> {
    Ok(eval::eval(&expr.ast, env)?)
}
