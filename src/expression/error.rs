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
//! # Expression errors
use thiserror::Error;

/// Expression error.
///
/// Compilation and evaluation failures are kept apart so that callers can tell
/// a broken configuration from a subject token lacking the expected data.
#[derive(Debug, Error)]
pub enum ExpressionError {
    /// The expression could not be compiled.
    #[error("expression parse error: {0}")]
    Parse(#[from] ParseError),

    /// The expression failed while being evaluated.
    #[error("expression evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Compilation (syntax and type-check) error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    /// The source text is too long.
    #[error("expression exceeds the maximum length of {max} bytes")]
    TooLong { max: usize },

    /// The expression is nested too deep.
    #[error("expression exceeds the maximum nesting depth of {max}")]
    TooDeep { max: usize },

    /// Syntax error.
    #[error("syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Reference to the variable or function that does not exist.
    #[error("undeclared reference to '{0}'")]
    UndeclaredReference(String),

    /// Operator or function is applied to the operands of unsupported types.
    #[error("found no matching overload for '{function}' applied to '({args})'")]
    NoMatchingOverload { function: String, args: String },

    /// Malformed macro invocation.
    #[error("invalid argument to {0}() macro")]
    InvalidMacro(String),

    /// Literal regular expression does not compile.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
}

/// Evaluation error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    /// Map does not contain the key.
    #[error("no such key: {0}")]
    NoSuchKey(String),

    /// Operation is not defined for the runtime operand types.
    #[error("no such overload: '{op}' applied to '({args})'")]
    NoSuchOverload { op: String, args: String },

    /// List index is out of range.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(i64),

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Integer overflow.
    #[error("integer overflow")]
    Overflow,

    /// Type conversion failed.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Regular expression does not compile.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),

    /// Variable is not bound in the environment.
    #[error("undeclared reference to '{0}'")]
    UnknownIdentifier(String),

    /// Result cannot be represented as JSON.
    #[error("value of type {0} cannot be represented as json")]
    Unrepresentable(String),
}
