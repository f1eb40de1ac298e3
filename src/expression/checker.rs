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
//! # Static checks
//!
//! Claims are untyped, so most of the expression is only known as `dyn` at
//! compile time. The checker still rejects everything that can never succeed:
//! unknown references, wrong arity and operands of literal types that have no
//! matching overload.
use super::ast::{BinaryOp, Expr, Literal, Macro, UnaryOp};
use super::error::ParseError;

/// Variable holding the claims of the subject token.
pub const CLAIMS: &str = "claims";
/// Variable holding the SHA-256 hex digest of the subject.
pub const SUB_SHA256: &str = "subSHA256";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Type {
    Dyn,
    Null,
    Bool,
    Int,
    Double,
    String,
    List,
    Map,
}

impl Type {
    fn name(&self) -> &'static str {
        match self {
            Type::Dyn => "dyn",
            Type::Null => "null_type",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Double => "double",
            Type::String => "string",
            Type::List => "list",
            Type::Map => "map",
        }
    }

    /// Whether the value of this type may be one of `allowed`.
    fn is(&self, allowed: &[Type]) -> bool {
        *self == Type::Dyn || allowed.contains(self)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }
}

fn overload(function: &str, args: &[Type]) -> ParseError {
    ParseError::NoMatchingOverload {
        function: function.into(),
        args: args
            .iter()
            .map(Type::name)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Check the expression and return its static type.
pub(super) fn check(expr: &Expr) -> Result<Type, ParseError> {
    Checker { locals: Vec::new() }.check(expr)
}

struct Checker {
    locals: Vec<String>,
}

impl Checker {
    fn check(&mut self, expr: &Expr) -> Result<Type, ParseError> {
        match expr {
            Expr::Literal { value } => Ok(match value {
                Literal::Null => Type::Null,
                Literal::Bool(_) => Type::Bool,
                Literal::Int(_) => Type::Int,
                Literal::Double(_) => Type::Double,
                Literal::String(_) => Type::String,
            }),
            Expr::Ident { name } => {
                if self.locals.iter().any(|x| x == name) {
                    Ok(Type::Dyn)
                } else if name == CLAIMS {
                    Ok(Type::Map)
                } else if name == SUB_SHA256 {
                    Ok(Type::String)
                } else {
                    Err(ParseError::UndeclaredReference(name.clone()))
                }
            }
            Expr::Select { operand, .. } => {
                let ty = self.check(operand)?;
                if !ty.is(&[Type::Map]) {
                    return Err(overload("_._", &[ty]));
                }
                Ok(Type::Dyn)
            }
            Expr::Has { operand, .. } => {
                let ty = self.check(operand)?;
                if !ty.is(&[Type::Map]) {
                    return Err(overload("has", &[ty]));
                }
                Ok(Type::Bool)
            }
            Expr::Index { operand, index } => {
                let ty = self.check(operand)?;
                let idx = self.check(index)?;
                let valid = match ty {
                    Type::List => idx.is(&[Type::Int]),
                    Type::Map => idx.is(&[Type::String]),
                    Type::Dyn => idx.is(&[Type::Int, Type::String]),
                    _ => false,
                };
                if !valid {
                    return Err(overload("_[_]", &[ty, idx]));
                }
                Ok(Type::Dyn)
            }
            Expr::Unary { op, operand } => {
                let ty = self.check(operand)?;
                match op {
                    UnaryOp::Not if ty.is(&[Type::Bool]) => Ok(Type::Bool),
                    UnaryOp::Neg if ty.is(&[Type::Int, Type::Double]) => Ok(ty),
                    UnaryOp::Not => Err(overload("!_", &[ty])),
                    UnaryOp::Neg => Err(overload("-_", &[ty])),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.check(lhs)?;
                let rhs = self.check(rhs)?;
                binary(*op, lhs, rhs)
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let cond = self.check(condition)?;
                if !cond.is(&[Type::Bool]) {
                    return Err(overload("_?_:_", &[cond]));
                }
                let then = self.check(then)?;
                let otherwise = self.check(otherwise)?;
                Ok(if then == otherwise { then } else { Type::Dyn })
            }
            Expr::List { elements } => {
                for element in elements {
                    self.check(element)?;
                }
                Ok(Type::List)
            }
            Expr::Map { entries } => {
                for entry in entries {
                    let key = self.check(&entry.key)?;
                    if !key.is(&[Type::String]) {
                        return Err(overload("{_:_}", &[key]));
                    }
                    self.check(&entry.value)?;
                }
                Ok(Type::Map)
            }
            Expr::Call {
                target,
                function,
                args,
            } => {
                let target = match target {
                    Some(target) => Some(self.check(target)?),
                    None => None,
                };
                let args = args
                    .iter()
                    .map(|arg| self.check(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match target {
                    Some(target) => method(function, target, &args, expr),
                    None => global(function, &args),
                }
            }
            Expr::Comprehension {
                r#macro,
                range,
                variable,
                body,
            } => {
                let ty = self.check(range)?;
                if !ty.is(&[Type::List, Type::Map]) {
                    return Err(overload(r#macro.name(), &[ty]));
                }
                if variable == CLAIMS || variable == SUB_SHA256 {
                    return Err(ParseError::InvalidMacro(r#macro.name().into()));
                }
                self.locals.push(variable.clone());
                let body = self.check(body);
                self.locals.pop();
                let body = body?;
                match r#macro {
                    Macro::Exists | Macro::All | Macro::Filter => {
                        if !body.is(&[Type::Bool]) {
                            return Err(overload(r#macro.name(), &[ty, body]));
                        }
                    }
                    Macro::Map => {}
                }
                Ok(match r#macro {
                    Macro::Exists | Macro::All => Type::Bool,
                    Macro::Map | Macro::Filter => Type::List,
                })
            }
        }
    }
}

fn binary(op: BinaryOp, lhs: Type, rhs: Type) -> Result<Type, ParseError> {
    let err = || overload(op.symbol(), &[lhs, rhs]);
    let dynamic = lhs == Type::Dyn || rhs == Type::Dyn;
    match op {
        BinaryOp::And | BinaryOp::Or => {
            if lhs.is(&[Type::Bool]) && rhs.is(&[Type::Bool]) {
                Ok(Type::Bool)
            } else {
                Err(err())
            }
        }
        BinaryOp::Eq | BinaryOp::Ne => Ok(Type::Bool),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let comparable = [Type::Bool, Type::Int, Type::Double, Type::String];
            if !lhs.is(&comparable) || !rhs.is(&comparable) {
                return Err(err());
            }
            if dynamic || lhs == rhs || (lhs.is_numeric() && rhs.is_numeric()) {
                Ok(Type::Bool)
            } else {
                Err(err())
            }
        }
        BinaryOp::In => {
            if rhs.is(&[Type::List, Type::Map]) {
                Ok(Type::Bool)
            } else {
                Err(err())
            }
        }
        BinaryOp::Add => {
            let addable = [Type::Int, Type::Double, Type::String, Type::List];
            if !lhs.is(&addable) || !rhs.is(&addable) {
                return Err(err());
            }
            if dynamic {
                let known = if lhs == Type::Dyn { rhs } else { lhs };
                Ok(if known.is_numeric() { Type::Dyn } else { known })
            } else if lhs == rhs {
                Ok(lhs)
            } else if lhs.is_numeric() && rhs.is_numeric() {
                Ok(Type::Double)
            } else {
                Err(err())
            }
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            let numeric = [Type::Int, Type::Double];
            if !lhs.is(&numeric) || !rhs.is(&numeric) {
                return Err(err());
            }
            Ok(if dynamic {
                Type::Dyn
            } else if lhs == Type::Int && rhs == Type::Int {
                Type::Int
            } else {
                Type::Double
            })
        }
        BinaryOp::Mod => {
            if lhs.is(&[Type::Int]) && rhs.is(&[Type::Int]) {
                Ok(Type::Int)
            } else {
                Err(err())
            }
        }
    }
}

fn arity(function: &str, args: &[Type], expected: usize) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(overload(function, args));
    }
    Ok(())
}

const SIZED: &[Type] = &[Type::String, Type::List, Type::Map];
const NUMERIC_OR_STRING: &[Type] = &[Type::Int, Type::Double, Type::String];
const SCALAR: &[Type] = &[Type::Bool, Type::Int, Type::Double, Type::String];
const BOOL_OR_STRING: &[Type] = &[Type::Bool, Type::String];
const ANY: &[Type] = &[
    Type::Null,
    Type::Bool,
    Type::Int,
    Type::Double,
    Type::String,
    Type::List,
    Type::Map,
];

fn global(function: &str, args: &[Type]) -> Result<Type, ParseError> {
    let (accepted, result) = match function {
        "size" => (SIZED, Type::Int),
        "int" => (NUMERIC_OR_STRING, Type::Int),
        "double" => (NUMERIC_OR_STRING, Type::Double),
        "string" => (SCALAR, Type::String),
        "bool" => (BOOL_OR_STRING, Type::Bool),
        "type" => (ANY, Type::String),
        other => return Err(ParseError::UndeclaredReference(other.into())),
    };
    arity(function, args, 1)?;
    if args.iter().all(|arg| arg.is(accepted)) {
        Ok(result)
    } else {
        Err(overload(function, args))
    }
}

fn method(function: &str, target: Type, args: &[Type], expr: &Expr) -> Result<Type, ParseError> {
    let all = || [&[target], args].concat();
    match function {
        "size" => {
            arity(function, args, 0)?;
            if !target.is(SIZED) {
                return Err(overload(function, &all()));
            }
            Ok(Type::Int)
        }
        "startsWith" | "endsWith" | "contains" | "matches" => {
            arity(function, args, 1)?;
            if !target.is(&[Type::String]) || !args.iter().all(|x| x.is(&[Type::String])) {
                return Err(overload(function, &all()));
            }
            if function == "matches" {
                check_regex_literal(expr)?;
            }
            Ok(Type::Bool)
        }
        "lowerAscii" | "upperAscii" => {
            arity(function, args, 0)?;
            if !target.is(&[Type::String]) {
                return Err(overload(function, &all()));
            }
            Ok(Type::String)
        }
        other => Err(ParseError::UndeclaredReference(other.into())),
    }
}

/// A literal pattern is compiled right away so a broken regex is reported
/// when the expression is stored and not for every exchanged token.
fn check_regex_literal(expr: &Expr) -> Result<(), ParseError> {
    if let Expr::Call { args, .. } = expr
        && let Some(Expr::Literal {
            value: Literal::String(pattern),
        }) = args.first()
    {
        regex::Regex::new(pattern).map_err(|e| ParseError::InvalidRegex(e.to_string()))?;
    }
    Ok(())
}
