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
//! # Tree walking evaluator
use std::collections::BTreeMap;

use super::Environment;
use super::ast::{BinaryOp, Expr, Literal, Macro, UnaryOp};
use super::checker::{CLAIMS, SUB_SHA256};
use super::error::EvalError;
use super::value::Value;

pub(super) fn eval(expr: &Expr, env: &Environment) -> Result<Value, EvalError> {
    Evaluator {
        env,
        locals: Vec::new(),
    }
    .eval(expr)
}

fn overload(op: &str, args: &[&Value]) -> EvalError {
    EvalError::NoSuchOverload {
        op: op.into(),
        args: args
            .iter()
            .map(|x| x.type_name())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

struct Evaluator<'a> {
    env: &'a Environment,
    /// Comprehension variables, innermost last.
    locals: Vec<(String, Value)>,
}

impl Evaluator<'_> {
    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal { value } => Ok(match value {
                Literal::Null => Value::Null,
                Literal::Bool(val) => Value::Bool(*val),
                Literal::Int(val) => Value::Int(*val),
                Literal::Double(val) => Value::Double(*val),
                Literal::String(val) => Value::String(val.clone()),
            }),
            Expr::Ident { name } => self.lookup(name),
            Expr::Select { operand, field } => match self.eval(operand)? {
                Value::Map(mut items) => items
                    .remove(field)
                    .ok_or_else(|| EvalError::NoSuchKey(field.clone())),
                other => Err(overload("_._", &[&other])),
            },
            Expr::Has { operand, field } => match self.eval(operand)? {
                Value::Map(items) => Ok(Value::Bool(items.contains_key(field))),
                other => Err(overload("has", &[&other])),
            },
            Expr::Index { operand, index } => {
                let operand = self.eval(operand)?;
                let index = self.eval(index)?;
                match (operand, index) {
                    (Value::List(mut items), Value::Int(idx)) => {
                        if idx < 0 || idx as usize >= items.len() {
                            return Err(EvalError::IndexOutOfBounds(idx));
                        }
                        Ok(items.swap_remove(idx as usize))
                    }
                    (Value::Map(mut items), Value::String(key)) => {
                        items.remove(&key).ok_or(EvalError::NoSuchKey(key))
                    }
                    (operand, index) => Err(overload("_[_]", &[&operand, &index])),
                }
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                match (op, operand) {
                    (UnaryOp::Not, Value::Bool(val)) => Ok(Value::Bool(!val)),
                    (UnaryOp::Neg, Value::Int(val)) => {
                        val.checked_neg().map(Value::Int).ok_or(EvalError::Overflow)
                    }
                    (UnaryOp::Neg, Value::Double(val)) => Ok(Value::Double(-val)),
                    (UnaryOp::Not, other) => Err(overload("!_", &[&other])),
                    (UnaryOp::Neg, other) => Err(overload("-_", &[&other])),
                }
            }
            Expr::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                lhs,
                rhs,
            } => self.logical(*op, lhs, rhs),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                binary(*op, lhs, rhs)
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => match self.eval(condition)? {
                Value::Bool(true) => self.eval(then),
                Value::Bool(false) => self.eval(otherwise),
                other => Err(overload("_?_:_", &[&other])),
            },
            Expr::List { elements } => Ok(Value::List(
                elements
                    .iter()
                    .map(|x| self.eval(x))
                    .collect::<Result<_, _>>()?,
            )),
            Expr::Map { entries } => {
                let mut items = BTreeMap::new();
                for entry in entries {
                    let key = match self.eval(&entry.key)? {
                        Value::String(key) => key,
                        other => return Err(overload("{_:_}", &[&other])),
                    };
                    let value = self.eval(&entry.value)?;
                    items.insert(key, value);
                }
                Ok(Value::Map(items))
            }
            Expr::Call {
                target,
                function,
                args,
            } => {
                let target = match target {
                    Some(target) => Some(self.eval(target)?),
                    None => None,
                };
                let args = args
                    .iter()
                    .map(|x| self.eval(x))
                    .collect::<Result<Vec<_>, _>>()?;
                match target {
                    Some(target) => method(function, target, args),
                    None => global(function, args),
                }
            }
            Expr::Comprehension {
                r#macro,
                range,
                variable,
                body,
            } => {
                let items = match self.eval(range)? {
                    Value::List(items) => items,
                    Value::Map(items) => items.into_keys().map(Value::String).collect(),
                    other => return Err(overload(r#macro.name(), &[&other])),
                };
                self.comprehension(*r#macro, items, variable, body)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        if let Some((_, val)) = self.locals.iter().rev().find(|(var, _)| var == name) {
            return Ok(val.clone());
        }
        match name {
            CLAIMS => Ok(Value::Map(self.env.claims.clone())),
            SUB_SHA256 => Ok(Value::String(self.env.sub_sha256.clone())),
            other => Err(EvalError::UnknownIdentifier(other.into())),
        }
    }

    /// `&&` and `||` are commutative regarding errors: a decisive operand on
    /// either side wins over an error on the other one.
    fn logical(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EvalError> {
        let decisive = op == BinaryOp::Or;
        let lhs = self.eval(lhs).and_then(|x| as_bool(op, x));
        if lhs == Ok(decisive) {
            return Ok(Value::Bool(decisive));
        }
        let rhs = self.eval(rhs).and_then(|x| as_bool(op, x));
        if rhs == Ok(decisive) {
            return Ok(Value::Bool(decisive));
        }
        lhs?;
        rhs?;
        Ok(Value::Bool(!decisive))
    }

    fn comprehension(
        &mut self,
        r#macro: Macro,
        items: Vec<Value>,
        variable: &str,
        body: &Expr,
    ) -> Result<Value, EvalError> {
        let mut mapped = Vec::new();
        let mut error = None;
        for item in items {
            self.locals.push((variable.to_string(), item));
            let res = self.eval(body);
            let item = self.locals.pop().map(|(_, x)| x).unwrap_or(Value::Null);
            match r#macro {
                Macro::Exists | Macro::All => {
                    let decisive = r#macro == Macro::Exists;
                    match res.and_then(|x| as_bool(BinaryOp::And, x)) {
                        Ok(val) if val == decisive => return Ok(Value::Bool(decisive)),
                        Ok(_) => {}
                        Err(e) => {
                            error.get_or_insert(e);
                        }
                    }
                }
                Macro::Map => mapped.push(res?),
                Macro::Filter => {
                    if as_bool(BinaryOp::And, res?)? {
                        mapped.push(item);
                    }
                }
            }
        }
        if let Some(e) = error {
            return Err(e);
        }
        Ok(match r#macro {
            Macro::Exists => Value::Bool(false),
            Macro::All => Value::Bool(true),
            Macro::Map | Macro::Filter => Value::List(mapped),
        })
    }
}

fn as_bool(op: BinaryOp, value: Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(val) => Ok(val),
        other => Err(overload(op.symbol(), &[&other])),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(lhs.equals(&rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!lhs.equals(&rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ord = lhs
                .compare(&rhs)
                .ok_or_else(|| overload(op.symbol(), &[&lhs, &rhs]))?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ord.is_lt(),
                BinaryOp::Le => ord.is_le(),
                BinaryOp::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            }))
        }
        BinaryOp::In => match (&lhs, &rhs) {
            (_, Value::List(items)) => Ok(Value::Bool(items.iter().any(|x| x.equals(&lhs)))),
            (Value::String(key), Value::Map(items)) => Ok(Value::Bool(items.contains_key(key))),
            (_, Value::Map(_)) => Ok(Value::Bool(false)),
            _ => Err(overload("in", &[&lhs, &rhs])),
        },
        BinaryOp::Add => match (lhs, rhs) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (lhs, rhs) => arithmetic(op, lhs, rhs),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => arithmetic(op, lhs, rhs),
        BinaryOp::And | BinaryOp::Or => {
            let a = as_bool(op, lhs)?;
            let b = as_bool(op, rhs)?;
            Ok(Value::Bool(if op == BinaryOp::And { a && b } else { a || b }))
        }
    }
}

/// Numeric operators. Mixing `int` and `double` promotes to `double`.
fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let res = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div | BinaryOp::Mod if b == 0 => {
                    return Err(EvalError::DivisionByZero);
                }
                BinaryOp::Div => a.checked_div(b),
                BinaryOp::Mod => a.checked_rem(b),
                _ => return Err(overload(op.symbol(), &[&lhs, &rhs])),
            };
            res.map(Value::Int).ok_or(EvalError::Overflow)
        }
        (Value::Int(_) | Value::Double(_), Value::Int(_) | Value::Double(_))
            if op != BinaryOp::Mod =>
        {
            let a = as_f64(&lhs);
            let b = as_f64(&rhs);
            Ok(Value::Double(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ => {
                    if b == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a / b
                }
            }))
        }
        _ => Err(overload(op.symbol(), &[&lhs, &rhs])),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(val) => *val as f64,
        Value::Double(val) => *val,
        _ => f64::NAN,
    }
}

fn single(function: &str, mut args: Vec<Value>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(overload(function, &args.iter().collect::<Vec<_>>()));
    }
    args.pop()
        .ok_or_else(|| overload(function, &[]))
}

fn size(function: &str, value: &Value) -> Result<Value, EvalError> {
    let len = match value {
        Value::String(val) => val.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(items) => items.len(),
        other => return Err(overload(function, &[other])),
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| EvalError::Overflow)
}

fn global(function: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    let arg = single(function, args)?;
    match (function, arg) {
        ("size", arg) => size(function, &arg),
        ("type", arg) => Ok(Value::String(arg.type_name().into())),
        ("int", Value::Int(val)) => Ok(Value::Int(val)),
        ("int", Value::Double(val)) => {
            if val.is_finite() && val >= i64::MIN as f64 && val < i64::MAX as f64 {
                Ok(Value::Int(val.trunc() as i64))
            } else {
                Err(EvalError::Conversion(format!("double {val} out of int range")))
            }
        }
        ("int", Value::String(val)) => val
            .parse()
            .map(Value::Int)
            .map_err(|_| EvalError::Conversion(format!("cannot convert '{val}' to int"))),
        ("double", Value::Int(val)) => Ok(Value::Double(val as f64)),
        ("double", Value::Double(val)) => Ok(Value::Double(val)),
        ("double", Value::String(val)) => val
            .parse()
            .map(Value::Double)
            .map_err(|_| EvalError::Conversion(format!("cannot convert '{val}' to double"))),
        ("string", Value::String(val)) => Ok(Value::String(val)),
        ("string", Value::Int(val)) => Ok(Value::String(val.to_string())),
        ("string", Value::Double(val)) => Ok(Value::String(val.to_string())),
        ("string", Value::Bool(val)) => Ok(Value::String(val.to_string())),
        ("bool", Value::Bool(val)) => Ok(Value::Bool(val)),
        ("bool", Value::String(val)) => match val.as_str() {
            "1" | "t" | "true" | "TRUE" | "True" => Ok(Value::Bool(true)),
            "0" | "f" | "false" | "FALSE" | "False" => Ok(Value::Bool(false)),
            _ => Err(EvalError::Conversion(format!(
                "cannot convert '{val}' to bool"
            ))),
        },
        (function, arg) => Err(overload(function, &[&arg])),
    }
}

fn method(function: &str, target: Value, args: Vec<Value>) -> Result<Value, EvalError> {
    if function == "size" && args.is_empty() {
        return size(function, &target);
    }
    match (function, &target, args.as_slice()) {
        ("startsWith", Value::String(val), [Value::String(arg)]) => {
            Ok(Value::Bool(val.starts_with(arg.as_str())))
        }
        ("endsWith", Value::String(val), [Value::String(arg)]) => {
            Ok(Value::Bool(val.ends_with(arg.as_str())))
        }
        ("contains", Value::String(val), [Value::String(arg)]) => {
            Ok(Value::Bool(val.contains(arg.as_str())))
        }
        ("matches", Value::String(val), [Value::String(pattern)]) => {
            let re = regex::Regex::new(pattern)
                .map_err(|e| EvalError::InvalidRegex(e.to_string()))?;
            Ok(Value::Bool(re.is_match(val)))
        }
        ("lowerAscii", Value::String(val), []) => Ok(Value::String(val.to_ascii_lowercase())),
        ("upperAscii", Value::String(val), []) => Ok(Value::String(val.to_ascii_uppercase())),
        _ => {
            let mut all = vec![&target];
            all.extend(args.iter());
            Err(overload(function, &all))
        }
    }
}
