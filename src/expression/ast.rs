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
//! # Expression syntax tree
//!
//! The tree is the portable form of a compiled expression: it is serialized
//! next to the source text and evaluated directly after being loaded.
use serde::{Deserialize, Serialize};

/// Expression node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Constant.
    Literal { value: Literal },
    /// Variable reference.
    Ident { name: String },
    /// Field selection `operand.field`.
    Select { operand: Box<Expr>, field: String },
    /// Index access `operand[index]`.
    Index { operand: Box<Expr>, index: Box<Expr> },
    /// Unary operator.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operator.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `condition ? then : otherwise`.
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// List construction.
    List { elements: Vec<Expr> },
    /// Map construction.
    Map { entries: Vec<MapEntry> },
    /// Function or method call.
    Call {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Box<Expr>>,
        function: String,
        args: Vec<Expr>,
    },
    /// `has(operand.field)` presence test.
    Has { operand: Box<Expr>, field: String },
    /// List macro binding `variable` for every element of `range`.
    Comprehension {
        r#macro: Macro,
        range: Box<Expr>,
        variable: String,
        body: Box<Expr>,
    },
}

impl Expr {
    /// Nesting depth of the stored form, the root counting as one.
    ///
    /// List elements and call arguments sit two levels below their node and
    /// map entries three, matching the serialized layout. The walk is
    /// iterative so arbitrarily deep trees are measured safely.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            max = max.max(depth);
            match expr {
                Expr::Literal { .. } | Expr::Ident { .. } => {}
                Expr::Select { operand, .. }
                | Expr::Unary { operand, .. }
                | Expr::Has { operand, .. } => pending.push((&**operand, depth + 1)),
                Expr::Index { operand, index } => {
                    pending.push((&**operand, depth + 1));
                    pending.push((&**index, depth + 1));
                }
                Expr::Binary { lhs, rhs, .. } => {
                    pending.push((&**lhs, depth + 1));
                    pending.push((&**rhs, depth + 1));
                }
                Expr::Conditional {
                    condition,
                    then,
                    otherwise,
                } => {
                    pending.push((&**condition, depth + 1));
                    pending.push((&**then, depth + 1));
                    pending.push((&**otherwise, depth + 1));
                }
                Expr::List { elements } => {
                    pending.extend(elements.iter().map(|el| (el, depth + 2)));
                }
                Expr::Map { entries } => {
                    for entry in entries {
                        pending.push((&entry.key, depth + 3));
                        pending.push((&entry.value, depth + 3));
                    }
                }
                Expr::Call { target, args, .. } => {
                    if let Some(target) = target {
                        pending.push((&**target, depth + 1));
                    }
                    pending.extend(args.iter().map(|arg| (arg, depth + 2)));
                }
                Expr::Comprehension { range, body, .. } => {
                    pending.push((&**range, depth + 1));
                    pending.push((&**body, depth + 1));
                }
            }
        }
        max
    }
}

/// Constant value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

/// Map construction entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    And,
    Or,
}

impl BinaryOp {
    /// Operator spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// List macros.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    /// True when the predicate holds for at least one element.
    Exists,
    /// True when the predicate holds for every element.
    All,
    /// Transform every element.
    Map,
    /// Keep the elements matching the predicate.
    Filter,
}

impl Macro {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exists" => Some(Macro::Exists),
            "all" => Some(Macro::All),
            "map" => Some(Macro::Map),
            "filter" => Some(Macro::Filter),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Macro::Exists => "exists",
            Macro::All => "all",
            Macro::Map => "map",
            Macro::Filter => "filter",
        }
    }
}
