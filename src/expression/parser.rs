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
//! # Recursive descent parser
//!
//! Operator precedence (lowest first):
//!
//! ```text
//! expr     = or ['?' or ':' expr]
//! or       = and {'||' and}
//! and      = relation {'&&' relation}
//! relation = addition {('<'|'<='|'>'|'>='|'=='|'!='|'in') addition}
//! addition = multiply {('+'|'-') multiply}
//! multiply = unary {('*'|'/'|'%') unary}
//! unary    = member | '!' unary | '-' unary
//! member   = primary {'.' IDENT ['(' args ')'] | '[' expr ']'}
//! primary  = IDENT ['(' args ')'] | '(' expr ')' | '[' list ']' | '{' map '}' | literal
//! ```
use super::ast::{BinaryOp, Expr, Literal, Macro, MapEntry, UnaryOp};
use super::error::ParseError;
use super::lexer::{Spanned, Token, tokenize};

/// Maximal nesting depth of the expression.
///
/// Depth is counted in levels of the stored syntax tree, operator chains and
/// member access included, so every accepted tree can be loaded back and
/// walked recursively.
pub const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

/// Parse the source into the syntax tree.
pub(super) fn parse(src: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(src)?,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        Token::Eof => {}
        other => return Err(parser.error(format!("unexpected token {other:?}"))),
    }
    // operands parsed ahead of an operator chain end up below it
    if expr.depth() > MAX_DEPTH {
        return Err(ParseError::TooDeep { max: MAX_DEPTH });
    }
    Ok(expr)
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|(t, _)| t)
            .unwrap_or(&Token::Eof)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, p)| *p)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected:?}, found {:?}", self.peek())))
        }
    }

    fn error<S: Into<String>>(&self, message: S) -> ParseError {
        ParseError::Syntax {
            position: self.position(),
            message: message.into(),
        }
    }

    /// Account for `levels` of nesting below the current node. Containers
    /// count their own levels since the stored form nests them as well.
    fn enter(&mut self, levels: usize) -> Result<(), ParseError> {
        self.depth += levels;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { max: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.enter(1)?;
        let condition = self.or()?;
        let res = if self.eat(&Token::Question) {
            let then = self.or()?;
            self.expect(Token::Colon)?;
            let otherwise = self.expr()?;
            Expr::Conditional {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            }
        } else {
            condition
        };
        self.leave(1);
        Ok(res)
    }

    /// Left associative chain of binary operators. Every operator adds one
    /// level on top of the chain parsed so far.
    fn chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, ParseError> {
        let mut lhs = operand(self)?;
        let mut levels = 0;
        while let Some(op) = operator(self.peek()) {
            self.advance();
            self.enter(1)?;
            levels += 1;
            let rhs = operand(self)?;
            lhs = binary(op, lhs, rhs);
        }
        self.leave(levels);
        Ok(lhs)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        self.chain(Self::and, |token| match token {
            Token::OrOr => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        self.chain(Self::relation, |token| match token {
            Token::AndAnd => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn relation(&mut self) -> Result<Expr, ParseError> {
        self.chain(Self::addition, |token| match token {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            Token::EqEq => Some(BinaryOp::Eq),
            Token::Ne => Some(BinaryOp::Ne),
            Token::In => Some(BinaryOp::In),
            _ => None,
        })
    }

    fn addition(&mut self) -> Result<Expr, ParseError> {
        self.chain(Self::multiply, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiply(&mut self) -> Result<Expr, ParseError> {
        self.chain(Self::unary, |token| match token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Token::Not => UnaryOp::Not,
            Token::Minus => UnaryOp::Neg,
            _ => return self.member(),
        };
        self.advance();
        self.enter(1)?;
        // negative double literals are folded
        let operand = self.unary()?;
        self.leave(1);
        Ok(match (op, operand) {
            (
                UnaryOp::Neg,
                Expr::Literal {
                    value: Literal::Double(val),
                },
            ) => Expr::Literal {
                value: Literal::Double(-val),
            },
            (op, operand) => Expr::Unary {
                op,
                operand: Box::new(operand),
            },
        })
    }

    fn member(&mut self) -> Result<Expr, ParseError> {
        let mut operand = self.primary()?;
        let mut levels = 0;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let field = match self.advance() {
                        Token::Ident(name) => name,
                        other => {
                            return Err(self.error(format!(
                                "expected field or method name, found {other:?}"
                            )));
                        }
                    };
                    self.enter(1)?;
                    levels += 1;
                    if self.eat(&Token::LParen) {
                        let args = self.call_args()?;
                        operand = method_call(operand, field, args)?;
                    } else {
                        operand = Expr::Select {
                            operand: Box::new(operand),
                            field,
                        };
                    }
                }
                Token::LBracket => {
                    self.advance();
                    self.enter(1)?;
                    levels += 1;
                    let index = self.expr()?;
                    self.expect(Token::RBracket)?;
                    operand = Expr::Index {
                        operand: Box::new(operand),
                        index: Box::new(index),
                    };
                }
                _ => {
                    self.leave(levels);
                    return Ok(operand);
                }
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let literal = |value| Ok(Expr::Literal { value });
        match self.advance() {
            Token::Int(val) => literal(Literal::Int(val)),
            Token::Double(val) => literal(Literal::Double(val)),
            Token::Str(val) => literal(Literal::String(val)),
            Token::True => literal(Literal::Bool(true)),
            Token::False => literal(Literal::Bool(false)),
            Token::Null => literal(Literal::Null),
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    let args = self.call_args()?;
                    global_call(name, args)
                } else {
                    Ok(Expr::Ident { name })
                }
            }
            Token::LParen => {
                let expr = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::LBracket => {
                // list node and its array
                self.enter(1)?;
                let elements = self.args(Token::RBracket)?;
                self.leave(1);
                Ok(Expr::List { elements })
            }
            Token::LBrace => {
                // map node, its array and the entry object
                self.enter(2)?;
                let mut entries = Vec::new();
                if !self.eat(&Token::RBrace) {
                    loop {
                        let key = self.expr()?;
                        self.expect(Token::Colon)?;
                        let value = self.expr()?;
                        entries.push(MapEntry { key, value });
                        if self.eat(&Token::Comma) {
                            // trailing comma
                            if self.eat(&Token::RBrace) {
                                break;
                            }
                            continue;
                        }
                        self.expect(Token::RBrace)?;
                        break;
                    }
                }
                self.leave(2);
                Ok(Expr::Map { entries })
            }
            Token::Eof => Err(self.error("unexpected end of expression")),
            other => Err(self.error(format!("unexpected token {other:?}"))),
        }
    }

    /// Call arguments, nested in the call node and its array.
    fn call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.enter(1)?;
        let args = self.args(Token::RParen)?;
        self.leave(1);
        Ok(args)
    }

    /// Comma separated expressions up to the `close` token.
    fn args(&mut self, close: Token) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.eat(&close) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                if self.eat(&close) {
                    return Ok(args);
                }
                continue;
            }
            self.expect(close)?;
            return Ok(args);
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn global_call(function: String, mut args: Vec<Expr>) -> Result<Expr, ParseError> {
    if function == "has" {
        return match (args.pop(), args.is_empty()) {
            (Some(Expr::Select { operand, field }), true) => Ok(Expr::Has { operand, field }),
            _ => Err(ParseError::InvalidMacro(function)),
        };
    }
    Ok(Expr::Call {
        target: None,
        function,
        args,
    })
}

fn method_call(target: Expr, function: String, mut args: Vec<Expr>) -> Result<Expr, ParseError> {
    if let Some(r#macro) = Macro::from_name(&function) {
        if args.len() != 2 {
            return Err(ParseError::InvalidMacro(function));
        }
        let body = args.pop();
        let variable = args.pop();
        return match (variable, body) {
            (Some(Expr::Ident { name }), Some(body)) => Ok(Expr::Comprehension {
                r#macro,
                range: Box::new(target),
                variable: name,
                body: Box::new(body),
            }),
            _ => Err(ParseError::InvalidMacro(function)),
        };
    }
    Ok(Expr::Call {
        target: Some(Box::new(target)),
        function,
        args,
    })
}
