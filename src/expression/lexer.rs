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
//! # Tokenizer
use std::iter::Peekable;
use std::str::CharIndices;

use super::error::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Token {
    Int(i64),
    Double(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    In,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,
    Question,
    Not,
    Minus,
    Plus,
    Star,
    Slash,
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    AndAnd,
    OrOr,
    Eof,
}

/// Token with its byte offset in the source.
pub(super) type Spanned = (Token, usize);

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

fn syntax<S: Into<String>>(position: usize, message: S) -> ParseError {
    ParseError::Syntax {
        position,
        message: message.into(),
    }
}

/// Split the source into tokens. The result always ends with [`Token::Eof`].
pub(super) fn tokenize(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut lexer = Lexer {
        src,
        chars: src.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.0 == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

impl Lexer<'_> {
    fn skip_whitespace(&mut self) {
        while let Some((_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn next_if(&mut self, expected: char) -> bool {
        if self.chars.peek().is_some_and(|(_, c)| *c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Result<Spanned, ParseError> {
        self.skip_whitespace();
        let Some((pos, c)) = self.chars.next() else {
            return Ok((Token::Eof, self.src.len()));
        };
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '.' => {
                if self.chars.peek().is_some_and(|(_, c)| c.is_ascii_digit()) {
                    return self.number(pos);
                }
                Token::Dot
            }
            ',' => Token::Comma,
            ':' => Token::Colon,
            '?' => Token::Question,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '!' => {
                if self.next_if('=') {
                    Token::Ne
                } else {
                    Token::Not
                }
            }
            '<' => {
                if self.next_if('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.next_if('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '=' => {
                if self.next_if('=') {
                    Token::EqEq
                } else {
                    return Err(syntax(pos, "unexpected '=', did you mean '=='?"));
                }
            }
            '&' => {
                if self.next_if('&') {
                    Token::AndAnd
                } else {
                    return Err(syntax(pos, "unexpected '&', did you mean '&&'?"));
                }
            }
            '|' => {
                if self.next_if('|') {
                    Token::OrOr
                } else {
                    return Err(syntax(pos, "unexpected '|', did you mean '||'?"));
                }
            }
            '"' | '\'' => return self.string(pos, c),
            c if c.is_ascii_digit() => return self.number(pos),
            c if c.is_ascii_alphabetic() || c == '_' => return Ok(self.ident(pos)),
            other => return Err(syntax(pos, format!("unexpected character '{other}'"))),
        };
        Ok((token, pos))
    }

    fn ident(&mut self, start: usize) -> Spanned {
        let mut end = start + 1;
        while let Some((idx, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || *c == '_' {
                end = idx + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let token = match &self.src[start..end] {
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            "in" => Token::In,
            other => Token::Ident(other.to_string()),
        };
        (token, start)
    }

    fn number(&mut self, start: usize) -> Result<Spanned, ParseError> {
        let mut end = start + 1;
        let mut is_double = self.src[start..].starts_with('.');
        while let Some((idx, c)) = self.chars.peek().copied() {
            if c.is_ascii_digit() {
                end = idx + 1;
                self.chars.next();
            } else if c == '.' && !is_double {
                // `1.size()` style member access is not a fraction
                let next_is_digit = self.src[idx + 1..]
                    .chars()
                    .next()
                    .is_some_and(|x| x.is_ascii_digit());
                if !next_is_digit {
                    break;
                }
                is_double = true;
                end = idx + 1;
                self.chars.next();
            } else if c == 'e' || c == 'E' {
                is_double = true;
                end = idx + 1;
                self.chars.next();
                if let Some((idx, sign)) = self.chars.peek().copied()
                    && (sign == '+' || sign == '-')
                {
                    end = idx + 1;
                    self.chars.next();
                }
            } else {
                break;
            }
        }
        let text = &self.src[start..end];
        let token = if is_double {
            Token::Double(
                text.parse()
                    .map_err(|_| syntax(start, format!("invalid double literal '{text}'")))?,
            )
        } else {
            Token::Int(
                text.parse()
                    .map_err(|_| syntax(start, format!("invalid int literal '{text}'")))?,
            )
        };
        Ok((token, start))
    }

    fn string(&mut self, start: usize, quote: char) -> Result<Spanned, ParseError> {
        let mut out = String::new();
        loop {
            let Some((pos, c)) = self.chars.next() else {
                return Err(syntax(start, "unterminated string literal"));
            };
            match c {
                c if c == quote => return Ok((Token::Str(out), start)),
                '\n' => return Err(syntax(pos, "newline in string literal")),
                '\\' => {
                    let Some((pos, escaped)) = self.chars.next() else {
                        return Err(syntax(start, "unterminated string literal"));
                    };
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '\'' => out.push('\''),
                        '"' => out.push('"'),
                        'u' => {
                            let mut code = 0u32;
                            for _ in 0..4 {
                                let digit = self
                                    .chars
                                    .next()
                                    .and_then(|(_, d)| d.to_digit(16))
                                    .ok_or_else(|| syntax(pos, "invalid unicode escape"))?;
                                code = code * 16 + digit;
                            }
                            out.push(
                                char::from_u32(code)
                                    .ok_or_else(|| syntax(pos, "invalid unicode escape"))?,
                            );
                        }
                        other => {
                            return Err(syntax(pos, format!("invalid escape sequence '\\{other}'")));
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }
}
