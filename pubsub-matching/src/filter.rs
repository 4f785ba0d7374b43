/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! LDAP-style service filters evaluated against property bags.
//!
//! Supported forms: `(key=value)`, `(key=*)`, `(&(..)(..))`, `(|(..)(..))` and
//! `(!(..))`. A backslash escapes the next character inside a value.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::properties::Properties;

/// Deepest nesting of `(...)` groups a parsed filter may have.
pub const MAX_FILTER_DEPTH: usize = 64;

/// Parsed service filter.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceFilter {
    Equals { key: String, value: String },
    Present { key: String },
    And(Vec<ServiceFilter>),
    Or(Vec<ServiceFilter>),
    Not(Box<ServiceFilter>),
}

/// Why a filter string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    UnexpectedEnd,
    UnexpectedChar { position: usize, found: char },
    EmptyKey { position: usize },
    EmptyComposite { position: usize },
    TrailingInput { position: usize },
    TooDeep { position: usize, limit: usize },
}

impl Display for FilterParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterParseError::UnexpectedEnd => write!(f, "filter ended unexpectedly"),
            FilterParseError::UnexpectedChar { position, found } => {
                write!(f, "unexpected character '{found}' at position {position}")
            }
            FilterParseError::EmptyKey { position } => {
                write!(f, "missing attribute name at position {position}")
            }
            FilterParseError::EmptyComposite { position } => {
                write!(f, "composite filter without operands at position {position}")
            }
            FilterParseError::TrailingInput { position } => {
                write!(f, "unexpected input after filter at position {position}")
            }
            FilterParseError::TooDeep { position, limit } => {
                write!(f, "filter nested deeper than {limit} levels at position {position}")
            }
        }
    }
}

impl Error for FilterParseError {}

impl ServiceFilter {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        ServiceFilter::Equals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn present(key: impl Into<String>) -> Self {
        ServiceFilter::Present { key: key.into() }
    }

    /// Evaluates the filter against `properties`.
    pub fn matches(&self, properties: &Properties) -> bool {
        match self {
            ServiceFilter::Equals { key, value } => properties
                .get(key)
                .is_some_and(|found| found.to_string() == *value),
            ServiceFilter::Present { key } => properties.contains_key(key),
            ServiceFilter::And(operands) => operands.iter().all(|op| op.matches(properties)),
            ServiceFilter::Or(operands) => operands.iter().any(|op| op.matches(properties)),
            ServiceFilter::Not(operand) => !operand.matches(properties),
        }
    }

    /// Returns the value of an equality term on `key` that every match must satisfy.
    ///
    /// Only the filter itself and the direct operands of a top-level `&` are
    /// considered.
    pub fn equality_value(&self, key: &str) -> Option<&str> {
        match self {
            ServiceFilter::Equals { key: k, value } if k == key => Some(value.as_str()),
            ServiceFilter::And(operands) => operands.iter().find_map(|op| match op {
                ServiceFilter::Equals { key: k, value } if k == key => Some(value.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }
}

impl Display for ServiceFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceFilter::Equals { key, value } => {
                write!(f, "({key}=")?;
                for c in value.chars() {
                    if matches!(c, '(' | ')' | '*' | '\\') {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            ServiceFilter::Present { key } => write!(f, "({key}=*)"),
            ServiceFilter::And(operands) => {
                write!(f, "(&")?;
                for op in operands {
                    write!(f, "{op}")?;
                }
                write!(f, ")")
            }
            ServiceFilter::Or(operands) => {
                write!(f, "(|")?;
                for op in operands {
                    write!(f, "{op}")?;
                }
                write!(f, ")")
            }
            ServiceFilter::Not(operand) => write!(f, "(!{operand})"),
        }
    }
}

impl FromStr for ServiceFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            chars: s.char_indices().collect(),
            pos: 0,
            depth: 0,
        };
        parser.skip_whitespace();
        let filter = parser.parse_filter()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(filter),
            Some((position, _)) => Err(FilterParseError::TrailingInput { position }),
        }
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<(usize, char)> {
        let next = self.peek();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FilterParseError> {
        match self.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((position, found)) => Err(FilterParseError::UnexpectedChar { position, found }),
            None => Err(FilterParseError::UnexpectedEnd),
        }
    }

    fn parse_filter(&mut self) -> Result<ServiceFilter, FilterParseError> {
        if self.depth == MAX_FILTER_DEPTH {
            let position = self.peek().map_or(self.chars.len(), |(position, _)| position);
            return Err(FilterParseError::TooDeep {
                position,
                limit: MAX_FILTER_DEPTH,
            });
        }
        self.depth += 1;
        let filter = self.parse_group();
        self.depth -= 1;
        filter
    }

    fn parse_group(&mut self) -> Result<ServiceFilter, FilterParseError> {
        self.expect('(')?;
        self.skip_whitespace();
        let filter = match self.peek() {
            Some((_, '&')) => {
                self.pos += 1;
                ServiceFilter::And(self.parse_operands()?)
            }
            Some((_, '|')) => {
                self.pos += 1;
                ServiceFilter::Or(self.parse_operands()?)
            }
            Some((_, '!')) => {
                self.pos += 1;
                self.skip_whitespace();
                ServiceFilter::Not(Box::new(self.parse_filter()?))
            }
            Some(_) => self.parse_item()?,
            None => return Err(FilterParseError::UnexpectedEnd),
        };
        self.skip_whitespace();
        self.expect(')')?;
        Ok(filter)
    }

    fn parse_operands(&mut self) -> Result<Vec<ServiceFilter>, FilterParseError> {
        let start = self.peek().map(|(position, _)| position).unwrap_or_default();
        let mut operands = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some((_, '(')) => operands.push(self.parse_filter()?),
                _ => break,
            }
        }
        if operands.is_empty() {
            return Err(FilterParseError::EmptyComposite { position: start });
        }
        Ok(operands)
    }

    fn parse_item(&mut self) -> Result<ServiceFilter, FilterParseError> {
        let key_start = self.peek().map(|(position, _)| position).unwrap_or_default();
        let mut key = String::new();
        loop {
            match self.next() {
                Some((_, '=')) => break,
                Some((position, c @ ('(' | ')'))) => {
                    return Err(FilterParseError::UnexpectedChar { position, found: c })
                }
                Some((_, c)) => key.push(c),
                None => return Err(FilterParseError::UnexpectedEnd),
            }
        }
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(FilterParseError::EmptyKey {
                position: key_start,
            });
        }

        let mut value = String::new();
        let mut escaped_any = false;
        loop {
            match self.peek() {
                Some((_, ')')) => break,
                Some((position, '(')) => {
                    return Err(FilterParseError::UnexpectedChar {
                        position,
                        found: '(',
                    })
                }
                Some((_, '\\')) => {
                    self.pos += 1;
                    let (_, c) = self.next().ok_or(FilterParseError::UnexpectedEnd)?;
                    escaped_any = true;
                    value.push(c);
                }
                Some((_, c)) => {
                    self.pos += 1;
                    value.push(c);
                }
                None => return Err(FilterParseError::UnexpectedEnd),
            }
        }

        if value == "*" && !escaped_any {
            Ok(ServiceFilter::Present { key })
        } else {
            Ok(ServiceFilter::Equals { key, value })
        }
    }
}
