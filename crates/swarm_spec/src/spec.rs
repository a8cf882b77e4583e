//! The address token value type.

use crate::error::{SpecError, SpecResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One part of an address token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// Object type, introduced by `/`.
    Type,
    /// Object id, introduced by `#`.
    Id,
    /// Version stamp, introduced by `!`.
    Stamp,
    /// Operation name, introduced by `.`.
    Op,
}

impl Part {
    /// All parts in canonical order.
    pub const ALL: [Part; 4] = [Part::Type, Part::Id, Part::Stamp, Part::Op];

    /// Returns the quant character introducing this part.
    pub fn quant(&self) -> char {
        match self {
            Part::Type => '/',
            Part::Id => '#',
            Part::Stamp => '!',
            Part::Op => '.',
        }
    }

    /// Returns the part introduced by a quant character.
    pub fn from_quant(quant: char) -> Option<Self> {
        match quant {
            '/' => Some(Part::Type),
            '#' => Some(Part::Id),
            '!' => Some(Part::Stamp),
            '.' => Some(Part::Op),
            _ => None,
        }
    }
}

/// A parsed address token.
///
/// `Spec` is an immutable value: parsing validates every part, and the
/// accessors never fail. Missing parts can be filled from a scope and a
/// defaults token with [`Spec::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Spec {
    type_name: Option<String>,
    id: Option<String>,
    stamp: Option<String>,
    op: Option<String>,
}

impl Spec {
    /// Parses an address token.
    ///
    /// The empty string parses to an empty spec.
    pub fn parse(input: &str) -> SpecResult<Self> {
        let mut spec = Spec::default();
        let mut chars = input.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            let part = Part::from_quant(ch).ok_or(SpecError::UnexpectedChar { ch, offset })?;
            let start = offset + ch.len_utf8();
            let mut end = start;
            while let Some(&(pos, next)) = chars.peek() {
                if Part::from_quant(next).is_some() {
                    break;
                }
                end = pos + next.len_utf8();
                chars.next();
            }

            let body = &input[start..end];
            validate_token(part, body)?;

            let slot = spec.slot_mut(part);
            if slot.is_some() {
                return Err(SpecError::RepeatedPart { quant: part.quant() });
            }
            *slot = Some(body.to_string());
        }

        Ok(spec)
    }

    /// Parses `key` and fills its missing parts, first from `scope` and
    /// then from `defaults`.
    pub fn resolve(key: &str, scope: Option<&Spec>, defaults: &Spec) -> SpecResult<Self> {
        let mut spec = Spec::parse(key)?;
        if let Some(scope) = scope {
            spec.fill_from(scope);
        }
        spec.fill_from(defaults);
        Ok(spec)
    }

    /// Returns the object type, including any `+Ext` suffix.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns the object id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the version stamp.
    pub fn stamp(&self) -> Option<&str> {
        self.stamp.as_deref()
    }

    /// Returns the operation name.
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Returns the token of a given part.
    pub fn get(&self, part: Part) -> Option<&str> {
        match part {
            Part::Type => self.type_name(),
            Part::Id => self.id(),
            Part::Stamp => self.stamp(),
            Part::Op => self.op(),
        }
    }

    /// Returns the quants of the parts present, in canonical order.
    ///
    /// A full token yields `"/#!."`.
    pub fn pattern(&self) -> String {
        Part::ALL
            .iter()
            .filter(|part| self.get(**part).is_some())
            .map(Part::quant)
            .collect()
    }

    /// Returns the `/Type#id` prefix of this spec.
    pub fn type_id(&self) -> Spec {
        Spec {
            type_name: self.type_name.clone(),
            id: self.id.clone(),
            stamp: None,
            op: None,
        }
    }

    /// Returns true if no part is present.
    pub fn is_empty(&self) -> bool {
        Part::ALL.iter().all(|part| self.get(*part).is_none())
    }

    /// Returns true if this spec addresses a handshake.
    pub fn is_handshake(&self) -> bool {
        crate::handshake::is_handshake(self)
    }

    fn fill_from(&mut self, other: &Spec) {
        for part in Part::ALL {
            let slot = self.slot_mut(part);
            if slot.is_none() {
                *slot = other.get(part).map(str::to_string);
            }
        }
    }

    fn slot_mut(&mut self, part: Part) -> &mut Option<String> {
        match part {
            Part::Type => &mut self.type_name,
            Part::Id => &mut self.id,
            Part::Stamp => &mut self.stamp,
            Part::Op => &mut self.op,
        }
    }
}

fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '~'
}

/// Accepts `body` or `body+ext`, both non-empty.
fn validate_token(part: Part, token: &str) -> SpecResult<()> {
    if token.is_empty() {
        return Err(SpecError::EmptyToken { quant: part.quant() });
    }
    let (body, ext) = match token.split_once('+') {
        Some((body, ext)) => (body, Some(ext)),
        None => (token, None),
    };
    let valid = |s: &str| !s.is_empty() && s.chars().all(is_token_char);
    if !valid(body) || !ext.map_or(true, valid) {
        return Err(SpecError::invalid_token(part.quant(), token));
    }
    Ok(())
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in Part::ALL {
            if let Some(token) = self.get(part) {
                write!(f, "{}{}", part.quant(), token)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Spec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Spec::parse(s)
    }
}

impl TryFrom<&str> for Spec {
    type Error = SpecError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Spec::parse(value)
    }
}

impl Serialize for Spec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Spec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Spec::parse(&text).map_err(serde::de::Error::custom)
    }
}
