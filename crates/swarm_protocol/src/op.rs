//! Operation records.

use crate::error::{ProtocolError, ProtocolResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use swarm_spec::Spec;

/// Source stamp of records built before any handshake is known.
pub const NO_SOURCE: &str = "0";

/// An immutable operation record.
///
/// `Op` represents one replicated fact:
///
/// - `spec`: the address of the target object, version and operation
/// - `value`: the payload, interpreted according to the operation name
/// - `source`: the stamp of the peer or process that produced the record
/// - `patch`: optional ordered field-level sub-operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Op {
    spec: Spec,
    value: Value,
    source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    patch: Option<Vec<Op>>,
}

impl Op {
    /// Creates a record without a patch.
    pub fn new(spec: Spec, value: impl Into<Value>, source: impl Into<String>) -> Self {
        Self::from_parts(spec, value.into(), source.into(), None)
    }

    /// Creates a record from all four fields.
    pub fn from_parts(spec: Spec, value: Value, source: String, patch: Option<Vec<Op>>) -> Self {
        Self {
            spec,
            value,
            source,
            patch,
        }
    }

    /// Returns the address.
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Returns the payload.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the source stamp.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the patch, if any.
    pub fn patch(&self) -> Option<&[Op]> {
        self.patch.as_deref()
    }

    /// Returns the version stamp of the address.
    pub fn stamp(&self) -> Option<&str> {
        self.spec.stamp()
    }

    /// Returns true if the address is a handshake.
    pub fn is_handshake(&self) -> bool {
        self.spec.is_handshake()
    }

    /// Returns true if this record carries an error signal.
    ///
    /// Errors travel as ordinary operations addressed `.error`, with an
    /// optional stamp but no type or id.
    pub fn is_error(&self) -> bool {
        self.spec.op() == Some("error")
            && self.spec.type_name().is_none()
            && self.spec.id().is_none()
    }

    /// Decomposes the record into its fields.
    pub fn into_parts(self) -> (Spec, Value, String, Option<Vec<Op>>) {
        (self.spec, self.value, self.source, self.patch)
    }

    /// Encodes to CBOR bytes.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes).map_err(ProtocolError::codec)?;
        Ok(bytes)
    }

    /// Decodes from CBOR bytes.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        ciborium::from_reader(bytes).map_err(ProtocolError::codec)
    }

    /// Renders the `spec<TAB>value` line form.
    ///
    /// The line form drops `source` and `patch`.
    pub fn to_line(&self) -> String {
        self.to_string()
    }

    /// Parses the `spec<TAB>value` line form.
    ///
    /// A line without a tab carries a `Null` payload.
    pub fn parse_line(line: &str, source: impl Into<String>) -> ProtocolResult<Self> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let (spec, value) = match line.split_once('\t') {
            Some((spec, value)) => (spec, Value::parse_scalar(value)),
            None => (line, Value::Null),
        };
        if spec.is_empty() {
            return Err(ProtocolError::MalformedLine {
                line: line.to_string(),
            });
        }
        Ok(Self::new(Spec::parse(spec)?, value, source))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.spec, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(s: &str) -> Spec {
        Spec::parse(s).unwrap()
    }

    #[test]
    fn accessors() {
        let op = Op::new(spec("/Model#m!S1.set"), 5i64, "S1");
        assert_eq!(op.spec().to_string(), "/Model#m!S1.set");
        assert_eq!(op.value(), &Value::Integer(5));
        assert_eq!(op.source(), "S1");
        assert_eq!(op.stamp(), Some("S1"));
        assert!(op.patch().is_none());
        assert!(!op.is_handshake());
        assert!(!op.is_error());
    }

    #[test]
    fn error_records() {
        assert!(Op::new(spec(".error"), "boom", NO_SOURCE).is_error());
        assert!(Op::new(spec("!S1.error"), "boom", "S1").is_error());
        assert!(!Op::new(spec("/Model.error"), "boom", NO_SOURCE).is_error());
        assert!(!Op::new(spec("#m!S1.error"), "boom", "S1").is_error());
        assert!(!Op::new(spec("!S1.fail"), "boom", "S1").is_error());
    }

    #[test]
    fn cbor_roundtrip_keeps_patch_order() {
        let patch = vec![
            Op::new(spec("/Model#m!0.b"), 1i64, "A"),
            Op::new(spec("/Model#m!0.a"), 2i64, "A"),
        ];
        let op = Op::from_parts(
            spec("/Model#m!0.on"),
            Value::Null,
            "A".into(),
            Some(patch.clone()),
        );

        let bytes = op.encode().unwrap();
        let decoded = Op::decode(&bytes).unwrap();
        assert_eq!(decoded, op);
        assert_eq!(decoded.patch().unwrap(), patch.as_slice());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Op::decode(&[0xff, 0x00]),
            Err(ProtocolError::Codec { .. })
        ));
    }

    #[test]
    fn line_form() {
        let op = Op::parse_line("/Model#m!S.set\t42\n", "S").unwrap();
        assert_eq!(op.value(), &Value::Integer(42));
        assert_eq!(op.to_line(), "/Model#m!S.set\t42");

        let bare = Op::parse_line(".end", "0").unwrap();
        assert!(bare.value().is_null());

        assert!(matches!(
            Op::parse_line("\tvalue", "0"),
            Err(ProtocolError::MalformedLine { .. })
        ));
        assert!(matches!(
            Op::parse_line("no-quant\t1", "0"),
            Err(ProtocolError::Spec(_))
        ));
    }

    proptest! {
        #[test]
        fn cbor_roundtrip_keeps_arbitrary_patch(
            entries in prop::collection::vec(("[a-z]{1,6}", any::<i64>()), 0..16)
        ) {
            let patch: Vec<Op> = entries
                .iter()
                .map(|(name, value)| Op::new(spec(&format!("/Model#m!0.{name}")), *value, "A"))
                .collect();
            let op = Op::from_parts(
                spec("/Model#m!0.on"),
                Value::Null,
                "A".into(),
                Some(patch.clone()),
            );

            let decoded = Op::decode(&op.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded.patch().unwrap(), patch.as_slice());
            prop_assert_eq!(decoded, op);
        }
    }
}
