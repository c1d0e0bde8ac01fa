//! Mapping parsed records onto entity fields.

use std::str::FromStr;

use log::debug;

use crate::error::{ParseError, Result};
use crate::parse::Record;

/// What to do with record fields an entity does not know about.
///
/// Unknown fields never become attributes; this only decides whether they
/// are noticed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Drop them silently.
    Ignore,
    /// Drop them with a debug log line.
    #[default]
    Log,
    /// Fail with [`ParseError::UnknownField`].
    Reject,
}

/// Typed read access to one record, after the unknown-key check.
pub(crate) struct RecordReader<'a> {
    entity: &'static str,
    record: &'a Record,
}

impl<'a> RecordReader<'a> {
    pub fn new(
        entity: &'static str,
        record: &'a Record,
        known: &[&str],
        policy: UnknownKeys,
    ) -> Result<Self> {
        for key in record.keys().filter(|k| !known.contains(&k.as_str())) {
            match policy {
                UnknownKeys::Ignore => {}
                UnknownKeys::Log => debug!("{}: ignoring unknown field '{}'", entity, key),
                UnknownKeys::Reject => {
                    return Err(ParseError::UnknownField {
                        entity: entity.to_string(),
                        field: key.clone(),
                    }
                    .into());
                }
            }
        }

        Ok(Self { entity, record })
    }

    /// Field value, empty when absent.
    pub fn text(&self, field: &str) -> String {
        self.record.get(field).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    /// Field value, `None` when absent or blank.
    pub fn optional(&self, field: &str) -> Option<String> {
        Some(self.text(field)).filter(|v| !v.is_empty())
    }

    pub fn required(&self, field: &str) -> Result<String> {
        self.optional(field).ok_or_else(|| {
            ParseError::MissingField {
                entity: self.entity.to_string(),
                field: field.to_string(),
            }
            .into()
        })
    }

    /// Numeric field, `None` when absent or blank.
    pub fn number<T: FromStr>(&self, field: &str) -> Result<Option<T>> {
        match self.optional(field) {
            None => Ok(None),
            Some(value) => match value.parse() {
                Ok(number) => Ok(Some(number)),
                Err(_) => Err(self.invalid(field, &value)),
            },
        }
    }

    /// Numeric field that must be present.
    pub fn required_number<T: FromStr>(&self, field: &str) -> Result<T> {
        self.number(field)?.ok_or_else(|| {
            ParseError::MissingField {
                entity: self.entity.to_string(),
                field: field.to_string(),
            }
            .into()
        })
    }

    pub fn invalid(&self, field: &str, value: &str) -> crate::Error {
        ParseError::InvalidField {
            entity: self.entity.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::connection::mock::record;

    const KNOWN: &[&str] = &["vlan_id", "name"];

    #[test]
    fn test_unknown_keys_policy() {
        let rec = record(&[("vlan_id", "10"), ("name", "USERS"), ("colour", "blue")]);

        assert!(RecordReader::new("vlan", &rec, KNOWN, UnknownKeys::Ignore).is_ok());
        assert!(RecordReader::new("vlan", &rec, KNOWN, UnknownKeys::Log).is_ok());

        let err = RecordReader::new("vlan", &rec, KNOWN, UnknownKeys::Reject)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::Parse(ParseError::UnknownField { ref field, .. }) if field == "colour"
        ));
    }

    #[test]
    fn test_field_access() {
        let rec = record(&[("vlan_id", " 10 "), ("name", "")]);
        let reader = RecordReader::new("vlan", &rec, KNOWN, UnknownKeys::default()).unwrap();

        assert_eq!(reader.text("vlan_id"), "10");
        assert_eq!(reader.optional("name"), None);
        assert_eq!(reader.number::<u16>("vlan_id").unwrap(), Some(10));
        assert_eq!(reader.number::<u16>("missing").unwrap(), None);
        assert!(matches!(
            reader.required("name"),
            Err(Error::Parse(ParseError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_invalid_number() {
        let rec = record(&[("vlan_id", "ten")]);
        let reader = RecordReader::new("vlan", &rec, KNOWN, UnknownKeys::Ignore).unwrap();
        assert!(matches!(
            reader.required_number::<u16>("vlan_id"),
            Err(Error::Parse(ParseError::InvalidField { ref value, .. })) if value == "ten"
        ));
    }
}
