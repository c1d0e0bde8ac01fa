//! VLAN entity.

use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::interface::canonical_interface_name;
use super::record::{RecordReader, UnknownKeys};
use crate::connection::Connection;
use crate::error::{Result, ValidationError};
use crate::parse::Record;

/// Longest VLAN name IOS accepts.
pub const MAX_VLAN_NAME_LEN: usize = 32;

const RESERVED_VLANS: [u16; 5] = [1, 1002, 1003, 1004, 1005];

/// Interface tokens in a `show vlan` ports column, however it is joined.
static PORT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z\-]*\d+(?:[/.:]\d+)*").expect("static port pattern")
});

const VLAN_FIELDS: &[&str] = &["vlan_id", "name", "status", "interfaces"];

/// A VLAN ID in the 802.1Q range 1-4094.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    pub fn new(id: u16) -> std::result::Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(ValidationError::VlanIdOutOfRange(id.into()))
        }
    }

    pub fn get(&self) -> u16 {
        self.0
    }

    /// VLAN 1 and the legacy FDDI/Token Ring VLANs 1002-1005 cannot be
    /// renamed.
    pub fn is_reserved(&self) -> bool {
        RESERVED_VLANS.contains(&self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ValidationError;

    fn try_from(id: u16) -> std::result::Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(id: VlanId) -> Self {
        id.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check a VLAN name before it is sent to the device.
pub fn validate_vlan_name(name: &str) -> std::result::Result<(), ValidationError> {
    let reason = if name.trim().is_empty() {
        "name is empty".to_string()
    } else if name.chars().count() > MAX_VLAN_NAME_LEN {
        format!("name is longer than {} characters", MAX_VLAN_NAME_LEN)
    } else if name.chars().any(char::is_control) {
        "name contains control characters".to_string()
    } else {
        return Ok(());
    };

    Err(ValidationError::InvalidVlanName { reason })
}

/// One VLAN as reported by `show vlan`.
///
/// `vlan_id`, `status` and `interfaces` are fixed once read. `interfaces` is
/// a snapshot of membership at read time and is not kept in sync with
/// later port changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vlan {
    vlan_id: VlanId,
    name: String,
    status: String,
    interfaces: Vec<String>,
}

impl Vlan {
    pub fn new(
        vlan_id: VlanId,
        name: impl Into<String>,
        status: impl Into<String>,
        interfaces: Vec<String>,
    ) -> Self {
        Self {
            vlan_id,
            name: name.into(),
            status: status.into(),
            interfaces,
        }
    }

    /// Build a VLAN from one `show vlan` record.
    pub fn from_record(record: &Record, policy: UnknownKeys) -> Result<Self> {
        let reader = RecordReader::new("vlan", record, VLAN_FIELDS, policy)?;

        let raw_id: u16 = reader.required_number("vlan_id")?;
        let vlan_id =
            VlanId::new(raw_id).map_err(|_| reader.invalid("vlan_id", &raw_id.to_string()))?;

        let ports = reader.text("interfaces");
        let interfaces = PORT_TOKEN
            .find_iter(&ports)
            .map(|m| m.as_str().to_string())
            .collect();

        Ok(Self {
            vlan_id,
            name: reader.text("name"),
            status: reader.text("status"),
            interfaces,
        })
    }

    pub fn vlan_id(&self) -> VlanId {
        self.vlan_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Member interfaces as the device abbreviates them (`Gi1/0/1`).
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Whether `interface` is a member, in any abbreviation.
    pub fn contains_interface(&self, interface: &str) -> bool {
        let wanted = canonical_interface_name(interface);
        self.interfaces
            .iter()
            .any(|member| canonical_interface_name(member) == wanted)
    }

    /// Rename the VLAN on the device and save the configuration.
    ///
    /// The cached name changes only once both the configuration change and
    /// the save have succeeded. Reserved VLANs are refused before anything
    /// is sent.
    pub async fn set_name<C: Connection>(&mut self, conn: &mut C, name: &str) -> Result<()> {
        if self.vlan_id.is_reserved() {
            return Err(ValidationError::ReservedVlan(self.vlan_id.get()).into());
        }
        validate_vlan_name(name)?;

        let vlan_line = format!("vlan {}", self.vlan_id);
        let name_line = format!("name {}", name);
        conn.send_config_set(&[vlan_line.as_str(), name_line.as_str()])
            .await?;
        conn.save_config().await?;

        self.name = name.to_string();
        debug!("VLAN {} name set to {}", self.vlan_id, name);
        Ok(())
    }

    /// Running configuration of this VLAN, framed by the device prompt as it
    /// would appear on a terminal.
    pub async fn get_config<C: Connection>(&self, conn: &mut C) -> Result<String> {
        let prompt = conn.find_prompt().await?;
        let command = format!("show running-config vlan {}", self.vlan_id);
        let output = conn.send_command(&command).await?;
        Ok(format!("{prompt}{command}\n{output}\n{prompt}"))
    }
}

impl fmt::Display for Vlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VLAN {} - {}", self.vlan_id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::connection::mock::{Call, MockConnection, record};
    use crate::error::{CommandError, ParseError};
    use tokio_test::{assert_err, assert_ok};

    fn vlan(id: u16, name: &str) -> Vlan {
        Vlan::new(
            VlanId::new(id).unwrap(),
            name,
            "active",
            vec!["Gi1/0/1".to_string()],
        )
    }

    #[test]
    fn test_vlan_id_range() {
        assert_ok!(VlanId::new(1));
        assert_ok!(VlanId::new(4094));
        assert_eq!(VlanId::new(0), Err(ValidationError::VlanIdOutOfRange(0)));
        assert_eq!(
            VlanId::new(4095),
            Err(ValidationError::VlanIdOutOfRange(4095))
        );
    }

    #[test]
    fn test_reserved_ids() {
        for id in [1, 1002, 1003, 1004, 1005] {
            assert!(VlanId::new(id).unwrap().is_reserved());
        }
        for id in [2, 10, 1001, 1006, 4094] {
            assert!(!VlanId::new(id).unwrap().is_reserved());
        }
    }

    #[test]
    fn test_vlan_id_serde() {
        let id: VlanId = serde_json::from_str("10").unwrap();
        assert_eq!(id.get(), 10);
        assert!(serde_json::from_str::<VlanId>("5000").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "10");
    }

    #[test]
    fn test_validate_vlan_name() {
        assert_ok!(validate_vlan_name("USERS"));
        assert_ok!(validate_vlan_name(&"x".repeat(32)));
        assert_err!(validate_vlan_name(""));
        assert_err!(validate_vlan_name("   "));
        assert_err!(validate_vlan_name(&"x".repeat(33)));
        assert_err!(validate_vlan_name("bad\nname"));
    }

    #[tokio::test]
    async fn test_reserved_vlan_rename_sends_nothing() {
        for id in [1, 1002, 1003, 1004, 1005] {
            let mut conn = MockConnection::new();
            let mut entity = vlan(id, "default");

            let err = entity.set_name(&mut conn, "NEW").await.unwrap_err();

            assert!(matches!(err, Error::Validation(ValidationError::ReservedVlan(v)) if v == id));
            assert!(conn.calls().is_empty());
            assert_eq!(entity.name(), "default");
        }
    }

    #[tokio::test]
    async fn test_rename_issues_three_calls_in_order() {
        let mut conn = MockConnection::new();
        let mut entity = vlan(10, "OLD");

        entity.set_name(&mut conn, "NEW").await.unwrap();

        assert_eq!(
            conn.calls(),
            vec![
                Call::Config(vec!["vlan 10".to_string(), "name NEW".to_string()]),
                Call::Save,
            ]
        );
        assert_eq!(entity.name(), "NEW");
        assert_eq!(entity.vlan_id().get(), 10);
        assert_eq!(entity.status(), "active");
        assert_eq!(entity.interfaces(), ["Gi1/0/1".to_string()]);
    }

    #[tokio::test]
    async fn test_rename_save_failure_keeps_old_name() {
        let mut conn = MockConnection::new().fail_save("startup-config is locked");
        let mut entity = vlan(10, "OLD");

        let err = entity.set_name(&mut conn, "NEW").await.unwrap_err();

        assert!(matches!(err, Error::Command(CommandError::Failed { .. })));
        assert_eq!(conn.calls().len(), 2);
        assert_eq!(entity.name(), "OLD");
    }

    #[tokio::test]
    async fn test_rename_config_failure_skips_save() {
        let mut conn = MockConnection::new().fail_config("% Invalid input detected");
        let mut entity = vlan(10, "OLD");

        assert!(entity.set_name(&mut conn, "NEW").await.is_err());
        assert_eq!(conn.calls().len(), 1);
        assert_eq!(entity.name(), "OLD");
    }

    #[tokio::test]
    async fn test_invalid_name_sends_nothing() {
        let mut conn = MockConnection::new();
        let mut entity = vlan(10, "OLD");

        let err = entity.set_name(&mut conn, "").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidVlanName { .. })
        ));
        assert!(conn.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_config_is_framed_by_prompt() {
        let mut conn = MockConnection::new().with_output(
            "show running-config vlan 10",
            "vlan 10\n name USERS",
        );
        let entity = vlan(10, "USERS");

        let config = entity.get_config(&mut conn).await.unwrap();

        assert_eq!(
            config,
            "sw1#show running-config vlan 10\nvlan 10\n name USERS\nsw1#"
        );
        assert_eq!(
            conn.calls(),
            vec![
                Call::Prompt,
                Call::Command("show running-config vlan 10".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_record() {
        let rec = record(&[
            ("interfaces", "Gi1/0/5, Gi1/0/6\nGi1/0/7"),
            ("name", "USERS"),
            ("status", "active"),
            ("vlan_id", "10"),
        ]);

        let entity = Vlan::from_record(&rec, UnknownKeys::Reject).unwrap();

        assert_eq!(entity.vlan_id().get(), 10);
        assert_eq!(entity.name(), "USERS");
        assert_eq!(entity.interfaces(), ["Gi1/0/5", "Gi1/0/6", "Gi1/0/7"]);
        assert!(entity.contains_interface("GigabitEthernet1/0/6"));
        assert!(!entity.contains_interface("Gi1/0/1"));
        assert_eq!(entity.to_string(), "VLAN 10 - USERS");
    }

    #[test]
    fn test_from_record_list_rendering() {
        let rec = record(&[
            ("interfaces", "['Gi1/0/1', 'Gi1/0/2', 'Po1']"),
            ("name", "default"),
            ("status", "active"),
            ("vlan_id", "1"),
        ]);

        let entity = Vlan::from_record(&rec, UnknownKeys::Log).unwrap();
        assert_eq!(entity.interfaces(), ["Gi1/0/1", "Gi1/0/2", "Po1"]);
    }

    #[test]
    fn test_unknown_keys_do_not_become_attributes() {
        let rec = record(&[
            ("vlan_id", "20"),
            ("name", "VOICE"),
            ("status", "active"),
            ("said", "100020"),
        ]);

        let entity = Vlan::from_record(&rec, UnknownKeys::Ignore).unwrap();
        assert_eq!(entity, Vlan::new(VlanId::new(20).unwrap(), "VOICE", "active", vec![]));

        let err = Vlan::from_record(&rec, UnknownKeys::Reject).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::UnknownField { .. })));
    }

    #[test]
    fn test_from_record_bad_id() {
        let rec = record(&[("vlan_id", "0"), ("name", "x")]);
        assert!(matches!(
            Vlan::from_record(&rec, UnknownKeys::Ignore),
            Err(Error::Parse(ParseError::InvalidField { .. }))
        ));

        let rec = record(&[("name", "x")]);
        assert!(matches!(
            Vlan::from_record(&rec, UnknownKeys::Ignore),
            Err(Error::Parse(ParseError::MissingField { .. }))
        ));
    }
}
