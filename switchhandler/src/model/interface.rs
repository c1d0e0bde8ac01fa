//! Interface entity.

use std::fmt;

use log::debug;
use serde::Serialize;

use super::record::{RecordReader, UnknownKeys};
use super::vlan::VlanId;
use crate::connection::Connection;
use crate::error::{Result, ValidationError};
use crate::parse::Record;

const INTERFACE_FIELDS: &[&str] = &[
    "interface",
    "link_status",
    "protocol_status",
    "hardware_type",
    "mac_address",
    "description",
    "mtu",
    "duplex",
    "speed",
    "last_input",
    "last_output",
    "input_errors",
    "crc",
    "output_errors",
];

const SWITCHPORT_FIELDS: &[&str] = &["interface", "mode", "access_vlan", "voice_vlan"];

/// Full interface type names, in the order abbreviations are tried.
const INTERFACE_TYPES: &[&str] = &[
    "GigabitEthernet",
    "FastEthernet",
    "TenGigabitEthernet",
    "TwoGigabitEthernet",
    "FortyGigabitEthernet",
    "HundredGigE",
    "Port-channel",
    "Vlan",
    "Ethernet",
    "Loopback",
    "Tunnel",
];

/// Expand an abbreviated interface name: `Gi1/0/1` -> `GigabitEthernet1/0/1`.
///
/// Names with an unrecognised type are returned unchanged.
pub fn canonical_interface_name(name: &str) -> String {
    let name = name.trim();
    let split = name
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(name.len());
    let (kind, rest) = name.split_at(split);

    if kind.len() < 2 {
        return name.to_string();
    }

    let kind = kind.to_ascii_lowercase();
    INTERFACE_TYPES
        .iter()
        .find(|full| full.to_ascii_lowercase().starts_with(&kind))
        .map(|full| format!("{full}{rest}"))
        .unwrap_or_else(|| name.to_string())
}

/// A VLAN as configured on a port: by number, or by name where the
/// platform allows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VlanRef {
    Id(u16),
    Name(String),
}

impl VlanRef {
    /// `0` and the empty name mean "no VLAN". Any other name, blank or
    /// not, is passed to the device as given.
    pub fn is_unset(&self) -> bool {
        match self {
            VlanRef::Id(id) => *id == 0,
            VlanRef::Name(name) => name.is_empty(),
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        match self {
            VlanRef::Id(id) => VlanId::new(*id).map(|_| ()),
            VlanRef::Name(name) if name.chars().any(|c| c.is_control()) => {
                Err(ValidationError::InvalidVlanRef {
                    reason: "contains control characters".to_string(),
                })
            }
            VlanRef::Name(_) => Ok(()),
        }
    }

    /// Value of an `Access Mode VLAN:` style field; `none` and blank are
    /// no VLAN.
    fn from_field(value: Option<String>) -> Option<Self> {
        let value = value?;
        if value.eq_ignore_ascii_case("none") {
            return None;
        }
        let vlan = match value.parse::<u16>() {
            Ok(id) => VlanRef::Id(id),
            Err(_) => VlanRef::Name(value),
        };
        Some(vlan).filter(|v| !v.is_unset())
    }
}

impl fmt::Display for VlanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VlanRef::Id(id) => write!(f, "{id}"),
            VlanRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<u16> for VlanRef {
    fn from(id: u16) -> Self {
        VlanRef::Id(id)
    }
}

impl From<VlanId> for VlanRef {
    fn from(id: VlanId) -> Self {
        VlanRef::Id(id.get())
    }
}

impl From<&str> for VlanRef {
    fn from(name: &str) -> Self {
        VlanRef::Name(name.to_string())
    }
}

impl From<String> for VlanRef {
    fn from(name: String) -> Self {
        VlanRef::Name(name)
    }
}

/// One switch port (or logical interface).
///
/// Only `description` and `access_vlan` can be changed, through
/// [`set_description`](Self::set_description) and
/// [`set_access_vlan`](Self::set_access_vlan). Everything else is a fact
/// read from the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interface {
    name: String,
    description: Option<String>,
    access_vlan: Option<VlanRef>,
    voice_vlan: Option<VlanRef>,
    switchport_mode: Option<String>,
    link_status: String,
    protocol_status: String,
    hardware_type: String,
    mac_address: Option<String>,
    mtu: Option<u32>,
    duplex: Option<String>,
    speed: Option<String>,
    last_input: String,
    last_output: String,
    input_errors: Option<u64>,
    crc: Option<u64>,
    output_errors: Option<u64>,
}

impl Interface {
    /// An interface with no facts loaded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build an interface from one `show interfaces` record.
    pub fn from_record(record: &Record, policy: UnknownKeys) -> Result<Self> {
        let reader = RecordReader::new("interface", record, INTERFACE_FIELDS, policy)?;

        Ok(Self {
            name: reader.required("interface")?,
            description: reader.optional("description"),
            access_vlan: None,
            voice_vlan: None,
            switchport_mode: None,
            link_status: reader.text("link_status"),
            protocol_status: reader.text("protocol_status"),
            hardware_type: reader.text("hardware_type"),
            mac_address: reader.optional("mac_address"),
            mtu: reader.number("mtu")?,
            duplex: reader.optional("duplex"),
            speed: reader.optional("speed"),
            last_input: reader.text("last_input"),
            last_output: reader.text("last_output"),
            input_errors: reader.number("input_errors")?,
            crc: reader.number("crc")?,
            output_errors: reader.number("output_errors")?,
        })
    }

    /// Merge VLAN facts from a `show interfaces switchport` record.
    pub fn apply_switchport(&mut self, record: &Record, policy: UnknownKeys) -> Result<()> {
        let reader = RecordReader::new("switchport", record, SWITCHPORT_FIELDS, policy)?;

        self.switchport_mode = reader.optional("mode");
        self.access_vlan = VlanRef::from_field(reader.optional("access_vlan"));
        self.voice_vlan = VlanRef::from_field(reader.optional("voice_vlan"));
        Ok(())
    }

    /// Name as the device reports it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with the interface type spelled out, used for lookups.
    pub fn canonical_name(&self) -> String {
        canonical_interface_name(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn access_vlan(&self) -> Option<&VlanRef> {
        self.access_vlan.as_ref()
    }

    pub fn voice_vlan(&self) -> Option<&VlanRef> {
        self.voice_vlan.as_ref()
    }

    /// Operational mode from `show interfaces switchport` (`static access`,
    /// `trunk`, `down`).
    pub fn switchport_mode(&self) -> Option<&str> {
        self.switchport_mode.as_deref()
    }

    pub fn link_status(&self) -> &str {
        &self.link_status
    }

    pub fn protocol_status(&self) -> &str {
        &self.protocol_status
    }

    pub fn hardware_type(&self) -> &str {
        &self.hardware_type
    }

    pub fn mac_address(&self) -> Option<&str> {
        self.mac_address.as_deref()
    }

    pub fn mtu(&self) -> Option<u32> {
        self.mtu
    }

    pub fn duplex(&self) -> Option<&str> {
        self.duplex.as_deref()
    }

    pub fn speed(&self) -> Option<&str> {
        self.speed.as_deref()
    }

    pub fn last_input(&self) -> &str {
        &self.last_input
    }

    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    pub fn input_errors(&self) -> Option<u64> {
        self.input_errors
    }

    pub fn crc(&self) -> Option<u64> {
        self.crc
    }

    pub fn output_errors(&self) -> Option<u64> {
        self.output_errors
    }

    /// Set or remove the port description.
    ///
    /// `None` and `""` both remove it.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use switchhandler::{Connection, Interface};
    ///
    /// # async fn example(conn: &mut impl Connection, port: &mut Interface) -> Result<(), switchhandler::Error> {
    /// port.set_description(conn, Some("uplink to core")).await?;
    /// port.set_description(conn, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set_description<C: Connection>(
        &mut self,
        conn: &mut C,
        description: Option<&str>,
    ) -> Result<()> {
        let description = description.filter(|d| !d.is_empty());

        if description.is_some_and(|d| d.chars().any(char::is_control)) {
            return Err(ValidationError::InvalidDescription {
                reason: "description contains control characters".to_string(),
            }
            .into());
        }

        let line = match description {
            Some(text) => format!("description {text}"),
            None => "no description".to_string(),
        };
        self.configure(conn, &line).await?;

        self.description = description.map(str::to_string);
        debug!("{}: description set to {:?}", self.name, self.description);
        Ok(())
    }

    /// Set or remove the access VLAN.
    ///
    /// `None`, `0` and `""` all remove it. Any other value is sent as given.
    pub async fn set_access_vlan<C: Connection>(
        &mut self,
        conn: &mut C,
        vlan: Option<VlanRef>,
    ) -> Result<()> {
        let vlan = vlan.filter(|v| !v.is_unset());
        if let Some(ref v) = vlan {
            v.validate()?;
        }

        let line = match vlan {
            Some(ref v) => format!("switchport access vlan {v}"),
            None => "no switchport access vlan".to_string(),
        };
        self.configure(conn, &line).await?;

        debug!("{}: access vlan set to {:?}", self.name, vlan);
        self.access_vlan = vlan;
        Ok(())
    }

    async fn configure<C: Connection>(&self, conn: &mut C, line: &str) -> Result<()> {
        let interface_line = format!("interface {}", self.name);
        conn.send_config_set(&[interface_line.as_str(), line])
            .await?;
        Ok(())
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} ({})", self.name, description),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::connection::mock::{Call, MockConnection, record};

    fn config_call(lines: &[&str]) -> Call {
        Call::Config(lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_canonical_interface_name() {
        assert_eq!(canonical_interface_name("Gi1/0/1"), "GigabitEthernet1/0/1");
        assert_eq!(canonical_interface_name("gi1/0/1"), "GigabitEthernet1/0/1");
        assert_eq!(
            canonical_interface_name("GigabitEthernet1/0/1"),
            "GigabitEthernet1/0/1"
        );
        assert_eq!(canonical_interface_name("Fa0/24"), "FastEthernet0/24");
        assert_eq!(canonical_interface_name("Te1/1/1"), "TenGigabitEthernet1/1/1");
        assert_eq!(canonical_interface_name("Tw1/0/1"), "TwoGigabitEthernet1/0/1");
        assert_eq!(canonical_interface_name("Po12"), "Port-channel12");
        assert_eq!(canonical_interface_name("Vl10"), "Vlan10");
        assert_eq!(canonical_interface_name("Eth1/1"), "Ethernet1/1");
        assert_eq!(canonical_interface_name("Lo0"), "Loopback0");
        assert_eq!(canonical_interface_name("Xy1"), "Xy1");
    }

    #[test]
    fn test_vlan_ref() {
        assert!(VlanRef::from(0).is_unset());
        assert!(VlanRef::from("").is_unset());
        assert!(!VlanRef::from("  ").is_unset());
        assert!(!VlanRef::from(10).is_unset());
        assert_eq!(VlanRef::from(10).to_string(), "10");
        assert_eq!(VlanRef::from("USERS").to_string(), "USERS");

        assert_eq!(VlanRef::from_field(Some("none".to_string())), None);
        assert_eq!(VlanRef::from_field(None), None);
        assert_eq!(
            VlanRef::from_field(Some("20".to_string())),
            Some(VlanRef::Id(20))
        );
    }

    #[tokio::test]
    async fn test_remove_description() {
        for value in [None, Some("")] {
            let mut conn = MockConnection::new();
            let mut port = Interface::new("GigabitEthernet1/0/4");

            port.set_description(&mut conn, value).await.unwrap();

            assert_eq!(
                conn.calls(),
                vec![config_call(&["interface GigabitEthernet1/0/4", "no description"])]
            );
            assert_eq!(port.description(), None);
        }
    }

    #[tokio::test]
    async fn test_set_description() {
        let mut conn = MockConnection::new();
        let mut port = Interface::new("GigabitEthernet1/0/4");

        port.set_description(&mut conn, Some("uplink to core"))
            .await
            .unwrap();

        assert_eq!(
            conn.calls(),
            vec![config_call(&[
                "interface GigabitEthernet1/0/4",
                "description uplink to core"
            ])]
        );
        assert_eq!(port.description(), Some("uplink to core"));
        assert_eq!(port.to_string(), "GigabitEthernet1/0/4 (uplink to core)");
    }

    #[tokio::test]
    async fn test_description_control_characters_rejected() {
        let mut conn = MockConnection::new();
        let mut port = Interface::new("Gi1/0/4");

        let err = port
            .set_description(&mut conn, Some("a\nshutdown"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidDescription { .. })
        ));
        assert!(conn.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_access_vlan() {
        for value in [None, Some(VlanRef::from(0)), Some(VlanRef::from(""))] {
            let mut conn = MockConnection::new();
            let mut port = Interface::new("Gi1/0/4");

            port.set_access_vlan(&mut conn, value).await.unwrap();

            assert_eq!(
                conn.calls(),
                vec![config_call(&["interface Gi1/0/4", "no switchport access vlan"])]
            );
            assert_eq!(port.access_vlan(), None);
        }
    }

    #[tokio::test]
    async fn test_set_access_vlan_verbatim() {
        for (value, expected) in [
            (VlanRef::from(10), "switchport access vlan 10"),
            (VlanRef::from("10"), "switchport access vlan 10"),
            (VlanRef::from("USERS"), "switchport access vlan USERS"),
            (VlanRef::from("  "), "switchport access vlan   "),
        ] {
            let mut conn = MockConnection::new();
            let mut port = Interface::new("Gi1/0/4");

            port.set_access_vlan(&mut conn, Some(value.clone()))
                .await
                .unwrap();

            assert_eq!(conn.calls(), vec![config_call(&["interface Gi1/0/4", expected])]);
            assert_eq!(port.access_vlan(), Some(&value));
        }
    }

    #[tokio::test]
    async fn test_access_vlan_out_of_range() {
        let mut conn = MockConnection::new();
        let mut port = Interface::new("Gi1/0/4");

        let err = port
            .set_access_vlan(&mut conn, Some(VlanRef::from(5000)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::VlanIdOutOfRange(5000))
        ));
        assert!(conn.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cached_value() {
        let mut conn = MockConnection::new().fail_config("% Invalid input detected");
        let mut port = Interface::new("Gi1/0/4");

        assert!(port.set_description(&mut conn, Some("x")).await.is_err());
        assert!(port.set_access_vlan(&mut conn, Some(10.into())).await.is_err());

        assert_eq!(port.description(), None);
        assert_eq!(port.access_vlan(), None);
    }

    #[test]
    fn test_from_record_and_switchport() {
        let rec = record(&[
            ("crc", "3"),
            ("description", "printer"),
            ("duplex", "Full"),
            ("hardware_type", "Gigabit Ethernet"),
            ("input_errors", "5"),
            ("interface", "GigabitEthernet1/0/5"),
            ("last_input", "00:00:01"),
            ("last_output", "never"),
            ("link_status", "up"),
            ("mac_address", "70db.98aa.bb05"),
            ("mtu", "1500"),
            ("output_errors", "0"),
            ("protocol_status", "up (connected)"),
            ("speed", "1000Mb/s"),
        ]);

        let mut port = Interface::from_record(&rec, UnknownKeys::Reject).unwrap();
        assert_eq!(port.name(), "GigabitEthernet1/0/5");
        assert_eq!(port.description(), Some("printer"));
        assert_eq!(port.mtu(), Some(1500));
        assert_eq!(port.input_errors(), Some(5));
        assert_eq!(port.crc(), Some(3));
        assert_eq!(port.output_errors(), Some(0));
        assert_eq!(port.last_output(), "never");
        assert_eq!(port.access_vlan(), None);

        let switchport = record(&[
            ("access_vlan", "10"),
            ("interface", "Gi1/0/5"),
            ("mode", "static access"),
            ("voice_vlan", "none"),
        ]);
        port.apply_switchport(&switchport, UnknownKeys::Reject)
            .unwrap();

        assert_eq!(port.access_vlan(), Some(&VlanRef::Id(10)));
        assert_eq!(port.voice_vlan(), None);
        assert_eq!(port.switchport_mode(), Some("static access"));
    }

    #[test]
    fn test_from_record_unknown_and_invalid() {
        let rec = record(&[("interface", "Gi1/0/1"), ("bia", "70db.98aa.bb01")]);
        let port = Interface::from_record(&rec, UnknownKeys::Log).unwrap();
        assert_eq!(port, Interface::new("Gi1/0/1"));

        let rec = record(&[("interface", "Gi1/0/1"), ("mtu", "jumbo")]);
        assert!(Interface::from_record(&rec, UnknownKeys::Log).is_err());

        let rec = record(&[("mtu", "1500")]);
        assert!(Interface::from_record(&rec, UnknownKeys::Log).is_err());
    }
}
