//! The switch aggregate: one session, its facts, VLANs and interfaces.

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;

use super::interface::{Interface, VlanRef, canonical_interface_name};
use super::record::{RecordReader, UnknownKeys};
use super::vlan::{Vlan, VlanId};
use crate::connection::{Connection, ConnectionBuilder, Credentials, SshConnection};
use crate::error::{ParseError, Result, ValidationError};
use crate::parse::Record;
use crate::platform::DeviceType;

const SHOW_VERSION: &str = "show version";
const SHOW_VLAN: &str = "show vlan";
const SHOW_INTERFACES: &str = "show interfaces";
const SHOW_SWITCHPORT: &str = "show interfaces switchport";

const VERSION_FIELDS: &[&str] = &[
    "version",
    "rommon",
    "hostname",
    "uptime",
    "uptime_years",
    "uptime_weeks",
    "uptime_days",
    "uptime_hours",
    "uptime_minutes",
    "reload_reason",
    "running_image",
    "hardware",
    "config_register",
    "mac",
    "restarted",
];

/// How long the switch has been up, as `show version` reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Uptime {
    /// The uptime line verbatim (`1 year, 2 weeks, 3 days, 4 hours, 5 minutes`).
    pub text: String,
    pub years: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

/// Facts from `show version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwitchFacts {
    pub hostname: String,
    pub model: String,
    pub version: String,
    pub rommon: String,
    pub uptime: Uptime,
    pub reload_reason: String,
    pub image: String,
    pub mac_address: String,
    pub config_register: String,
    pub restarted: String,
}

impl SwitchFacts {
    /// Map the `show version` record.
    pub fn from_record(record: &Record, policy: UnknownKeys) -> Result<Self> {
        let reader = RecordReader::new("version", record, VERSION_FIELDS, policy)?;

        Ok(Self {
            hostname: reader.required("hostname")?,
            model: reader.text("hardware"),
            version: reader.text("version"),
            rommon: reader.text("rommon"),
            uptime: Uptime {
                text: reader.text("uptime"),
                years: reader.number("uptime_years")?.unwrap_or(0),
                weeks: reader.number("uptime_weeks")?.unwrap_or(0),
                days: reader.number("uptime_days")?.unwrap_or(0),
                hours: reader.number("uptime_hours")?.unwrap_or(0),
                minutes: reader.number("uptime_minutes")?.unwrap_or(0),
            },
            reload_reason: reader.text("reload_reason"),
            image: reader.text("running_image"),
            mac_address: reader.text("mac"),
            config_register: reader.text("config_register"),
            restarted: reader.text("restarted"),
        })
    }
}

/// A managed switch.
///
/// The switch owns its connection. Every device interaction, including
/// writes on its VLANs and interfaces, goes through `&mut self`, so calls
/// on one session never interleave.
///
/// A `Switch` only exists fully loaded: construction fails, and the session
/// is closed, if the facts or the VLAN table cannot be read.
///
/// # Example
///
/// ```rust,no_run
/// use switchhandler::{Credentials, Switch};
///
/// #[tokio::main]
/// async fn main() -> Result<(), switchhandler::Error> {
///     let credentials = Credentials::new("admin", "secret");
///     let mut switch = Switch::connect("192.0.2.10", credentials).await?;
///
///     println!("{} runs {}", switch.hostname(), switch.version());
///     switch.set_vlan_name(10, "USERS").await?;
///
///     switch.close().await;
///     Ok(())
/// }
/// ```
pub struct Switch<C: Connection = SshConnection> {
    address: String,
    device_type: DeviceType,
    facts: SwitchFacts,
    vlans: IndexMap<VlanId, Vlan>,
    /// Keyed by canonical interface name.
    interfaces: IndexMap<String, Interface>,
    unknown_keys: UnknownKeys,
    connection: C,
    closed: bool,
}

impl Switch<SshConnection> {
    /// Connect with username and password, autodetecting the device type.
    pub async fn connect(address: impl Into<String>, credentials: Credentials) -> Result<Self> {
        Self::connect_with(ConnectionBuilder::new(address).credentials(credentials)).await
    }

    /// Connect with full control over the session settings.
    pub async fn connect_with(builder: ConnectionBuilder) -> Result<Self> {
        let address = builder.host().to_string();
        let connection = builder.connect().await?;
        Self::from_connection(address, connection).await
    }
}

impl<C: Connection> Switch<C> {
    /// Load facts and VLANs over an open connection.
    pub async fn from_connection(address: impl Into<String>, connection: C) -> Result<Self> {
        Self::from_connection_with(address, connection, UnknownKeys::default()).await
    }

    /// [`from_connection`](Self::from_connection) with an explicit policy for
    /// record fields the model does not know.
    pub async fn from_connection_with(
        address: impl Into<String>,
        mut connection: C,
        unknown_keys: UnknownKeys,
    ) -> Result<Self> {
        let address = address.into();

        let (facts, vlans) = match load(&mut connection, unknown_keys).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("{}: loading switch facts failed: {}", address, e);
                if let Err(close_err) = connection.disconnect().await {
                    warn!("{}: disconnect failed: {}", address, close_err);
                }
                return Err(e);
            }
        };

        info!(
            "{}: {} ({}) with {} VLANs",
            address,
            facts.hostname,
            facts.model,
            vlans.len()
        );

        Ok(Self {
            address,
            device_type: connection.device_type(),
            facts,
            vlans,
            interfaces: IndexMap::new(),
            unknown_keys,
            connection,
            closed: false,
        })
    }

    /// Management address.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn facts(&self) -> &SwitchFacts {
        &self.facts
    }

    pub fn hostname(&self) -> &str {
        &self.facts.hostname
    }

    /// Hardware model (`WS-C2960X-48FPD-L`).
    pub fn model(&self) -> &str {
        &self.facts.model
    }

    /// Software version (`15.2(7)E2`).
    pub fn version(&self) -> &str {
        &self.facts.version
    }

    pub fn uptime(&self) -> &Uptime {
        &self.facts.uptime
    }

    pub fn reload_reason(&self) -> &str {
        &self.facts.reload_reason
    }

    /// Running image file name.
    pub fn image(&self) -> &str {
        &self.facts.image
    }

    pub fn mac_address(&self) -> &str {
        &self.facts.mac_address
    }

    pub fn config_register(&self) -> &str {
        &self.facts.config_register
    }

    pub fn restarted(&self) -> &str {
        &self.facts.restarted
    }

    /// VLANs by ID, in the order the device lists them.
    pub fn vlans(&self) -> &IndexMap<VlanId, Vlan> {
        &self.vlans
    }

    pub fn vlan(&self, id: u16) -> Option<&Vlan> {
        VlanId::new(id).ok().and_then(|id| self.vlans.get(&id))
    }

    /// Rename a VLAN on the device and save the configuration.
    pub async fn set_vlan_name(&mut self, id: u16, name: &str) -> Result<()> {
        let vlan_id = VlanId::new(id)?;
        let vlan = self
            .vlans
            .get_mut(&vlan_id)
            .ok_or(ValidationError::UnknownVlan(id))?;
        vlan.set_name(&mut self.connection, name).await
    }

    /// Running configuration of one VLAN, framed by the prompt.
    pub async fn vlan_config(&mut self, id: u16) -> Result<String> {
        let vlan_id = VlanId::new(id)?;
        let vlan = self
            .vlans
            .get(&vlan_id)
            .ok_or(ValidationError::UnknownVlan(id))?;
        vlan.get_config(&mut self.connection).await
    }

    /// Re-read facts and VLANs. Interfaces are left as they are.
    pub async fn refresh(&mut self) -> Result<()> {
        let (facts, vlans) = load(&mut self.connection, self.unknown_keys).await?;
        self.facts = facts;
        self.vlans = vlans;
        debug!("{}: refreshed facts and VLANs", self.address);
        Ok(())
    }

    /// Re-read the VLAN table only.
    pub async fn refresh_vlans(&mut self) -> Result<()> {
        self.vlans = load_vlans(&mut self.connection, self.unknown_keys).await?;
        debug!("{}: refreshed {} VLANs", self.address, self.vlans.len());
        Ok(())
    }

    /// Read interfaces and their switchport VLANs from the device.
    ///
    /// Interfaces are not loaded at construction; call this before using
    /// [`interfaces`](Self::interfaces) or the interface setters.
    pub async fn load_interfaces(&mut self) -> Result<()> {
        let policy = self.unknown_keys;

        let records = self
            .connection
            .send_command_structured(SHOW_INTERFACES)
            .await?;
        let mut interfaces = IndexMap::with_capacity(records.len());
        for record in &records {
            let interface = Interface::from_record(record, policy)?;
            interfaces.insert(interface.canonical_name(), interface);
        }

        let switchports = self
            .connection
            .send_command_structured(SHOW_SWITCHPORT)
            .await?;
        for record in &switchports {
            let name = record
                .get("interface")
                .map(|n| canonical_interface_name(n))
                .unwrap_or_default();
            match interfaces.get_mut(&name) {
                Some(interface) => interface.apply_switchport(record, policy)?,
                None => debug!("{}: switchport record for unknown '{}'", self.address, name),
            }
        }

        debug!("{}: loaded {} interfaces", self.address, interfaces.len());
        self.interfaces = interfaces;
        Ok(())
    }

    /// Interfaces by canonical name. Empty until
    /// [`load_interfaces`](Self::load_interfaces) has run.
    pub fn interfaces(&self) -> &IndexMap<String, Interface> {
        &self.interfaces
    }

    /// Look up an interface by any abbreviation of its name.
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(&canonical_interface_name(name))
    }

    /// Set (`Some`) or remove (`None` or `""`) an interface description.
    pub async fn set_interface_description(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        let interface = self
            .interfaces
            .get_mut(&canonical_interface_name(name))
            .ok_or_else(|| ValidationError::UnknownInterface(name.to_string()))?;
        interface
            .set_description(&mut self.connection, description)
            .await
    }

    /// Set or remove an interface's access VLAN, then re-read the VLAN table
    /// so VLAN membership reflects the change.
    ///
    /// An error always means the write was not applied. If the write succeeds
    /// but the re-read fails, the failure is logged and the previous VLAN
    /// table is kept until the next [`refresh_vlans`](Self::refresh_vlans).
    pub async fn set_interface_access_vlan(
        &mut self,
        name: &str,
        vlan: Option<VlanRef>,
    ) -> Result<()> {
        let interface = self
            .interfaces
            .get_mut(&canonical_interface_name(name))
            .ok_or_else(|| ValidationError::UnknownInterface(name.to_string()))?;
        interface.set_access_vlan(&mut self.connection, vlan).await?;

        if let Err(e) = self.refresh_vlans().await {
            warn!(
                "{}: access VLAN of {} changed but VLANs were not re-read: {}",
                self.address, name, e
            );
        }
        Ok(())
    }

    /// End the session. Disconnect failures are logged, not returned.
    pub async fn close(mut self) {
        self.closed = true;
        match self.connection.disconnect().await {
            Ok(()) => debug!("{}: disconnected", self.address),
            Err(e) => warn!("{}: failed to disconnect: {}", self.address, e),
        }
    }
}

impl<C: Connection> Drop for Switch<C> {
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                "Switch {} dropped without close(); call close() to end the session cleanly",
                self.address
            );
        }
    }
}

async fn load<C: Connection>(
    conn: &mut C,
    policy: UnknownKeys,
) -> Result<(SwitchFacts, IndexMap<VlanId, Vlan>)> {
    let records = conn.send_command_structured(SHOW_VERSION).await?;
    let record = records.first().ok_or_else(|| ParseError::Empty {
        command: SHOW_VERSION.to_string(),
    })?;
    let facts = SwitchFacts::from_record(record, policy)?;

    let vlans = load_vlans(conn, policy).await?;
    Ok((facts, vlans))
}

async fn load_vlans<C: Connection>(
    conn: &mut C,
    policy: UnknownKeys,
) -> Result<IndexMap<VlanId, Vlan>> {
    let records = conn.send_command_structured(SHOW_VLAN).await?;
    records
        .iter()
        .map(|record| Vlan::from_record(record, policy).map(|vlan| (vlan.vlan_id(), vlan)))
        .collect()
}
