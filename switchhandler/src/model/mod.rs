//! Domain model: a switch, its VLANs and its interfaces.
//!
//! Entities hold the facts last read from the device. Setters are async
//! methods that take the connection explicitly, validate first, send the
//! configuration, and update the cached value only once the device accepted
//! it.

mod interface;
mod record;
mod switch;
mod vlan;

pub use interface::{Interface, VlanRef, canonical_interface_name};
pub use record::UnknownKeys;
pub use switch::{Switch, SwitchFacts, Uptime};
pub use vlan::{MAX_VLAN_NAME_LEN, Vlan, VlanId, validate_vlan_name};
