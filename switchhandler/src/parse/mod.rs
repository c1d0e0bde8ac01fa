//! Structured parsing of command output with TextFSM templates.
//!
//! Templates are embedded per (device family, command). A command is looked
//! up the way the CLI itself resolves it: every word may be abbreviated down
//! to a minimum prefix, so `sh ver` and `show version` hit the same template.
//!
//! ```rust
//! use switchhandler::parse::parse_output;
//! use switchhandler::platform::DeviceType;
//!
//! let output = "Configuration register is 0x102\n";
//! let records = parse_output(DeviceType::CiscoIos, "sh ver", output).unwrap();
//! assert_eq!(records[0]["config_register"], "0x102");
//! ```

use indexmap::IndexMap;
use log::trace;
use textfsm_rust::Template;

use crate::error::{ParseError, Result};
use crate::platform::DeviceType;

/// One parsed row: lower-case field name to raw string value.
pub type Record = IndexMap<String, String>;

const IOS_FAMILY: &[DeviceType] = &[DeviceType::CiscoIos, DeviceType::CiscoXe];

/// An embedded template and the command it parses.
struct TemplateEntry {
    name: &'static str,
    device_types: &'static [DeviceType],
    /// Full command words with the shortest accepted abbreviation length.
    command: &'static [(&'static str, usize)],
    source: &'static str,
}

const TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry {
        name: "cisco_ios_show_version",
        device_types: IOS_FAMILY,
        command: &[("show", 2), ("version", 3)],
        source: include_str!("templates/cisco_ios_show_version.textfsm"),
    },
    TemplateEntry {
        name: "cisco_ios_show_vlan",
        device_types: IOS_FAMILY,
        command: &[("show", 2), ("vlan", 2)],
        source: include_str!("templates/cisco_ios_show_vlan.textfsm"),
    },
    TemplateEntry {
        name: "cisco_ios_show_vlan",
        device_types: IOS_FAMILY,
        command: &[("show", 2), ("vlan", 2), ("brief", 2)],
        source: include_str!("templates/cisco_ios_show_vlan.textfsm"),
    },
    TemplateEntry {
        name: "cisco_ios_show_interfaces",
        device_types: IOS_FAMILY,
        command: &[("show", 2), ("interfaces", 3)],
        source: include_str!("templates/cisco_ios_show_interfaces.textfsm"),
    },
    TemplateEntry {
        name: "cisco_ios_show_interfaces_switchport",
        device_types: IOS_FAMILY,
        command: &[("show", 2), ("interfaces", 3), ("switchport", 2)],
        source: include_str!("templates/cisco_ios_show_interfaces_switchport.textfsm"),
    },
];

impl TemplateEntry {
    fn matches(&self, device_type: DeviceType, command: &str) -> bool {
        if !self.device_types.contains(&device_type) {
            return false;
        }

        let words: Vec<String> = command
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();

        words.len() == self.command.len()
            && words
                .iter()
                .zip(self.command)
                .all(|(word, (full, min))| word.len() >= *min && full.starts_with(word.as_str()))
    }
}

/// Whether a template exists for this device type and command.
pub fn has_template(device_type: DeviceType, command: &str) -> bool {
    find_template(device_type, command).is_some()
}

fn find_template(device_type: DeviceType, command: &str) -> Option<&'static TemplateEntry> {
    TEMPLATES.iter().find(|t| t.matches(device_type, command))
}

/// Parse `output` of `command` into records.
pub fn parse_output(device_type: DeviceType, command: &str, output: &str) -> Result<Vec<Record>> {
    let entry = find_template(device_type, command).ok_or_else(|| ParseError::NoTemplate {
        device_type: device_type.to_string(),
        command: command.to_string(),
    })?;

    let template_error = |e: &dyn std::fmt::Display| ParseError::Template {
        template: entry.name.to_string(),
        message: e.to_string(),
    };

    let template = Template::parse_str(entry.source).map_err(|e| template_error(&e))?;
    let mut parser = template.parser();
    let rows = parser
        .parse_text_to_dicts(output)
        .map_err(|e| template_error(&e))?;

    trace!("{}: parsed {} records", entry.name, rows.len());

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut fields: Vec<(String, String)> = row
                .into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value))
                .collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            fields.into_iter().collect()
        })
        .collect())
}
