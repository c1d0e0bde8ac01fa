//! Switch inventory example
//!
//! Connects to a switch, prints its facts and VLAN table, and optionally
//! its interfaces. Can also rename one VLAN.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example switch_inventory -- --host sw1 --user admin --password secret
//! ```
//!
//! JSON output with interfaces:
//! ```bash
//! cargo run --example switch_inventory -- --host sw1 --user admin --password secret --interfaces --json
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use switchhandler::{ConnectionBuilder, DeviceType, HostKeyVerification, Switch};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = ConnectionBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .timeout(Duration::from_secs(args.timeout));

    if let Some(password) = &args.password {
        builder = builder.password(password);
    } else if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    } else {
        eprintln!("Error: Must provide either --password or --key");
        std::process::exit(1);
    }

    if let Some(secret) = &args.enable_secret {
        builder = builder.enable_secret(secret);
    }
    if let Some(device_type) = &args.device_type {
        builder = builder.device_type(device_type.parse::<DeviceType>()?);
    }
    if args.insecure {
        builder = builder.host_key_verification(HostKeyVerification::Disabled);
    }

    let mut switch = Switch::connect_with(builder).await?;

    if let Some((id, name)) = &args.rename {
        switch.set_vlan_name(*id, name).await?;
        println!("{}", switch.vlan(*id).map(|v| v.to_string()).unwrap_or_default());
    }

    if args.interfaces {
        switch.load_interfaces().await?;
    }

    if args.json {
        let report = json!({
            "address": switch.address(),
            "device_type": switch.device_type(),
            "facts": switch.facts(),
            "vlans": switch.vlans().values().collect::<Vec<_>>(),
            "interfaces": switch.interfaces().values().collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&switch);
    }

    switch.close().await;
    Ok(())
}

fn print_report(switch: &Switch) {
    println!("=== {} ({}) ===\n", switch.hostname(), switch.address());
    println!("Device type:     {}", switch.device_type());
    println!("Model:           {}", switch.model());
    println!("Version:         {}", switch.version());
    println!("Image:           {}", switch.image());
    println!("Uptime:          {}", switch.uptime().text);
    println!("Reload reason:   {}", switch.reload_reason());
    println!("MAC address:     {}", switch.mac_address());
    println!("Config register: {}", switch.config_register());

    println!("\n--- VLANs ---\n");
    for vlan in switch.vlans().values() {
        println!(
            "{:<5} {:<32} {:<10} {}",
            vlan.vlan_id(),
            vlan.name(),
            vlan.status(),
            vlan.interfaces().join(", ")
        );
    }

    if !switch.interfaces().is_empty() {
        println!("\n--- Interfaces ---\n");
        for interface in switch.interfaces().values() {
            println!(
                "{:<28} {:<8} {:<6} {}",
                interface.name(),
                interface.link_status(),
                interface
                    .access_vlan()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                interface.description().unwrap_or_default()
            );
        }
    }
}

/// Simple argument parser
struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    key: Option<PathBuf>,
    enable_secret: Option<String>,
    device_type: Option<String>,
    timeout: u64,
    interfaces: bool,
    json: bool,
    insecure: bool,
    rename: Option<(u16, String)>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = env::var("USER").unwrap_or_else(|_| "admin".to_string());
        let mut password = None;
        let mut key = None;
        let mut enable_secret = None;
        let mut device_type = None;
        let mut timeout = 30u64;
        let mut interfaces = false;
        let mut json = false;
        let mut insecure = false;
        let mut rename = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--key" | "-k" => {
                    i += 1;
                    if i < args.len() {
                        key = Some(PathBuf::from(&args[i]));
                    }
                }
                "--enable" | "-e" => {
                    i += 1;
                    if i < args.len() {
                        enable_secret = Some(args[i].clone());
                    }
                }
                "--device-type" | "-d" => {
                    i += 1;
                    if i < args.len() {
                        device_type = Some(args[i].clone());
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--rename" | "-r" => {
                    i += 1;
                    if i < args.len() {
                        rename = args[i]
                            .split_once(':')
                            .and_then(|(id, name)| Some((id.parse().ok()?, name.to_string())));
                    }
                }
                "--interfaces" | "-i" => interfaces = true,
                "--json" | "-j" => json = true,
                "--insecure" => insecure = true,
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            key,
            enable_secret,
            device_type,
            timeout,
            interfaces,
            json,
            insecure,
            rename,
        }
    }

    fn print_help() {
        println!(
            r#"switchhandler inventory example

Prints a switch's facts and VLAN table, optionally its interfaces.

USAGE:
    cargo run --example switch_inventory -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>          Target host [default: localhost]
    -p, --port <PORT>          SSH port [default: 22]
    -u, --user <USER>          Username [default: $USER]
    -P, --password <PASS>      Password for authentication
    -k, --key <PATH>           Path to SSH private key
    -e, --enable <SECRET>      Enable secret
    -d, --device-type <TYPE>   cisco_ios, cisco_xe, cisco_nxos or arista_eos [default: autodetect]
    -t, --timeout <SECS>       Timeout [default: 30]
    -r, --rename <ID:NAME>     Rename a VLAN before printing
    -i, --interfaces           Load and print interfaces
    -j, --json                 Print JSON instead of tables
    --insecure                 Skip host key verification
    --help                     Print this help message

EXAMPLES:
    cargo run --example switch_inventory -- --host sw1 --user admin --password secret

    # Debug logging
    RUST_LOG=debug cargo run --example switch_inventory -- --host sw1 --user admin --password secret
"#
        );
    }
}
