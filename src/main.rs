// ==========================================================
//  lanwarden — LAN discovery and monitoring controller
// ==========================================================

use comfy_table::{presets::UTF8_FULL, Table};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use lanwarden::model::DeviceRecord;
use lanwarden::registry::RegistryEvent;
use lanwarden::{
    control, net, persist, ControllerConfig, DiscoveryError, Fingerprinter, Monitor, Registry,
    Sweeper, SystemProber,
};

#[tokio::main]
async fn main() -> Result<(), DiscoveryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let raw_args: Vec<String> = std::env::args().collect();
    let mut args = raw_args.iter().skip(1);

    let mut jobs: Option<usize> = None;
    let mut config_path = "network_config.json".to_string();
    let mut db_path = "devices.json".to_string();
    let mut command = None;
    let mut positional = None;

    // Parse command line arguments
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--jobs" | "-j" => jobs = args.next().and_then(|s| s.parse().ok()),
            "--config" | "-c" => {
                if let Some(p) = args.next() {
                    config_path = p.clone();
                }
            }
            "--db" => {
                if let Some(p) = args.next() {
                    db_path = p.clone();
                }
            }
            "--list" => {
                net::interface::list_network_interfaces()?;
                return Ok(());
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "scan" | "monitor" | "wake" => command = Some(arg.clone()),
            _ => positional = Some(arg.clone()),
        }
    }

    let Some(command) = command else {
        print_usage();
        return Err(DiscoveryError::Other("no command specified".to_string()));
    };

    if command == "wake" {
        let mac = positional
            .ok_or_else(|| DiscoveryError::Other("wake requires a MAC address".to_string()))?;
        return control::wake_device(&mac).await;
    }

    let mut config = ControllerConfig::load(&config_path)?;
    if let Some(j) = jobs {
        config.max_threads = j.max(1);
    }

    // Positional argument overrides the configured subnet; an interface name
    // is mapped to its network
    if let Some(arg) = positional {
        config.default_subnet = if arg.contains('/') {
            arg
        } else {
            net::interface::get_network_from_interface(&arg)?
        };
    }

    let arp_interface = net::interface::find_network_interface(&config.default_subnet)?;
    let prober = Arc::new(SystemProber::new(&config, arp_interface));
    let registry = Arc::new(Registry::new());

    match command.as_str() {
        "scan" => run_scan(&config, prober, &registry, &db_path).await,
        "monitor" => run_monitor(config, prober, registry, &db_path).await,
        _ => unreachable!(),
    }
}

/// One-shot discovery: sweep, fingerprint every live host, print the results,
/// and save a snapshot
async fn run_scan(
    config: &ControllerConfig,
    prober: Arc<SystemProber>,
    registry: &Arc<Registry>,
    db_path: &str,
) -> Result<(), DiscoveryError> {
    println!("Scanning {} ...", config.default_subnet);

    let sweeper = Sweeper::new(prober.clone(), config.max_threads);
    let live = sweeper.sweep_subnet(&config.default_subnet).await?;
    println!("Found {} active devices, fingerprinting...", live.len());

    let fingerprinter = Arc::new(Fingerprinter::new(
        prober,
        config.probe_ports.clone(),
        config.max_threads,
    ));

    let records: Vec<DeviceRecord> = stream::iter(live)
        .map(|address| {
            let fingerprinter = fingerprinter.clone();
            async move { fingerprinter.fingerprint(address).await }
        })
        .buffer_unordered(config.max_threads)
        .collect()
        .await;

    for record in records {
        registry.apply(record).await;
    }

    print_devices(&registry.list().await);
    persist::save_snapshot(registry, db_path).await?;
    Ok(())
}

/// Continuous monitoring: restore the last snapshot, run the monitor loop
/// until Ctrl-C, then save state
async fn run_monitor(
    config: ControllerConfig,
    prober: Arc<SystemProber>,
    registry: Arc<Registry>,
    db_path: &str,
) -> Result<(), DiscoveryError> {
    persist::load_snapshot(&registry, db_path).await?;

    // Print change events as they arrive
    let mut events = registry.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RegistryEvent::Added(record)) => {
                    println!(
                        "+ {} {} ({})",
                        record.address, record.hostname, record.device_type
                    );
                }
                Ok(RegistryEvent::StatusChanged { address, old, new }) => {
                    println!("~ {} {} -> {}", address, old, new);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let monitor = Monitor::new(registry.clone(), prober, config);
    monitor.start().await;
    println!("Monitoring... press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    monitor.stop().await;

    print_devices(&registry.list().await);
    persist::save_snapshot(&registry, db_path).await?;
    Ok(())
}

/// Render discovered devices as a table
fn print_devices(records: &[DeviceRecord]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table.set_header(vec![
        "IP", "Hostname", "MAC", "Type", "OS", "Status", "Ports", "Services",
    ]);

    for record in records {
        let ports = record
            .open_ports
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let services = record
            .services
            .values()
            .filter(|s| !s.name.is_empty())
            .map(|s| s.name.clone())
            .take(3)
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(vec![
            record.address.to_string(),
            record.hostname.clone(),
            record.mac_address.clone(),
            record.device_type.to_string(),
            record.os_guess.clone(),
            record.status.to_string(),
            ports,
            services,
        ]);
    }

    println!("{}", table);
}

fn print_usage() {
    println!("Usage: lanwarden [OPTIONS] <COMMAND> [CIDR_NETWORK|INTERFACE]");
    println!("Commands:");
    println!("  scan               one-shot discovery of the target subnet");
    println!("  monitor            continuous monitoring (Ctrl-C to stop)");
    println!("  wake <MAC>         send a Wake-on-LAN packet");
    println!("Options:");
    println!("  -j, --jobs <N>     concurrent probe limit (default: 50)");
    println!("  -c, --config <P>   config file path (default: network_config.json)");
    println!("      --db <P>       snapshot file path (default: devices.json)");
    println!("      --list         list available network interfaces");
    println!("  -h, --help         show this help message");
}
