//! `nzbmount show-config` – print the resolved configuration.

use anyhow::Result;
use nzbmount_core::config::{self, NzbMountConfig};

pub fn run_show_config(cfg: &NzbMountConfig) -> Result<()> {
    match config::config_path() {
        Ok(path) => println!("config file: {}", path.display()),
        Err(err) => println!("config file: unavailable ({err})"),
    }
    match &cfg.mount_dir {
        Some(dir) => println!("mount dir:   {}", dir.display()),
        None => println!("mount dir:   (engine default)"),
    }
    println!("log level:   {:?}", cfg.log_level);

    println!();
    if cfg.servers.is_empty() {
        println!("No servers configured.");
    } else {
        println!("servers:");
        for server in &cfg.servers {
            println!("  {} ({} connections)", server, server.connections);
        }
    }

    println!();
    let throttling = &cfg.throttling;
    println!("throttling:  {:?}", throttling.mode);
    if throttling.speed_limit_enabled() {
        println!(
            "speed limit: {} {}",
            throttling.speed_limit, throttling.speed_limit_unit
        );
    } else {
        println!("speed limit: unlimited");
    }
    if throttling.precache_enabled() {
        println!(
            "precache:    {} {}",
            throttling.precache_size, throttling.precache_size_unit
        );
    } else {
        println!("precache:    disabled");
    }
    Ok(())
}
