//! Ember Modbus Server Demo
//!
//! Starts a Modbus TCP server over an in-memory store and serves requests
//! until interrupted. Discrete inputs and input registers are pre-seeded
//! with an alternating pattern so read-only spaces have something to show.
//!
//! Usage: cargo run --bin server [bind_address] [unit_id]
//! Example: cargo run --bin server 0.0.0.0:1502 1

use std::sync::Arc;

use ember_modbus::{MemoryStore, ModbusTcpServer};
use tracing_subscriber::EnvFilter;

const STORE_SIZE: usize = 1000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let bind_address = args.next().unwrap_or_else(|| "127.0.0.1:1502".to_string());
    let unit_id: u8 = args.next().as_deref().unwrap_or("1").parse()?;

    println!("🚀 Ember Modbus Server Demo");
    println!("===========================");
    println!("  Bind address: {}", bind_address);
    println!("  Unit id:      {}", unit_id);
    println!("  Store size:   {} entities per space\n", STORE_SIZE);

    let store = Arc::new(MemoryStore::with_size(STORE_SIZE));

    // Alternating pattern in the read-only spaces, input simulation
    for address in 0..STORE_SIZE as u16 {
        store.set_discrete_input(address, address % 2 == 1)?;
        store.set_input_register(address, address % 2)?;
    }

    let mut server = ModbusTcpServer::new(&bind_address, unit_id, store)?;
    server.start().await?;
    println!("Server listening on {}. Press Ctrl-C to stop.", server.local_addr().unwrap());

    tokio::signal::ctrl_c().await?;
    server.stop();

    let stats = server.get_stats();
    println!("\n📊 Session statistics");
    println!("  Connections:         {}", stats.connections_count);
    println!("  Requests served:     {}", stats.total_requests);
    println!("  Successful:          {}", stats.successful_requests);
    println!("  Exception responses: {}", stats.exception_responses);
    println!("  Bytes in/out:        {}/{}", stats.bytes_received, stats.bytes_sent);

    Ok(())
}
