//! Ember Modbus Client Demo
//!
//! Connects to a Modbus TCP server and exercises every supported function
//! code: coil and register writes followed by read-backs, plus reads of the
//! read-only input spaces.
//!
//! Usage: cargo run --bin client [server_address] [unit_id]
//! Example: cargo run --bin client 127.0.0.1:1502 1

use std::time::Duration;

use ember_modbus::{ModbusClient, ModbusTcpClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let address = args.next().unwrap_or_else(|| "127.0.0.1:1502".to_string());
    let unit_id: u8 = args.next().as_deref().unwrap_or("1").parse()?;

    println!("🚀 Ember Modbus Client Demo");
    println!("===========================");
    println!("  Server:  {}", address);
    println!("  Unit id: {}\n", unit_id);

    let mut client = ModbusTcpClient::from_address(&address, Duration::from_secs(5)).await?;
    client.set_packet_logging(true);

    // =========================================================================
    // Part 1: Single writes (FC05 / FC06)
    // =========================================================================
    println!("✍️  Part 1: Single Writes");
    println!("-------------------------");

    client.write_05(unit_id, 8, true).await?;
    println!("  write_05: coil 8 set ON");

    client.write_06(unit_id, 7, 200).await?;
    println!("  write_06: register 7 = 200");

    // =========================================================================
    // Part 2: Read-backs (FC01 / FC03)
    // =========================================================================
    println!("\n📖 Part 2: Read-Backs");
    println!("---------------------");

    let coils = client.read_01(unit_id, 5, 8).await?;
    println!("  read_01 coils 5..13:   {:?}", coils);

    let holding = client.read_03(unit_id, 0, 10).await?;
    println!("  read_03 registers 0..10: {:?}", holding);

    // =========================================================================
    // Part 3: Read-only input spaces (FC02 / FC04)
    // =========================================================================
    println!("\n🔎 Part 3: Input Spaces");
    println!("-----------------------");

    let inputs = client.read_02(unit_id, 20, 3).await?;
    println!("  read_02 inputs 20..23:  {:?}", inputs);

    let input_regs = client.read_04(unit_id, 6, 1).await?;
    println!("  read_04 register 6:     {:?}", input_regs);

    // =========================================================================
    // Statistics
    // =========================================================================
    let stats = client.get_stats();
    println!("\n📊 Communication statistics");
    println!("  Requests sent:      {}", stats.requests_sent);
    println!("  Responses received: {}", stats.responses_received);
    println!("  Errors:             {}", stats.errors);
    println!("  Bytes in/out:       {}/{}", stats.bytes_received, stats.bytes_sent);

    client.close().await?;
    Ok(())
}
