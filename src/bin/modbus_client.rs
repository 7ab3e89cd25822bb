// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::{Context, Result};
use clap::Parser;
use hvac_modbus_simulator::modbus::address_map::{self, AddressEntry};
use hvac_modbus_simulator::modbus::Bank;
use tokio::time::{timeout, Duration};
use tokio_modbus::prelude::*;

/// Modbus client dumping every mapped register of the HVAC simulator
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Modbus server address
    #[clap(long, default_value = "127.0.0.1")]
    address: String,

    /// Modbus server port
    #[clap(long, default_value = "5002")]
    port: u16,

    /// Modbus unit identifier
    #[clap(long, default_value = "1")]
    unit: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();

    let socket_addr = tokio::net::lookup_host((args.address.as_str(), args.port))
        .await?
        .next()
        .with_context(|| format!("Cannot resolve {}:{}", args.address, args.port))?;
    println!("Connecting to Modbus server at {}", socket_addr);

    let mut ctx = timeout(
        Duration::from_secs(1),
        tcp::connect_slave(socket_addr, Slave(args.unit)),
    )
    .await
    .context("Connection timed out")??;

    let count = span(Bank::InputRegisters);
    let input = ctx.read_input_registers(0, count).await??;
    print_registers(Bank::InputRegisters, &input);

    let count = span(Bank::HoldingRegisters);
    let holding = ctx.read_holding_registers(0, count).await??;
    print_registers(Bank::HoldingRegisters, &holding);

    let count = span(Bank::Coils);
    let coils = ctx.read_coils(0, count).await??;
    print_bits(Bank::Coils, &coils);

    let count = span(Bank::DiscreteInputs);
    let discrete = ctx.read_discrete_inputs(0, count).await??;
    print_bits(Bank::DiscreteInputs, &discrete);

    ctx.disconnect().await?;
    Ok(())
}

/// Number of cells to read so that every mapped offset of `bank` is covered.
fn span(bank: Bank) -> u16 {
    address_map::entries(bank)
        .map(|e| e.offset + 1)
        .max()
        .unwrap_or(0)
}

fn header(bank: Bank) {
    println!();
    println!("{}s", bank);
    println!("{}", "-".repeat(40));
}

fn describe(entry: &AddressEntry) -> String {
    if entry.meaning.is_empty() {
        String::new()
    } else {
        format!(" ({})", entry.meaning)
    }
}

fn print_registers(bank: Bank, values: &[u16]) {
    header(bank);
    for entry in address_map::entries(bank) {
        let Some(raw) = values.get(usize::from(entry.offset)) else {
            continue;
        };
        if entry.scale > 1 {
            println!(
                "{:>3} {:<22} {:>8.1} {}{}",
                entry.offset,
                entry.name,
                f32::from(*raw) / f32::from(entry.scale),
                entry.unit,
                describe(entry)
            );
        } else {
            println!(
                "{:>3} {:<22} {:>8} {}{}",
                entry.offset,
                entry.name,
                raw,
                entry.unit,
                describe(entry)
            );
        }
    }
}

fn print_bits(bank: Bank, values: &[bool]) {
    header(bank);
    for entry in address_map::entries(bank) {
        if let Some(bit) = values.get(usize::from(entry.offset)) {
            println!(
                "{:>3} {:<22} {:>8}{}",
                entry.offset,
                entry.name,
                if *bit { "ON" } else { "OFF" },
                describe(entry)
            );
        }
    }
}
