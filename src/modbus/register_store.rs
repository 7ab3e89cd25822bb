// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Shared register storage for the simulated field device
//!
//! The store holds the four Modbus data banks as flat, zero-based arrays:
//!
//! | Bank | Cell type | Written by |
//! |------|-----------|------------|
//! | Input registers | `u16` | simulation |
//! | Holding registers | `u16` | Modbus clients |
//! | Coils | `bool` | Modbus clients |
//! | Discrete inputs | `bool` | simulation |
//!
//! Every access is bounds-checked against the current size of the bank. A request
//! reaching past the end of a bank fails with [`RegisterError::OutOfRange`]; the
//! store never truncates or pads a result.
//!
//! ### Thread Safety
//!
//! [`RegisterStore`] is a handle around an `Arc<Mutex<RegisterBanks>>`. Cloning
//! the handle shares the banks, which is how the Modbus server connections and
//! the simulation loop observe the same state. Use [`RegisterStore::transaction`]
//! when several cells must change under one lock acquisition.

use std::{
    fmt,
    ops::Range,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

/// Identifies one of the four Modbus data banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    InputRegisters,
    HoldingRegisters,
    Coils,
    DiscreteInputs,
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bank::InputRegisters => "input register",
            Bank::HoldingRegisters => "holding register",
            Bank::Coils => "coil",
            Bank::DiscreteInputs => "discrete input",
        };
        f.write_str(name)
    }
}

/// Banks holding 16-bit register cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterBank {
    Input,
    Holding,
}

impl From<RegisterBank> for Bank {
    fn from(bank: RegisterBank) -> Self {
        match bank {
            RegisterBank::Input => Bank::InputRegisters,
            RegisterBank::Holding => Bank::HoldingRegisters,
        }
    }
}

/// Banks holding boolean cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitBank {
    Coils,
    DiscreteInputs,
}

impl From<BitBank> for Bank {
    fn from(bank: BitBank) -> Self {
        match bank {
            BitBank::Coils => Bank::Coils,
            BitBank::DiscreteInputs => Bank::DiscreteInputs,
        }
    }
}

/// Errors raised by register bank accesses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// The requested span `addr..addr + count` does not fit in the bank.
    #[error("{bank} address out of range: {addr} (count {count}, bank size {len})")]
    OutOfRange {
        bank: Bank,
        addr: u16,
        count: usize,
        len: usize,
    },
}

/// The four data banks behind the store lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterBanks {
    input_registers: Vec<u16>,
    holding_registers: Vec<u16>,
    coils: Vec<bool>,
    discrete_inputs: Vec<bool>,
}

impl RegisterBanks {
    /// Current number of cells in `bank`.
    pub fn len(&self, bank: Bank) -> usize {
        match bank {
            Bank::InputRegisters => self.input_registers.len(),
            Bank::HoldingRegisters => self.holding_registers.len(),
            Bank::Coils => self.coils.len(),
            Bank::DiscreteInputs => self.discrete_inputs.len(),
        }
    }

    /// Grow or shrink `bank` to `len` cells, keeping the existing prefix.
    pub fn resize(&mut self, bank: Bank, len: usize) {
        match bank {
            Bank::InputRegisters => self.input_registers.resize(len, 0),
            Bank::HoldingRegisters => self.holding_registers.resize(len, 0),
            Bank::Coils => self.coils.resize(len, false),
            Bank::DiscreteInputs => self.discrete_inputs.resize(len, false),
        }
    }

    /// Replace `bank` with `len` zeroed cells.
    pub fn reset(&mut self, bank: Bank, len: usize) {
        match bank {
            Bank::InputRegisters => self.input_registers = vec![0; len],
            Bank::HoldingRegisters => self.holding_registers = vec![0; len],
            Bank::Coils => self.coils = vec![false; len],
            Bank::DiscreteInputs => self.discrete_inputs = vec![false; len],
        }
    }

    pub fn read_registers(
        &self,
        bank: RegisterBank,
        addr: u16,
        count: u16,
    ) -> Result<Vec<u16>, RegisterError> {
        let cells = self.registers(bank);
        let range = checked_range(bank.into(), cells.len(), addr, count.into())?;
        Ok(cells[range].to_vec())
    }

    pub fn write_registers(
        &mut self,
        bank: RegisterBank,
        addr: u16,
        values: &[u16],
    ) -> Result<(), RegisterError> {
        let cells = self.registers_mut(bank);
        let range = checked_range(bank.into(), cells.len(), addr, values.len())?;
        cells[range].copy_from_slice(values);
        Ok(())
    }

    pub fn read_bits(&self, bank: BitBank, addr: u16, count: u16) -> Result<Vec<bool>, RegisterError> {
        let cells = self.bits(bank);
        let range = checked_range(bank.into(), cells.len(), addr, count.into())?;
        Ok(cells[range].to_vec())
    }

    pub fn write_bits(
        &mut self,
        bank: BitBank,
        addr: u16,
        values: &[bool],
    ) -> Result<(), RegisterError> {
        let cells = self.bits_mut(bank);
        let range = checked_range(bank.into(), cells.len(), addr, values.len())?;
        cells[range].copy_from_slice(values);
        Ok(())
    }

    /// Single-cell register read.
    pub fn register(&self, bank: RegisterBank, addr: u16) -> Result<u16, RegisterError> {
        let cells = self.registers(bank);
        let range = checked_range(bank.into(), cells.len(), addr, 1)?;
        Ok(cells[range.start])
    }

    /// Single-cell register write.
    pub fn set_register(
        &mut self,
        bank: RegisterBank,
        addr: u16,
        value: u16,
    ) -> Result<(), RegisterError> {
        self.write_registers(bank, addr, std::slice::from_ref(&value))
    }

    /// Single-cell boolean read.
    pub fn bit(&self, bank: BitBank, addr: u16) -> Result<bool, RegisterError> {
        let cells = self.bits(bank);
        let range = checked_range(bank.into(), cells.len(), addr, 1)?;
        Ok(cells[range.start])
    }

    /// Single-cell boolean write.
    pub fn set_bit(&mut self, bank: BitBank, addr: u16, value: bool) -> Result<(), RegisterError> {
        self.write_bits(bank, addr, std::slice::from_ref(&value))
    }

    fn registers(&self, bank: RegisterBank) -> &[u16] {
        match bank {
            RegisterBank::Input => &self.input_registers,
            RegisterBank::Holding => &self.holding_registers,
        }
    }

    fn registers_mut(&mut self, bank: RegisterBank) -> &mut [u16] {
        match bank {
            RegisterBank::Input => &mut self.input_registers,
            RegisterBank::Holding => &mut self.holding_registers,
        }
    }

    fn bits(&self, bank: BitBank) -> &[bool] {
        match bank {
            BitBank::Coils => &self.coils,
            BitBank::DiscreteInputs => &self.discrete_inputs,
        }
    }

    fn bits_mut(&mut self, bank: BitBank) -> &mut [bool] {
        match bank {
            BitBank::Coils => &mut self.coils,
            BitBank::DiscreteInputs => &mut self.discrete_inputs,
        }
    }
}

/// Resolve `addr..addr + count` against a bank of `len` cells.
fn checked_range(
    bank: Bank,
    len: usize,
    addr: u16,
    count: usize,
) -> Result<Range<usize>, RegisterError> {
    let start = usize::from(addr);
    let end = start + count;
    if end > len {
        return Err(RegisterError::OutOfRange {
            bank,
            addr,
            count,
            len,
        });
    }
    Ok(start..end)
}

/// Cloneable, thread-safe handle to the register banks.
///
/// A fresh store has four empty banks; every access fails with
/// [`RegisterError::OutOfRange`] until the banks are sized with
/// [`RegisterStore::reset`] (the data model does this on construction).
#[derive(Debug, Clone, Default)]
pub struct RegisterStore {
    banks: Arc<Mutex<RegisterBanks>>,
}

impl RegisterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to all four banks.
    ///
    /// Nothing else can read or write the store while `f` runs, so a group of
    /// writes performed inside one transaction is observed atomically by
    /// Modbus clients.
    pub fn transaction<T>(&self, f: impl FnOnce(&mut RegisterBanks) -> T) -> T {
        f(&mut self.lock())
    }

    /// Returns `true` when both handles point at the same banks.
    pub fn shares_banks_with(&self, other: &RegisterStore) -> bool {
        Arc::ptr_eq(&self.banks, &other.banks)
    }

    pub fn len(&self, bank: Bank) -> usize {
        self.lock().len(bank)
    }

    pub fn resize(&self, bank: Bank, len: usize) {
        self.lock().resize(bank, len);
    }

    pub fn reset(&self, bank: Bank, len: usize) {
        self.lock().reset(bank, len);
    }

    pub fn read_registers(
        &self,
        bank: RegisterBank,
        addr: u16,
        count: u16,
    ) -> Result<Vec<u16>, RegisterError> {
        self.lock().read_registers(bank, addr, count)
    }

    pub fn write_registers(
        &self,
        bank: RegisterBank,
        addr: u16,
        values: &[u16],
    ) -> Result<(), RegisterError> {
        self.lock().write_registers(bank, addr, values)
    }

    pub fn read_bits(&self, bank: BitBank, addr: u16, count: u16) -> Result<Vec<bool>, RegisterError> {
        self.lock().read_bits(bank, addr, count)
    }

    pub fn write_bits(&self, bank: BitBank, addr: u16, values: &[bool]) -> Result<(), RegisterError> {
        self.lock().write_bits(bank, addr, values)
    }

    // The banks only hold plain values, so a panic in another holder of the
    // lock cannot leave them in a state worth refusing.
    fn lock(&self) -> MutexGuard<'_, RegisterBanks> {
        self.banks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
