//! ELF-backed region inspector
//!
//! Implements the [`RegionInspector`] collaborator by reading the mapped
//! file's symbol table with the `object` crate: every text symbol whose
//! address lands inside the region's file window becomes a named function at
//! its offset within the region. Symbol names are demangled with
//! `rustc-demangle` so Rust frames read as source names.
//!
//! Inspection is best-effort: an unreadable or non-ELF file yields an empty
//! function list with a warning, since a region with no known functions is
//! perfectly valid (hits there are reported as unknown-region samples).

use anyhow::{Context, Result};
use log::warn;
use object::{Object, ObjectSymbol, SymbolKind};
use rustc_demangle::demangle;
use std::fs;

use crate::region::RegionInspector;

pub struct ElfInspector;

impl RegionInspector for ElfInspector {
    fn functions(&self, file_name: &str, file_offset: u32, size: u32) -> Vec<(String, u32)> {
        match read_symbols(file_name, file_offset, size) {
            Ok(functions) => functions,
            Err(err) => {
                warn!("no symbols for {file_name}: {err:#}");
                Vec::new()
            }
        }
    }
}

fn read_symbols(file_name: &str, file_offset: u32, size: u32) -> Result<Vec<(String, u32)>> {
    let data = fs::read(file_name).context("failed to read mapped file")?;
    let file = object::File::parse(&*data).context("failed to parse object file")?;

    let window_start = u64::from(file_offset);
    let window_end = window_start + u64::from(size);

    let mut functions = Vec::new();
    for symbol in file.symbols() {
        if symbol.kind() != SymbolKind::Text {
            continue;
        }
        let address = symbol.address();
        if address < window_start || address >= window_end {
            continue;
        }
        let Ok(name) = symbol.name() else { continue };
        if name.is_empty() {
            continue;
        }
        let offset = u32::try_from(address - window_start).unwrap_or(u32::MAX);
        functions.push((format!("{:#}", demangle(name)), offset));
    }
    Ok(functions)
}
