//! Binary format readers.
//!
//! Each reader extracts the handful of facts dependency analysis needs from a
//! module image: its declared name (if the format has one), the libraries it
//! links against in declaration order, runtime search directories, and
//! whether it carries debug information. Readers never panic on malformed
//! input; every offset is bounds-checked.

pub mod elf;
pub mod macho;
pub mod pe;

use thiserror::Error;

use crate::core::BuildType;

/// Container format of a module image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleFormat {
    Elf,
    Pe,
    MachO,
}

impl ModuleFormat {
    /// Identify a format from its magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() >= 4 && &data[0..4] == b"\x7FELF" {
            return Some(ModuleFormat::Elf);
        }
        if data.len() >= 2 && &data[0..2] == b"MZ" {
            return Some(ModuleFormat::Pe);
        }
        if macho::is_thin_macho(data) {
            return Some(ModuleFormat::MachO);
        }
        None
    }
}

/// Facts extracted from one module image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub format: ModuleFormat,
    /// Name the module declares for itself (ELF `DT_SONAME`, Mach-O `LC_ID_DYLIB`).
    pub declared_name: Option<String>,
    /// Linked libraries in declaration order, without duplicates.
    pub dependencies: Vec<String>,
    /// Runtime search directories as written in the binary (may contain `$ORIGIN`).
    pub search_dirs: Vec<String>,
    pub build_type: BuildType,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unrecognized binary format")]
    Unsupported,
    #[error("{0}")]
    Malformed(String),
}

/// Parse any supported module image.
pub fn parse_module(data: &[u8]) -> Result<ModuleInfo, FormatError> {
    match ModuleFormat::detect(data) {
        Some(ModuleFormat::Elf) => elf::parse_elf(data),
        Some(ModuleFormat::Pe) => pe::parse_pe(data),
        Some(ModuleFormat::MachO) => macho::parse_macho(data),
        None => Err(FormatError::Unsupported),
    }
}

pub(crate) fn read_u16(data: &[u8], off: usize, le: bool) -> Option<u16> {
    let b = data.get(off..off.checked_add(2)?)?;
    Some(if le {
        u16::from_le_bytes([b[0], b[1]])
    } else {
        u16::from_be_bytes([b[0], b[1]])
    })
}

pub(crate) fn read_u32(data: &[u8], off: usize, le: bool) -> Option<u32> {
    let b = data.get(off..off.checked_add(4)?)?;
    Some(if le {
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    } else {
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    })
}

pub(crate) fn read_u64(data: &[u8], off: usize, le: bool) -> Option<u64> {
    let b = data.get(off..off.checked_add(8)?)?;
    Some(if le {
        u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
    } else {
        u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
    })
}

/// Longest name accepted from a string table.
const MAX_NAME_LEN: usize = 4096;

/// Read a NUL-terminated UTF-8 string starting at `off`.
pub(crate) fn read_cstr(table: &[u8], off: usize) -> Option<&str> {
    let rest = table.get(off..)?;
    let window = &rest[..rest.len().min(MAX_NAME_LEN)];
    let end = window.iter().position(|&b| b == 0)?;
    std::str::from_utf8(&window[..end]).ok()
}

/// Append `name` unless already present, preserving first-seen order.
pub(crate) fn push_unique(list: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}
