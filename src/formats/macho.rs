//! Mach-O load-command metadata.
//!
//! Only thin images are handled; universal (fat) binaries are reported as
//! unsupported.

use object::read::Object;

use super::{push_unique, read_cstr, read_u32};
use super::{FormatError, ModuleFormat, ModuleInfo};
use crate::core::BuildType;

const MH_MAGIC: u32 = 0xfeedface;
const MH_MAGIC_64: u32 = 0xfeedfacf;

const LC_LOAD_DYLIB: u32 = 0xc;
const LC_ID_DYLIB: u32 = 0xd;
const LC_LOAD_WEAK_DYLIB: u32 = 0x18;
const LC_RPATH: u32 = 0x1c;
const LC_REEXPORT_DYLIB: u32 = 0x1f;
const LC_LAZY_LOAD_DYLIB: u32 = 0x20;
const LC_LOAD_UPWARD_DYLIB: u32 = 0x23;

fn cmd_kind(cmd: u32) -> u32 {
    cmd & 0x7fff_ffff
}

/// (is_64, little_endian) for a thin Mach-O magic.
fn magic(data: &[u8]) -> Option<(bool, bool)> {
    let b = data.get(0..4)?;
    let magic_le = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    let magic_be = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
    match (magic_le, magic_be) {
        (MH_MAGIC_64, _) => Some((true, true)),
        (MH_MAGIC, _) => Some((false, true)),
        (_, MH_MAGIC_64) => Some((true, false)),
        (_, MH_MAGIC) => Some((false, false)),
        _ => None,
    }
}

pub(crate) fn is_thin_macho(data: &[u8]) -> bool {
    magic(data).is_some()
}

/// Read the `lc_str` at offset +8 of a dylib/rpath command.
fn command_string(cmd: &[u8], le: bool) -> Option<&str> {
    let name_off = read_u32(cmd, 8, le)? as usize;
    read_cstr(cmd, name_off)
}

/// Parse linked dylibs, install name and rpaths from a thin Mach-O image.
pub fn parse_macho(data: &[u8]) -> Result<ModuleInfo, FormatError> {
    let (is_64, le) = magic(data).ok_or(FormatError::Unsupported)?;
    let malformed = |msg: &str| FormatError::Malformed(format!("Mach-O: {}", msg));

    let ncmds = read_u32(data, 16, le).ok_or_else(|| malformed("truncated header"))?;
    let sizeofcmds = read_u32(data, 20, le).ok_or_else(|| malformed("truncated header"))? as usize;
    let start: usize = if is_64 { 32 } else { 28 };
    let lc_end = start
        .checked_add(sizeofcmds)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| malformed("load commands out of bounds"))?;

    let mut info = ModuleInfo {
        format: ModuleFormat::MachO,
        declared_name: None,
        dependencies: Vec::new(),
        search_dirs: Vec::new(),
        build_type: classify(data),
    };

    let mut off = start;
    for _ in 0..ncmds {
        if off + 8 > lc_end {
            return Err(malformed("load command past end"));
        }
        let cmd = read_u32(data, off, le).unwrap_or(0);
        let cmdsize = read_u32(data, off + 4, le).unwrap_or(0) as usize;
        if cmdsize < 8 || off + cmdsize > lc_end {
            return Err(malformed("bad load command size"));
        }
        let body = &data[off..off + cmdsize];
        match cmd_kind(cmd) {
            LC_LOAD_DYLIB
            | LC_LOAD_WEAK_DYLIB
            | LC_REEXPORT_DYLIB
            | LC_LAZY_LOAD_DYLIB
            | LC_LOAD_UPWARD_DYLIB => {
                if let Some(name) = command_string(body, le) {
                    push_unique(&mut info.dependencies, name);
                }
            }
            LC_ID_DYLIB => {
                if let Some(name) = command_string(body, le).filter(|n| !n.is_empty()) {
                    info.declared_name = Some(name.to_string());
                }
            }
            LC_RPATH => {
                if let Some(path) = command_string(body, le) {
                    push_unique(&mut info.search_dirs, path);
                }
            }
            _ => {}
        }
        off += cmdsize;
    }

    Ok(info)
}

/// Debug when `__DWARF` content is embedded; Unknown if the image does not
/// parse as a full object.
fn classify(data: &[u8]) -> BuildType {
    match object::read::File::parse(data) {
        Ok(obj) if obj.has_debug_symbols() => BuildType::Debug,
        Ok(_) => BuildType::Release,
        Err(_) => BuildType::Unknown,
    }
}
