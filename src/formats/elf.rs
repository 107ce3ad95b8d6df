//! ELF dynamic-linking metadata.
//!
//! Reads the section header table, the `SHT_DYNAMIC` section(s) and the section
//! name table. Both classes and both byte orders are handled.

use tracing::debug;

use super::{push_unique, read_cstr, read_u16, read_u32, read_u64};
use super::{FormatError, ModuleFormat, ModuleInfo};
use crate::core::BuildType;

const SHT_DYNAMIC: u32 = 6;
const SHT_NOBITS: u32 = 8;

const DT_NULL: i64 = 0;
const DT_NEEDED: i64 = 1;
const DT_SONAME: i64 = 14;
const DT_RPATH: i64 = 15;
const DT_RUNPATH: i64 = 29;

const SHN_UNDEF: u16 = 0;
const SHN_XINDEX: u16 = 0xffff;

#[derive(Debug, Clone, Copy)]
struct Header {
    is_64: bool,
    le: bool,
    shoff: u64,
    shentsize: u16,
    shnum: u16,
    shstrndx: u16,
}

#[derive(Debug, Clone, Copy)]
struct Shdr {
    name_off: u32,
    sh_type: u32,
    sh_offset: u64,
    sh_size: u64,
    sh_link: u32,
}

fn malformed(msg: &str) -> FormatError {
    FormatError::Malformed(format!("ELF: {}", msg))
}

fn parse_header(data: &[u8]) -> Result<Header, FormatError> {
    if data.len() < 16 || &data[0..4] != b"\x7FELF" {
        return Err(FormatError::Unsupported);
    }
    let is_64 = match data[4] {
        1 => false,
        2 => true,
        _ => return Err(malformed("invalid class")),
    };
    let le = match data[5] {
        1 => true,
        2 => false,
        _ => return Err(malformed("invalid data encoding")),
    };
    let truncated = || malformed("truncated header");
    // e_shoff and the trailing e_shentsize/e_shnum/e_shstrndx move with the class.
    let (shoff, tail) = if is_64 {
        (read_u64(data, 40, le).ok_or_else(truncated)?, 58)
    } else {
        (read_u32(data, 32, le).ok_or_else(truncated)? as u64, 46)
    };
    Ok(Header {
        is_64,
        le,
        shoff,
        shentsize: read_u16(data, tail, le).ok_or_else(truncated)?,
        shnum: read_u16(data, tail + 2, le).ok_or_else(truncated)?,
        shstrndx: read_u16(data, tail + 4, le).ok_or_else(truncated)?,
    })
}

fn read_shdr(data: &[u8], off: usize, h: &Header) -> Option<Shdr> {
    let le = h.le;
    if h.is_64 {
        Some(Shdr {
            name_off: read_u32(data, off, le)?,
            sh_type: read_u32(data, off + 4, le)?,
            sh_offset: read_u64(data, off + 24, le)?,
            sh_size: read_u64(data, off + 32, le)?,
            sh_link: read_u32(data, off + 40, le)?,
        })
    } else {
        Some(Shdr {
            name_off: read_u32(data, off, le)?,
            sh_type: read_u32(data, off + 4, le)?,
            sh_offset: read_u32(data, off + 16, le)? as u64,
            sh_size: read_u32(data, off + 20, le)? as u64,
            sh_link: read_u32(data, off + 24, le)?,
        })
    }
}

fn section_headers(data: &[u8], h: &Header) -> Result<Vec<Shdr>, FormatError> {
    if h.shoff == 0 {
        return Ok(Vec::new());
    }
    let min_entsize = if h.is_64 { 64 } else { 40 };
    if (h.shentsize as usize) < min_entsize {
        return Err(malformed("section header entry too small"));
    }
    let shoff = usize::try_from(h.shoff).map_err(|_| malformed("section table offset"))?;
    let entsize = h.shentsize as usize;

    // e_shnum == 0 with a table present means the count lives in section 0's sh_size.
    let count = if h.shnum == 0 {
        let first = read_shdr(data, shoff, h).ok_or_else(|| malformed("section table out of bounds"))?;
        usize::try_from(first.sh_size).map_err(|_| malformed("section count"))?
    } else {
        h.shnum as usize
    };

    let table_end = count
        .checked_mul(entsize)
        .and_then(|len| shoff.checked_add(len))
        .ok_or_else(|| malformed("section table size overflow"))?;
    if table_end > data.len() {
        return Err(malformed("section table out of bounds"));
    }

    (0..count)
        .map(|i| read_shdr(data, shoff + i * entsize, h).ok_or_else(|| malformed("section header")))
        .collect()
}

fn section_bytes<'a>(data: &'a [u8], sh: &Shdr) -> Option<&'a [u8]> {
    if sh.sh_type == SHT_NOBITS {
        return None;
    }
    let start = usize::try_from(sh.sh_offset).ok()?;
    let len = usize::try_from(sh.sh_size).ok()?;
    data.get(start..start.checked_add(len)?)
}

/// Debug when any `.debug_*`/`.zdebug_*` section exists; Unknown when the
/// section names cannot be read.
fn classify(data: &[u8], h: &Header, shdrs: &[Shdr]) -> BuildType {
    if shdrs.is_empty() || h.shstrndx == SHN_UNDEF || h.shstrndx == SHN_XINDEX {
        return BuildType::Unknown;
    }
    let Some(names) = shdrs
        .get(h.shstrndx as usize)
        .and_then(|sh| section_bytes(data, sh))
    else {
        return BuildType::Unknown;
    };
    let has_debug = shdrs.iter().any(|sh| {
        read_cstr(names, sh.name_off as usize)
            .is_some_and(|n| n.starts_with(".debug") || n.starts_with(".zdebug"))
    });
    if has_debug {
        BuildType::Debug
    } else {
        BuildType::Release
    }
}

/// Parse dynamic-linking metadata from an ELF image.
pub fn parse_elf(data: &[u8]) -> Result<ModuleInfo, FormatError> {
    let header = parse_header(data)?;
    let shdrs = section_headers(data, &header)?;

    let mut info = ModuleInfo {
        format: ModuleFormat::Elf,
        declared_name: None,
        dependencies: Vec::new(),
        search_dirs: Vec::new(),
        build_type: classify(data, &header, &shdrs),
    };

    let entsize = if header.is_64 { 16 } else { 8 };
    for dynamic in shdrs.iter().filter(|s| s.sh_type == SHT_DYNAMIC) {
        let Some(entries) = section_bytes(data, dynamic) else {
            debug!("Dynamic section out of bounds; skipped");
            continue;
        };
        let Some(strings) = shdrs
            .get(dynamic.sh_link as usize)
            .and_then(|sh| section_bytes(data, sh))
        else {
            debug!("Dynamic section without a readable string table; skipped");
            continue;
        };

        for entry in entries.chunks_exact(entsize) {
            let (tag, val) = if header.is_64 {
                (
                    read_u64(entry, 0, header.le).unwrap_or(0) as i64,
                    read_u64(entry, 8, header.le).unwrap_or(0),
                )
            } else {
                (
                    read_u32(entry, 0, header.le).unwrap_or(0) as i32 as i64,
                    read_u32(entry, 4, header.le).unwrap_or(0) as u64,
                )
            };
            if tag == DT_NULL {
                break;
            }
            if !matches!(tag, DT_NEEDED | DT_SONAME | DT_RPATH | DT_RUNPATH) {
                continue;
            }
            let Some(value) = usize::try_from(val).ok().and_then(|off| read_cstr(strings, off))
            else {
                debug!(tag, offset = val, "Unreadable dynamic string; skipped");
                continue;
            };
            match tag {
                DT_NEEDED => push_unique(&mut info.dependencies, value),
                DT_SONAME => {
                    if info.declared_name.is_none() && !value.is_empty() {
                        info.declared_name = Some(value.to_string());
                    }
                }
                _ => {
                    for dir in value.split(':') {
                        push_unique(&mut info.search_dirs, dir);
                    }
                }
            }
        }
    }

    Ok(info)
}
