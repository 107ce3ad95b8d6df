//! Common test utilities and helpers.
//!
//! Synthesized ELF images stand in for real binaries so the tests never depend
//! on what happens to be installed on the host.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use refgraph::{AnalysisConfig, BuildType, StaticProvider};

const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;
const SHT_DYNAMIC: u32 = 6;

const DT_NULL: u64 = 0;
const DT_NEEDED: u64 = 1;
const DT_SONAME: u64 = 14;
const DT_RPATH: u64 = 15;
const DT_RUNPATH: u64 = 29;

/// Builder for a minimal little-endian ELF64 shared object.
///
/// The image has no program headers; it carries `.dynstr`, `.dynamic`,
/// optionally `.debug_info`, and `.shstrtab`.
#[derive(Debug, Clone, Default)]
pub struct ElfImage {
    soname: Option<String>,
    needed: Vec<String>,
    rpath: Option<String>,
    runpath: Option<String>,
    debug: bool,
}

struct Section {
    name: u32,
    sh_type: u32,
    offset: u64,
    size: u64,
    link: u32,
}

impl ElfImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn soname(mut self, name: &str) -> Self {
        self.soname = Some(name.to_string());
        self
    }

    pub fn needed(mut self, names: &[&str]) -> Self {
        self.needed.extend(names.iter().map(|s| s.to_string()));
        self
    }

    pub fn rpath(mut self, path: &str) -> Self {
        self.rpath = Some(path.to_string());
        self
    }

    pub fn runpath(mut self, path: &str) -> Self {
        self.runpath = Some(path.to_string());
        self
    }

    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut dynstr = vec![0u8];
        let mut add_str = |s: &str| {
            let off = dynstr.len() as u64;
            dynstr.extend_from_slice(s.as_bytes());
            dynstr.push(0);
            off
        };

        let mut dynamic: Vec<(u64, u64)> = Vec::new();
        for name in &self.needed {
            dynamic.push((DT_NEEDED, add_str(name)));
        }
        if let Some(soname) = &self.soname {
            dynamic.push((DT_SONAME, add_str(soname)));
        }
        if let Some(rpath) = &self.rpath {
            dynamic.push((DT_RPATH, add_str(rpath)));
        }
        if let Some(runpath) = &self.runpath {
            dynamic.push((DT_RUNPATH, add_str(runpath)));
        }
        dynamic.push((DT_NULL, 0));

        let mut shstrtab = vec![0u8];
        let mut add_name = |s: &str| {
            let off = shstrtab.len() as u32;
            shstrtab.extend_from_slice(s.as_bytes());
            shstrtab.push(0);
            off
        };
        let dynstr_name = add_name(".dynstr");
        let dynamic_name = add_name(".dynamic");
        let debug_name = add_name(".debug_info");
        let shstrtab_name = add_name(".shstrtab");

        let mut out = vec![0u8; 64];
        let mut sections = vec![Section {
            name: 0,
            sh_type: 0,
            offset: 0,
            size: 0,
            link: 0,
        }];

        let dynstr_off = out.len() as u64;
        out.extend_from_slice(&dynstr);
        sections.push(Section {
            name: dynstr_name,
            sh_type: SHT_STRTAB,
            offset: dynstr_off,
            size: dynstr.len() as u64,
            link: 0,
        });

        align(&mut out, 8);
        let dynamic_off = out.len() as u64;
        for (tag, val) in &dynamic {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&val.to_le_bytes());
        }
        sections.push(Section {
            name: dynamic_name,
            sh_type: SHT_DYNAMIC,
            offset: dynamic_off,
            size: (dynamic.len() * 16) as u64,
            link: 1,
        });

        if self.debug {
            let debug_off = out.len() as u64;
            out.extend_from_slice(&[0u8; 16]);
            sections.push(Section {
                name: debug_name,
                sh_type: SHT_PROGBITS,
                offset: debug_off,
                size: 16,
                link: 0,
            });
        }

        let shstrtab_off = out.len() as u64;
        out.extend_from_slice(&shstrtab);
        sections.push(Section {
            name: shstrtab_name,
            sh_type: SHT_STRTAB,
            offset: shstrtab_off,
            size: shstrtab.len() as u64,
            link: 0,
        });

        align(&mut out, 8);
        let shoff = out.len() as u64;
        for sh in &sections {
            out.extend_from_slice(&sh.name.to_le_bytes());
            out.extend_from_slice(&sh.sh_type.to_le_bytes());
            out.extend_from_slice(&0u64.to_le_bytes()); // flags
            out.extend_from_slice(&0u64.to_le_bytes()); // addr
            out.extend_from_slice(&sh.offset.to_le_bytes());
            out.extend_from_slice(&sh.size.to_le_bytes());
            out.extend_from_slice(&sh.link.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes()); // info
            out.extend_from_slice(&1u64.to_le_bytes()); // addralign
            out.extend_from_slice(&0u64.to_le_bytes()); // entsize
        }

        let shnum = sections.len() as u16;
        write_header(&mut out, shoff, shnum, shnum - 1);
        out
    }

    /// Write the image to `dir/file_name`, creating `dir` if needed.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

fn align(out: &mut Vec<u8>, to: usize) {
    while out.len() % to != 0 {
        out.push(0);
    }
}

fn write_header(out: &mut [u8], shoff: u64, shnum: u16, shstrndx: u16) {
    out[0..4].copy_from_slice(b"\x7FELF");
    out[4] = 2; // ELFCLASS64
    out[5] = 1; // ELFDATA2LSB
    out[6] = 1; // EV_CURRENT
    out[16..18].copy_from_slice(&3u16.to_le_bytes()); // ET_DYN
    out[18..20].copy_from_slice(&62u16.to_le_bytes()); // EM_X86_64
    out[20..24].copy_from_slice(&1u32.to_le_bytes());
    out[40..48].copy_from_slice(&shoff.to_le_bytes());
    out[52..54].copy_from_slice(&64u16.to_le_bytes()); // e_ehsize
    out[58..60].copy_from_slice(&64u16.to_le_bytes()); // e_shentsize
    out[60..62].copy_from_slice(&shnum.to_le_bytes());
    out[62..64].copy_from_slice(&shstrndx.to_le_bytes());
}

/// Configuration that only searches directories the test controls.
pub fn isolated_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.search.use_system_paths = false;
    config
}

/// T -> [A, B], A -> [B].
pub fn scenario_a() -> StaticProvider {
    StaticProvider::new()
        .with_path("/opt/app/T", "T", BuildType::Release, &["A", "B"])
        .with_module("A", BuildType::Release, &["B"])
        .with_module("B", BuildType::Debug, &[])
}

/// T -> [X, A] where X cannot be loaded.
pub fn scenario_b() -> StaticProvider {
    StaticProvider::new()
        .with_path("/opt/app/T", "T", BuildType::Release, &["X", "A"])
        .with_module("A", BuildType::Release, &["X"])
}
