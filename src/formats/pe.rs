//! PE import metadata via the `object` crate.

use object::read::Object;

use super::{push_unique, FormatError, ModuleFormat, ModuleInfo};
use crate::core::BuildType;

/// Parse imported DLL names from a PE image.
///
/// Import descriptors are visited in table order; the first occurrence of a
/// DLL fixes its position.
pub fn parse_pe(data: &[u8]) -> Result<ModuleInfo, FormatError> {
    let obj = object::read::File::parse(data)
        .map_err(|e| FormatError::Malformed(format!("PE: {}", e)))?;
    if obj.format() != object::BinaryFormat::Pe {
        return Err(FormatError::Unsupported);
    }

    let mut dependencies = Vec::new();
    let imports = obj
        .imports()
        .map_err(|e| FormatError::Malformed(format!("PE imports: {}", e)))?;
    for import in imports {
        let library = String::from_utf8_lossy(import.library());
        push_unique(&mut dependencies, &library);
    }

    let build_type = classify(obj.has_debug_symbols(), &dependencies);
    Ok(ModuleInfo {
        format: ModuleFormat::Pe,
        declared_name: None,
        dependencies,
        search_dirs: Vec::new(),
        build_type,
    })
}

/// Debug when DWARF is embedded (MinGW) or a debug C runtime is linked
/// (MSVC `/MDd`). A PDB reference says nothing about the configuration:
/// release builds and system DLLs carry one too.
fn classify(has_dwarf: bool, dependencies: &[String]) -> BuildType {
    if has_dwarf || dependencies.iter().any(|d| is_debug_crt(d)) {
        BuildType::Debug
    } else {
        BuildType::Release
    }
}

/// `ucrtbased.dll`, `vcruntime<ver>d.dll`, `msvcr<ver>d.dll`, `msvcp<ver>d.dll`.
fn is_debug_crt(dll: &str) -> bool {
    let lower = dll.to_ascii_lowercase();
    let Some(stem) = lower.strip_suffix(".dll") else {
        return false;
    };
    if stem == "ucrtbased" {
        return true;
    }
    ["vcruntime", "msvcr", "msvcp"].iter().any(|prefix| {
        stem.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix('d'))
            .is_some_and(|version| {
                !version.is_empty()
                    && version.bytes().all(|b| b.is_ascii_digit() || b == b'_')
            })
    })
}
