//! End-to-end analysis tests.

mod elf_on_disk;
mod graph_scenarios;
