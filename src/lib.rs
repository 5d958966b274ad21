//! An assembler for a 24-bit word machine, featuring:
//! - a `mcro ... mcroend` preprocessor
//! - two-pass translation with a shared symbol table and memory image
//! - `.ob` / `.ent` / `.ext` output files

pub mod assembler;
pub mod logging;
