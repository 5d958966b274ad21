//! Emits the three output artifacts: `.ob`, `.ent` and `.ext`.
//!
//! The writers are generic over `io::Write` so the formats can be tested
//! without touching the filesystem; thin wrappers bind them to files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::assembler::errors::ErrorKind;
use crate::assembler::memory::{Image, IC_START};
use crate::assembler::symbols::{SymbolKind, SymbolTable};

/// Write the object image: a header with the code and data word counts,
/// then one `address value` pair per occupied word.
pub fn write_object<W: Write>(image: &Image, out: &mut W) -> io::Result<()> {
    writeln!(out, "{:7} {}", image.ic() - IC_START, image.dc())?;
    for address in image.addresses() {
        if let Some(word) = image.word_at(address) {
            writeln!(out, "{:07} {:06x}", address, word.bits())?;
        }
    }
    Ok(())
}

/// Entry symbols with their final addresses, ascending.
pub fn entry_records(symbols: &SymbolTable) -> Vec<(String, u32)> {
    symbols
        .sorted_by_address()
        .into_iter()
        .filter(|symbol| symbol.entry)
        .map(|symbol| (symbol.name.clone(), symbol.address))
        .collect()
}

/// Every use site of an external symbol: the addresses of extension
/// words whose tag names an external, ascending.
pub fn external_records(image: &Image, symbols: &SymbolTable) -> Vec<(String, u32)> {
    let mut records = Vec::new();
    for address in image.addresses() {
        let Some(word) = image.word_at(address) else {
            continue;
        };
        let Some(tag) = word.tag.as_deref() else {
            continue;
        };
        if tag.starts_with('&') {
            continue; // relative targets are never external
        }
        if let Some(symbol) = symbols.lookup(tag) {
            if symbol.kind == SymbolKind::External {
                records.push((symbol.name.clone(), address));
            }
        }
    }
    records
}

pub fn write_records<W: Write>(records: &[(String, u32)], out: &mut W) -> io::Result<()> {
    for (name, address) in records {
        writeln!(out, "{} {:07}", name, address)?;
    }
    Ok(())
}

/// Write the `.ob` file.
pub fn write_object_file(image: &Image, path: &Path) -> Result<(), ErrorKind> {
    let file = File::create(path).map_err(|_| ErrorKind::ObjectFileCreate)?;
    let mut out = BufWriter::new(file);
    write_object(image, &mut out).map_err(|_| ErrorKind::FileWrite)?;
    out.flush().map_err(|_| ErrorKind::FileWrite)
}

/// Write the `.ent` file. Not created when the file defines no entries.
pub fn write_entry_file(symbols: &SymbolTable, path: &Path) -> Result<(), ErrorKind> {
    let records = entry_records(symbols);
    if records.is_empty() {
        return Ok(());
    }
    let file = File::create(path).map_err(|_| ErrorKind::EntryFileCreate)?;
    let mut out = BufWriter::new(file);
    write_records(&records, &mut out).map_err(|_| ErrorKind::FileWrite)?;
    out.flush().map_err(|_| ErrorKind::FileWrite)
}

/// Write the `.ext` file. Not created when nothing references an
/// external symbol.
pub fn write_externals_file(
    image: &Image,
    symbols: &SymbolTable,
    path: &Path,
) -> Result<(), ErrorKind> {
    let records = external_records(image, symbols);
    if records.is_empty() {
        return Ok(());
    }
    let file = File::create(path).map_err(|_| ErrorKind::ExternalFileCreate)?;
    let mut out = BufWriter::new(file);
    write_records(&records, &mut out).map_err(|_| ErrorKind::FileWrite)?;
    out.flush().map_err(|_| ErrorKind::FileWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::first_pass::first_pass;
    use crate::assembler::preprocessor::MacroTable;
    use crate::assembler::second_pass::second_pass;

    fn assemble(source: &str) -> (SymbolTable, Image) {
        let mut symbols = SymbolTable::new();
        let mut image = Image::new();
        let macros = MacroTable::new();
        let p1 = first_pass(source, &mut symbols, &mut image, &macros);
        assert!(p1.is_valid(), "{:?}", p1.diagnostics);
        let p2 = second_pass(source, &mut symbols, &mut image);
        assert!(p2.is_valid(), "{:?}", p2.diagnostics);
        (symbols, image)
    }

    fn object_text(image: &Image) -> String {
        let mut buffer = Vec::new();
        write_object(image, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn object_header_pads_the_code_count() {
        let (_, image) = assemble("MAIN: mov #3, r1\n stop\n");
        let text = object_text(&image);
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "      3 0");
    }

    #[test]
    fn object_body_is_seven_digit_addresses_and_six_hex_digits() {
        let (_, image) = assemble("mov r1, r2\nNUMS: .data 5, -1, 7\n stop\n");
        let text = object_text(&image);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "      2 3");
        assert!(lines[1].starts_with("0000100 "));
        assert_eq!(lines[3], "0000102 000005");
        assert_eq!(lines[4], "0000103 ffffff");
        assert_eq!(lines[5], "0000104 000007");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn entry_records_sorted_by_address() {
        let (symbols, _) = assemble("B: stop\nA: stop\n.entry A\n.entry B\n");
        let records = entry_records(&symbols);
        assert_eq!(
            records,
            [("B".to_string(), 100), ("A".to_string(), 101)]
        );
    }

    #[test]
    fn entry_file_skipped_when_no_entries() {
        let (symbols, _) = assemble("stop\n");
        assert!(entry_records(&symbols).is_empty());
    }

    #[test]
    fn external_use_sites_are_extension_word_addresses() {
        let (symbols, image) =
            assemble(".extern KBD\nmov KBD, r2\n stop\njsr KBD\n");
        let records = external_records(&image, &symbols);
        assert_eq!(
            records,
            [("KBD".to_string(), 101), ("KBD".to_string(), 104)]
        );
    }

    #[test]
    fn record_format_is_name_and_seven_digit_address() {
        let mut buffer = Vec::new();
        write_records(&[("KBD".to_string(), 101)], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "KBD 0000101\n");
    }

    #[test]
    fn emitted_object_is_deterministic() {
        let source = "MAIN: mov #3, r1\nLOOP: jmp &LOOP\n stop\n.entry MAIN\n";
        let (_, image_a) = assemble(source);
        let (_, image_b) = assemble(source);
        assert_eq!(object_text(&image_a), object_text(&image_b));
    }
}
