//! The symbol (label) table: insertion-ordered, linear-scan lookups,
//! fixed capacity like the machine it serves.

use crate::assembler::errors::ErrorKind;
use crate::assembler::instructions;
use crate::assembler::lexing;
use crate::assembler::preprocessor::MacroTable;

/// Fixed capacity of the table.
pub const MAX_SYMBOLS: usize = 100;

/// Longest accepted label name.
pub const MAX_LABEL_LENGTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Code,
    Data,
    External,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub line_number: usize,
    pub address: u32,
    pub kind: SymbolKind,
    pub entry: bool,
}

/// Syntactic label validation: a letter, then letters, digits or
/// underscores, no reserved word, no register name, at most 30 chars.
pub fn validate_label_name(name: &str) -> Result<(), ErrorKind> {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return Err(ErrorKind::IllegalLabelStart),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ErrorKind::IllegalLabelChar);
    }
    if lexing::is_register(name) {
        return Err(ErrorKind::LabelIsRegister);
    }
    if instructions::is_reserved_word(name) {
        return Err(ErrorKind::LabelIsReservedWord);
    }
    if name.len() > MAX_LABEL_LENGTH {
        return Err(ErrorKind::LabelTooLong);
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            symbols: Vec::new(),
        }
    }

    /// Linear scan by name. Names are case-sensitive.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }

    /// Add a label definition.
    ///
    /// External symbols are inserted with address 0; redefining one as a
    /// local label (or re-declaring it extern) is `LABEL_ALREADY_EXTERN`,
    /// while shadowing a local label with `.extern` is
    /// `EXTERN_LABEL_CONFLICT`.
    pub fn insert(
        &mut self,
        name: &str,
        line_number: usize,
        kind: SymbolKind,
        address: u32,
        macros: &MacroTable,
    ) -> Result<(), ErrorKind> {
        validate_label_name(name)?;
        if let Some(existing) = self.lookup(name) {
            if existing.kind == SymbolKind::External {
                return Err(ErrorKind::LabelAlreadyExtern);
            }
            return Err(if kind == SymbolKind::External {
                ErrorKind::ExternLabelConflict
            } else {
                ErrorKind::LabelDuplicate
            });
        }
        if macros.get(name).is_some() {
            return Err(ErrorKind::LabelIsMcroName);
        }
        if self.symbols.len() >= MAX_SYMBOLS {
            return Err(ErrorKind::MemoryAllocation);
        }
        self.symbols.push(Symbol {
            name: name.to_string(),
            line_number,
            address,
            kind,
            entry: false,
        });
        Ok(())
    }

    /// Flag a symbol as an entry point. Only the second pass calls this,
    /// once every label has its final address.
    pub fn mark_entry(&mut self, name: &str) -> Result<(), ErrorKind> {
        let Some(symbol) = self.symbols.iter_mut().find(|symbol| symbol.name == name) else {
            return Err(ErrorKind::UndefinedEntryLabel);
        };
        if symbol.kind == SymbolKind::External {
            return Err(ErrorKind::LabelNotDefinedInFile);
        }
        if symbol.entry {
            return Err(ErrorKind::DuplicateEntryLabel);
        }
        symbol.entry = true;
        Ok(())
    }

    /// Turn the relative data offsets recorded during the scan into final
    /// absolute addresses, once the final IC is known.
    pub fn relocate_data(&mut self, final_ic: u32) {
        for symbol in &mut self.symbols {
            if symbol.kind == SymbolKind::Data {
                symbol.address += final_ic;
            }
        }
    }

    /// Symbols in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Symbols sorted by ascending address, for the emitter.
    pub fn sorted_by_address(&self) -> Vec<&Symbol> {
        let mut sorted: Vec<&Symbol> = self.symbols.iter().collect();
        sorted.sort_by_key(|symbol| symbol.address);
        sorted
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
