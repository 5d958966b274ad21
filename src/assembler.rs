//! Translates assembly source for a 24-bit word machine into its object,
//! entries and externals files, in a two-pass manner.
//!
//! Per input file the pipeline is: the macro preprocessor rewrites the
//! source into a flat `.am` intermediate; the first pass classifies each
//! line, builds the symbol table and allocates instruction and data
//! memory; the second pass resolves label references and patches the
//! operand words; the emitter writes `.ob`, `.ent` and `.ext`.
//!
//! Source syntax in brief:
//!
//! ```ignore
//! ; comments run to the end of the line
//! mcro PUSH            ; macro definitions expand textually
//!     mov r1, r2
//! mcroend
//! MAIN: PUSH           ; labels end with a colon
//!     add #1, COUNT    ; immediate (#), direct (label), register (r0-r7)
//!     jmp &MAIN        ; relative (&label) for jumps
//!     stop
//! COUNT: .data 0       ; data is placed after all code
//! .entry MAIN
//! .extern KBD
//! ```
//!
//! Every pass keeps going after an error so one run surfaces as many
//! diagnostics as possible; output files are produced only for a clean
//! file, and the `.am` intermediate of a failed file is removed.

pub mod directives;
pub mod encoder;
pub mod errors;
pub mod first_pass;
pub mod instructions;
pub mod lexing;
pub mod memory;
pub mod output;
pub mod preprocessor;
pub mod second_pass;
pub mod statement;
pub mod symbols;

use std::fs;
use std::path::{Path, PathBuf};

use crate::logging;
use self::errors::{Diagnostic, ErrorKind};
use self::memory::Image;
use self::symbols::SymbolTable;

/// Longest accepted final path component, extension included.
pub const MAX_FILENAME_LENGTH: usize = 30;

/// Assemble one source file, named with or without its `.as` suffix.
/// Diagnostics go to the console as they are found; the return value says
/// whether the file assembled cleanly and its outputs were written.
pub fn assemble_path(argument: &str) -> bool {
    let base = argument.strip_suffix(".as").unwrap_or(argument);
    let as_path = PathBuf::from(format!("{base}.as"));
    let am_path = PathBuf::from(format!("{base}.am"));
    let ob_path = PathBuf::from(format!("{base}.ob"));
    let ent_path = PathBuf::from(format!("{base}.ent"));
    let ext_path = PathBuf::from(format!("{base}.ext"));

    let stem_len = as_path
        .file_name()
        .map(|name| name.to_string_lossy().len())
        .unwrap_or(0);
    if stem_len > MAX_FILENAME_LENGTH {
        logging::report(&Diagnostic::error_no_line(ErrorKind::FilenameTooLong));
        return false;
    }

    if !as_path.exists() {
        // a stray .am/.ob with the right base name hints at a forgotten .as
        let kind = if am_path.exists() || ob_path.exists() {
            ErrorKind::MissingAsFile
        } else {
            ErrorKind::FileNotExist
        };
        logging::report(&Diagnostic::error_no_line(kind));
        return false;
    }

    let pre = match preprocessor::preprocess_file(&as_path, &am_path) {
        Ok(result) => result,
        Err(kind) => {
            logging::report(&Diagnostic::error_no_line(kind));
            return false;
        }
    };
    logging::report_all(&pre.diagnostics);
    let mut valid = pre.is_valid();

    let mut symbols = SymbolTable::new();
    let mut image = Image::new();

    // Each pass re-reads the intermediate from disk.
    let Ok(am_source) = fs::read_to_string(&am_path) else {
        logging::report(&Diagnostic::error_no_line(ErrorKind::FileRead));
        discard_intermediate(&am_path);
        return false;
    };
    let p1 = first_pass::first_pass(&am_source, &mut symbols, &mut image, &pre.macros);
    logging::report_all(&p1.diagnostics);
    if let Some(kind) = p1.fatal {
        logging::report(&Diagnostic::error_no_line(kind));
        discard_intermediate(&am_path);
        return false;
    }
    valid &= p1.is_valid();

    let Ok(am_source) = fs::read_to_string(&am_path) else {
        logging::report(&Diagnostic::error_no_line(ErrorKind::FileRead));
        discard_intermediate(&am_path);
        return false;
    };
    let p2 = second_pass::second_pass(&am_source, &mut symbols, &mut image);
    logging::report_all(&p2.diagnostics);
    valid &= p2.is_valid();

    if !valid {
        discard_intermediate(&am_path);
        logging::report(&Diagnostic::error_no_line(ErrorKind::AssemblyFailed));
        return false;
    }

    let emitted = output::write_object_file(&image, &ob_path)
        .and_then(|()| output::write_entry_file(&symbols, &ent_path))
        .and_then(|()| output::write_externals_file(&image, &symbols, &ext_path));
    if let Err(kind) = emitted {
        logging::report(&Diagnostic::error_no_line(kind));
        discard_intermediate(&am_path);
        return false;
    }
    true
}

/// A failed file leaves no intermediate behind.
fn discard_intermediate(am_path: &Path) {
    if am_path.exists() && fs::remove_file(am_path).is_err() {
        logging::report(&Diagnostic::error_no_line(ErrorKind::FileDelete));
    }
}
