use std::env;

use asm24::assembler;
use asm24::assembler::errors::{Diagnostic, ErrorKind};
use asm24::logging;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        logging::report(&Diagnostic::error_no_line(ErrorKind::MissingAsFile));
        eprintln!("Usage: asm24 <source[.as]>...");
        std::process::exit(1);
    }

    let mut success = true;
    for arg in &args {
        if !assembler::assemble_path(arg) {
            success = false;
        }
    }

    std::process::exit(if success { 0 } else { 1 });
}
