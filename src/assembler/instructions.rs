//! The instruction set: opcode/funct numbers, operand counts and the
//! addressing modes each opcode accepts, as one static table.

use bitflags::bitflags;

use crate::assembler::errors::ErrorKind;
use crate::assembler::lexing;
use crate::assembler::symbols;

/// The four directive names, reserved alongside the mnemonics.
pub const DIRECTIVES: [&str; 4] = [".data", ".string", ".entry", ".extern"];

bitflags! {
    /// A set of addressing modes, as stored in the opcode table.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeSet: u8 {
        const IMMEDIATE = 1 << 0;
        const DIRECT = 1 << 1;
        const RELATIVE = 1 << 2;
        const REGISTER = 1 << 3;
    }
}

const NONE: ModeSet = ModeSet::empty();
const DIR_REG: ModeSet = ModeSet::DIRECT.union(ModeSet::REGISTER);
const IMM_DIR_REG: ModeSet = ModeSet::IMMEDIATE.union(DIR_REG);
const DIR_REL: ModeSet = ModeSet::DIRECT.union(ModeSet::RELATIVE);
const DIR_ONLY: ModeSet = ModeSet::DIRECT;

/// One addressing mode, with its 2-bit wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Immediate = 0,
    Direct = 1,
    Relative = 2,
    Register = 3,
}

impl Mode {
    /// The 2-bit code stored in the instruction word.
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn flag(self) -> ModeSet {
        match self {
            Mode::Immediate => ModeSet::IMMEDIATE,
            Mode::Direct => ModeSet::DIRECT,
            Mode::Relative => ModeSet::RELATIVE,
            Mode::Register => ModeSet::REGISTER,
        }
    }
}

/// Table entry for one mnemonic.
#[derive(Debug)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub opcode: u32,
    pub funct: Option<u32>,
    pub operands: usize,
    pub src_modes: ModeSet,
    pub dest_modes: ModeSet,
}

/// The 16 opcodes. Opcodes sharing a primary code (groups 2, 5 and 9) are
/// told apart by funct.
pub static OPCODES: [OpcodeInfo; 16] = [
    OpcodeInfo { name: "mov", opcode: 0, funct: None, operands: 2, src_modes: IMM_DIR_REG, dest_modes: DIR_REG },
    OpcodeInfo { name: "cmp", opcode: 1, funct: None, operands: 2, src_modes: IMM_DIR_REG, dest_modes: IMM_DIR_REG },
    OpcodeInfo { name: "add", opcode: 2, funct: Some(1), operands: 2, src_modes: IMM_DIR_REG, dest_modes: DIR_REG },
    OpcodeInfo { name: "sub", opcode: 2, funct: Some(2), operands: 2, src_modes: IMM_DIR_REG, dest_modes: DIR_REG },
    OpcodeInfo { name: "lea", opcode: 4, funct: None, operands: 2, src_modes: DIR_ONLY, dest_modes: DIR_REG },
    OpcodeInfo { name: "clr", opcode: 5, funct: Some(1), operands: 1, src_modes: NONE, dest_modes: DIR_REG },
    OpcodeInfo { name: "not", opcode: 5, funct: Some(2), operands: 1, src_modes: NONE, dest_modes: DIR_REG },
    OpcodeInfo { name: "inc", opcode: 5, funct: Some(3), operands: 1, src_modes: NONE, dest_modes: DIR_REG },
    OpcodeInfo { name: "dec", opcode: 5, funct: Some(4), operands: 1, src_modes: NONE, dest_modes: DIR_REG },
    OpcodeInfo { name: "jmp", opcode: 9, funct: Some(1), operands: 1, src_modes: NONE, dest_modes: DIR_REL },
    OpcodeInfo { name: "bne", opcode: 9, funct: Some(2), operands: 1, src_modes: NONE, dest_modes: DIR_REL },
    OpcodeInfo { name: "jsr", opcode: 9, funct: Some(3), operands: 1, src_modes: NONE, dest_modes: DIR_REL },
    OpcodeInfo { name: "red", opcode: 12, funct: None, operands: 1, src_modes: NONE, dest_modes: DIR_REG },
    OpcodeInfo { name: "prn", opcode: 13, funct: None, operands: 1, src_modes: NONE, dest_modes: IMM_DIR_REG },
    OpcodeInfo { name: "rts", opcode: 14, funct: None, operands: 0, src_modes: NONE, dest_modes: NONE },
    OpcodeInfo { name: "stop", opcode: 15, funct: None, operands: 0, src_modes: NONE, dest_modes: NONE },
];

/// Find a mnemonic in the table. Case-sensitive, like every name here.
pub fn lookup(name: &str) -> Option<&'static OpcodeInfo> {
    OPCODES.iter().find(|info| info.name == name)
}

/// Mnemonics and directives form the reserved-word set. Registers are
/// checked separately ([lexing::is_register]) so their diagnostics can
/// name them.
pub fn is_reserved_word(token: &str) -> bool {
    lookup(token).is_some() || DIRECTIVES.contains(&token)
}

/// A classified operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Immediate(i64),
    Direct(String),
    Relative(String),
    Register(u8),
}

impl Operand {
    pub fn mode(&self) -> Mode {
        match self {
            Operand::Immediate(_) => Mode::Immediate,
            Operand::Direct(_) => Mode::Direct,
            Operand::Relative(_) => Mode::Relative,
            Operand::Register(_) => Mode::Register,
        }
    }
}

/// Which slot an operand occupies; selects the diagnostic on a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    First,
    Second,
    Only,
}

/// Classify an operand by its syntax alone. Symbol existence is the
/// second pass's business; here a bare name only has to look like a label.
pub fn classify(text: &str) -> Option<Operand> {
    if let Some(digits) = text.strip_prefix('#') {
        if lexing::is_integer(digits) {
            return digits.parse().ok().map(Operand::Immediate);
        }
        return None;
    }
    if let Some(number) = lexing::register_number(text) {
        return Some(Operand::Register(number));
    }
    if let Some(name) = text.strip_prefix('&') {
        if symbols::validate_label_name(name).is_ok() {
            return Some(Operand::Relative(name.to_string()));
        }
        return None;
    }
    if symbols::validate_label_name(text).is_ok() {
        return Some(Operand::Direct(text.to_string()));
    }
    None
}

/// Check every operand of a statement against the opcode's allowed-mode
/// sets, returning the classified operands in source order (src, dest).
pub fn validate_operands(
    info: &OpcodeInfo,
    operand_texts: &[&str],
) -> Result<Vec<Operand>, ErrorKind> {
    let mut operands = Vec::with_capacity(operand_texts.len());
    for (index, text) in operand_texts.iter().copied().enumerate() {
        let (allowed, position) = match (info.operands, index) {
            (2, 0) => (info.src_modes, Position::First),
            (2, 1) => (info.dest_modes, Position::Second),
            _ => (info.dest_modes, Position::Only),
        };
        let operand = classify(text)
            .filter(|op| allowed.contains(op.mode().flag()))
            .ok_or_else(|| operand_error(allowed, position, text))?;
        operands.push(operand);
    }
    Ok(operands)
}

/// Map an allowed-mode set and operand slot to its diagnostic.
fn operand_error(allowed: ModeSet, position: Position, text: &str) -> ErrorKind {
    if allowed == DIR_REG {
        return match position {
            Position::Second => ErrorKind::InvalidDirectOrRegisterSecondOperand,
            _ => ErrorKind::InvalidDirectOrRegisterOperand,
        };
    }
    if allowed == IMM_DIR_REG {
        return match position {
            Position::First => ErrorKind::InvalidImmediateDirectOrRegisterFirstOperand,
            Position::Second => ErrorKind::InvalidImmediateDirectOrRegisterSecondOperand,
            Position::Only => {
                // prn with a malformed `#` operand gets the immediate-specific text
                if text.starts_with('#') {
                    ErrorKind::InvalidImmediateOperand
                } else {
                    ErrorKind::InvalidImmediateDirectOrRegisterOperand
                }
            }
        };
    }
    if allowed == DIR_ONLY {
        return ErrorKind::InvalidDirectFirstOperand;
    }
    ErrorKind::InvalidRelativeOrDirectOperand
}
