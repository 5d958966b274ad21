//! Packs validated instructions into 24-bit words.
//!
//! The instruction word carries opcode, addressing modes, register
//! numbers and funct; every non-register operand is followed by one
//! extension word. Extension words that reference a label are emitted as
//! placeholders tagged with the operand text, for the second pass to
//! patch.

use crate::assembler::instructions::{Operand, OpcodeInfo};
use crate::assembler::memory::Word;

pub const OPCODE_SHIFT: u32 = 18;
pub const DEST_MODE_SHIFT: u32 = 16;
pub const DEST_REG_SHIFT: u32 = 13;
pub const SRC_MODE_SHIFT: u32 = 11;
pub const SRC_REG_SHIFT: u32 = 8;
pub const FUNCT_SHIFT: u32 = 3;

/// The A bit: set on instruction words and immediate/relative extensions.
pub const A_BIT: u32 = 1 << 2;

/// ARE bits of a patched direct word naming a local symbol.
pub const ARE_RELOCATABLE: u32 = 0b10;

/// ARE bits of a patched direct word naming an external symbol.
pub const ARE_EXTERNAL: u32 = 0b01;

/// Placeholder payload of a direct extension before patching.
pub const DIRECT_PLACEHOLDER: u32 = 0b11;

/// Width of an extension word's value field (bits 23-3).
pub const EXTENSION_VALUE_MASK: u32 = (1 << 21) - 1;

/// Offset of the value field within a word.
pub const EXTENSION_VALUE_SHIFT: u32 = 3;

/// Encode one instruction into its word sequence: the instruction word,
/// then one extension word per non-register operand in source order
/// (src first, then dest).
pub fn encode_instruction(info: &OpcodeInfo, operands: &[Operand]) -> Vec<Word> {
    let mut first = (info.opcode << OPCODE_SHIFT) | A_BIT;
    if let Some(funct) = info.funct {
        first |= funct << FUNCT_SHIFT;
    }
    match operands {
        [] => {}
        [dest] => first |= dest_field(dest),
        [src, dest] => first |= src_field(src) | dest_field(dest),
        _ => unreachable!("operand count is validated before encoding"),
    }

    let mut words = vec![Word::new(first as i32)];
    for operand in operands {
        match operand {
            Operand::Register(_) => {}
            Operand::Immediate(value) => {
                let payload = ((*value as u32) & EXTENSION_VALUE_MASK) << EXTENSION_VALUE_SHIFT;
                words.push(Word::new((payload | A_BIT) as i32));
            }
            Operand::Relative(name) => {
                words.push(Word::tagged(A_BIT as i32, &format!("&{name}")));
            }
            Operand::Direct(name) => {
                words.push(Word::tagged(DIRECT_PLACEHOLDER as i32, name));
            }
        }
    }
    words
}

fn dest_field(operand: &Operand) -> u32 {
    let mut bits = operand.mode().code() << DEST_MODE_SHIFT;
    if let Operand::Register(number) = operand {
        bits |= (*number as u32) << DEST_REG_SHIFT;
    }
    bits
}

fn src_field(operand: &Operand) -> u32 {
    let mut bits = operand.mode().code() << SRC_MODE_SHIFT;
    if let Operand::Register(number) = operand {
        bits |= (*number as u32) << SRC_REG_SHIFT;
    }
    bits
}

/// The patched payload of a direct extension word: target address in the
/// value field, A cleared, ARE per the symbol's linkage.
pub fn direct_word(address: u32, external: bool) -> i32 {
    let are = if external { ARE_EXTERNAL } else { ARE_RELOCATABLE };
    (((address & EXTENSION_VALUE_MASK) << EXTENSION_VALUE_SHIFT) | are) as i32
}

/// The patched payload of a relative extension word: the signed distance
/// from the instruction word, A still set.
pub fn relative_word(distance: i32) -> i32 {
    ((((distance as u32) & EXTENSION_VALUE_MASK) << EXTENSION_VALUE_SHIFT) | A_BIT) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::instructions::lookup;

    #[test]
    fn stop_is_a_single_bare_word() {
        let words = encode_instruction(lookup("stop").unwrap(), &[]);
        assert_eq!(words.len(), 1);
        // opcode 15, A bit, everything else clear
        assert_eq!(words[0].bits(), (15 << OPCODE_SHIFT) | A_BIT);
    }

    #[test]
    fn mov_immediate_to_register() {
        let mov = lookup("mov").unwrap();
        let words = encode_instruction(
            mov,
            &[Operand::Immediate(3), Operand::Register(1)],
        );
        assert_eq!(words.len(), 2);
        let first = words[0].bits();
        assert_eq!(first >> OPCODE_SHIFT, 0); // mov
        assert_eq!((first >> DEST_MODE_SHIFT) & 0b11, 0b11); // register dest
        assert_eq!((first >> DEST_REG_SHIFT) & 0b111, 1);
        assert_eq!((first >> SRC_MODE_SHIFT) & 0b11, 0b00); // immediate src
        assert_eq!((first >> SRC_REG_SHIFT) & 0b111, 0);
        assert_eq!(first & 0b111, A_BIT);
        // extension: value 3 in bits 23-3, A bit set
        assert_eq!(words[1].bits(), (3 << EXTENSION_VALUE_SHIFT) | A_BIT);
        assert!(words[1].tag.is_none());
    }

    #[test]
    fn negative_immediate_is_twos_complement() {
        let prn = lookup("prn").unwrap();
        let words = encode_instruction(prn, &[Operand::Immediate(-1)]);
        assert_eq!(
            words[1].bits(),
            (EXTENSION_VALUE_MASK << EXTENSION_VALUE_SHIFT) | A_BIT
        );
    }

    #[test]
    fn register_pair_is_one_word() {
        let mov = lookup("mov").unwrap();
        let words = encode_instruction(mov, &[Operand::Register(1), Operand::Register(2)]);
        assert_eq!(words.len(), 1);
        let first = words[0].bits();
        assert_eq!((first >> SRC_REG_SHIFT) & 0b111, 1);
        assert_eq!((first >> DEST_REG_SHIFT) & 0b111, 2);
        assert_eq!((first >> SRC_MODE_SHIFT) & 0b11, 0b11);
        assert_eq!((first >> DEST_MODE_SHIFT) & 0b11, 0b11);
    }

    #[test]
    fn funct_lands_in_bits_7_to_3() {
        let sub = lookup("sub").unwrap();
        let words = encode_instruction(sub, &[Operand::Register(0), Operand::Register(0)]);
        let first = words[0].bits();
        assert_eq!(first >> OPCODE_SHIFT, 2);
        assert_eq!((first >> FUNCT_SHIFT) & 0b11111, 2);
    }

    #[test]
    fn single_operand_uses_dest_fields() {
        let inc = lookup("inc").unwrap();
        let words = encode_instruction(inc, &[Operand::Register(5)]);
        let first = words[0].bits();
        assert_eq!((first >> DEST_MODE_SHIFT) & 0b11, 0b11);
        assert_eq!((first >> DEST_REG_SHIFT) & 0b111, 5);
        assert_eq!((first >> SRC_MODE_SHIFT) & 0b11, 0);
        assert_eq!((first >> SRC_REG_SHIFT) & 0b111, 0);
    }

    #[test]
    fn direct_operand_leaves_tagged_placeholder() {
        let jmp = lookup("jmp").unwrap();
        let words = encode_instruction(jmp, &[Operand::Direct("END".to_string())]);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].bits(), DIRECT_PLACEHOLDER);
        assert_eq!(words[1].tag.as_deref(), Some("END"));
    }

    #[test]
    fn relative_operand_keeps_ampersand_in_tag() {
        let bne = lookup("bne").unwrap();
        let words = encode_instruction(bne, &[Operand::Relative("LOOP".to_string())]);
        assert_eq!(words[1].bits(), A_BIT);
        assert_eq!(words[1].tag.as_deref(), Some("&LOOP"));
    }

    #[test]
    fn two_label_operands_take_two_extensions() {
        let lea = lookup("lea").unwrap();
        let words = encode_instruction(
            lea,
            &[
                Operand::Direct("STR".to_string()),
                Operand::Direct("DST".to_string()),
            ],
        );
        assert_eq!(words.len(), 3);
        assert_eq!(words[1].tag.as_deref(), Some("STR"));
        assert_eq!(words[2].tag.as_deref(), Some("DST"));
    }

    #[test]
    fn patched_payload_helpers() {
        assert_eq!(direct_word(102, false) as u32, (102 << 3) | ARE_RELOCATABLE);
        assert_eq!(direct_word(0, true) as u32, ARE_EXTERNAL);
        assert_eq!(relative_word(2) as u32, (2 << 3) | A_BIT);
        // negative distances wrap in the 21-bit field
        assert_eq!(
            relative_word(-3) as u32,
            ((EXTENSION_VALUE_MASK - 2) << 3) | A_BIT
        );
    }
}
