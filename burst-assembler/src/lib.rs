//! Two-pass assembler for the BURST instruction set.
//!
//! [`assemble`] turns source text into the flat binary the machine
//! loads at address zero, together with the label map that doubles as a
//! debugger symbol table. Output is deterministic: the same source
//! yields byte-identical binaries on every run.
//!
//! # Source language
//!
//! The language is line based. A line is an optional `label:`,
//! optionally followed by one instruction or directive, optionally
//! followed by a `;` comment running to the end of the line:
//!
//! ```text
//! start:  movi r0, #32        ; SYS_PUTCHAR
//!         movi r1, #65
//!         syscall
//!         halt
//! msg:    .string "hello\n"
//! table:  .word 1, 0x10, msg
//! buf:    .space 64
//! ```
//!
//! Mnemonics and register names are case-insensitive. Operand forms:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `r0`..`r15` | register |
//! | `#123`, `#0x7f`, `#-1`, `#label` | immediate |
//! | `[rN]`, `[rN+off]` | memory reference |
//! | `label` or `0x...` | jump/call target |
//!
//! Directives: `.string`/`.ascii` (escape sequences `\n \r \t \" \\`),
//! `.byte`/`.db`, `.word`/`.dw` (little-endian, label values allowed),
//! `.space`/`.skip`.
//!
//! Pass 1 walks the lines computing each one's emitted size and records
//! label addresses; pass 2 emits bytes, resolving label references
//! against that map. Both passes size strings by their escape-processed
//! length, so label addresses after string data stay correct.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod encode;
mod error;
mod operand;
mod parser;

pub use error::{AssembleError, ErrorKind};
pub use operand::Operand;
pub use parser::{Directive, Item, Statement, Value};

use burst_asm::Word;

use std::collections::BTreeMap;

/// The product of one assemble call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    /// The flat binary, loadable at address zero
    pub bytes: Vec<u8>,
    /// Label name to address, in name order
    pub labels: BTreeMap<String, Word>,
}

/// Assemble source text into a binary and its label map.
pub fn assemble(source: &str) -> Result<Assembly, AssembleError> {
    let statements = parser::parse(source)?;

    // Pass 1: label addresses from accumulated item sizes.
    let mut labels = BTreeMap::new();
    let mut address: Word = 0;

    for statement in &statements {
        if let Some(name) = &statement.label {
            if labels.insert(name.clone(), address).is_some() {
                return Err(ErrorKind::DuplicateLabel(name.clone()).at(statement.line));
            }
        }

        if let Some(item) = &statement.item {
            address = address
                .checked_add(encode::item_size(item))
                .ok_or_else(|| {
                    ErrorKind::ValueOutOfRange(i64::from(address)).at(statement.line)
                })?;
        }
    }

    // Pass 2: emit, resolving label references.
    let mut bytes = Vec::with_capacity(address as usize);

    for statement in &statements {
        match &statement.item {
            Some(Item::Instruction { mnemonic, operands }) => {
                let opcode =
                    encode::encode_instruction(mnemonic, operands, &labels, statement.line)?;
                bytes.extend_from_slice(&opcode.to_bytes());
            }
            Some(Item::Directive(directive)) => {
                encode::emit_directive(directive, &labels, statement.line, &mut bytes)?;
            }
            None => (),
        }
    }

    debug_assert_eq!(bytes.len(), address as usize, "pass sizes diverged");

    Ok(Assembly { bytes, labels })
}

#[cfg(test)]
mod tests {
    use super::*;

    use burst_asm::Opcode;

    fn words(assembly: &Assembly) -> Vec<u32> {
        assembly
            .bytes
            .chunks(4)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word.copy_from_slice(chunk);
                u32::from_le_bytes(word)
            })
            .collect()
    }

    #[test]
    fn assembles_the_putchar_program() {
        let source = "\
movi r0, #32
movi r1, #65
syscall
halt
";
        let assembly = assemble(source).unwrap();

        assert_eq!(
            words(&assembly),
            vec![
                u32::from(Opcode::MOVI(0, 32)),
                u32::from(Opcode::MOVI(1, 65)),
                u32::from(Opcode::SYSCALL),
                u32::from(Opcode::HALT),
            ]
        );
    }

    #[test]
    fn resolves_forward_and_backward_labels() {
        let source = "\
start: jmp end
back:  nop
       jmp back
end:   halt
";
        let assembly = assemble(source).unwrap();

        assert_eq!(assembly.labels["start"], 0x0);
        assert_eq!(assembly.labels["back"], 0x4);
        assert_eq!(assembly.labels["end"], 0xc);

        assert_eq!(
            words(&assembly),
            vec![
                u32::from(Opcode::JMP(0xc)),
                u32::from(Opcode::NOP),
                u32::from(Opcode::JMP(0x4)),
                u32::from(Opcode::HALT),
            ]
        );
    }

    #[test]
    fn string_sizes_use_the_escaped_length_in_both_passes() {
        // "a\nb" is three bytes once the escape collapses; a pass that
        // sized it by raw source length would put `tail` at 4.
        let source = "\
msg:  .string \"a\\nb\"
tail: .byte 7
ref:  .word tail
";
        let assembly = assemble(source).unwrap();

        assert_eq!(assembly.labels["msg"], 0);
        assert_eq!(assembly.labels["tail"], 3);
        assert_eq!(assembly.labels["ref"], 4);
        assert_eq!(&assembly.bytes[..4], b"a\nb\x07");
        assert_eq!(&assembly.bytes[4..], &3u32.to_le_bytes());
    }

    #[test]
    fn crlf_sources_assemble_identically() {
        let lf = "movi r0, #1\nhalt\n";
        let crlf = "movi r0, #1\r\nhalt\r\n";

        assert_eq!(assemble(lf).unwrap(), assemble(crlf).unwrap());
    }

    #[test]
    fn output_is_deterministic() {
        let source = "\
loop: inc r1
      cmp r1, r2
      jlt loop
      .space 5
      .word loop
      halt
";
        let first = assemble(source).unwrap();
        let second = assemble(source).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn undefined_label_aborts_with_the_line() {
        let err = assemble("jmp nowhere\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.kind, ErrorKind::UndefinedLabel("nowhere".into()));
    }

    #[test]
    fn duplicate_label_reports_the_second_definition() {
        let err = assemble("a: nop\na: halt\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ErrorKind::DuplicateLabel("a".into()));
    }

    #[test]
    fn label_as_immediate_loads_its_address() {
        let source = "\
      movi r1, #msg
      halt
msg:  .string \"x\"
";
        let assembly = assemble(source).unwrap();
        assert_eq!(words(&assembly)[0], u32::from(Opcode::MOVI(1, 8)));
    }

    #[test]
    fn space_directive_zero_fills() {
        let assembly = assemble("a: .space 3\nb: .byte 1\n").unwrap();
        assert_eq!(assembly.bytes, vec![0, 0, 0, 1]);
        assert_eq!(assembly.labels["b"], 3);
    }
}
