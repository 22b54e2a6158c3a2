use crate::*;

use strum::IntoEnumIterator;

#[test]
fn opcode_byte_round_trips_through_repr() {
    for repr in OpcodeRepr::iter() {
        let byte = repr as u8;
        assert_eq!(OpcodeRepr::try_from(byte), Ok(repr));
    }

    for byte in 0..=u8::MAX {
        match OpcodeRepr::try_from(byte) {
            Ok(repr) => assert_eq!(repr as u8, byte),
            Err(InvalidOpcode(b)) => assert_eq!(b, byte),
        }
    }
}

/// Sweep every defined opcode with a few operand bit patterns and check
/// that `u32 -> Opcode -> u32` is the identity.
#[test]
fn instruction_word_round_trips_for_every_opcode() {
    // Operand payloads that exercise all-zero, all-one and alternating
    // field bits; each is masked to the fields the opcode defines.
    let payloads = [0u32, 0x00ff_ffff, 0x00a5_a5a5, 0x005a_5a5a];

    for repr in OpcodeRepr::iter() {
        for payload in payloads {
            let raw = ((repr as u8 as u32) << 24) | payload;
            let decoded = Opcode::from(raw);
            let encoded = u32::from(decoded);

            // Re-decoding the normalized word must be a fixpoint.
            assert_eq!(decoded, Opcode::from(encoded));
            assert_eq!(encoded, u32::from(Opcode::from(encoded)));
            assert_eq!(decoded.repr(), Some(repr));
        }
    }
}

#[test]
fn undefined_opcodes_preserve_the_raw_word() {
    for raw in [0x0000_0000, 0x0712_3456, 0xffff_ffff, 0x4312_3456] {
        let decoded = Opcode::from(raw);
        assert_eq!(decoded.repr(), None);
        assert_eq!(u32::from(decoded), raw);
    }
}

#[test]
fn words_are_stored_little_endian() {
    // movi r1, #0x0203 => 0x31010203
    let op = Opcode::MOVI(1, 0x0203);
    assert_eq!(u32::from(op), 0x3101_0203);
    assert_eq!(op.to_bytes(), [0x03, 0x02, 0x01, 0x31]);
    assert_eq!(Opcode::from([0x03, 0x02, 0x01, 0x31]), op);
}

#[test]
fn operand_fields_land_on_their_bit_positions() {
    // add r2, r0, r1 => opcode 0x10, rd=2, rs1=0, rs2=1
    assert_eq!(u32::from(Opcode::ADD(2, 0, 1)), 0x1002_0100);
    // load r1, [r2+4] => opcode 0x01, rd=1, rs1=2, off=4
    assert_eq!(u32::from(Opcode::LOAD(1, 2, 4)), 0x0101_2004);
    // cmp r1, r2 lives in the rs1/rs2 fields
    assert_eq!(u32::from(Opcode::CMP(1, 2)), 0x3200_1200);
    // jmp 0x10
    assert_eq!(u32::from(Opcode::JMP(0x10)), 0x2000_0010);
    // syscall has no operands
    assert_eq!(u32::from(Opcode::SYSCALL), 0x4000_0000);
}

#[test]
fn register_fields_are_masked_to_four_bits() {
    assert_eq!(u32::from(Opcode::PUSH(0x1f)), u32::from(Opcode::PUSH(0x0f)));
}

#[test]
fn instruction_view_exposes_all_fields() {
    let raw = u32::from(Opcode::LOAD(1, 2, 4));
    let parsed = Instruction::new(raw);

    assert_eq!(parsed.op(), 0x01);
    assert_eq!(parsed.rd(), 1);
    assert_eq!(parsed.rs1(), 2);
    assert_eq!(parsed.off12(), 4);
    assert_eq!(parsed.addr24(), 0x0001_2004 & 0x00ff_ffff);
    assert_eq!(u32::from(parsed), raw);
    assert_eq!(parsed.to_bytes(), raw.to_le_bytes());
}

#[test]
fn byte_stream_decoding_ignores_trailing_fragment() {
    let program: Vec<u8> = [Opcode::NOP, Opcode::HALT].into_iter().collect();
    assert_eq!(program.len(), 8);

    let mut stream = program.clone();
    stream.push(0xaa); // unaligned trailing byte

    let decoded = Instruction::from_bytes_iter(stream);
    assert_eq!(decoded.len(), 2);
    assert_eq!(Opcode::from(decoded[0]), Opcode::NOP);
    assert_eq!(Opcode::from(decoded[1]), Opcode::HALT);
}

#[test]
fn movi_immediate_is_the_low_sixteen_bits() {
    let raw = u32::from(Opcode::MOVI(0, 0xffff));
    assert_eq!(raw, 0x3100_ffff);

    let Opcode::MOVI(rd, imm) = Opcode::from(raw) else {
        panic!("decoded to a different opcode");
    };
    assert_eq!(rd, 0);
    assert_eq!(imm, 0xffff);
}
