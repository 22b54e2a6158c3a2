use burst_vm::prelude::*;

use quickcheck_macros::quickcheck;

use burst_asm::Address24;

fn vm() -> Interpreter<CapturedIo> {
    Interpreter::with_host(CapturedIo::default())
}

fn vm_with(program: Vec<u8>) -> Interpreter<CapturedIo> {
    let mut vm = vm();
    vm.load_program(&program).expect("program fits at address 0");
    vm
}

#[test]
fn print_a_via_putchar_syscall() {
    // movi r0, #32; movi r1, #65; syscall; halt
    let program: Vec<u8> = [
        Opcode::MOVI(0, SYS_PUTCHAR as u16),
        Opcode::MOVI(1, 65),
        Opcode::SYSCALL,
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    assert_eq!(vm.host().output(), b"A");
    assert_eq!(vm.register(0), 1);
}

#[test]
fn memory_round_trip_branches_to_ok() {
    let ok: Address24 = 0x20;
    let program: Vec<u8> = [
        Opcode::MOVI(3, 0x1000),       // 0x00
        Opcode::MOVI(1, 0x1234),       // 0x04
        Opcode::STORE(1, 3, 0),        // 0x08
        Opcode::LOAD(2, 3, 0),         // 0x0c
        Opcode::CMP(1, 2),             // 0x10
        Opcode::JEQ(ok),               // 0x14
        Opcode::HALT,                  // 0x18
        Opcode::NOP,                   // 0x1c
        Opcode::MOVI(0, SYS_PUTCHAR as u16), // 0x20: ok
        Opcode::MOVI(1, 0x4f),         // 0x24
        Opcode::SYSCALL,               // 0x28
        Opcode::MOVI(0, SYS_PUTCHAR as u16), // 0x2c
        Opcode::MOVI(1, 0x4b),         // 0x30
        Opcode::SYSCALL,               // 0x34
        Opcode::HALT,                  // 0x38
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    assert_eq!(vm.host().output(), b"OK");
}

#[test]
fn arithmetic_scenario() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, 10),
        Opcode::MOVI(1, 5),
        Opcode::ADD(2, 0, 1),
        Opcode::SUB(3, 0, 1),
        Opcode::MUL(4, 0, 1),
        Opcode::DIV(5, 0, 1),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    assert_eq!(vm.register(2), 15);
    assert_eq!(vm.register(3), 5);
    assert_eq!(vm.register(4), 50);
    assert_eq!(vm.register(5), 2);
}

#[test]
fn stack_scenario_restores_register_and_sp() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, 42),
        Opcode::PUSH(0),
        Opcode::MOVI(0, 0),
        Opcode::POP(0),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    let initial_sp = vm.sp();

    assert_eq!(vm.run().unwrap(), StopReason::Halted);
    assert_eq!(vm.register(0), 42);
    assert_eq!(vm.sp(), initial_sp);
}

#[test]
fn movi_sign_extends_into_arithmetic() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, 0xffff),
        Opcode::MOVI(1, 0),
        Opcode::ADD(1, 1, 0),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    assert_eq!(vm.register(0), 0xffff_ffff);
    assert_eq!(vm.register(1), 0xffff_ffff);
    assert!(vm.flags().contains(Flags::NEGATIVE));
    assert!(!vm.flags().contains(Flags::ZERO));
}

#[test]
fn allocator_syscalls_reuse_the_first_hole() {
    let program: Vec<u8> = [
        // r4 = alloc(100)
        Opcode::MOVI(0, SYS_ALLOC as u16),
        Opcode::MOVI(1, 100),
        Opcode::SYSCALL,
        Opcode::MOV(4, 0),
        // r5 = alloc(200)
        Opcode::MOVI(0, SYS_ALLOC as u16),
        Opcode::MOVI(1, 200),
        Opcode::SYSCALL,
        Opcode::MOV(5, 0),
        // free(r4)
        Opcode::MOVI(0, SYS_FREE as u16),
        Opcode::MOV(1, 4),
        Opcode::SYSCALL,
        Opcode::MOV(6, 0),
        // r7 = alloc(50)
        Opcode::MOVI(0, SYS_ALLOC as u16),
        Opcode::MOVI(1, 50),
        Opcode::SYSCALL,
        Opcode::MOV(7, 0),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    let a1 = vm.register(4);
    let a2 = vm.register(5);
    assert_eq!(a1, HEAP_BASE);
    assert!(a2 > a1);
    assert_eq!(vm.register(6), E_OK);

    // First fit: the 50-byte block reuses the hole left by a1.
    assert_eq!(vm.register(7), a1);

    // Coalescing invariant holds afterwards.
    let blocks = vm.allocator().free_blocks();
    for pair in blocks.windows(2) {
        assert!(pair[0].start + pair[0].size < pair[1].start);
    }
}

#[test]
fn free_of_unknown_address_reports_invalid() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, SYS_FREE as u16),
        Opcode::MOVI(1, 0x7000),
        Opcode::SYSCALL,
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);
    assert_eq!(vm.register(0), E_INVALID);
    assert!(vm.fault().is_none());
}

#[test]
fn unimplemented_syscall_reports_nosys_and_continues() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, 21), // reserved number
        Opcode::SYSCALL,
        Opcode::MOVI(2, 5),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);
    assert_eq!(vm.register(0), E_NOSYS);
    assert_eq!(vm.register(2), 5, "execution continued past the syscall");
}

#[test]
fn sys_exit_halts_and_stores_the_code() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, SYS_EXIT as u16),
        Opcode::MOVI(1, 3),
        Opcode::SYSCALL,
        Opcode::MOVI(2, 9),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    assert!(vm.halted());
    assert_eq!(vm.register(0), 3);
    assert_eq!(vm.exit_code(), Some(3));
    assert_eq!(vm.register(2), 0, "nothing executes after exit");
}

#[test]
fn sys_print_emits_guest_memory() {
    // Write "Hi" into memory via storeb, then print it.
    let program: Vec<u8> = [
        Opcode::MOVI(3, 0x2000),
        Opcode::MOVI(1, b'H' as u16),
        Opcode::STOREB(1, 3, 0),
        Opcode::MOVI(1, b'i' as u16),
        Opcode::STOREB(1, 3, 1),
        Opcode::MOVI(0, SYS_PRINT as u16),
        Opcode::MOVI(1, 0x2000),
        Opcode::MOVI(2, 2),
        Opcode::SYSCALL,
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    assert_eq!(vm.host().output(), b"Hi");
    assert_eq!(vm.register(0), 2);
}

#[test]
fn getchar_reads_scripted_input_until_eof() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, SYS_GETCHAR as u16),
        Opcode::SYSCALL,
        Opcode::MOV(2, 0),
        Opcode::MOVI(0, SYS_GETCHAR as u16),
        Opcode::SYSCALL,
        Opcode::MOV(3, 0),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = Interpreter::with_host(CapturedIo::with_input("x"));
    vm.load_program(&program).unwrap();
    assert_eq!(vm.run().unwrap(), StopReason::Halted);

    assert_eq!(vm.register(2), b'x' as u32);
    assert_eq!(vm.register(3), u32::MAX, "-1 at end of input");
}

#[test]
fn call_and_ret_nest() {
    let program: Vec<u8> = [
        Opcode::CALL(0x10),  // 0x00
        Opcode::MOVI(2, 2),  // 0x04
        Opcode::HALT,        // 0x08
        Opcode::NOP,         // 0x0c
        Opcode::MOVI(1, 1),  // 0x10: subroutine
        Opcode::RET,         // 0x14
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program);
    let initial_sp = vm.sp();

    assert_eq!(vm.run().unwrap(), StopReason::Halted);
    assert_eq!(vm.register(1), 1);
    assert_eq!(vm.register(2), 2);
    assert_eq!(vm.sp(), initial_sp);
}

#[test]
fn load_at_the_memory_edge() {
    let mut vm = vm();
    let size = vm.memory().len() as u32;

    // A word read at size-3 still succeeds; size-2 crosses the
    // boundary.
    assert!(vm.memory().read_word(size - 4).is_ok());
    assert!(vm.memory().read_word(size - 3).is_ok());
    assert_eq!(
        vm.memory().read_word(size - 2),
        Err(VmError::MemoryViolation { addr: size - 2 })
    );

    // Through the ISA: load r1, [r3] with r3 past the edge.
    let program: Vec<u8> = [Opcode::LOAD(1, 3, 0), Opcode::HALT].into_iter().collect();
    vm.load_program(&program).unwrap();
    vm.set_register(3, size - 2);

    assert_eq!(
        vm.run(),
        Err(VmError::MemoryViolation { addr: size - 2 })
    );
    assert!(vm.halted());
}

#[test]
fn stack_overflow_and_underflow_trap() {
    // Pushing with sp at the very bottom overflows.
    let program: Vec<u8> = [Opcode::PUSH(0), Opcode::HALT].into_iter().collect();
    let mut vm = vm_with(program);
    vm.set_sp(0);
    assert_eq!(vm.run(), Err(VmError::StackOverflow));

    // Popping past the top of memory underflows.
    let program: Vec<u8> = [Opcode::POP(0), Opcode::HALT].into_iter().collect();
    let mut vm = vm_with(program);
    let top = vm.memory().len() as u32;
    vm.set_sp(top - 2);
    assert_eq!(vm.run(), Err(VmError::StackUnderflow));
}

#[test]
fn unknown_opcode_traps_with_the_byte() {
    let program = 0xff00_0000u32.to_le_bytes().to_vec();
    let mut vm = vm_with(program);

    assert_eq!(vm.run(), Err(VmError::UnknownOpcode(0xff)));
    assert_eq!(vm.fault(), Some(VmError::UnknownOpcode(0xff)));
}

#[test]
fn reset_restores_a_fresh_machine() {
    let program: Vec<u8> = [
        Opcode::MOVI(0, SYS_ALLOC as u16),
        Opcode::MOVI(1, 64),
        Opcode::SYSCALL,
        Opcode::PUSH(0),
        Opcode::HALT,
    ]
    .into_iter()
    .collect();

    let mut vm = vm_with(program.clone());
    vm.run().unwrap();
    vm.reset();

    let fresh = vm_with(Vec::new());
    assert_eq!(vm.registers(), fresh.registers());
    assert_eq!(vm.pc(), 0);
    assert_eq!(vm.sp(), fresh.sp());
    assert_eq!(vm.flags(), fresh.flags());
    assert_eq!(vm.allocator().free_blocks(), fresh.allocator().free_blocks());
    assert_eq!(vm.memory().as_slice(), fresh.memory().as_slice());
    assert!(!vm.halted());

    // Loading the same program again reproduces the same run.
    vm.load_program(&program).unwrap();
    vm.run().unwrap();
    assert_eq!(vm.register(0), HEAP_BASE);
}

fn branch_taken(branch: fn(Address24) -> Opcode, a: u32, b: u32) -> bool {
    let program: Vec<u8> = [
        Opcode::CMP(1, 2), // 0x00
        branch(0x10),      // 0x04
        Opcode::HALT,      // 0x08: fall through
        Opcode::NOP,       // 0x0c
        Opcode::HALT,      // 0x10: branch target
    ]
    .into_iter()
    .collect();

    let mut vm = Interpreter::with_memory_size(0x2_0000, CapturedIo::default());
    vm.load_program(&program).expect("program fits");
    vm.set_register(1, a);
    vm.set_register(2, b);

    vm.run().expect("no traps in the branch probe");

    // Halting at 0x10 leaves pc at 0x14; falling through leaves 0x0c.
    vm.pc() == 0x14
}

#[quickcheck]
fn signed_branches_follow_the_comparison(a: u32, b: u32) -> bool {
    let (sa, sb) = (a as i32, b as i32);

    branch_taken(Opcode::JLT, a, b) == (sa < sb)
        && branch_taken(Opcode::JGT, a, b) == (sa > sb)
        && branch_taken(Opcode::JLE, a, b) == (sa <= sb)
        && branch_taken(Opcode::JGE, a, b) == (sa >= sb)
        && branch_taken(Opcode::JEQ, a, b) == (sa == sb)
        && branch_taken(Opcode::JNE, a, b) == (sa != sb)
        && branch_taken(Opcode::JZ, a, b) == (sa == sb)
        && branch_taken(Opcode::JNZ, a, b) == (sa != sb)
}

#[quickcheck]
fn push_pop_round_trips(value: u32) -> bool {
    let program: Vec<u8> = [Opcode::PUSH(1), Opcode::POP(1), Opcode::HALT]
        .into_iter()
        .collect();

    let mut vm = Interpreter::with_memory_size(0x2_0000, CapturedIo::default());
    vm.load_program(&program).expect("program fits");
    vm.set_register(1, value);
    let initial_sp = vm.sp();

    vm.run().expect("no traps");

    vm.register(1) == value && vm.sp() == initial_sp
}
