//! Expression evaluation for `print` and `set`.
//!
//! An expression is a register name (`r0..r15`, `pc`, `sp`, `flags`),
//! a numeric literal, a symbol from the loaded assembly, or a memory
//! dereference `[expr]`, which nests.

use crate::session::SessionError;

use burst_asm::Word;
use burst_vm::interpreter::Interpreter;

use std::collections::BTreeMap;

/// A register reference accepted by `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegRef {
    Gpr(usize),
    Pc,
    Sp,
}

/// Case-insensitive register name lookup.
pub(crate) fn parse_reg(text: &str) -> Option<RegRef> {
    let lower = text.to_ascii_lowercase();

    match lower.as_str() {
        "pc" => return Some(RegRef::Pc),
        "sp" => return Some(RegRef::Sp),
        _ => (),
    }

    let digits = lower.strip_prefix('r')?;
    match digits.parse::<usize>() {
        Ok(id) if id < 16 => Some(RegRef::Gpr(id)),
        _ => None,
    }
}

/// `0x` hex or decimal literal.
pub(crate) fn parse_word(text: &str) -> Option<Word> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => Word::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Evaluate an expression against the machine and symbol table.
pub(crate) fn eval<H>(
    vm: &Interpreter<H>,
    symbols: &BTreeMap<String, Word>,
    text: &str,
) -> Result<Word, SessionError> {
    let text = text.trim();

    if let Some(inner) = text.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| SessionError::BadExpression(text.to_owned()))?;

        let addr = eval(vm, symbols, inner)?;
        return Ok(vm.memory().read_word(addr)?);
    }

    if let Some(reg) = parse_reg(text) {
        return Ok(match reg {
            RegRef::Gpr(id) => vm.register(id),
            RegRef::Pc => vm.pc(),
            RegRef::Sp => vm.sp(),
        });
    }

    if text.eq_ignore_ascii_case("flags") {
        return Ok(Word::from(vm.flags().bits()));
    }

    if let Some(value) = parse_word(text) {
        return Ok(value);
    }

    if let Some(&addr) = symbols.get(text) {
        return Ok(addr);
    }

    Err(SessionError::BadExpression(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use burst_vm::interpreter::CapturedIo;

    #[test]
    fn registers_literals_symbols_and_derefs() {
        let mut vm = Interpreter::with_host(CapturedIo::default());
        vm.set_register(3, 77);
        vm.memory_mut().write_word(0x1000, 0xabcd).unwrap();
        vm.set_register(4, 0x1000);

        let mut symbols = BTreeMap::new();
        symbols.insert("msg".to_owned(), 0x1000);

        assert_eq!(eval(&vm, &symbols, "r3").unwrap(), 77);
        assert_eq!(eval(&vm, &symbols, "R3").unwrap(), 77);
        assert_eq!(eval(&vm, &symbols, "sp").unwrap(), vm.sp());
        assert_eq!(eval(&vm, &symbols, "42").unwrap(), 42);
        assert_eq!(eval(&vm, &symbols, "0x2a").unwrap(), 42);
        assert_eq!(eval(&vm, &symbols, "msg").unwrap(), 0x1000);
        assert_eq!(eval(&vm, &symbols, "[0x1000]").unwrap(), 0xabcd);
        assert_eq!(eval(&vm, &symbols, "[r4]").unwrap(), 0xabcd);
        assert_eq!(eval(&vm, &symbols, "[msg]").unwrap(), 0xabcd);

        // Nested deref: follow the pointer stored at [r4].
        vm.memory_mut().write_word(0xabcd, 9).unwrap();
        assert_eq!(eval(&vm, &symbols, "[[r4]]").unwrap(), 9);

        assert!(eval(&vm, &symbols, "nope").is_err());
        assert!(eval(&vm, &symbols, "[oops").is_err());
    }

    #[test]
    fn register_names_reject_out_of_range_indices() {
        assert_eq!(parse_reg("r15"), Some(RegRef::Gpr(15)));
        assert_eq!(parse_reg("r16"), None);
        assert_eq!(parse_reg("PC"), Some(RegRef::Pc));
        assert_eq!(parse_reg("rx"), None);
    }
}
