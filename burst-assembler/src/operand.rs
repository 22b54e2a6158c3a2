//! Operand classification.
//!
//! Operand text is typed at parse time: a token is a register, an
//! immediate, a memory reference or a label, and each instruction
//! encoder accepts only the variants it supports.

use crate::error::{AssembleError, ErrorKind};

use burst_asm::{Offset12, RegisterId};

/// One parsed operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `r0..r15`
    Register(RegisterId),
    /// `#123`, `#0x10`, or a bare number
    Immediate(i64),
    /// `[rN]` or `[rN+off]`
    Memory {
        /// Base register
        reg: RegisterId,
        /// Unsigned 12-bit displacement
        offset: Offset12,
    },
    /// A label reference, resolved in pass 2
    Label(String),
}

impl Operand {
    pub(crate) fn parse(text: &str, line: usize) -> Result<Self, AssembleError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(ErrorKind::InvalidLiteral(String::new()).at(line));
        }

        if let Some(inner) = text.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| ErrorKind::InvalidLiteral(text.into()).at(line))?;

            return parse_memory(inner, line);
        }

        if let Some(literal) = text.strip_prefix('#') {
            return match parse_number(literal) {
                Some(value) => Ok(Self::Immediate(value)),
                None if is_label(literal) => Ok(Self::Label(literal.into())),
                None => Err(ErrorKind::InvalidLiteral(literal.into()).at(line)),
            };
        }

        if let Some(register) = try_register(text) {
            return register
                .map(Self::Register)
                .map_err(|_| ErrorKind::InvalidRegister(text.into()).at(line));
        }

        if let Some(value) = parse_number(text) {
            return Ok(Self::Immediate(value));
        }

        if is_label(text) {
            return Ok(Self::Label(text.into()));
        }

        Err(ErrorKind::InvalidLiteral(text.into()).at(line))
    }
}

fn parse_memory(inner: &str, line: usize) -> Result<Operand, AssembleError> {
    let (reg_text, offset) = match inner.split_once('+') {
        Some((reg, off)) => {
            let off = off.trim();
            let value = parse_number(off)
                .ok_or_else(|| ErrorKind::InvalidLiteral(off.into()).at(line))?;

            if !(0..=0xfff).contains(&value) {
                return Err(ErrorKind::ValueOutOfRange(value).at(line));
            }

            (reg.trim(), value as Offset12)
        }
        None => (inner.trim(), 0),
    };

    match try_register(reg_text) {
        Some(Ok(reg)) => Ok(Operand::Memory { reg, offset }),
        _ => Err(ErrorKind::InvalidRegister(reg_text.into()).at(line)),
    }
}

/// `Some(Ok(_))` for `r0..r15`, `Some(Err(()))` for register-shaped
/// text with a bad index, `None` for anything else.
fn try_register(text: &str) -> Option<Result<RegisterId, ()>> {
    let digits = text.strip_prefix(&['r', 'R'][..])?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match digits.parse::<usize>() {
        Ok(id) if id < 16 => Some(Ok(id)),
        _ => Some(Err(())),
    }
}

/// Decimal or `0x` hexadecimal, optionally negated.
pub(crate) fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };

    Some(if negative { -value } else { value })
}

/// Label names look like identifiers; dots are allowed for local
/// labels. Whitespace never is.
pub(crate) fn is_label(text: &str) -> bool {
    let mut chars = text.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_' || first == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
