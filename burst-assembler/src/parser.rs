//! Line-based lexing.
//!
//! A line is an optional `label:`, optionally followed by one
//! instruction or directive, optionally followed by a `;` comment.
//! String literals keep their `;` characters; everything else after an
//! unquoted `;` is comment.

use crate::error::{AssembleError, ErrorKind};
use crate::operand::{self, Operand};

/// One source line after lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based source line
    pub line: usize,
    /// Label defined on this line, if any
    pub label: Option<String>,
    /// Instruction or directive on this line, if any
    pub item: Option<Item>,
}

/// The emitting part of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// An instruction line: mnemonic plus parsed operands
    Instruction {
        /// Lower-cased mnemonic
        mnemonic: String,
        /// Operands in source order
        operands: Vec<Operand>,
    },
    /// A data directive
    Directive(Directive),
}

/// Data-emitting directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `.string`/`.ascii`: escape-processed bytes
    String(Vec<u8>),
    /// `.byte`/`.db`: one byte per value
    Bytes(Vec<Value>),
    /// `.word`/`.dw`: one little-endian word per value
    Words(Vec<Value>),
    /// `.space`/`.skip`: zero fill
    Space(u32),
}

/// A directive value: a literal or a label resolved in pass 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Numeric literal
    Number(i64),
    /// Label reference
    Label(String),
}

/// Lex the whole source into statements, one per line.
pub fn parse(source: &str) -> Result<Vec<Statement>, AssembleError> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

fn parse_line(line: usize, raw: &str) -> Result<Statement, AssembleError> {
    let text = strip_comment(raw);
    let mut text = text.trim();

    let mut label = None;

    if let Some(token) = text.split_whitespace().next() {
        if let Some(name) = token.strip_suffix(':') {
            if !operand::is_label(name) {
                return Err(ErrorKind::InvalidLabel(name.into()).at(line));
            }

            label = Some(name.to_owned());
            text = text[token.len()..].trim_start();
        }
    }

    let item = if text.is_empty() {
        None
    } else if text.starts_with('.') {
        Some(Item::Directive(parse_directive(line, text)?))
    } else {
        Some(parse_instruction(line, text)?)
    };

    Ok(Statement { line, label, item })
}

/// Cut an unquoted `;` comment off the line.
fn strip_comment(raw: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;

    for (pos, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            ';' if !in_string => return &raw[..pos],
            _ => (),
        }
    }

    raw
}

fn parse_instruction(line: usize, text: &str) -> Result<Item, AssembleError> {
    let (mnemonic, rest) = match text.split_once(char::is_whitespace) {
        Some((mnemonic, rest)) => (mnemonic, rest.trim()),
        None => (text, ""),
    };

    let operands = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',')
            .map(|part| Operand::parse(part, line))
            .collect::<Result<_, _>>()?
    };

    Ok(Item::Instruction {
        mnemonic: mnemonic.to_ascii_lowercase(),
        operands,
    })
}

fn parse_directive(line: usize, text: &str) -> Result<Directive, AssembleError> {
    let (name, rest) = match text.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (text, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        ".string" | ".ascii" => parse_string(line, rest).map(Directive::String),
        ".byte" | ".db" => parse_values(line, name, rest).map(Directive::Bytes),
        ".word" | ".dw" => parse_values(line, name, rest).map(Directive::Words),
        ".space" | ".skip" => match operand::parse_number(rest) {
            Some(count) if (0..=i64::from(u32::MAX)).contains(&count) => {
                Ok(Directive::Space(count as u32))
            }
            Some(count) => Err(ErrorKind::ValueOutOfRange(count).at(line)),
            None => Err(ErrorKind::MalformedDirective(name.into()).at(line)),
        },
        _ => Err(ErrorKind::MalformedDirective(name.into()).at(line)),
    }
}

fn parse_values(line: usize, name: &str, rest: &str) -> Result<Vec<Value>, AssembleError> {
    if rest.is_empty() {
        return Err(ErrorKind::MalformedDirective(name.into()).at(line));
    }

    rest.split(',')
        .map(|part| {
            let part = part.trim();

            if let Some(value) = operand::parse_number(part) {
                Ok(Value::Number(value))
            } else if operand::is_label(part) {
                Ok(Value::Label(part.into()))
            } else {
                Err(ErrorKind::InvalidLiteral(part.into()).at(line))
            }
        })
        .collect()
}

/// Parse a quoted string literal, processing `\n \r \t \" \\`.
fn parse_string(line: usize, text: &str) -> Result<Vec<u8>, AssembleError> {
    let inner = text
        .strip_prefix('"')
        .ok_or_else(|| ErrorKind::MalformedDirective(text.into()).at(line))?;

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();

    loop {
        match chars.next() {
            None => return Err(ErrorKind::UnterminatedString.at(line)),
            Some('"') => break,
            Some('\\') => {
                let escape = chars
                    .next()
                    .ok_or_else(|| ErrorKind::UnterminatedString.at(line))?;

                let byte = match escape {
                    'n' => b'\n',
                    'r' => b'\r',
                    't' => b'\t',
                    '"' => b'"',
                    '\\' => b'\\',
                    other => return Err(ErrorKind::UnknownEscape(other).at(line)),
                };

                bytes.push(byte);
            }
            Some(c) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    if !chars.as_str().trim().is_empty() {
        return Err(ErrorKind::MalformedDirective(chars.as_str().trim().into()).at(line));
    }

    Ok(bytes)
}
