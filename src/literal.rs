//! A closed set of lesson-language literals used as a fallback when comparing
//! an expected value against printed output.
//!
//! Only booleans, `None`, integers and plain quoted strings are understood. The
//! parsed value is rendered back the way the interpreter's `repr()` would print
//! it, so `"abc"` matches `'abc'` and `0x10` matches `16`. Anything outside this
//! set is rejected; expected values are never evaluated as code.
//!
//! Integers have no size limit. Strings holding a non-ASCII character whose
//! printability can't be decided without the full Unicode tables are rejected
//! rather than rendered wrongly.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
  Bool(bool),
  None,
  /// Canonical decimal text, `-` prefixed when negative.
  Int(String),
  Str(String),
}

impl Literal {
  pub fn parse(src: &str) -> Option<Literal> {
    let s = src.trim();
    match s {
      "True" => Some(Literal::Bool(true)),
      "False" => Some(Literal::Bool(false)),
      "None" => Some(Literal::None),
      _ => parse_int(s).map(Literal::Int).or_else(|| parse_str(s).map(Literal::Str)),
    }
  }

  /// Canonical printed form.
  pub fn repr(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for Literal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Literal::Bool(true) => f.write_str("True"),
      Literal::Bool(false) => f.write_str("False"),
      Literal::None => f.write_str("None"),
      Literal::Int(n) => f.write_str(n),
      Literal::Str(s) => f.write_str(&repr_str(s)),
    }
  }
}

fn parse_int(s: &str) -> Option<String> {
  let (negative, body) = match s.as_bytes().first()? {
    b'-' => (true, &s[1..]),
    b'+' => (false, &s[1..]),
    _ => (false, s),
  };

  let lower = body.get(..2).map(|p| p.to_ascii_lowercase());
  let (radix, digits, after_prefix) = match lower.as_deref() {
    Some("0x") => (16, &body[2..], true),
    Some("0o") => (8, &body[2..], true),
    Some("0b") => (2, &body[2..], true),
    _ => (10, body, false),
  };

  // One underscore may follow a radix prefix; otherwise underscores only sit between digits.
  let digits = if after_prefix { digits.strip_prefix('_').unwrap_or(digits) } else { digits };
  if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
    return None;
  }
  let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
  if !cleaned.chars().all(|c| c.is_digit(radix)) {
    return None;
  }
  // Decimal literals can't have leading zeros unless the value is zero.
  if radix == 10 && cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0') {
    return None;
  }

  let magnitude = to_decimal(&cleaned, radix);
  if negative && magnitude != "0" {
    Some(format!("-{magnitude}"))
  } else {
    Some(magnitude)
  }
}

/// Convert validated `digits` in `radix` to decimal text of any length.
fn to_decimal(digits: &str, radix: u32) -> String {
  const LIMB: u64 = 1_000_000_000;
  // Little-endian base-1e9 limbs.
  let mut limbs: Vec<u64> = vec![0];
  for d in digits.chars().filter_map(|c| c.to_digit(radix)) {
    let mut carry = u64::from(d);
    for limb in limbs.iter_mut() {
      let v = *limb * u64::from(radix) + carry;
      *limb = v % LIMB;
      carry = v / LIMB;
    }
    while carry > 0 {
      limbs.push(carry % LIMB);
      carry /= LIMB;
    }
  }

  let mut out = limbs.last().map(|l| l.to_string()).unwrap_or_default();
  for limb in limbs.iter().rev().skip(1) {
    out.push_str(&format!("{limb:09}"));
  }
  out
}

fn parse_str(s: &str) -> Option<String> {
  let quote = s.chars().next().filter(|&c| c == '\'' || c == '"')?;
  if s.len() < 2 || !s.ends_with(quote) {
    return None;
  }
  let triple: String = std::iter::repeat(quote).take(3).collect();
  if s.len() >= 6 && s.starts_with(&triple) {
    // Triple-quoted strings are out of scope.
    return None;
  }

  let inner = &s[1..s.len() - 1];
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '\\' => {
        let esc = chars.next()?;
        match esc {
          '\n' => {}
          '\\' | '\'' | '"' => out.push(esc),
          'n' => out.push('\n'),
          't' => out.push('\t'),
          'r' => out.push('\r'),
          'a' => out.push('\u{07}'),
          'b' => out.push('\u{08}'),
          'f' => out.push('\u{0c}'),
          'v' => out.push('\u{0b}'),
          '0'..='7' => {
            let mut code = esc.to_digit(8)?;
            for _ in 0..2 {
              match chars.peek().and_then(|d| d.to_digit(8)) {
                Some(d) => {
                  code = code * 8 + d;
                  chars.next();
                }
                None => break,
              }
            }
            out.push(char::from_u32(code)?);
          }
          'x' => out.push(hex_escape(&mut chars, 2)?),
          'u' => out.push(hex_escape(&mut chars, 4)?),
          'U' => out.push(hex_escape(&mut chars, 8)?),
          // Named escapes need the Unicode name table.
          'N' => return None,
          other => {
            out.push('\\');
            out.push(other);
          }
        }
      }
      '\n' => return None,
      c if c == quote => return None,
      c => out.push(c),
    }
  }
  if out.chars().any(|c| printability(c).is_none()) {
    return None;
  }
  Some(out)
}

fn hex_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, width: usize) -> Option<char> {
  let mut code = 0u32;
  for _ in 0..width {
    code = code * 16 + chars.next()?.to_digit(16)?;
  }
  char::from_u32(code)
}

/// Mirrors the interpreter's string repr: prefer single quotes, switch to
/// double quotes only when the text holds `'` but no `"`.
fn repr_str(s: &str) -> String {
  let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
  let mut out = String::with_capacity(s.len() + 2);
  out.push(quote);
  for c in s.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if c == quote => {
        out.push('\\');
        out.push(c);
      }
      c if is_printable(c) => out.push(c),
      c => {
        let code = c as u32;
        if code < 0x100 {
          out.push_str(&format!("\\x{code:02x}"));
        } else if code < 0x10000 {
          out.push_str(&format!("\\u{code:04x}"));
        } else {
          out.push_str(&format!("\\U{code:08x}"));
        }
      }
    }
  }
  out.push(quote);
  out
}

// Characters `repr()` escapes even though they are neither controls nor separators.
const ESCAPED_RANGES: &[(u32, u32)] = &[
  // Format (Cf)
  (0x00AD, 0x00AD),
  (0x0600, 0x0605),
  (0x061C, 0x061C),
  (0x06DD, 0x06DD),
  (0x070F, 0x070F),
  (0x0890, 0x0891),
  (0x08E2, 0x08E2),
  (0x180E, 0x180E),
  (0x200B, 0x200F),
  (0x202A, 0x202E),
  (0x2060, 0x2064),
  (0x2066, 0x206F),
  (0xFEFF, 0xFEFF),
  (0xFFF9, 0xFFFB),
  (0x110BD, 0x110BD),
  (0x110CD, 0x110CD),
  (0x13430, 0x1343F),
  (0x1BCA0, 0x1BCA3),
  (0x1D173, 0x1D17A),
  (0xE0001, 0xE0001),
  (0xE0020, 0xE007F),
  // Private use (Co)
  (0xE000, 0xF8FF),
  (0xF0000, 0xFFFFD),
  (0x100000, 0x10FFFD),
  // Noncharacters
  (0xFDD0, 0xFDEF),
];

// Fully assigned blocks of punctuation, symbols and marks, all printable.
const PRINTABLE_RANGES: &[(u32, u32)] = &[
  (0x00A1, 0x00FF),
  (0x0300, 0x036F),
  (0x2010, 0x2027),
  (0x2030, 0x205E),
  (0x20A0, 0x20BF),
  (0x2190, 0x23FF),
  (0x2500, 0x27BF),
  (0x3001, 0x303F),
  (0xFF01, 0xFF5E),
];

fn in_ranges(c: char, ranges: &[(u32, u32)]) -> bool {
  let code = c as u32;
  ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&code))
}

/// `Some(true)` if `repr()` prints `c` as-is, `Some(false)` if it escapes it,
/// `None` when that depends on Unicode data we don't carry.
fn printability(c: char) -> Option<bool> {
  let code = c as u32;
  if c.is_ascii() {
    return Some(!c.is_ascii_control());
  }
  if c.is_control()
    || c.is_whitespace()
    || (code & 0xFFFE) == 0xFFFE
    || in_ranges(c, ESCAPED_RANGES)
  {
    return Some(false);
  }
  if c.is_alphanumeric() || in_ranges(c, PRINTABLE_RANGES) {
    return Some(true);
  }
  None
}

fn is_printable(c: char) -> bool {
  printability(c).unwrap_or(true)
}
