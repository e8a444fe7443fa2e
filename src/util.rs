//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole tracebacks or program output.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::trunc_for_log;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
  }

  #[test]
  fn cuts_on_char_boundary() {
    // 'é' is two bytes; a cut at byte 2 would split it.
    assert_eq!(trunc_for_log("aéz", 2), "a… (4 bytes total)");
  }
}
