// I tried the deserialize_with annotation for this at some point
// and it was more trouble than it's worth. Doing empty string to
// None in the DTO conversions with a plain old function instead.
pub fn empty_string_to_none(value: Option<String>) -> Option<String> {
  match value {
    Some(s) => if s.trim().is_empty()
      { None } else { Some(s) },
    None => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_strings_become_none() {
    assert_eq!(None, empty_string_to_none(Some(String::new())));
    assert_eq!(None, empty_string_to_none(Some("   ".to_string())));
    assert_eq!(None, empty_string_to_none(None));
    assert_eq!(
      Some("2025-11-05".to_string()),
      empty_string_to_none(Some("2025-11-05".to_string()))
    );
  }
}
