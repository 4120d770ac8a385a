// Placeholder the old frontend showed for articles with no content.
pub const EMPTY_EXCERPT_PLACEHOLDER: &'static str =
  "The blog content will show up here...";

// Cutting a String with truncate() can panic when the cut lands
// in the middle of a multibyte char (and blog posts are full of
// those), so we count chars instead of bytes.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
  s.chars().take(max_chars).collect()
}

// Short text shown on listing cards.
// With_ellipsis adds "..." only when something was actually cut.
pub fn excerpt(content: &str, max_chars: usize, with_ellipsis: bool) -> String {
  if content.is_empty() {
    return String::from(EMPTY_EXCERPT_PLACEHOLDER);
  }
  let mut result = truncate_chars(content, max_chars);
  if with_ellipsis && content.chars().count() > max_chars {
    result.push_str("...");
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncate_does_not_split_multibyte_chars() {
    let sut = "これは2025年11月5日のブログ記事です。";
    assert_eq!("これは", truncate_chars(sut, 3));
  }

  #[test]
  fn excerpt_adds_ellipsis_only_when_cut() {
    assert_eq!("Hello...", excerpt("Hello world", 5, true));
    assert_eq!("Hello", excerpt("Hello", 5, true));
    assert_eq!("Hello", excerpt("Hello world", 5, false));
  }

  #[test]
  fn empty_content_gives_placeholder() {
    assert_eq!(EMPTY_EXCERPT_PLACEHOLDER, excerpt("", 100, false));
  }
}
