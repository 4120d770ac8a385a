use std::cmp::Ordering;
use super::model::Article;

// Most recent first. ISO calendar dates compare correctly as
// plain strings. Same effective date falls back to the creation
// timestamp, and unknown dates (empty string) always go last.
fn recency(a: &Article, b: &Article) -> Ordering {
  match (a.effective_date.is_empty(), b.effective_date.is_empty()) {
    (true, true) => Ordering::Equal,
    (true, false) => Ordering::Greater,
    (false, true) => Ordering::Less,
    (false, false) => b.effective_date.cmp(&a.effective_date)
      .then_with(|| b.created_at_iso.cmp(&a.created_at_iso))
  }
}

// sort_by is stable, articles that compare equal keep their
// original relative order.
pub fn sort_by_effective_date_desc(mut articles: Vec<Article>) -> Vec<Article> {
  articles.sort_by(recency);
  articles
}

pub fn take_latest(articles: Vec<Article>, n: usize) -> Vec<Article> {
  let mut sorted = sort_by_effective_date_desc(articles);
  sorted.truncate(n);
  sorted
}

#[cfg(test)]
mod tests {
  use super::*;

  fn article(id: &str, date: &str, created: Option<&str>) -> Article {
    Article {
      id: id.to_string(),
      title: id.to_string(),
      content: String::new(),
      effective_date: date.to_string(),
      created_at_iso: created.map(String::from),
      permalink: format!("/blog/{}", id),
      published: true
    }
  }

  fn ids(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.id.as_str()).collect()
  }

  #[test]
  fn newest_first_unknown_last() {
    let sut = vec![
      article("unknown1", "", None),
      article("old", "2025-11-05", None),
      article("new", "2025-11-25", None),
      article("unknown2", "", None),
      article("mid", "2025-11-16", None)
    ];
    let sorted = sort_by_effective_date_desc(sut);
    assert_eq!(vec!["new", "mid", "old", "unknown1", "unknown2"], ids(&sorted));
  }

  #[test]
  fn same_date_uses_creation_time_then_stays_stable() {
    let sut = vec![
      article("first", "2025-11-08", None),
      article("early", "2025-11-08", Some("2025-11-08T08:00:00.000Z")),
      article("second", "2025-11-08", None),
      article("late", "2025-11-08", Some("2025-11-08T20:00:00.000Z"))
    ];
    let sorted = sort_by_effective_date_desc(sut);
    assert_eq!(vec!["late", "early", "first", "second"], ids(&sorted));
  }

  #[test]
  fn sorted_output_is_a_permutation() {
    let sut = vec![
      article("a", "2025-01-01", None),
      article("b", "", None),
      article("c", "2024-06-30", None),
      article("d", "2025-01-01", None)
    ];
    let sorted = sort_by_effective_date_desc(sut.clone());
    assert_eq!(sut.len(), sorted.len());
    for a in &sut {
      assert!(sorted.contains(a));
    }
    for pair in sorted.windows(2) {
      assert_ne!(Ordering::Greater, recency(&pair[0], &pair[1]));
    }
  }

  #[test]
  fn take_latest_bounds() {
    let sut = vec![
      article("old", "2025-11-05", None),
      article("new", "2025-11-20", None)
    ];
    assert_eq!(vec!["new", "old"], ids(&take_latest(sut.clone(), 10)));
    assert_eq!(vec!["new", "old"], ids(&take_latest(sut.clone(), 2)));
    assert_eq!(vec!["new"], ids(&take_latest(sut.clone(), 1)));
    assert!(take_latest(sut, 0).is_empty());
    assert!(take_latest(Vec::new(), 3).is_empty());
  }
}
