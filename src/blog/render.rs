use pulldown_cmark::{html, Options, Parser};

// GitHub flavoured extras the blog posts use.
fn markdown_options() -> Options {
  let mut options = Options::empty();
  options.insert(Options::ENABLE_TABLES);
  options.insert(Options::ENABLE_STRIKETHROUGH);
  options.insert(Options::ENABLE_TASKLISTS);
  options
}

/**
 * Renders blog content to HTML. Raw HTML in the markdown goes
 * through too, so the output is always sanitized before it leaves
 * here. Task list checkboxes are the only inputs allowed.
 */
pub fn render_markdown(content: &str) -> String {
  let parser = Parser::new_ext(content, markdown_options());
  let mut unsafe_html = String::with_capacity(content.len() * 3 / 2);
  html::push_html(&mut unsafe_html, parser);
  ammonia::Builder::default()
    .add_tags(&["input"])
    .add_tag_attributes("input", &["type", "checked", "disabled"])
    .clean(&unsafe_html)
    .to_string()
}
