/**
 * Generate the "SET a = ?, b = ?" part of an UPDATE
 * query for the given column names.
 */
pub fn generate_set_placeholders(names: &[&str]) -> String {
  names.iter()
    .map(|name| generate_field_equal_qmark(name))
    .collect::<Vec<String>>()
    .join(", ")
}

pub fn generate_field_equal_qmark(name: &str) -> String {
  format!("{} = ?", name)
}
