pub mod text_utils;
pub mod time_utils;
pub mod serde_utils;

// SQLite has no booleans, we store 0 and 1.
pub fn option_bool_to_i32(value: Option<bool>) -> Option<i32> {
  value.map(|v| if v { 1 } else { 0 })
}

pub fn option_i32_to_bool(value: Option<i32>) -> Option<bool> {
  value.map(|v| v != 0)
}
