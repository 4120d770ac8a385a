use derive_more::Display;
use crate::store::StoreError;

// Everything the repository can fail with. Reads that find nothing
// are not errors, they give back None.
#[derive(Debug, Display)]
pub enum BlogError {
  #[display(fmt = "{}", _0)]
  Store(StoreError),
  #[display(fmt = "Authentication is required")]
  AuthRequired,
  #[display(fmt = "Blog {} does not exist", _0)]
  NotFound(String)
}

impl std::error::Error for BlogError {}

impl From<StoreError> for BlogError {
  fn from(error: StoreError) -> Self {
    BlogError::Store(error)
  }
}
