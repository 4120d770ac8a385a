use tokio::fs::{read_dir, DirEntry, read_to_string, remove_file};
use tokio::io;
use std::fs::Metadata;
use std::time::SystemTime;
use std::path::{PathBuf, Path};
use std::sync::atomic::{self, AtomicBool};
use derive_more::Display;
use log::{error, info, warn};
use crate::auth::Actor;
use crate::blog::{ArticlePatch, BlogError, ContentRepository};
use super::dtos::{
  ArticleDraftDto,
  ImportedArticleDto,
  JsonStatus,
  JsonStatusType
};

// Imports blogs from JSON files dropped in a directory. Mostly for
// writing posts offline and pushing them all at once. Only one
// import can run at a time, hence the atomic lock in there.

const IMPORT_EXT: &'static str = "json";
// 30 MB size limit for import files just in case:
const MAX_FILE_SIZE: u64 = 31457280;
const DELETE_ACTION: u32 = 1;

#[derive(Debug, Display)]
enum ImportError {
  #[display(fmt = "IO error")]
  IOError,
  #[display(fmt = "Parse error: {}", _0)]
  ParseError(String)
}

impl std::error::Error for ImportError {}

impl From<serde_json::error::Error> for ImportError {
  fn from(error: serde_json::error::Error) -> Self {
    error!("JSON parsing error when importing blog: {}", error);
    ImportError::ParseError(error.to_string())
  }
}

impl From<ImportError> for JsonStatus {
  fn from(e: ImportError) -> Self {
    JsonStatus::new(JsonStatusType::Error, &e.to_string())
  }
}

// Store errors abort the whole import, there's no point going on
// with the other files if the store is down.
impl From<BlogError> for JsonStatus {
  fn from(e: BlogError) -> Self {
    error!("Encountered store error while importing blogs: {}", e);
    JsonStatus::new(JsonStatusType::Error, &format!("Database error: {}", e))
  }
}

pub struct ImportService {
  import_path: PathBuf,
  is_import_locked: AtomicBool
}

impl ImportService {

  // A missing directory gets created. One that exists but can't be
  // written to is an error right away, not in the middle of an import.
  pub fn open(path: &str) -> Result<Self, io::Error> {
    let import_path = PathBuf::from(path);
    if !import_path.exists() {
      std::fs::create_dir_all(&import_path)?;
      info!("Created import directory {:?}", import_path);
    }
    let read_only = import_path.metadata()?.permissions().readonly();
    let is_dir = import_path.is_dir();
    match (read_only, is_dir) {
      (false, true) => Ok(Self {
        import_path,
        is_import_locked: AtomicBool::new(false)
      }),
      _ => Err(
        io::Error::new(
          io::ErrorKind::PermissionDenied,
          "Import directory is not writable"
        )
      )
    }
  }

  // New blogs are authored by whoever started the import.
  pub async fn import_articles(
    &self,
    repository: &ContentRepository,
    actor: &Actor
  ) -> Result<Vec<JsonStatus>, JsonStatus> {
    if self.check_lock_set_if_unlocked() {
      warn!("An import was attempted while the import service is locked");
      return Err(
        JsonStatus::new(
          JsonStatusType::Error,
          "An import is already in progress"
        )
      );
    }
    let result = self.import_articles_no_lock(repository, actor).await;
    self.unlock();
    result
  }

  async fn import_articles_no_lock(
    &self,
    repository: &ContentRepository,
    actor: &Actor
  ) -> Result<Vec<JsonStatus>, JsonStatus> {
    let files = self.list_files_earliest_first()
      .await
      .map_err(|e| {
        error!("Error reading import directory: {}", e);
        JsonStatus::new(
          JsonStatusType::Error,
          "Could not list files in import directory"
        )
      })?;

    let mut statuses: Vec<JsonStatus> = Vec::new();
    for file in files {
      let path = file.path();
      let imported = match parse_article(&path).await {
        Ok(imported) => imported,
        Err(e) => {
          warn!("Blog parsing failed while importing {:?} - {}", path, e);
          statuses.push(e.into());
          continue;
        }
      };
      let status = apply_import(repository, actor, imported).await?;
      // Files that failed stay in the directory so they can be
      // fixed and imported again.
      if status.is_success() {
        if let Err(e) = remove_file(&path).await {
          warn!("Could not remove imported file {:?} - {}", path, e);
        }
      }
      statuses.push(status);
    }

    info!("Import done, {} file(s) processed", statuses.len());
    Ok(statuses)
  }

  // Returns true if it was already locked, false if it wasn't
  // and is now locked.
  fn check_lock_set_if_unlocked(&self) -> bool {
    self.is_import_locked.compare_exchange(
      false,
      true,
      atomic::Ordering::SeqCst,
      atomic::Ordering::Acquire
    ).is_err()
  }

  fn unlock(&self) {
    self.is_import_locked.store(false, atomic::Ordering::SeqCst);
  }

  async fn list_files_earliest_first(
    &self
  ) -> Result<Vec<DirEntry>, io::Error> {
    let mut files = read_dir(&self.import_path).await?;
    // Files and their modified time. The sort closure can't await
    // so the time has to be fetched beforehand.
    let mut import_files: Vec<(DirEntry, u128)> = Vec::new();
    // Entries giving out IO errors are ignored silently.
    while let Ok(Some(file)) = files.next_entry().await {
      let is_import_ext: bool = file.path()
        .extension()
        .map(
          |ext|
          ext.to_str().unwrap_or("").to_lowercase() == IMPORT_EXT
        )
        .unwrap_or(false);
      if let Ok(metadata) = file.metadata().await {
        if is_import_ext &&
          metadata.is_file() &&
          metadata.len() < MAX_FILE_SIZE &&
          !metadata.permissions().readonly()
          {
            let modified = modified_time(&metadata);
            import_files.push((file, modified));
          }
      }
    }
    import_files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(import_files.into_iter().map(|f| f.0).collect())
  }

}

// - action = 1 and id present => delete
// - id present => update
// - no id => create
async fn apply_import(
  repository: &ContentRepository,
  actor: &Actor,
  imported: ImportedArticleDto
) -> Result<JsonStatus, JsonStatus> {
  match (imported.id.clone(), imported.action) {
    (Some(id), Some(DELETE_ACTION)) => {
      match repository.delete_by_id(&id).await {
        Ok(()) => Ok(JsonStatus::new_with_id(JsonStatusType::Success, "Blog deleted", &id)),
        Err(BlogError::NotFound(_)) => Ok(missing_id_status(&id)),
        Err(e) => Err(e.into())
      }
    },
    (None, Some(DELETE_ACTION)) => Ok(JsonStatus::new(
      JsonStatusType::Error,
      "Field id is required when deleting blogs"
    )),
    (Some(id), _) => {
      let patch = ArticlePatch::from(imported);
      if patch.is_empty() {
        return Ok(JsonStatus::new_with_id(JsonStatusType::Error, "Nothing to update", &id));
      }
      match repository.update(&id, patch).await {
        Ok(()) => Ok(JsonStatus::new_with_id(JsonStatusType::Success, "Blog updated", &id)),
        Err(BlogError::NotFound(_)) => Ok(missing_id_status(&id)),
        Err(e) => Err(e.into())
      }
    },
    (None, _) => {
      match ArticleDraftDto::from(imported).into_draft() {
        Ok(draft) => {
          let id = repository.create(Some(actor), draft).await?;
          Ok(JsonStatus::new_with_id(JsonStatusType::Success, "Blog created", &id))
        },
        Err(field) => Ok(JsonStatus::new(
          JsonStatusType::Error,
          &format!("Field {} is required when creating blogs", field)
        ))
      }
    }
  }
}

fn missing_id_status(id: &str) -> JsonStatus {
  JsonStatus::new_with_id(JsonStatusType::Error, "Blog ID doesn't exist", id)
}

// Errors reading the modified time just give 0, the file goes first.
fn modified_time(metadata: &Metadata) -> u128 {
  metadata.modified()
    .map_or(0, |m| {
      match m.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(t) => t.as_nanos(),
        Err(_) => 0
      }
    })
}

// The whole file is loaded in memory, the size limit is taken
// care of when listing the files.
async fn parse_article<P: AsRef<Path>>(
  path: P
) -> Result<ImportedArticleDto, ImportError> {
  let contents = read_to_string(path)
    .await
    .map_err(|_| ImportError::IOError)?;
  let imported: ImportedArticleDto = serde_json::from_str(&contents)?;
  Ok(imported)
}
