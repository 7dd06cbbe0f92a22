// web-server/src/uploads.rs
use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::TryStreamExt;
use mime::Mime;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

const FILE_FIELD: &str = "certificate";
const ACTIVITY_FIELD: &str = "activityName";
const MAX_TEXT_FIELD_BYTES: usize = 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no certificate file was provided")]
    MissingFile,

    #[error("an activity name is required")]
    MissingActivityName,

    #[error("the file exceeds the {0} byte limit")]
    TooLarge(u64),

    #[error("malformed upload: {0}")]
    Malformed(String),

    #[error("could not stage the upload")]
    Io(#[from] io::Error),
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        UploadError::Malformed(e.to_string())
    }
}

/// Form data of one upload request.
///
/// Owns the staged temp file; dropping the payload deletes it, whatever path
/// the request took.
#[derive(Debug)]
pub struct UploadPayload {
    activity_name: String,
    file: StagedFile,
}

#[derive(Debug)]
struct StagedFile {
    temp: NamedTempFile,
    file_name: String,
    content_type: Mime,
    size: u64,
}

impl UploadPayload {
    /// Take ownership of an already written temp file
    pub fn from_temp_file(
        activity_name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Mime,
        temp: NamedTempFile,
    ) -> io::Result<Self> {
        let size = temp.as_file().metadata()?.len();
        Ok(Self {
            activity_name: activity_name.into(),
            file: StagedFile {
                temp,
                file_name: file_name.into(),
                content_type,
                size,
            },
        })
    }

    pub fn activity_name(&self) -> &str {
        &self.activity_name
    }

    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    pub fn content_type(&self) -> &Mime {
        &self.file.content_type
    }

    pub fn size(&self) -> u64 {
        self.file.size
    }

    pub fn path(&self) -> &Path {
        self.file.temp.path()
    }

    /// Fresh read handle positioned at the start of the staged file
    pub async fn open(&self) -> io::Result<tokio::fs::File> {
        tokio::fs::File::open(self.path()).await
    }
}

/// Where and how much of an upload may be buffered on disk
#[derive(Clone, Debug)]
pub struct UploadStaging {
    dir: PathBuf,
    max_bytes: u64,
}

impl UploadStaging {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Read the multipart body, spooling the certificate to a temp file
    pub async fn stage(&self, mut multipart: Multipart) -> Result<UploadPayload, UploadError> {
        let mut activity_name = None;
        let mut file = None;

        while let Some(mut field) = multipart.try_next().await? {
            match field.name() {
                Some(FILE_FIELD) => {
                    if let Some(staged) = self.stage_file(&mut field).await? {
                        file = Some(staged);
                    }
                }
                Some(ACTIVITY_FIELD) => activity_name = Some(read_text(&mut field).await?),
                other => {
                    tracing::debug!("Skipping unexpected upload field {:?}", other);
                    while field.try_next().await?.is_some() {}
                }
            }
        }

        let file = file.ok_or(UploadError::MissingFile)?;
        let activity_name = activity_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or(UploadError::MissingActivityName)?;

        Ok(UploadPayload {
            activity_name,
            file,
        })
    }

    /// Returns `None` for the empty part browsers send when no file was chosen
    async fn stage_file(&self, field: &mut Field) -> Result<Option<StagedFile>, UploadError> {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(sanitize_file_name)
            .unwrap_or_default();
        let content_type = field
            .content_type()
            .cloned()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);

        let temp = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.dir)?;
        let mut out = tokio::fs::File::from_std(temp.as_file().try_clone()?);

        let mut size: u64 = 0;
        while let Some(chunk) = field.try_next().await? {
            size += chunk.len() as u64;
            if size > self.max_bytes {
                // temp is dropped on return, removing the partial file
                return Err(UploadError::TooLarge(self.max_bytes));
            }
            out.write_all(&chunk).await?;
        }
        out.flush().await?;

        if size == 0 && file_name.is_empty() {
            return Ok(None);
        }

        let file_name = if file_name.is_empty() {
            "certificate".to_string()
        } else {
            file_name
        };

        tracing::debug!(
            "Staged upload {} ({} bytes, {}) at {}",
            file_name,
            size,
            content_type,
            temp.path().display()
        );

        Ok(Some(StagedFile {
            temp,
            file_name,
            content_type,
            size,
        }))
    }
}

async fn read_text(field: &mut Field) -> Result<String, UploadError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(UploadError::Malformed("text field too long".to_string()));
        }
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf).map_err(|_| UploadError::Malformed("text field is not UTF-8".to_string()))
}

/// Keep only the last path component of a client supplied file name
fn sanitize_file_name(name: &str) -> String {
    name.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect::<String>()
        .trim()
        .to_string()
}
