use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

/// A file received in a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    }
}

/// Storage for uploaded posters and photos. Returns the public URL under
/// which a stored file is served.
pub trait FileStore: Send + Sync {
    fn save(&self, container: &str, file: &UploadedFile) -> Result<String>;

    fn delete(&self, url: &str, container: &str) -> Result<()>;
}

/// Saves `file` when present and hands its URL to `commit`. The saved file is
/// removed again if `commit` fails, so no row is left without its file and no
/// file is left without its row.
pub fn save_with<T>(
    files: &dyn FileStore,
    container: &str,
    file: Option<&UploadedFile>,
    commit: impl FnOnce(Option<String>) -> Result<T>,
) -> Result<T> {
    let url = file.map(|file| files.save(container, file)).transpose()?;
    match commit(url.clone()) {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Some(url) = &url {
                discard(files, url, container);
            }
            Err(e)
        }
    }
}

/// Best-effort delete of a file that is no longer referenced.
pub fn discard(files: &dyn FileStore, url: &str, container: &str) {
    if let Err(e) = files.delete(url, container) {
        log::warn!("Couldn't delete {} from {}: {}", url, container, e);
    }
}

/// Writes files under `<root>/<container>/` and serves them from
/// `<public_url>/<container>/`.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    public_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, container: &str, file_name: &str) -> PathBuf {
        self.root.join(container).join(file_name)
    }
}

impl FileStore for LocalFileStore {
    fn save(&self, container: &str, file: &UploadedFile) -> Result<String> {
        let file_name = match file.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        fs::create_dir_all(self.root.join(container))?;
        fs::write(self.path_for(container, &file_name), &file.content)?;
        log::debug!("Stored upload {}/{}", container, file_name);
        Ok(format!("{}/{}/{}", self.public_url, container, file_name))
    }

    fn delete(&self, url: &str, container: &str) -> Result<()> {
        let Some(file_name) = url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        else {
            return Ok(());
        };
        match fs::remove_file(self.path_for(container, file_name)) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::CatalogError;
    use tempfile::TempDir;

    fn store() -> (LocalFileStore, TempDir) {
        let root = TempDir::new().unwrap();
        (LocalFileStore::new(root.path(), "http://localhost:8080/"), root)
    }

    fn poster() -> UploadedFile {
        UploadedFile {
            file_name: Some("poster.png".to_string()),
            content: vec![1, 2, 3],
        }
    }

    #[test]
    fn save_writes_under_the_container() {
        let (store, root) = store();
        let url = store.save("peliculas", &poster()).unwrap();

        assert!(url.starts_with("http://localhost:8080/peliculas/"));
        assert!(url.ends_with(".png"));
        let name = url.rsplit('/').next().unwrap();
        assert_eq!(fs::read(root.path().join("peliculas").join(name)).unwrap(), vec![1, 2, 3]);
    }

    /// Records deletes and refuses saves once `saves_left` runs out.
    #[derive(Default)]
    struct RecordingFileStore {
        saves_left: Mutex<usize>,
        saved: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    impl RecordingFileStore {
        fn allowing(saves: usize) -> Self {
            Self {
                saves_left: Mutex::new(saves),
                ..Default::default()
            }
        }
    }

    impl FileStore for RecordingFileStore {
        fn save(&self, container: &str, _file: &UploadedFile) -> Result<String> {
            let mut left = self.saves_left.lock().unwrap();
            if *left == 0 {
                return Err(std::io::Error::new(ErrorKind::Other, "disk full").into());
            }
            *left -= 1;
            let mut saved = self.saved.lock().unwrap();
            let url = format!("http://x/{}/{}.png", container, saved.len());
            saved.push(url.clone());
            Ok(url)
        }

        fn delete(&self, url: &str, _container: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn failed_saves_never_reach_the_commit() {
        let files = RecordingFileStore::allowing(0);
        let mut committed = false;
        let result = save_with(&files, "peliculas", Some(&poster()), |_| {
            committed = true;
            Ok(())
        });

        assert!(result.is_err());
        assert!(!committed);
        assert!(files.deleted.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_commits_remove_the_new_file() {
        let files = RecordingFileStore::allowing(1);
        let result: Result<()> = save_with(&files, "peliculas", Some(&poster()), |url| {
            assert_eq!(url.as_deref(), Some("http://x/peliculas/0.png"));
            Err(CatalogError::NotFound)
        });

        assert!(result.is_err());
        assert_eq!(*files.deleted.lock().unwrap(), vec!["http://x/peliculas/0.png"]);
    }

    #[test]
    fn commits_without_a_file_get_no_url() {
        let files = RecordingFileStore::allowing(0);
        let url = save_with(&files, "actores", None, Ok).unwrap();
        assert_eq!(url, None);
        assert!(files.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn deleting_a_missing_file_is_not_an_error() {
        let (store, _) = store();
        store
            .delete("http://localhost:8080/peliculas/missing.png", "peliculas")
            .unwrap();
    }

    #[test]
    fn unsafe_extensions_are_dropped() {
        let file = UploadedFile {
            file_name: Some("../../etc/passwd.p/ng".to_string()),
            content: vec![],
        };
        assert_eq!(file.extension(), None);
    }
}
