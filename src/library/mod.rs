use crate::error::Result;
use crate::models::{Library, MediaFolder, MOVIES_COLLECTION_TYPE};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Answers whether a folder without a declared collection type holds movies.
#[async_trait]
pub trait MovieProbe: Send + Sync {
    async fn has_movies(&self, library_id: &str) -> Result<bool>;
}

/// Keeps the folders that hold movies, in listing order.
///
/// Folders typed `movies` are always kept. Untyped folders are probed and kept
/// only when the probe finds at least one movie; a failing probe drops the
/// folder. Every other collection type is skipped.
pub async fn classify_libraries<P>(folders: &[MediaFolder], probe: &P) -> Vec<Library>
where
    P: MovieProbe + ?Sized,
{
    let mut libraries = Vec::new();

    for folder in folders {
        match folder.collection_type() {
            MOVIES_COLLECTION_TYPE => {
                debug!("Library '{}' declared as movies", folder.name);
                libraries.push(Library::from(folder));
            }
            "" => match probe.has_movies(&folder.id).await {
                Ok(true) => {
                    debug!("Library '{}' contains movies", folder.name);
                    libraries.push(Library::from(folder));
                }
                Ok(false) => debug!("Library '{}' has no movies, skipping", folder.name),
                Err(e) => warn!("Could not probe library '{}': {}", folder.name, e),
            },
            other => debug!("Skipping '{}' library '{}'", other, folder.name),
        }
    }

    info!(
        "Classified {} of {} media folders as movie libraries",
        libraries.len(),
        folders.len()
    );
    libraries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeProbe {
        answers: HashMap<String, Option<bool>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        fn answer(mut self, id: &str, answer: Option<bool>) -> Self {
            self.answers.insert(id.to_string(), answer);
            self
        }
    }

    #[async_trait]
    impl MovieProbe for FakeProbe {
        async fn has_movies(&self, library_id: &str) -> Result<bool> {
            self.calls.lock().push(library_id.to_string());
            match self.answers.get(library_id).copied().flatten() {
                Some(found) => Ok(found),
                None => Err(Error::UpstreamStatus(StatusCode::BAD_GATEWAY)),
            }
        }
    }

    fn folder(id: &str, collection_type: Option<&str>) -> MediaFolder {
        MediaFolder {
            id: id.to_string(),
            name: format!("Folder {}", id),
            collection_type: collection_type.map(str::to_string),
        }
    }

    fn ids(libraries: &[Library]) -> Vec<&str> {
        libraries.iter().map(|l| l.id.as_str()).collect()
    }

    #[tokio::test]
    async fn movies_type_is_kept_without_probing() {
        let probe = FakeProbe::default().answer("a", Some(false));
        let libraries = classify_libraries(&[folder("a", Some("movies"))], &probe).await;

        assert_eq!(ids(&libraries), vec!["a"]);
        assert!(probe.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn other_types_are_never_kept() {
        let probe = FakeProbe::default()
            .answer("tv", Some(true))
            .answer("music", Some(true));
        let folders = [folder("tv", Some("tvshows")), folder("music", Some("music"))];

        let libraries = classify_libraries(&folders, &probe).await;
        assert!(libraries.is_empty());
        assert!(probe.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn untyped_folders_follow_the_probe() {
        let probe = FakeProbe::default()
            .answer("yes", Some(true))
            .answer("no", Some(false))
            .answer("broken", None);
        let folders = [
            folder("yes", None),
            folder("no", Some("")),
            folder("broken", None),
        ];

        let libraries = classify_libraries(&folders, &probe).await;
        assert_eq!(ids(&libraries), vec!["yes"]);
        assert_eq!(*probe.calls.lock(), vec!["yes", "no", "broken"]);
    }

    #[tokio::test]
    async fn listing_order_is_preserved() {
        let probe = FakeProbe::default().answer("b", Some(true));
        let folders = [
            folder("c", Some("movies")),
            folder("tv", Some("tvshows")),
            folder("b", None),
            folder("a", Some("movies")),
        ];

        let libraries = classify_libraries(&folders, &probe).await;
        assert_eq!(ids(&libraries), vec!["c", "b", "a"]);
        assert_eq!(libraries[1].name, "Folder b");
    }
}
