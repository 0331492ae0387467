use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use rocket::{
    request::{self, FromRequest, Request},
    tokio::fs,
    State,
};

use crate::error::Result;
use crate::model::question::{Question, MAX_RECENT};

/// Storage for the bounded question list, newest first.
///
/// `insert` is defined in terms of `load` and `save`, so implementations only
/// describe where the records live. The whole collection is rewritten on
/// every insert and there is no locking: concurrent writers can lose updates
/// (last writer wins).
#[rocket::async_trait]
pub trait QuestionStore: Send + Sync {
    /// Read all stored questions.
    ///
    /// A missing backing location yields an empty list; any other failure
    /// propagates.
    async fn load(&self) -> Result<Vec<Question>>;

    /// Overwrite the backing location with the given questions.
    async fn save(&self, questions: &[Question]) -> Result<()>;

    /// Store a new question at the front of the list, dropping anything that
    /// falls outside the retention window. Returns the stored question.
    async fn insert(&self, text: String) -> Result<Question> {
        let mut questions = self.load().await?;
        let question = Question::new(questions.len() as u32 + 1, text);
        questions.insert(0, question.clone());
        questions.truncate(MAX_RECENT);
        self.save(&questions).await?;
        Ok(question)
    }
}

/// A store backed by a single human-readable JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[rocket::async_trait]
impl QuestionStore for FileStore {
    async fn load(&self) -> Result<Vec<Question>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save(&self, questions: &[Question]) -> Result<()> {
        let contents = serde_json::to_string_pretty(questions)?;
        fs::write(&self.path, contents).await?;
        Ok(())
    }
}

/// An in-memory store, usable anywhere a [`QuestionStore`] is expected.
/// Lets tests exercise the web surface without touching the filesystem.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore(std::sync::Mutex<Vec<Question>>);

#[cfg(test)]
#[rocket::async_trait]
impl QuestionStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Question>> {
        Ok(self.0.lock().unwrap().clone())
    }

    async fn save(&self, questions: &[Question]) -> Result<()> {
        *self.0.lock().unwrap() = questions.to_vec();
        Ok(())
    }
}

/// Request guard handing out the managed store.
pub struct Store<'r>(&'r dyn QuestionStore);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Store<'r> {
    type Error = ();

    /// Get the store from the managed state.
    ///
    /// Panics iff no store is managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let store = req
            .guard::<&State<Box<dyn QuestionStore>>>()
            .await
            .unwrap();
        request::Outcome::Success(Store(store.inner().as_ref()))
    }
}

impl<'r> Deref for Store<'r> {
    type Target = dyn QuestionStore + 'r;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[backend_test]
    async fn load_without_file_is_empty(store: FileStore) {
        // Nothing has been written yet, so the backing file does not exist.
        assert_eq!(store.load().await.unwrap(), vec![]);
    }

    #[backend_test]
    async fn insert_prepends_and_numbers(store: FileStore) {
        store.insert("What is X?".to_string()).await.unwrap();
        store.insert("What is Y?".to_string()).await.unwrap();

        let questions = store.load().await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, 2);
        assert_eq!(questions[0].question, "What is Y?");
        assert_eq!(questions[1].id, 1);
        assert_eq!(questions[1].question, "What is X?");
        assert!(questions[0].created_at >= questions[1].created_at);
    }

    #[backend_test]
    async fn retention_window_drops_the_oldest(store: FileStore) {
        for i in 1..=11 {
            store.insert(format!("Question number {i}")).await.unwrap();
        }

        let questions = store.load().await.unwrap();
        assert_eq!(questions.len(), MAX_RECENT);
        assert_eq!(questions[0].question, "Question number 11");
        assert!(questions.iter().all(|q| q.question != "Question number 1"));
    }

    #[backend_test]
    async fn ids_repeat_once_the_window_is_full(store: FileStore) {
        for i in 1..=12 {
            store.insert(format!("Question number {i}")).await.unwrap();
        }

        // The stored count stops growing at the window size, so the two
        // newest questions were both numbered 11.
        let questions = store.load().await.unwrap();
        assert_eq!(questions[0].id, 11);
        assert_eq!(questions[1].id, 11);
    }

    #[backend_test]
    async fn save_of_fresh_load_changes_nothing(store: FileStore, data_file: PathBuf) {
        store.insert("What is X?".to_string()).await.unwrap();
        store.insert("What is Y?".to_string()).await.unwrap();

        let before = std::fs::read_to_string(&data_file).unwrap();
        let questions = store.load().await.unwrap();
        store.save(&questions).await.unwrap();
        let after = std::fs::read_to_string(&data_file).unwrap();
        assert_eq!(before, after);
    }

    #[backend_test]
    async fn file_format_is_stable(store: FileStore, data_file: PathBuf) {
        store.insert("What is X?".to_string()).await.unwrap();

        let contents = std::fs::read_to_string(&data_file).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        let record = &parsed.as_array().unwrap()[0];
        assert_eq!(record["id"], 1);
        assert_eq!(record["question"], "What is X?");
        assert!(record["created_at"].is_string());
    }

    #[rocket::async_test]
    async fn memory_store_matches_file_semantics() {
        let store = MemoryStore::default();
        store.insert("What is X?".to_string()).await.unwrap();
        store.insert("What is Y?".to_string()).await.unwrap();

        let questions = store.load().await.unwrap();
        assert_eq!(questions[0].id, 2);
        assert_eq!(questions[0].question, "What is Y?");
        assert_eq!(questions[1].id, 1);
        assert_eq!(questions[1].question, "What is X?");
    }
}
