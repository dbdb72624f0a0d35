use std::io;

use bytes::Bytes;
use futures::{StreamExt, stream};

use listenbox::application::ports::{MediaStore, MediaStoreError};
use listenbox::infrastructure::storage::LocalMediaStore;

fn create_test_store() -> (tempfile::TempDir, LocalMediaStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalMediaStore::new(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

async fn read_all(store: &LocalMediaStore, name: &str) -> Vec<u8> {
    let mut stream = store.open(name).await.unwrap();
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

#[tokio::test]
async fn given_valid_stream_when_storing_then_size_and_content_match() {
    let (_dir, store) = create_test_store();
    let chunks = vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))];

    let size = store
        .store("a_WHSHPR_b.mp3", stream::iter(chunks).boxed())
        .await
        .unwrap();

    assert_eq!(size, 11);
    assert_eq!(read_all(&store, "a_WHSHPR_b.mp3").await, b"hello world");
}

#[tokio::test]
async fn given_failing_stream_when_storing_then_partial_file_is_removed() {
    let (dir, store) = create_test_store();
    let chunks = vec![
        Ok(Bytes::from("partial")),
        Err(io::Error::other("reset")),
    ];

    let result = store.store("x.mp3", stream::iter(chunks).boxed()).await;

    assert!(matches!(result, Err(MediaStoreError::Source(_))));
    assert!(!dir.path().join("x.mp3").exists());
}

#[tokio::test]
async fn given_traversal_names_when_storing_then_rejected() {
    let (_dir, store) = create_test_store();

    for name in ["", ".", "..", "../x", "a/b", "a\\b"] {
        let result = store
            .store(name, stream::iter(vec![Ok(Bytes::from("x"))]).boxed())
            .await;
        assert!(
            matches!(result, Err(MediaStoreError::InvalidName(_))),
            "{:?}",
            name
        );
    }
}

#[tokio::test]
async fn given_stored_file_when_renaming_then_only_new_name_exists() {
    let (dir, store) = create_test_store();
    store
        .store("old.mp3", stream::iter(vec![Ok(Bytes::from("x"))]).boxed())
        .await
        .unwrap();

    store.rename("old.mp3", "new.mp3").await.unwrap();

    assert!(!dir.path().join("old.mp3").exists());
    assert_eq!(read_all(&store, "new.mp3").await, b"x");
}

#[tokio::test]
async fn given_missing_file_when_opening_or_deleting_then_not_found() {
    let (_dir, store) = create_test_store();

    assert!(matches!(
        store.open("missing.mp3").await,
        Err(MediaStoreError::NotFound(_))
    ));
    assert!(matches!(
        store.delete("missing.mp3").await,
        Err(MediaStoreError::NotFound(_))
    ));
    assert!(matches!(
        store.rename("missing.mp3", "other.mp3").await,
        Err(MediaStoreError::NotFound(_))
    ));
}
