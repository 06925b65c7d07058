use super::*;
use tempfile::TempDir;

fn manager(dir: &TempDir, enabled: bool, expire_hours: u64) -> CacheManager {
    CacheManager::new(CacheConfig {
        enabled,
        cache_dir: dir.path().to_path_buf(),
        expire_hours,
    })
}

#[test]
fn test_hash_prompt_is_stable_md5() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir, true, 1);
    assert_eq!(cache.hash_prompt(""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(cache.hash_prompt("abc"), cache.hash_prompt("abc"));
    assert_ne!(cache.hash_prompt("abc"), cache.hash_prompt("abd"));
}

#[tokio::test]
async fn test_set_then_get_returns_data() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir, true, 1);

    cache.set("prompt", "hello", "world".to_string()).await.unwrap();
    let hit: Option<String> = cache.get("prompt", "hello").await.unwrap();
    assert_eq!(hit.as_deref(), Some("world"));

    let hash = cache.hash_prompt("hello");
    assert!(dir.path().join("prompt").join(format!("{}.json", hash)).exists());
}

#[tokio::test]
async fn test_miss_for_unknown_prompt() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir, true, 1);
    let miss: Option<String> = cache.get("prompt", "never stored").await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_disabled_cache_is_noop() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir, false, 1);

    cache.set("prompt", "hello", "world".to_string()).await.unwrap();
    assert!(!dir.path().join("prompt").exists());
    let miss: Option<String> = cache.get("prompt", "hello").await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_expired_entry_is_deleted_on_read() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir, true, 1);

    let hash = cache.hash_prompt("old");
    let path = dir.path().join("prompt").join(format!("{}.json", hash));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let entry = CacheEntry {
        data: "stale".to_string(),
        timestamp: 0,
        prompt_hash: hash,
    };
    std::fs::write(&path, serde_json::to_string(&entry).unwrap()).unwrap();

    let miss: Option<String> = cache.get("prompt", "old").await.unwrap();
    assert!(miss.is_none());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_corrupt_entry_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let cache = manager(&dir, true, 1);

    let hash = cache.hash_prompt("broken");
    let path = dir.path().join("prompt").join(format!("{}.json", hash));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let miss: Option<String> = cache.get("prompt", "broken").await.unwrap();
    assert!(miss.is_none());
}
