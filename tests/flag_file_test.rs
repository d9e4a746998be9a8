use anyhow::Result;
use metal_bench::core::flags::{apply_flags, DEFAULT_FLAG_KEYS};
use metal_bench::core::FlagStore;
use metal_bench::LocalFlagFile;
use tempfile::TempDir;

const METAL_YML: &str = "\
# MetalMC Configuration File
config-version: 1
optimizations:
  chunk-ticking: true
multithreading:
  async-chunk-loading:
    enabled: true
    threads: 4
  async-entity-processing:
    enabled: true
    async-pathfinding: true
    threads: 2
  thread-priorities:
    enabled: true
    main-thread-priority: 10
";

fn default_keys() -> Vec<String> {
    DEFAULT_FLAG_KEYS.iter().map(|k| k.to_string()).collect()
}

/// 測試在磁碟上的設定檔切換 true -> false -> true 後內容完全還原
#[tokio::test]
async fn test_toggle_on_disk_restores_original() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("metal.yml");
    tokio::fs::write(&path, METAL_YML).await?;
    let store = LocalFlagFile::new(&path);

    apply_flags(&store, &default_keys(), true).await?;
    assert_eq!(tokio::fs::read_to_string(&path).await?, METAL_YML);

    let edit = apply_flags(&store, &default_keys(), false).await?;
    assert_eq!(edit.total_matches(), 4);
    let disabled = tokio::fs::read_to_string(&path).await?;
    assert!(!disabled.contains("enabled: true"));
    assert!(disabled.contains("  chunk-ticking: false\n"));
    assert!(disabled.contains("    async-pathfinding: true\n"));
    assert!(disabled.contains("    main-thread-priority: 10\n"));

    apply_flags(&store, &default_keys(), true).await?;
    assert_eq!(tokio::fs::read_to_string(&path).await?, METAL_YML);

    Ok(())
}

#[tokio::test]
async fn test_unknown_keys_leave_file_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("metal.yml");
    tokio::fs::write(&path, METAL_YML).await?;
    let store = LocalFlagFile::new(&path);

    let keys = vec!["dab-enabled".to_string()];
    let edit = apply_flags(&store, &keys, false).await?;

    assert_eq!(edit.total_matches(), 0);
    assert_eq!(edit.unmatched_keys().collect::<Vec<_>>(), vec!["dab-enabled"]);
    assert_eq!(store.read_config().await?, METAL_YML);

    Ok(())
}

#[tokio::test]
async fn test_missing_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalFlagFile::new(temp_dir.path().join("missing.yml"));

    let result = apply_flags(&store, &default_keys(), true).await;
    assert!(matches!(result, Err(metal_bench::BenchError::IoError(_))));
}
