//! 定义表缓存
//!
//! 按定义表版本缓存原始表和构建好的 `Catalog`。
//!
//! ## 缓存策略
//!
//! 每次 `load()` 都会拉取清单以获得最新版本号：
//! - 版本未变：直接返回已构建的 `Catalog`，不再请求任何表
//! - 版本变化：丢弃旧版本的全部缓存，重新拉取所需的表
//!
//! 所需的表全部拉取并解析成功后才写入缓存，任一失败则整个调用失败，
//! 不会留下部分更新的定义表。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use futures::future::try_join_all;
use season_shared::observability::metrics;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::error::{Result, RewardError};
use crate::models::{
    Catalog, CatalogVersion, ItemDefinition, ManifestDescriptor, ProgressionDefinition,
    SeasonDefinition, SeasonPassDefinition,
};
use crate::platform::wire::{
    InventoryItemRecord, ProgressionDefinitionRecord, SeasonPassRecord, SeasonRecord,
};
use crate::platform::{CatalogSource, PlatformFailure};

/// 定义表名
pub mod tables {
    pub const PROGRESSION: &str = "DestinyProgressionDefinition";
    pub const INVENTORY_ITEM: &str = "DestinyInventoryItemDefinition";
    pub const SEASON: &str = "DestinySeasonDefinition";
    pub const SEASON_PASS: &str = "DestinySeasonPassDefinition";

    /// 构建 `Catalog` 所需的全部表
    pub const REQUIRED: [&str; 4] = [PROGRESSION, INVENTORY_ITEM, SEASON, SEASON_PASS];
}

#[derive(Default)]
struct StoreState {
    version: Option<CatalogVersion>,
    /// 当前版本的原始表
    tables: HashMap<String, Arc<Value>>,
}

impl StoreState {
    /// 版本变化时丢弃旧缓存
    fn sync_version(&mut self, version: &CatalogVersion) {
        if self.version.as_ref() != Some(version) {
            if let Some(old) = &self.version {
                info!(old_version = %old, new_version = %version, "定义表版本变化，丢弃旧缓存");
            }
            self.tables.clear();
            self.version = Some(version.clone());
        }
    }
}

/// 定义表缓存
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    /// 串行化加载，避免并发调用重复拉取同一版本
    state: Mutex<StoreState>,
    current: ArcSwapOption<Catalog>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            state: Mutex::new(StoreState::default()),
            current: ArcSwapOption::empty(),
        }
    }

    /// 加载当前版本的定义表
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Arc<Catalog>> {
        let start = Instant::now();
        let manifest = self.fetch_manifest().await?;

        let mut state = self.state.lock().await;
        state.sync_version(&manifest.version);

        if let Some(catalog) = self.current.load_full()
            && catalog.version == manifest.version
        {
            debug!(version = %catalog.version, "定义表命中缓存");
            metrics::record_catalog_load("hit", 0.0);
            return Ok(catalog);
        }

        let fetched = self.fetch_missing(&manifest, &state.tables, &tables::REQUIRED).await?;
        let mut all_tables = state.tables.clone();
        all_tables.extend(fetched);

        // 解析成功后再写入缓存
        let catalog = Arc::new(build_catalog(manifest.version.clone(), &all_tables)?);
        state.tables = all_tables;
        self.current.store(Some(catalog.clone()));

        let elapsed = start.elapsed();
        metrics::record_catalog_load("miss", elapsed.as_secs_f64());
        info!(
            version = %catalog.version,
            progressions = catalog.progressions.len(),
            items = catalog.items.len(),
            seasons = catalog.seasons.len(),
            tracks = catalog.track_count(),
            duration_ms = elapsed.as_millis() as u64,
            "定义表已加载"
        );

        Ok(catalog)
    }

    /// 读取当前版本的一张表并解析为 `hash -> T`
    #[instrument(skip(self))]
    pub async fn get_table<T: DeserializeOwned>(&self, name: &str) -> Result<HashMap<u32, T>> {
        let manifest = self.fetch_manifest().await?;

        let mut state = self.state.lock().await;
        state.sync_version(&manifest.version);
        if let Some(raw) = state.tables.get(name) {
            return decode_table(name, raw);
        }

        let fetched = self.fetch_missing(&manifest, &state.tables, &[name]).await?;
        let raw = fetched
            .get(name)
            .ok_or_else(|| RewardError::Internal(format!("table {} not fetched", name)))?;
        // 先解析再缓存
        let table = decode_table(name, raw)?;
        state.tables.extend(fetched);
        Ok(table)
    }

    /// 最近一次成功加载的定义表
    pub fn cached(&self) -> Option<Arc<Catalog>> {
        self.current.load_full()
    }

    /// 丢弃全部缓存，下次加载重新拉取
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        *state = StoreState::default();
        self.current.store(None);
        info!("定义表缓存已失效");
    }

    async fn fetch_manifest(&self) -> Result<ManifestDescriptor> {
        self.source
            .fetch_manifest()
            .await
            .map_err(|e| catalog_unavailable("manifest", &e))
    }

    /// 并发拉取缓存中缺少的表，全部成功才返回
    async fn fetch_missing(
        &self,
        manifest: &ManifestDescriptor,
        cached: &HashMap<String, Arc<Value>>,
        names: &[&str],
    ) -> Result<HashMap<String, Arc<Value>>> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !cached.contains_key(*name))
            .collect();

        let fetched = try_join_all(missing.into_iter().map(|name| async move {
            let value = self
                .source
                .fetch_table(manifest, name)
                .await
                .map_err(|e| catalog_unavailable(name, &e))?;
            Ok::<_, RewardError>((name.to_string(), Arc::new(value)))
        }))
        .await?;

        Ok(fetched.into_iter().collect())
    }
}

fn catalog_unavailable(what: &str, failure: &PlatformFailure) -> RewardError {
    RewardError::CatalogUnavailable {
        reason: format!("{}: {}", what, failure.describe()),
    }
}

/// 解析一张原始表：JSON 对象，键为 hash 的十进制字符串
fn decode_table<T: DeserializeOwned>(name: &str, raw: &Value) -> Result<HashMap<u32, T>> {
    let object = raw.as_object().ok_or_else(|| RewardError::CatalogUnavailable {
        reason: format!("{}: table is not a JSON object", name),
    })?;

    object
        .iter()
        .map(|(key, value)| {
            let hash = key.parse::<u32>().map_err(|_| RewardError::CatalogUnavailable {
                reason: format!("{}: invalid hash key '{}'", name, key),
            })?;
            let record = T::deserialize(value).map_err(|e| RewardError::CatalogUnavailable {
                reason: format!("{}: record {} is malformed: {}", name, hash, e),
            })?;
            Ok((hash, record))
        })
        .collect()
}

fn table<'a>(tables: &'a HashMap<String, Arc<Value>>, name: &str) -> Result<&'a Value> {
    tables
        .get(name)
        .map(|v| v.as_ref())
        .ok_or_else(|| RewardError::CatalogUnavailable {
            reason: format!("{}: table missing", name),
        })
}

fn build_catalog(version: CatalogVersion, tables: &HashMap<String, Arc<Value>>) -> Result<Catalog> {
    let progressions = decode_table::<ProgressionDefinitionRecord>(
        tables::PROGRESSION,
        table(tables, tables::PROGRESSION)?,
    )?
    .into_iter()
    .map(|(hash, record)| (hash, ProgressionDefinition::from(record)))
    .collect();

    let items = decode_table::<InventoryItemRecord>(
        tables::INVENTORY_ITEM,
        table(tables, tables::INVENTORY_ITEM)?,
    )?
    .into_iter()
    .map(|(hash, record)| (hash, ItemDefinition::from(record)))
    .collect();

    let seasons = decode_table::<SeasonRecord>(tables::SEASON, table(tables, tables::SEASON)?)?
        .into_iter()
        .map(|(hash, record)| (hash, SeasonDefinition::from(record)))
        .collect();

    let season_passes: HashMap<u32, SeasonPassDefinition> = decode_table::<SeasonPassRecord>(
        tables::SEASON_PASS,
        table(tables, tables::SEASON_PASS)?,
    )?
    .into_iter()
    .map(|(hash, record)| (hash, SeasonPassDefinition::from(record)))
    .collect();

    Ok(Catalog::new(version, progressions, items, seasons, &season_passes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FailureKind;
    use crate::platform::traits::MockCatalogSource;
    use mockall::predicate::eq;
    use serde_json::json;

    fn manifest(version: &str) -> ManifestDescriptor {
        ManifestDescriptor {
            version: CatalogVersion::new(version),
            table_paths: tables::REQUIRED
                .iter()
                .map(|t| (t.to_string(), format!("/content/{}.json", t)))
                .collect(),
        }
    }

    fn table_json(name: &str) -> Value {
        match name {
            tables::PROGRESSION => json!({
                "3001": {"hash": 3001, "steps": [{"progressTotal": 100}],
                         "rewardItems": [{"itemHash": 5001, "quantity": 1, "rewardedAtProgressionLevel": 1}]}
            }),
            tables::INVENTORY_ITEM => json!({
                "5001": {"hash": 5001, "displayProperties": {"name": "Engram"}, "itemType": 8,
                         "itemTypeDisplayName": "Engram"}
            }),
            tables::SEASON => json!({
                "1001": {"hash": 1001, "seasonNumber": 20, "seasonPassHash": 2001}
            }),
            tables::SEASON_PASS => json!({
                "2001": {"hash": 2001, "rewardProgressionHash": 3001}
            }),
            _ => json!({}),
        }
    }

    fn failure() -> PlatformFailure {
        PlatformFailure {
            kind: FailureKind::Http,
            status: Some(503),
            message: "Service Unavailable".to_string(),
            error_status: None,
            error_code: None,
        }
    }

    #[tokio::test]
    async fn test_load_builds_catalog() {
        let mut source = MockCatalogSource::new();
        source.expect_fetch_manifest().returning(|| Ok(manifest("v1")));
        source
            .expect_fetch_table()
            .times(4)
            .returning(|_, name| Ok(table_json(name)));

        let store = CatalogStore::new(Arc::new(source));
        let catalog = store.load().await.unwrap();

        assert_eq!(catalog.version.as_str(), "v1");
        assert_eq!(catalog.progressions[&3001].steps.len(), 1);
        assert_eq!(catalog.items[&5001].category, "Engram");
        assert_eq!(catalog.season_for_progression(3001).unwrap().season_number, 20);
        assert!(store.cached().is_some());
    }

    #[tokio::test]
    async fn test_same_version_is_served_from_cache() {
        let mut source = MockCatalogSource::new();
        source
            .expect_fetch_manifest()
            .times(2)
            .returning(|| Ok(manifest("v1")));
        // 第二次加载不应再拉取任何表
        source
            .expect_fetch_table()
            .times(4)
            .returning(|_, name| Ok(table_json(name)));

        let store = CatalogStore::new(Arc::new(source));
        let first = store.load().await.unwrap();
        let second = store.load().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_new_version_refetches_tables() {
        let mut source = MockCatalogSource::new();
        let mut seq = mockall::Sequence::new();
        source
            .expect_fetch_manifest()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(manifest("v1")));
        source
            .expect_fetch_manifest()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(manifest("v2")));
        source
            .expect_fetch_table()
            .times(8)
            .returning(|_, name| Ok(table_json(name)));

        let store = CatalogStore::new(Arc::new(source));
        store.load().await.unwrap();
        let catalog = store.load().await.unwrap();

        assert_eq!(catalog.version.as_str(), "v2");
    }

    #[tokio::test]
    async fn test_failed_table_leaves_no_partial_catalog() {
        let mut source = MockCatalogSource::new();
        source.expect_fetch_manifest().returning(|| Ok(manifest("v1")));
        source.expect_fetch_table().returning(|_, name| {
            if name == tables::SEASON {
                Err(failure())
            } else {
                Ok(table_json(name))
            }
        });

        let store = CatalogStore::new(Arc::new(source));
        let err = store.load().await.unwrap_err();

        assert!(matches!(err, RewardError::CatalogUnavailable { .. }));
        assert!(err.to_string().contains(tables::SEASON));
        assert!(store.cached().is_none());
    }

    #[tokio::test]
    async fn test_malformed_table_fails_atomically() {
        let mut source = MockCatalogSource::new();
        source.expect_fetch_manifest().returning(|| Ok(manifest("v1")));
        source.expect_fetch_table().returning(|_, name| {
            if name == tables::INVENTORY_ITEM {
                Ok(json!({"not-a-hash": {}}))
            } else {
                Ok(table_json(name))
            }
        });

        let store = CatalogStore::new(Arc::new(source));
        let err = store.load().await.unwrap_err();

        assert_eq!(err.error_code(), "CATALOG_UNAVAILABLE");
        assert!(store.cached().is_none());
    }

    #[tokio::test]
    async fn test_manifest_failure_is_catalog_unavailable() {
        let mut source = MockCatalogSource::new();
        source.expect_fetch_manifest().returning(|| Err(failure()));

        let store = CatalogStore::new(Arc::new(source));
        let err = store.load().await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[tokio::test]
    async fn test_get_table_caches_raw_table() {
        let mut source = MockCatalogSource::new();
        source.expect_fetch_manifest().returning(|| Ok(manifest("v1")));
        source
            .expect_fetch_table()
            .with(mockall::predicate::always(), eq(tables::SEASON))
            .times(1)
            .returning(|_, name| Ok(table_json(name)));

        let store = CatalogStore::new(Arc::new(source));
        let first: HashMap<u32, SeasonRecord> = store.get_table(tables::SEASON).await.unwrap();
        let second: HashMap<u32, SeasonRecord> = store.get_table(tables::SEASON).await.unwrap();

        assert_eq!(first[&1001].season_number, 20);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_get_table_does_not_cache_malformed_table() {
        let mut source = MockCatalogSource::new();
        let mut seq = mockall::Sequence::new();
        source.expect_fetch_manifest().returning(|| Ok(manifest("v1")));
        source
            .expect_fetch_table()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(json!({"not-a-hash": {}})));
        source
            .expect_fetch_table()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, name| Ok(table_json(name)));

        let store = CatalogStore::new(Arc::new(source));
        let err = store
            .get_table::<SeasonRecord>(tables::SEASON)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CATALOG_UNAVAILABLE");

        // 解析失败的表未进入缓存，再次读取会重新拉取
        let table: HashMap<u32, SeasonRecord> = store.get_table(tables::SEASON).await.unwrap();
        assert_eq!(table[&1001].season_number, 20);
    }

    #[tokio::test]
    async fn test_invalidate_drops_cache() {
        let mut source = MockCatalogSource::new();
        source.expect_fetch_manifest().returning(|| Ok(manifest("v1")));
        source
            .expect_fetch_table()
            .times(8)
            .returning(|_, name| Ok(table_json(name)));

        let store = CatalogStore::new(Arc::new(source));
        store.load().await.unwrap();
        store.invalidate().await;
        assert!(store.cached().is_none());

        store.load().await.unwrap();
        assert!(store.cached().is_some());
    }
}
