//! 指标模块
//!
//! 基于 metrics facade 记录业务指标。未安装 recorder 时所有记录均为空操作，
//! 由宿主进程决定是否接入导出器。

/// 注册指标描述
pub fn describe_metrics() {
    metrics::describe_counter!("catalog_loads_total", "Catalog loads by cache outcome");
    metrics::describe_histogram!(
        "catalog_load_duration_seconds",
        "Catalog table fetch duration in seconds"
    );
    metrics::describe_counter!(
        "progression_fetches_total",
        "Player progression fetches by status"
    );
    metrics::describe_counter!(
        "unclaimed_resolutions_total",
        "Number of unclaimed reward resolutions"
    );
    metrics::describe_counter!(
        "data_integrity_warnings_total",
        "Catalog joins skipped during resolution"
    );
    metrics::describe_counter!("reward_claims_total", "Reward claim submissions by outcome");
}

/// 记录定义表加载
#[inline]
pub fn record_catalog_load(cache: &str, duration_secs: f64) {
    metrics::counter!("catalog_loads_total", "cache" => cache.to_string()).increment(1);
    if cache == "miss" {
        metrics::histogram!("catalog_load_duration_seconds").record(duration_secs);
    }
}

/// 记录进度拉取
#[inline]
pub fn record_progression_fetch(status: &str) {
    metrics::counter!("progression_fetches_total", "status" => status.to_string()).increment(1);
}

/// 记录一次未领取奖励解析
#[inline]
pub fn record_resolution(items: usize, warnings: usize) {
    metrics::counter!("unclaimed_resolutions_total").increment(1);
    if warnings > 0 {
        metrics::counter!("data_integrity_warnings_total").increment(warnings as u64);
    }
    metrics::gauge!("unclaimed_items").set(items as f64);
}

/// 记录奖励领取结果
#[inline]
pub fn record_claim(outcome: &str) {
    metrics::counter!("reward_claims_total", "outcome" => outcome.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 未初始化 recorder 时也不应 panic
        describe_metrics();
        record_catalog_load("miss", 0.2);
        record_catalog_load("hit", 0.0);
        record_progression_fetch("ok");
        record_resolution(12, 1);
        record_claim("claimed");
    }
}
