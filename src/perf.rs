use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::time::Instant;

static PERF_ENABLED: AtomicBool = AtomicBool::new(false);
static PERF_INIT: Once = Once::new();

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 耗时日志开关
///
/// - Debug 默认开启；Release 默认关闭
/// - `COA_RESOLVER_PERF=1` 强制开启，`=0` 强制关闭
fn perf_enabled() -> bool {
    PERF_INIT.call_once(|| {
        let enabled = match std::env::var("COA_RESOLVER_PERF") {
            Ok(v) => is_true(&v),
            Err(_) => cfg!(debug_assertions),
        };
        PERF_ENABLED.store(enabled, Ordering::Relaxed);
    });
    PERF_ENABLED.load(Ordering::Relaxed)
}

/// 性能统计 Guard：记录 elapsed_ms + 处理条目数
///
/// 使用方式：
/// ```ignore
/// let mut perf = coa_resolver::perf::PerfGuard::new("resolve_order");
/// perf.add_items(lot_codes.len());
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    items: usize,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            items: 0,
        }
    }

    pub fn add_items(&mut self, n: usize) {
        self.items = self.items.saturating_add(n);
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        if !perf_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            items = self.items,
            "done"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true() {
        assert!(is_true(" YES "));
        assert!(is_true("1"));
        assert!(!is_true("off"));
    }

    #[test]
    fn test_guard_counts_items() {
        let mut guard = PerfGuard::new("test");
        guard.add_items(3);
        guard.add_items(usize::MAX);
        assert_eq!(guard.items, usize::MAX);
    }
}
