use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use serde::Serialize;

use crate::domain::error::ErrorCode;

const LATENCY_CAP: usize = 1000;

/// ローカルメトリクス収集器（フロー単位）
pub struct Metrics {
    counters: Mutex<MetricsCounters>,
    latencies: Mutex<Vec<LatencyRecord>>,
}

#[derive(Debug, Default)]
struct MetricsCounters {
    invocations: BTreeMap<String, u64>,
    successes: BTreeMap<String, u64>,
    errors: HashMap<ErrorCode, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRecord {
    pub flow: String,
    pub duration_ms: u64,
    pub timestamp: String,
}

/// メトリクスサマリー（UIに返す用）
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub flows: Vec<FlowCounts>,
    pub error_counts: ErrorCounts,
    /// フロー名 → 平均レイテンシ (ms)
    pub avg_latency_ms: BTreeMap<String, f64>,
    pub recent_latencies: Vec<LatencyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowCounts {
    pub flow: String,
    pub invocations: u64,
    pub successes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorCounts {
    pub invalid_input: u64,
    pub invalid_output: u64,
    pub empty_generation: u64,
    pub external_service: u64,
    pub timeout: u64,
    pub internal: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(MetricsCounters::default()),
            latencies: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_invocation(&self, flow: &str) {
        *self
            .counters
            .lock()
            .invocations
            .entry(flow.to_string())
            .or_default() += 1;
    }

    pub fn inc_success(&self, flow: &str) {
        *self
            .counters
            .lock()
            .successes
            .entry(flow.to_string())
            .or_default() += 1;
    }

    pub fn inc_error(&self, code: ErrorCode) {
        *self.counters.lock().errors.entry(code).or_default() += 1;
    }

    pub fn record_latency(&self, flow: &str, duration_ms: u64) {
        let record = LatencyRecord {
            flow: flow.to_string(),
            duration_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut latencies = self.latencies.lock();
        latencies.push(record);
        // 最新1000件のみ保持
        if latencies.len() > LATENCY_CAP {
            let excess = latencies.len() - LATENCY_CAP;
            latencies.drain(0..excess);
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let c = self.counters.lock();
        let latencies = self.latencies.lock();

        let flows = c
            .invocations
            .iter()
            .map(|(flow, &invocations)| FlowCounts {
                flow: flow.clone(),
                invocations,
                successes: c.successes.get(flow).copied().unwrap_or(0),
            })
            .collect();

        let errors = |code: ErrorCode| c.errors.get(&code).copied().unwrap_or(0);

        let mut sums: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        for r in latencies.iter() {
            let entry = sums.entry(r.flow.clone()).or_default();
            entry.0 += r.duration_ms;
            entry.1 += 1;
        }
        let avg_latency_ms = sums
            .into_iter()
            .map(|(flow, (total, count))| (flow, total as f64 / count as f64))
            .collect();

        let recent: Vec<LatencyRecord> = latencies.iter().rev().take(20).cloned().collect();

        MetricsSummary {
            flows,
            error_counts: ErrorCounts {
                invalid_input: errors(ErrorCode::InvalidInput),
                invalid_output: errors(ErrorCode::InvalidOutput),
                empty_generation: errors(ErrorCode::EmptyGeneration),
                external_service: errors(ErrorCode::ExternalService),
                timeout: errors(ErrorCode::Timeout),
                internal: errors(ErrorCode::Internal),
            },
            avg_latency_ms,
            recent_latencies: recent,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
