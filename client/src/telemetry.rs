use errors::ApiError;
use metrics::counter;

pub const REQUESTS_TOTAL: &str = "jotter_api_requests_total";

pub struct Telemetry;

impl Telemetry {
    /// Count one pipeline call. `outcome` is `ok` or the error kind.
    pub fn record_request(method: &str, outcome: &str) {
        counter!(REQUESTS_TOTAL, "method" => method.to_string(), "outcome" => outcome.to_string())
            .increment(1);
    }

    pub fn record_result<T>(method: &str, result: &Result<T, ApiError>) {
        match result {
            Ok(_) => Self::record_request(method, "ok"),
            Err(e) => Self::record_request(method, &e.kind().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::CompositeKey;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    type SnapshotVec = Vec<(
        CompositeKey,
        Option<metrics::Unit>,
        Option<metrics::SharedString>,
        DebugValue,
    )>;

    fn with_test_recorder<F: FnOnce()>(f: F) -> SnapshotVec {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, f);
        snapshotter.snapshot().into_vec()
    }

    fn count_for(snapshot: &SnapshotVec, method: &str, outcome: &str) -> u64 {
        snapshot
            .iter()
            .filter(|(k, _, _, _)| k.key().name() == REQUESTS_TOTAL)
            .filter(|(k, _, _, _)| {
                let labels: Vec<_> = k.key().labels().collect();
                labels.iter().any(|l| l.key() == "method" && l.value() == method)
                    && labels.iter().any(|l| l.key() == "outcome" && l.value() == outcome)
            })
            .map(|(_, _, _, v)| match v {
                DebugValue::Counter(c) => *c,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_outcomes_are_labelled_by_kind() {
        let snapshot = with_test_recorder(|| {
            Telemetry::record_result::<()>("GET", &Ok(()));
            Telemetry::record_result::<()>("GET", &Ok(()));
            Telemetry::record_result::<()>("POST", &Err(ApiError::from_response(500, "")));
            Telemetry::record_result::<()>(
                "DELETE",
                &Err(ApiError::dispatch_message("bad url")),
            );
        });

        assert_eq!(count_for(&snapshot, "GET", "ok"), 2);
        assert_eq!(count_for(&snapshot, "POST", "server"), 1);
        assert_eq!(count_for(&snapshot, "DELETE", "dispatch"), 1);
        assert_eq!(count_for(&snapshot, "PUT", "ok"), 0);
    }
}
