use anyhow::bail;
use async_trait::async_trait;
use std::collections::HashMap;
use warehouse_metrics::fetch::{HttpClient, RetryingFetcher, RetryPolicy, Sleeper};
use warehouse_metrics::pipeline::Pipeline;
use warehouse_metrics::sources::{SourceKey, default_sources};
use warehouse_metrics::stats::summarize;
use warehouse_metrics::window::filter_window;

/// Serves canned payloads by URL; unknown URLs fail every attempt.
struct CannedClient {
    payloads: HashMap<String, String>,
}

#[async_trait]
impl HttpClient for CannedClient {
    async fn get_text(&self, url: &str) -> anyhow::Result<String> {
        match self.payloads.get(url) {
            Some(body) => Ok(body.clone()),
            None => bail!("status 404 for {url}"),
        }
    }
}

/// No-op sleeper so retry exhaustion doesn't slow the test run down.
struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _delay: std::time::Duration) {}
}

fn canned_pipeline(payloads: &[(&str, &str)]) -> Pipeline<CannedClient, NoSleep> {
    let client = CannedClient {
        payloads: payloads
            .iter()
            .map(|(url, body)| (url.to_string(), body.to_string()))
            .collect(),
    };
    let fetcher = RetryingFetcher::with_policy(client, RetryPolicy::default(), NoSleep);
    Pipeline::new(fetcher, default_sources("http://metrics.test"))
}

#[tokio::test]
async fn test_two_source_scenario_merges_into_one_hour() {
    let pipeline = canned_pipeline(&[
        (
            "http://metrics.test/orders.csv",
            "timestamp,count\n2024-06-01T10:15:00Z,7\n",
        ),
        (
            "http://metrics.test/labels.csv",
            "timestamp,count\n2024-06-01T10:50:00Z,3\n",
        ),
        ("http://metrics.test/packers.csv", "timestamp,count\n"),
        ("http://metrics.test/pickers.csv", "timestamp,count\n"),
    ]);

    let series = pipeline.run().await.unwrap();

    assert_eq!(series.len(), 1);
    let row = &series[0];
    assert_eq!(row.bucket_label, "Jun-01 10:00");
    assert_eq!(row.sort_key, 1_717_236_000_000); // 2024-06-01T10:00:00Z
    assert_eq!(row.value(SourceKey::Orders), 7);
    assert_eq!(row.value(SourceKey::Labels), 3);
    assert_eq!(row.value(SourceKey::Packers), 0);
    assert_eq!(row.value(SourceKey::Pickers), 0);
}

#[tokio::test]
async fn test_missing_source_fails_the_whole_run() {
    // pickers.csv is absent, so its fetch exhausts retries and the run fails.
    let pipeline = canned_pipeline(&[
        (
            "http://metrics.test/orders.csv",
            "timestamp,count\n2024-06-01T10:15:00Z,7\n",
        ),
        ("http://metrics.test/labels.csv", "timestamp,count\n"),
        ("http://metrics.test/packers.csv", "timestamp,count\n"),
    ]);

    let err = pipeline.run().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Pickers"), "unexpected error: {message}");
    assert!(message.contains("3 attempts"), "unexpected error: {message}");
}

#[tokio::test]
async fn test_full_pipeline_window_and_stats() {
    let pipeline = canned_pipeline(&[
        (
            "http://metrics.test/orders.csv",
            "timestamp,count\n\
             2024-06-01T09:10:00Z,4\n\
             2024-06-01T09:45:00Z,2\n\
             2024-06-01T10:05:00Z,5\n\
             2024-05-01T10:00:00Z,100\n",
        ),
        (
            "http://metrics.test/labels.csv",
            "timestamp,count\n2024-06-01T10:20:00Z,10\n",
        ),
        (
            "http://metrics.test/packers.csv",
            "timestamp,count\n2024-06-01T10:00:00Z,2\n",
        ),
        (
            "http://metrics.test/pickers.csv",
            "timestamp,count\n2024-06-01T10:30:00Z,3\n",
        ),
    ]);

    let series = pipeline.run().await.unwrap();
    // Three distinct hours: the May outlier plus 09:00 and 10:00 on Jun 1.
    assert_eq!(series.len(), 3);

    // A 7-day window anchored to Jun 1 drops the May row.
    let filtered = filter_window(&series, 7);
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered[0].bucket_label, "Jun-01 09:00");
    assert_eq!(filtered[0].value(SourceKey::Orders), 6); // 4 + 2 summed

    let stats = summarize(filtered);
    assert_eq!(stats.orders.max, 6);
    assert_eq!(stats.orders.min, 5);
    assert_eq!(stats.peak_order_day.count, 11);
    assert_eq!(stats.peak_order_day.date_label, "Sat 6/1/2024");
    // Only the 10:00 hour has labor: 10 labels / (2 + 3) workers.
    assert!((stats.efficiency.avg - 2.0).abs() < f64::EPSILON);
}
