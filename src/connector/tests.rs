use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{ConnectorRegistry, RequestParams};
use crate::config::ExecutorConfig;
use crate::transport::Transport;
use crate::transport::test_support::StubTransport;

fn registry_with(stub: &Arc<StubTransport>) -> ConnectorRegistry {
    let transport: Arc<dyn Transport> = stub.clone();
    ConnectorRegistry::new(
        transport,
        ExecutorConfig {
            inter_job_delay: Duration::ZERO,
            ..ExecutorConfig::default()
        },
    )
}

#[test]
fn lookups_return_the_same_connector() -> Result<(), String> {
    let registry = registry_with(&Arc::new(StubTransport::replying(200, "ok")));
    let first = registry.get_or_create("alpha");
    let second = registry.get_or_create("alpha");
    let other = registry.get_or_create("beta");

    if !first.ptr_eq(&second) || first != second {
        return Err("Expected the same connector for one tag".to_owned());
    }
    if first.ptr_eq(&other) {
        return Err("Different tags must not share a connector".to_owned());
    }
    if registry.tags() != ["alpha", "beta"] {
        return Err(format!("Unexpected tags: {:?}", registry.tags()));
    }
    if registry.connectors_created() != 2 {
        return Err(format!(
            "Unexpected creation count: {}",
            registry.connectors_created()
        ));
    }
    Ok(())
}

#[test]
fn evict_yields_a_fresh_connector() -> Result<(), String> {
    let registry = registry_with(&Arc::new(StubTransport::replying(200, "ok")));
    let before = registry.get_or_create("alpha");
    registry.evict("alpha");
    if registry.contains("alpha") {
        return Err("Tag should be gone after evict".to_owned());
    }
    registry.evict("missing");

    let after = registry.get_or_create("alpha");
    if before.ptr_eq(&after) {
        return Err("Expected a new connector after evict".to_owned());
    }
    Ok(())
}

#[test]
fn evict_all_refreshes_every_tag() -> Result<(), String> {
    let registry = registry_with(&Arc::new(StubTransport::replying(200, "ok")));
    let tags = ["a", "b", "c"];
    let before: Vec<_> = tags.iter().map(|tag| registry.get_or_create(tag)).collect();

    registry.evict_all();
    if !registry.is_empty() {
        return Err(format!("Registry not cleared: {:?}", registry.tags()));
    }

    for (tag, old) in tags.iter().zip(&before) {
        let fresh = registry.get_or_create(tag);
        if fresh.ptr_eq(old) {
            return Err(format!("Tag '{}' kept its old connector", tag));
        }
    }
    if registry.len() != 3 || registry.connectors_created() != 6 {
        return Err(format!(
            "Unexpected registry state: len={} created={}",
            registry.len(),
            registry.connectors_created()
        ));
    }
    Ok(())
}

#[test]
fn concurrent_lookups_create_one_connector() -> Result<(), String> {
    let registry = Arc::new(registry_with(&Arc::new(StubTransport::replying(200, "ok"))));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.get_or_create("same-tag"))
        })
        .collect();
    let mut connectors = Vec::new();
    for handle in handles {
        connectors.push(
            handle
                .join()
                .map_err(|_panic| "lookup thread panicked".to_owned())?,
        );
    }

    if registry.connectors_created() != 1 {
        return Err(format!(
            "Expected one creation, got {}",
            registry.connectors_created()
        ));
    }
    match connectors.as_slice() {
        [first, second] if first.ptr_eq(second) => Ok(()),
        _ => Err("Both lookups must observe the same connector".to_owned()),
    }
}

#[tokio::test]
async fn evict_releases_pending_callers() -> Result<(), String> {
    let stub = Arc::new(StubTransport::replying(200, "ok"));
    let transport: Arc<dyn Transport> = stub.clone();
    let registry = ConnectorRegistry::new(
        transport,
        ExecutorConfig {
            inter_job_delay: Duration::from_secs(60),
            ..ExecutorConfig::default()
        },
    );
    let connector = registry.get_or_create("slow");

    let pending = {
        let requester = connector.requester().clone();
        tokio::spawn(async move {
            requester
                .request(RequestParams::get("http://localhost/slow"))
                .await
        })
    };
    crate::transport::test_support::wait_until(
        || connector.executor().metrics_snapshot().cumulative_requested == 1,
        Duration::from_secs(5),
    )
    .await?;

    registry.evict("slow");
    let response = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .map_err(|err| format!("Caller hung after evict: {}", err))?
        .map_err(|err| format!("Caller task failed: {}", err))?;
    if !response.is_failure() {
        return Err(format!("Expected failure after evict: {:?}", response));
    }
    if connector.executor().is_running() {
        return Err("Evicted executor should be stopped".to_owned());
    }
    Ok(())
}

#[tokio::test]
async fn malformed_endpoint_fails_without_submitting() -> Result<(), String> {
    let stub = Arc::new(StubTransport::replying(200, "ok"));
    let registry = registry_with(&stub);
    let connector = registry.get_or_create("input");

    let response = connector
        .requester()
        .request(RequestParams::get("not a url"))
        .await;
    if response.error.is_none() || response.status_code.is_some() {
        return Err(format!("Expected input failure: {:?}", response));
    }
    if connector.executor().metrics_snapshot().cumulative_requested != 0 {
        return Err("Malformed endpoint must not be submitted".to_owned());
    }
    if !stub.calls().is_empty() {
        return Err("Transport must not be called".to_owned());
    }
    Ok(())
}

#[tokio::test]
async fn requester_routes_immediate_and_queued() -> Result<(), String> {
    let stub = Arc::new(StubTransport::replying(200, "{}"));
    let registry = registry_with(&stub);
    let requester = registry.get_or_create("routes").requester().clone();

    let queued = requester
        .request(
            RequestParams::new("post", "http://localhost/queued")
                .with_header("Content-Type", "application/json")
                .with_body("{\"a\":1}"),
        )
        .await;
    let immediate = requester
        .request(RequestParams::get("http://localhost/immediate").immediate(true))
        .await;
    if queued.status_code != Some(200) || immediate.status_code != Some(200) {
        return Err(format!("Unexpected responses: {:?} {:?}", queued, immediate));
    }

    let calls = stub.calls();
    let Some(post) = calls.first() else {
        return Err("Expected a queued call".to_owned());
    };
    if post.body.as_deref() != Some(b"{\"a\":1}".as_slice()) {
        return Err(format!("Body not forwarded: {:?}", post.body));
    }
    if post.method != reqwest::Method::POST {
        return Err(format!("Method not normalized: {}", post.method));
    }

    requester.init_transaction();
    let metrics = registry
        .get_or_create("routes")
        .executor()
        .metrics_snapshot();
    if metrics.cumulative_requested != 0 || metrics.cumulative_executed != 0 {
        return Err(format!("init_transaction did not reset: {:?}", metrics));
    }
    registry.evict_all();
    Ok(())
}

#[tokio::test]
async fn content_path_only_accepts_200() -> Result<(), String> {
    let ok = registry_with(&Arc::new(StubTransport::replying(200, "hello")));
    let requester = ok.get_or_create("content").requester().clone();
    let body = requester
        .load_content(RequestParams::get("http://localhost/").immediate(true))
        .await;
    if body.as_deref() != Some("hello") {
        return Err(format!("Unexpected content: {:?}", body));
    }

    let created = registry_with(&Arc::new(StubTransport::replying(201, "made")));
    let requester = created.get_or_create("content").requester().clone();
    let body = requester
        .load_content(RequestParams::get("http://localhost/").immediate(true))
        .await;
    if body.is_some() {
        return Err("Non-200 content must be discarded".to_owned());
    }
    let detailed = requester
        .load_detailed(RequestParams::get("http://localhost/").immediate(true))
        .await;
    if detailed.status_code != Some(201) || detailed.body.as_deref() != Some("made") {
        return Err(format!("Unexpected detailed response: {:?}", detailed));
    }
    Ok(())
}
