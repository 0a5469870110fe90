use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use volley::{
    BatchDispatcher, BoardEvent, HarnessConfig, HttpResponse, MockHttpClient, Presentation,
    SingleShot, SlotBoard, SlotStateFilter, VolleyError, render,
};

/// Script the mock so the demo batch behaves like the probed server: CGI
/// scripts spin for the requested seconds, static files answer quickly.
fn script_demo_server(mock: &MockHttpClient) {
    mock.add_delayed_response(
        "GET /spin.cgi?10",
        Ok(HttpResponse::new(200, "<h2>Spun for 10 seconds</h2>").with_content_type("text/html")),
        Duration::from_secs(10),
    );
    mock.add_delayed_response(
        "GET /spin.cgi?5",
        Ok(HttpResponse::new(200, "<h2>Spun for 5 seconds</h2>").with_content_type("text/html")),
        Duration::from_secs(5),
    );
    for _ in 0..2 {
        mock.add_delayed_response(
            "GET /another.html",
            Ok(HttpResponse::new(200, "<p>another page</p>").with_content_type("text/html")),
            Duration::from_millis(30),
        );
    }
    mock.add_delayed_response(
        "GET /file.txt",
        Ok(HttpResponse::new(200, "plain text file\n").with_content_type("text/plain")),
        Duration::from_millis(20),
    );
    mock.add_delayed_response(
        "GET /no_existe.html",
        Ok(HttpResponse::new(404, "<h1>404 Not Found</h1>").with_content_type("text/html")),
        Duration::from_millis(10),
    );
}

fn finalized_positions(events: &mut tokio::sync::broadcast::Receiver<BoardEvent>) -> Vec<usize> {
    let mut positions = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let BoardEvent::Updated { position, .. } = event {
            positions.push(position);
        }
    }
    positions
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_demo_batch_end_to_end() {
    let config = HarnessConfig::default();
    let mock = Arc::new(MockHttpClient::new());
    script_demo_server(&mock);

    let board = Arc::new(SlotBoard::new());
    let mut events = board.subscribe();
    let dispatcher = BatchDispatcher::new(mock.clone(), board.clone());

    let launch = dispatcher.launch_batch(config.demo_batch.clone());
    assert_eq!(launch.len(), 6);

    // Every slot is visible and pending before any response arrives
    let pending = board.snapshot();
    assert!(pending.iter().all(|slot| slot.is_pending()));
    assert!(render::render_slot(&pending[0]).starts_with("[pending] Slow (CGI) /spin.cgi?10"));

    // After six seconds only the slow request is still outstanding
    tokio::time::sleep(Duration::from_secs(6)).await;
    let midway = board.snapshot();
    assert!(midway[0].is_pending());
    assert!(midway[1..].iter().all(|slot| slot.is_terminal()));
    assert_eq!(dispatcher.in_flight(), 1);

    dispatcher.wait_idle().await;

    let order = finalized_positions(&mut events);
    assert_eq!(order.len(), 6);
    assert_eq!(order[0], 4, "the 404 answers first");
    assert_eq!(order[4], 3);
    assert_eq!(order[5], 0);

    let slots = board.snapshot();
    let labels: Vec<_> = slots.iter().map(|s| s.descriptor().label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Slow (CGI)",
            "Fast (HTML)",
            "Fast (Text)",
            "Medium (CGI)",
            "Fast (404 Error)",
            "Fast (HTML)",
        ]
    );

    assert_eq!(slots[4].state(), SlotStateFilter::HttpError);
    assert_eq!(
        render::body(&slots[4]),
        "Error 404: Not Found\n\n<h1>404 Not Found</h1>"
    );
    assert_eq!(slots[2].body().and_then(|b| b.as_text()), Some("plain text file\n"));
    assert!(render::render_slot(&slots[0]).starts_with("[ok] Slow (CGI) /spin.cgi?10 (Completed at "));

    let stats = dispatcher.stats();
    assert_eq!(stats.requests_launched, 6);
    assert_eq!(stats.requests_succeeded, 5);
    assert_eq!(stats.requests_http_errors, 1);
    assert_eq!(stats.requests_network_errors, 0);
    assert_eq!(stats.updates_discarded, 0);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_reset_mid_flight_then_relaunch() {
    let config = HarnessConfig::default();
    let mock = Arc::new(MockHttpClient::new());
    script_demo_server(&mock);
    script_demo_server(&mock);

    let board = Arc::new(SlotBoard::new());
    let dispatcher = BatchDispatcher::new(mock.clone(), board.clone());

    let first = dispatcher.launch_batch(config.demo_batch.clone());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(dispatcher.in_flight(), 2);

    dispatcher.reset_batch();
    assert!(board.snapshot().is_empty());

    let second = dispatcher.launch_batch(config.demo_batch.clone());
    assert!(second.generation > first.generation);
    dispatcher.wait_idle().await;

    // The slow and medium requests of the first batch finished into a cleared board
    let stats = dispatcher.stats();
    assert_eq!(stats.requests_launched, 12);
    assert_eq!(stats.updates_discarded, 2);

    let slots = board.snapshot();
    assert_eq!(slots.len(), 6);
    let ids: Vec<_> = slots.iter().map(|s| s.id()).collect();
    let expected: Vec<_> = second.handles.iter().map(|h| h.id).collect();
    assert_eq!(ids, expected);
    assert!(slots.iter().all(|s| s.is_terminal()));
}

#[test_log::test(tokio::test)]
async fn test_network_errors_are_reported_per_slot() {
    let mock = Arc::new(MockHttpClient::new());
    mock.add_response("GET /up", Ok(HttpResponse::new(200, "fine")));
    mock.add_response(
        "GET /down",
        Err(VolleyError::Other(anyhow::anyhow!("error sending request: connection refused"))),
    );

    let board = Arc::new(SlotBoard::new());
    let dispatcher = BatchDispatcher::new(mock, board.clone());
    dispatcher.launch_batch(vec![
        "/up".parse().unwrap(),
        "/down,Unreachable".parse().unwrap(),
    ]);
    dispatcher.wait_idle().await;

    let slots = board.snapshot();
    assert_eq!(slots[0].state(), SlotStateFilter::Success);
    assert_eq!(slots[1].state(), SlotStateFilter::NetworkError);
    assert_eq!(slots[1].descriptor().label, "Unreachable");
    assert_eq!(
        render::body(&slots[1]),
        "Network error: error sending request: connection refused"
    );
    assert_eq!(slots[1].status_code(), None);
}

#[test_log::test(tokio::test)]
async fn test_board_events_describe_every_transition() {
    let mock = Arc::new(MockHttpClient::new());
    mock.add_response("GET /a", Ok(HttpResponse::new(200, "a")));
    mock.add_response("GET /b", Ok(HttpResponse::new(500, "b")));

    let board = Arc::new(SlotBoard::new());
    let mut events = board.subscribe();
    let dispatcher = BatchDispatcher::new(mock, board.clone());
    let launch = dispatcher.launch_batch(vec!["/a".parse().unwrap(), "/b".parse().unwrap()]);
    dispatcher.wait_idle().await;

    let mut created = 0;
    let mut updated: HashMap<usize, SlotStateFilter> = HashMap::new();
    let mut cleared = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            BoardEvent::Cleared { generation } => {
                assert_eq!(generation, launch.generation);
                cleared += 1;
            }
            BoardEvent::Created { slot, .. } => {
                assert!(slot.is_pending());
                created += 1;
            }
            BoardEvent::Updated { position, slot, .. } => {
                assert!(updated.insert(position, slot.state()).is_none());
            }
        }
    }

    assert_eq!(cleared, 1);
    assert_eq!(created, 2);
    assert_eq!(updated[&0], SlotStateFilter::Success);
    assert_eq!(updated[&1], SlotStateFilter::HttpError);
}

#[test_log::test(tokio::test)]
async fn test_single_shot_get_and_submit() {
    let mock = Arc::new(MockHttpClient::new());
    mock.add_response(
        "POST /spin.cgi?2",
        Ok(HttpResponse::new(200, "<pre>nombre=Luis</pre>").with_content_type("text/html")),
    );
    mock.add_response("GET /file.txt", Ok(HttpResponse::new(200, "text")));

    let single = SingleShot::new(mock.clone(), Arc::new(SlotBoard::new()), "/spin.cgi?2");
    let submitted = single.submit(&[("nombre", "Luis")]).await.unwrap();
    assert_eq!(submitted.body().and_then(|b| b.as_text()), Some("<pre>nombre=Luis</pre>"));

    let fetched = single.get("/file.txt").await;
    assert_eq!(fetched.state(), SlotStateFilter::Success);
    assert_eq!(single.presentation().snapshot().len(), 1);

    let calls = mock.get_calls();
    let methods: Vec<_> = calls.iter().map(|c| c.method.as_str()).collect();
    assert_eq!(methods, vec!["POST", "GET"]);
}
