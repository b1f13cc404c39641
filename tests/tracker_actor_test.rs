use drone_tracker::clients::mock::MockBackend;
use drone_tracker::clients::{ApiError, TrackerClient};
use drone_tracker::config::TrackerConfig;
use drone_tracker::model::{AuthToken, Coordinates, Order, OrderId, OrderStatus};
use drone_tracker::tracker_actor::{self, PollOutcome, TrackerError, TrackingSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Polls far apart, so only the first immediate poll and explicit `poll_now` calls hit
/// the backend during a test.
fn quiet_config() -> TrackerConfig {
    TrackerConfig {
        poll_interval: Duration::from_secs(3600),
        ..TrackerConfig::default()
    }
}

fn spawn_tracker(config: &TrackerConfig, mock: &Arc<MockBackend>) -> TrackerClient {
    let (actor, client) = tracker_actor::new(config, mock.clone());
    tokio::spawn(actor.run());
    client
}

fn token() -> AuthToken {
    AuthToken::new("customer-token")
}

fn order(id: u64, status: OrderStatus) -> Order {
    Order::new(id, status)
        .with_restaurant(10.0, 106.0)
        .with_delivery(10.1, 106.1)
        .with_drone("Falcon-7")
}

/// Signs in and waits until the first poll has been applied.
async fn sign_in_tracking(client: &TrackerClient) -> TrackingSnapshot {
    client.set_token(token()).await.unwrap();
    client
        .subscribe()
        .wait_for(|s| s.order.is_some())
        .await
        .unwrap()
        .clone()
}

async fn wait_arrival(client: &TrackerClient) -> TrackingSnapshot {
    client
        .subscribe()
        .wait_for(|s| s.simulation.has_arrived)
        .await
        .unwrap()
        .clone()
}

#[tokio::test(start_paused = true)]
async fn test_first_poll_resolves_route_and_snaps_to_origin() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(Order::new(5u64, OrderStatus::Preparing).with_restaurant(10.7769, 106.7009)));
    let client = spawn_tracker(&quiet_config(), &mock);

    let snapshot = sign_in_tracking(&client).await;
    let route = snapshot.route.unwrap();
    assert_eq!(route.origin, Coordinates::new(10.7769, 106.7009));
    assert!((route.destination.lat - 10.7869).abs() < 1e-9);
    assert!((route.destination.lng - 106.7109).abs() < 1e-9);
    assert_eq!(snapshot.simulation.position, Some(route.origin));
    assert!(!snapshot.simulation.is_running);
    assert!(snapshot.signed_in);
    assert_eq!(snapshot.revision, 1);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_flight_lands_exactly_on_destination() {
    let mock = Arc::new(MockBackend::new());
    let client = spawn_tracker(&quiet_config(), &mock);

    let started = Instant::now();
    let route = client
        .start_flight_between(Coordinates::new(10.0, 106.0), Coordinates::new(10.1, 106.1))
        .await
        .unwrap();
    assert_eq!(route.destination, Coordinates::new(10.1, 106.1));

    let snapshot = wait_arrival(&client).await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(10_100), "{elapsed:?}");

    assert_eq!(snapshot.simulation.position, Some(Coordinates::new(10.1, 106.1)));
    assert_eq!(snapshot.simulation.progress, 1.0);
    assert!(!snapshot.simulation.is_running);
    assert_eq!(snapshot.simulation.remaining, Duration::ZERO);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_restart_keeps_a_single_timer() {
    let mock = Arc::new(MockBackend::new());
    let client = spawn_tracker(&quiet_config(), &mock);
    let origin = Coordinates::new(10.0, 106.0);
    let destination = Coordinates::new(10.1, 106.1);

    client.start_flight_between(origin, destination).await.unwrap();
    tokio::time::sleep(Duration::from_millis(4_550)).await;
    let halfway = client.snapshot().await.unwrap();
    assert!(halfway.simulation.is_running);
    assert!((halfway.simulation.progress - 0.45).abs() < 1e-9);

    let restarted = Instant::now();
    client.start_flight_between(origin, destination).await.unwrap();
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.simulation.progress, 0.0);
    assert_eq!(snapshot.simulation.position, Some(origin));

    // Two timers would step twice as fast and land after five seconds.
    tokio::time::sleep(Duration::from_millis(5_050)).await;
    let midway = client.snapshot().await.unwrap();
    assert!((midway.simulation.progress - 0.5).abs() < 1e-9);

    wait_arrival(&client).await;
    assert!(restarted.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_returns_to_idle() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    let client = spawn_tracker(&quiet_config(), &mock);
    sign_in_tracking(&client).await;

    assert_eq!(client.cancel_flight().await, Ok(false));
    client.start_flight().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_050)).await;
    assert_eq!(client.cancel_flight().await, Ok(true));

    let snapshot = client.snapshot().await.unwrap();
    assert!(!snapshot.simulation.is_running);
    assert!(!snapshot.simulation.has_arrived);
    assert_eq!(snapshot.simulation.progress, 0.0);
    assert_eq!(snapshot.simulation.position, Some(Coordinates::new(10.0, 106.0)));

    // No timer left behind.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(client.snapshot().await.unwrap(), snapshot);
}

#[tokio::test(start_paused = true)]
async fn test_start_flight_needs_an_order() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order().return_ok(None);
    let client = spawn_tracker(&quiet_config(), &mock);

    assert_eq!(client.start_flight().await, Err(TrackerError::NoActiveOrder));

    client.set_token(token()).await.unwrap();
    while mock.current_order_calls() < 1 {
        tokio::task::yield_now().await;
    }
    assert_eq!(client.start_flight().await, Err(TrackerError::NoActiveOrder));
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_identical_poll_is_ignored() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(Order::new(5u64, OrderStatus::Preparing)));
    mock.expect_current_order()
        .return_ok(Some(Order::new(5u64, OrderStatus::Preparing).with_drone("Falcon-7")));
    let client = spawn_tracker(&quiet_config(), &mock);

    let before = sign_in_tracking(&client).await;
    let mut changes = client.subscribe();
    changes.borrow_and_update();

    assert_eq!(client.poll_now().await, Ok(PollOutcome::Unchanged));
    let after = client.snapshot().await.unwrap();
    assert_eq!(after, before);
    assert_eq!(after.order.unwrap().drone_name, None);
    assert!(!changes.has_changed().unwrap());
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_status_change_replaces_order() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::Preparing)));
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    let client = spawn_tracker(&quiet_config(), &mock);

    let before = sign_in_tracking(&client).await;
    assert_eq!(client.poll_now().await, Ok(PollOutcome::Replaced));

    let after = client.current();
    assert_eq!(after.order.unwrap().status, OrderStatus::OutForDelivery);
    assert_eq!(after.revision, before.revision + 1);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_poll_failure_keeps_state() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_current_order().return_err(ApiError::Status(500));
    mock.expect_current_order()
        .return_err(ApiError::Decode("expected value at line 1 column 1".into()));
    let client = spawn_tracker(&quiet_config(), &mock);

    let before = sign_in_tracking(&client).await;
    assert_eq!(client.poll_now().await, Ok(PollOutcome::Failed));
    assert_eq!(client.poll_now().await, Ok(PollOutcome::Failed));
    assert_eq!(client.snapshot().await.unwrap(), before);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_no_active_order_clears_state() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_current_order().return_ok(None);
    mock.expect_current_order().return_ok(None);
    let client = spawn_tracker(&quiet_config(), &mock);

    let before = sign_in_tracking(&client).await;
    client.start_flight().await.unwrap();

    assert_eq!(client.poll_now().await, Ok(PollOutcome::Cleared));
    let after = client.snapshot().await.unwrap();
    assert_eq!(after.order, None);
    assert_eq!(after.route, None);
    assert_eq!(after.simulation.position, None);
    assert!(!after.simulation.is_running);
    assert_eq!(after.revision, before.revision + 1);

    assert_eq!(client.poll_now().await, Ok(PollOutcome::Unchanged));
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_slow_poll_does_not_overwrite_newer_one() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::Preparing)));
    mock.expect_current_order()
        .with_delay(Duration::from_secs(2))
        .return_ok(Some(order(5, OrderStatus::Preparing)));
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    let client = spawn_tracker(&quiet_config(), &mock);
    sign_in_tracking(&client).await;

    let slow = tokio::spawn({
        let client = client.clone();
        async move { client.poll_now().await }
    });
    while mock.current_order_calls() < 2 {
        tokio::task::yield_now().await;
    }

    assert_eq!(client.poll_now().await, Ok(PollOutcome::Replaced));
    assert_eq!(slow.await.unwrap(), Ok(PollOutcome::Stale));

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.order.unwrap().status, OrderStatus::OutForDelivery);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_polls_on_interval_until_signed_out() {
    let mock = Arc::new(MockBackend::new());
    for _ in 0..3 {
        mock.expect_current_order()
            .return_ok(Some(order(5, OrderStatus::Preparing)));
    }
    let client = spawn_tracker(&TrackerConfig::default(), &mock);

    client.set_token(token()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(mock.current_order_calls(), 3);

    client.clear_token().await.unwrap();
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.order, None);
    assert!(!snapshot.signed_in);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.current_order_calls(), 3);
    assert_eq!(client.poll_now().await, Err(TrackerError::NotAuthenticated));
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_new_order_resets_simulation() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_current_order().return_ok(Some(
        Order::new(6u64, OrderStatus::Preparing)
            .with_restaurant(21.0285, 105.8542)
            .with_delivery(21.0333, 105.85),
    ));
    let client = spawn_tracker(&quiet_config(), &mock);
    sign_in_tracking(&client).await;

    client.start_flight().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_050)).await;
    assert!(client.snapshot().await.unwrap().simulation.is_running);

    assert_eq!(client.poll_now().await, Ok(PollOutcome::Replaced));
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.order.as_ref().unwrap().order_id, OrderId::from(6));
    assert!(!snapshot.simulation.is_running);
    assert_eq!(snapshot.simulation.progress, 0.0);
    assert_eq!(snapshot.simulation.position, Some(Coordinates::new(21.0285, 105.8542)));

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(client.snapshot().await.unwrap(), snapshot);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_complete_after_arrival() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_complete(5u64).return_ok(());
    let client = spawn_tracker(&quiet_config(), &mock);
    let before = sign_in_tracking(&client).await;

    client.start_flight().await.unwrap();
    wait_arrival(&client).await;

    let delivered = client.complete(OrderId::from(5)).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.order.unwrap().status, OrderStatus::Delivered);
    assert!(!snapshot.simulation.has_arrived);
    assert!(!snapshot.simulation.is_running);
    assert_eq!(snapshot.simulation.position, Some(Coordinates::new(10.1, 106.1)));
    assert_eq!(snapshot.revision, before.revision + 1);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_failed_completion_changes_nothing() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_complete(5u64)
        .return_err(ApiError::Http("connection refused".into()));
    let client = spawn_tracker(&quiet_config(), &mock);
    sign_in_tracking(&client).await;

    client.start_flight().await.unwrap();
    let arrived = wait_arrival(&client).await;

    let result = client.complete(OrderId::from(5)).await;
    assert_eq!(
        result,
        Err(TrackerError::Api(ApiError::Http("connection refused".into())))
    );

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot, arrived);
    assert_eq!(snapshot.order.unwrap().status, OrderStatus::OutForDelivery);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_complete_checks_the_tracked_order() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    let client = spawn_tracker(&quiet_config(), &mock);

    assert_eq!(
        client.complete(OrderId::from(5)).await,
        Err(TrackerError::NotAuthenticated)
    );

    sign_in_tracking(&client).await;
    assert_eq!(
        client.complete(OrderId::from(9)).await,
        Err(TrackerError::NotActiveOrder(OrderId::from(9)))
    );
    assert_eq!(mock.complete_calls(), 0);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_switching_account_starts_from_scratch() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_current_order().return_ok(None);
    let client = spawn_tracker(&quiet_config(), &mock);
    sign_in_tracking(&client).await;

    client.set_token(AuthToken::new("other-customer")).await.unwrap();
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.order, None);
    assert!(snapshot.signed_in);

    while mock.current_order_calls() < 2 {
        tokio::task::yield_now().await;
    }
    mock.verify();
}

#[tokio::test]
async fn test_client_fails_once_actor_is_gone() {
    let mock = Arc::new(MockBackend::new());
    let (actor, client) = tracker_actor::new(&quiet_config(), mock);
    drop(actor);

    assert!(matches!(
        client.snapshot().await,
        Err(TrackerError::Framework(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_delivered_by_server_ends_flight() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::Delivered)));
    let client = spawn_tracker(&quiet_config(), &mock);
    sign_in_tracking(&client).await;

    client.start_flight().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_050)).await;

    assert_eq!(client.poll_now().await, Ok(PollOutcome::Replaced));
    let snapshot = client.snapshot().await.unwrap();
    assert!(!snapshot.simulation.is_running);
    assert!(!snapshot.simulation.has_arrived);
    assert_eq!(snapshot.simulation.position, Some(Coordinates::new(10.1, 106.1)));
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_completion_discards_older_poll() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_current_order()
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_current_order()
        .with_delay(Duration::from_secs(3))
        .return_ok(Some(order(5, OrderStatus::OutForDelivery)));
    mock.expect_complete(5u64).return_ok(());
    let client = spawn_tracker(&quiet_config(), &mock);
    sign_in_tracking(&client).await;

    let slow = tokio::spawn({
        let client = client.clone();
        async move { client.poll_now().await }
    });
    while mock.current_order_calls() < 2 {
        tokio::task::yield_now().await;
    }

    let delivered = client.complete(OrderId::from(5)).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    // The poll was sent before the acknowledgement and still says out_for_delivery.
    assert_eq!(slow.await.unwrap(), Ok(PollOutcome::Stale));
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.order.unwrap().status, OrderStatus::Delivered);
    assert_eq!(snapshot.simulation.position, Some(Coordinates::new(10.1, 106.1)));
    mock.verify();
}
