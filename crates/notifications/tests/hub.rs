use std::time::Duration;

use notifications::{Event, Hub, Payload};
use tokio::time::timeout;
use tokio_stream::StreamExt;
use uuid::Uuid;

fn budget_updated(plan_id: Uuid, spent_cents: i64) -> Payload {
    Payload::BudgetUpdated {
        plan_id,
        spent_cents,
        remaining_cents: 1000 - spent_cents,
    }
}

#[tokio::test]
async fn subscription_starts_with_connected_event() {
    let hub = Hub::new();
    let user = Uuid::new_v4();
    let mut sub = hub.subscribe(user);

    let event = timeout(Duration::from_millis(100), sub.recv())
        .await
        .expect("timeout")
        .expect("closed");
    assert_eq!(event.payload, Payload::Connected { user_id: user });
    assert_eq!(sub.user_id(), user);
}

#[tokio::test]
async fn publish_fans_out_to_every_channel_of_the_user_only() {
    let hub = Hub::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let mut tab = hub.subscribe(alice);
    let mut phone = hub.subscribe(alice);
    let mut other = hub.subscribe(bob);
    for sub in [&mut tab, &mut phone, &mut other] {
        assert_eq!(sub.try_recv().map(|e| e.kind()), Some("connected"));
    }

    let plan_id = Uuid::new_v4();
    assert_eq!(hub.publish(alice, budget_updated(plan_id, 200)), 2);

    for sub in [&mut tab, &mut phone] {
        let event = sub.try_recv().expect("event delivered");
        assert_eq!(event.payload, budget_updated(plan_id, 200));
    }
    assert!(other.try_recv().is_none());
}

#[tokio::test]
async fn full_channel_drops_without_blocking_the_publisher() {
    let hub = Hub::with_capacity(3);
    let user = Uuid::new_v4();
    let mut sub = hub.subscribe(user);
    let plan_id = Uuid::new_v4();

    // The connected event takes one slot.
    assert_eq!(hub.publish(user, budget_updated(plan_id, 1)), 1);
    assert_eq!(hub.publish(user, budget_updated(plan_id, 2)), 1);
    let overflow = timeout(Duration::from_millis(100), async {
        hub.publish(user, budget_updated(plan_id, 3))
    })
    .await
    .expect("publish blocked");
    assert_eq!(overflow, 0);

    let mut received = Vec::new();
    while let Some(event) = sub.try_recv() {
        received.push(event.payload);
    }
    assert_eq!(
        received,
        [
            Payload::Connected { user_id: user },
            budget_updated(plan_id, 1),
            budget_updated(plan_id, 2),
        ]
    );

    // Room again after draining.
    assert_eq!(hub.publish(user, budget_updated(plan_id, 4)), 1);
}

#[tokio::test]
async fn unsubscribe_is_idempotent_and_ends_the_stream() {
    let hub = Hub::new();
    let user = Uuid::new_v4();
    let mut sub = hub.subscribe(user);
    let handle = sub.handle();
    assert_eq!(hub.subscriber_count(user), 1);

    handle.unsubscribe();
    handle.unsubscribe();
    sub.unsubscribe();
    assert_eq!(hub.subscriber_count(user), 0);
    assert_eq!(hub.publish(user, budget_updated(Uuid::new_v4(), 1)), 0);

    // The buffered connected event is still readable, then the stream ends.
    let events: Vec<Event> = timeout(Duration::from_millis(100), (&mut sub).collect())
        .await
        .expect("stream did not end");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), "connected");

    drop(sub);
    handle.unsubscribe();
}

#[tokio::test]
async fn dropping_a_subscription_releases_its_channel() {
    let hub = Hub::new();
    let user = Uuid::new_v4();
    let kept = hub.subscribe(user);
    {
        let _short_lived = hub.subscribe(user);
        assert_eq!(hub.subscriber_count(user), 2);
    }
    assert_eq!(hub.subscriber_count(user), 1);
    drop(kept);
    assert_eq!(hub.subscriber_count(user), 0);
}

#[tokio::test]
async fn subscription_is_a_stream() {
    let hub = Hub::new();
    let user = Uuid::new_v4();
    let plan_id = Uuid::new_v4();
    let sub = hub.subscribe(user);

    let publisher = hub.clone();
    tokio::spawn(async move {
        publisher.publish(user, Payload::AiAdvices { plan_id, count: 3 });
    })
    .await
    .unwrap();

    let kinds: Vec<&str> = timeout(
        Duration::from_millis(100),
        sub.map(|event| event.kind()).take(2).collect(),
    )
    .await
    .expect("timeout");
    assert_eq!(kinds, ["connected", "ai_advices"]);
}

#[test]
fn event_wire_format() {
    let plan_id = Uuid::new_v4();
    let event = Event::now(Payload::BudgetUpdated {
        plan_id,
        spent_cents: 200_000,
        remaining_cents: 300_000,
    });

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "budget_updated");
    assert_eq!(json["data"]["plan_id"], plan_id.to_string());
    assert_eq!(json["data"]["spent_cents"], 200_000);
    assert_eq!(json["data"]["remaining_cents"], 300_000);
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    let connected = serde_json::to_value(Event::now(Payload::Connected { user_id: plan_id })).unwrap();
    assert_eq!(connected["type"], "connected");
    assert_eq!(connected["data"]["user_id"], plan_id.to_string());
}
