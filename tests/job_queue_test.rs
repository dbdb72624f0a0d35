use std::sync::Arc;
use std::time::Duration;

use listenbox::application::services::{JobQueue, OverflowPolicy, QueueError};
use listenbox::domain::JobId;

#[tokio::test]
async fn given_ids_when_dequeuing_then_fifo_order() {
    let queue = JobQueue::new(4, OverflowPolicy::Block);
    let ids = [JobId::new(), JobId::new(), JobId::new()];
    for id in ids {
        queue.enqueue(id).await.unwrap();
    }

    for id in ids {
        assert_eq!(queue.dequeue().await, Some(id));
    }
    assert!(queue.is_empty());
}

#[tokio::test]
async fn given_full_drop_oldest_queue_when_enqueuing_then_oldest_is_evicted() {
    let queue = JobQueue::new(2, OverflowPolicy::DropOldest);
    let (a, b, c) = (JobId::new(), JobId::new(), JobId::new());

    assert_eq!(queue.enqueue(a).await, Ok(None));
    assert_eq!(queue.enqueue(b).await, Ok(None));
    assert_eq!(queue.enqueue(c).await, Ok(Some(a)));

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dequeue().await, Some(b));
    assert_eq!(queue.dequeue().await, Some(c));
}

#[tokio::test]
async fn given_full_blocking_queue_when_enqueuing_then_waits_for_dequeue() {
    let queue = Arc::new(JobQueue::new(1, OverflowPolicy::Block));
    let (a, b) = (JobId::new(), JobId::new());
    queue.enqueue(a).await.unwrap();

    let producer = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.enqueue(b).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!producer.is_finished());
    assert_eq!(queue.len(), 1);

    assert_eq!(queue.dequeue().await, Some(a));
    let outcome = tokio::time::timeout(Duration::from_secs(1), producer)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, Ok(None));
    assert_eq!(queue.dequeue().await, Some(b));
}

#[tokio::test]
async fn given_waiting_consumer_when_enqueuing_then_consumer_wakes() {
    let queue = Arc::new(JobQueue::new(1, OverflowPolicy::Block));
    let consumer = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.dequeue().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let id = JobId::new();
    queue.enqueue(id).await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(1), consumer)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, Some(id));
}

#[tokio::test]
async fn given_closed_queue_when_used_then_drains_then_reports_closed() {
    let queue = JobQueue::new(2, OverflowPolicy::Block);
    let id = JobId::new();
    queue.enqueue(id).await.unwrap();

    queue.close();

    assert_eq!(queue.enqueue(JobId::new()).await, Err(QueueError::Closed));
    assert_eq!(queue.dequeue().await, Some(id));
    assert_eq!(queue.dequeue().await, None);
}

#[test]
fn given_zero_capacity_when_creating_then_capacity_is_one() {
    let queue = JobQueue::new(0, OverflowPolicy::DropOldest);
    assert_eq!(queue.capacity(), 1);
    assert_eq!(queue.policy(), OverflowPolicy::DropOldest);
}
