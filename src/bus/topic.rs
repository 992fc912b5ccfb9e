//! Single-topic broadcast channel and its subscriber stream.

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::debug;

/// One typed broadcast channel of the event bus.
///
/// Publishing delivers to every subscriber registered at that moment and
/// never blocks on any of them: each subscriber has a bounded ring, and a
/// subscriber that falls behind loses the oldest events rather than stalling
/// the producer. Subscribers registered after a publish do not see it - hot
/// stream, not a log.
///
/// Sends from one producer arrive at every subscriber in publish order;
/// interleaving across producers is unspecified.
#[derive(Debug)]
pub struct Topic<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> Topic<T> {
    /// Create a topic whose subscribers each buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Deliver `event` to every current subscriber.
    ///
    /// Returns the number of subscribers reached; zero subscribers is a
    /// normal condition, not an error.
    pub fn publish(&self, event: T) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Register a new subscriber.
    ///
    /// The stream yields events published after this call and ends when the
    /// topic (and every clone of it) is dropped.
    pub fn subscribe(&self) -> TopicStream<T> {
        TopicStream { inner: BroadcastStream::new(self.tx.subscribe()) }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pin_project! {
    /// Subscriber stream for one [`Topic`].
    ///
    /// A subscriber that lags far enough to overflow its ring skips the lost
    /// events and continues with the newest ones; the skip is logged, never
    /// surfaced as a stream error and never felt by the publisher.
    pub struct TopicStream<T> {
        #[pin]
        inner: BroadcastStream<T>,
    }
}

impl<T: Clone + Send + 'static> Stream for TopicStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(event)) => return Poll::Ready(Some(event)),
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    debug!(skipped, "subscriber lagged, dropping oldest events");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn delivers_to_all_current_subscribers() {
        let topic = Topic::new(8);
        let mut a = topic.subscribe();
        let mut b = topic.subscribe();

        assert_eq!(topic.publish(7u32), 2);
        assert_eq!(a.next().await, Some(7));
        assert_eq!(b.next().await, Some(7));
    }

    #[tokio::test]
    async fn no_replay_for_late_subscribers() {
        let topic = Topic::new(8);
        topic.publish(1u32);

        let mut late = topic.subscribe();
        topic.publish(2u32);
        assert_eq!(late.next().await, Some(2));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let topic = Topic::new(8);
        assert_eq!(topic.publish(1u32), 0);
    }

    #[tokio::test]
    async fn fifo_per_producer() {
        let topic = Topic::new(64);
        let mut sub = topic.subscribe();
        for n in 0..10u32 {
            topic.publish(n);
        }
        for n in 0..10u32 {
            assert_eq!(sub.next().await, Some(n));
        }
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_oldest_without_blocking_publisher() {
        let topic = Topic::new(4);
        let mut slow = topic.subscribe();

        // Overflow the subscriber ring; publish never blocks
        for n in 0..20u32 {
            topic.publish(n);
        }

        // The stream resumes at the oldest retained event, not an error
        let first = slow.next().await.unwrap();
        assert_eq!(first, 16);
        assert_eq!(slow.next().await, Some(17));
    }

    #[tokio::test]
    async fn stream_ends_when_topic_drops() {
        let topic = Topic::new(4);
        let mut sub = topic.subscribe();
        topic.publish(1u32);
        drop(topic);
        assert_eq!(sub.next().await, Some(1));
        assert_eq!(sub.next().await, None);
    }
}
