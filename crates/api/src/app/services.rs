use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use sparekeep_core::UserId;
use sparekeep_events::{EventBus, EventEnvelope, InMemoryEventBus};
use sparekeep_infra::{
    DispatchError, InMemoryStore, NotifierError, PartStore, RequisitionDispatcher,
    RequisitionNotifier, StoreError,
};
use sparekeep_requisitions::{
    Notification, RequisitionCommand, RequisitionEvent, RequisitionSnapshot, SubmitRequisition,
    submission_notice,
};

use crate::config::ApiConfig;

pub type RequisitionBus = InMemoryEventBus<EventEnvelope<RequisitionEvent>>;

const NOTICE_MAX_RETRIES: u32 = 5;
const NOTICE_BASE_BACKOFF: Duration = Duration::from_millis(250);

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    /// Recipient; `None` reaches every connected user.
    pub user_id: Option<UserId>,
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Result of submitting one or more requisitions together.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedBatch {
    pub requisitions: Vec<RequisitionSnapshot>,
    pub notification: Option<Notification>,
}

#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn PartStore>,
    dispatcher: Arc<RequisitionDispatcher<Arc<RequisitionBus>>>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    pub fn store(&self) -> &Arc<dyn PartStore> {
        &self.store
    }

    pub fn dispatcher(&self) -> &RequisitionDispatcher<Arc<RequisitionBus>> {
        &self.dispatcher
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    /// Dispatch each submit command in order, then store one submission
    /// notice for the whole batch.
    ///
    /// Every command is validated before the first dispatch, so an invalid
    /// line rejects the whole batch. Commands dispatched before a store
    /// failure stay submitted. A notice that cannot be stored is logged and
    /// omitted from the result.
    pub async fn submit_requisitions(
        &self,
        commands: Vec<SubmitRequisition>,
        actor: UserId,
    ) -> Result<SubmittedBatch, DispatchError> {
        for cmd in &commands {
            cmd.validate()?;
        }

        let mut requisitions = Vec::with_capacity(commands.len());
        let mut submitted = Vec::with_capacity(commands.len());

        for cmd in commands {
            let id = cmd.requisition_id;
            let dispatched = self
                .dispatcher
                .dispatch(id, RequisitionCommand::Submit(cmd), actor)
                .await?;

            submitted.extend(dispatched.events.into_iter().filter_map(|e| match e {
                RequisitionEvent::Submitted(s) => Some(s),
                RequisitionEvent::Processed(_) => None,
            }));
            requisitions.push(dispatched.snapshot);
        }

        let notification = match submission_notice(&submitted) {
            Some(notice) => match self.store.insert_notification(notice.clone()).await {
                Ok(()) => {
                    broadcast_notification(&self.realtime_tx, &notice);
                    Some(notice)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to store submission notice");
                    None
                }
            },
            None => None,
        };

        Ok(SubmittedBatch {
            requisitions,
            notification,
        })
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    if config.use_persistent_stores {
        #[cfg(feature = "postgres")]
        {
            let store = build_persistent_store(config).await?;
            return Ok(services_with_store(store));
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    tracing::info!("using seeded in-memory store");
    Ok(services_with_store(Arc::new(InMemoryStore::seeded())))
}

#[cfg(feature = "postgres")]
async fn build_persistent_store(config: &ApiConfig) -> Result<Arc<dyn PartStore>, StoreError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;

    let store = sparekeep_infra::PostgresStore::connect(url).await?;
    store.migrate().await?;
    tracing::info!("using postgres store");
    Ok(Arc::new(store))
}

/// Wire the bus, dispatcher and background notifier around `store`.
///
/// Must be called from within a Tokio runtime.
pub fn services_with_store(store: Arc<dyn PartStore>) -> AppServices {
    let bus: Arc<RequisitionBus> = Arc::new(InMemoryEventBus::new());
    let dispatcher = Arc::new(RequisitionDispatcher::new(store.clone(), bus.clone()));
    let notifier = RequisitionNotifier::new(store.clone());

    // Realtime channel (SSE): lossy broadcast, user-filtered in handlers.
    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    // Background subscriber: bus -> notifier -> realtime. Ends when the
    // dispatcher (the last bus owner) is dropped.
    {
        let sub = bus.subscribe();
        let realtime_tx = realtime_tx.clone();
        let runtime = tokio::runtime::Handle::current();
        tokio::task::spawn_blocking(move || {
            while let Some(env) = sub.recv() {
                let _ = realtime_tx.send(RealtimeMessage {
                    user_id: None,
                    topic: "requisitions.updated".to_string(),
                    payload: serde_json::json!({
                        "kind": env.event_type(),
                        "requisition_id": env.aggregate_id().to_string(),
                        "sequence_number": env.sequence_number(),
                    }),
                });

                if let Some(notification) = apply_with_retry(&runtime, &notifier, &env) {
                    broadcast_notification(&realtime_tx, &notification);
                }
            }
        });
    }

    AppServices {
        store,
        dispatcher,
        realtime_tx,
    }
}

/// Store failures are retried with exponential backoff; anything else, or a
/// store that stays down, drops the notice.
fn apply_with_retry(
    runtime: &tokio::runtime::Handle,
    notifier: &RequisitionNotifier,
    env: &EventEnvelope<RequisitionEvent>,
) -> Option<Notification> {
    let mut attempt = 0;
    loop {
        match runtime.block_on(notifier.apply_envelope(env)) {
            Ok(notification) => return notification,
            Err(NotifierError::Store(e)) if attempt < NOTICE_MAX_RETRIES => {
                attempt += 1;
                let wait = backoff(NOTICE_BASE_BACKOFF, attempt);
                tracing::warn!(error = %e, attempt, wait_ms = wait.as_millis() as u64, "storing notice failed, retrying");
                std::thread::sleep(wait);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    requisition_id = %env.aggregate_id(),
                    sequence = env.sequence_number(),
                    "requisition notice dropped"
                );
                return None;
            }
        }
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // base * 2^(attempt-1), capped at ten seconds.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}

fn broadcast_notification(tx: &broadcast::Sender<RealtimeMessage>, notification: &Notification) {
    let payload = serde_json::to_value(notification).unwrap_or_else(|_| serde_json::json!({}));
    let _ = tx.send(RealtimeMessage {
        user_id: Some(notification.user_id),
        topic: "notifications.created".to_string(),
        payload,
    });
}

/// SSE stream of realtime messages addressed to `user_id` or to everyone.
pub fn user_sse_stream(
    services: Arc<AppServices>,
    user_id: UserId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.user_id.is_none_or(|u| u == user_id) => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff(base, 1), Duration::from_millis(250));
        assert_eq!(backoff(base, 3), Duration::from_secs(1));
        assert_eq!(backoff(base, 9), Duration::from_secs(10));
        assert_eq!(backoff(base, 40), Duration::from_secs(10));
    }
}
