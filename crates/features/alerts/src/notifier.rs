use crate::error::AlertsError;
use crate::model::{AlertMethod, AlertTriggered};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Where a triggered alert is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Email { to: String },
    Sms { to: String },
}

/// Picks the delivery target for `event` and records the dispatch.
///
/// Returns `None` for sms alerts without a mobile number.
pub fn dispatch(event: &AlertTriggered) -> Option<Dispatch> {
    let alert = &event.alert;
    let target = match alert.method() {
        AlertMethod::Email => Dispatch::Email { to: event.email.clone() },
        AlertMethod::Sms => match alert.mobile_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => Dispatch::Sms { to: number.to_owned() },
            _ => {
                warn!(alert_id = %alert.id, "SMS alert has no mobile number; skipping");
                return None;
            },
        },
    };

    match &target {
        Dispatch::Email { to } => info!(
            alert_id = %alert.id,
            alert_name = %alert.alert_name,
            aqhi = event.aqhi,
            threshold = alert.threshold,
            to = %to,
            "Dispatching email alert"
        ),
        Dispatch::Sms { to } => info!(
            alert_id = %alert.id,
            alert_name = %alert.alert_name,
            aqhi = event.aqhi,
            threshold = alert.threshold,
            to = %to,
            "Dispatching SMS alert"
        ),
    }

    Some(target)
}

/// Handle to the background dispatch task.
///
/// Events travel over a bounded queue and [`Notifier::notify`] waits for room, so none are
/// dropped. The task stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    queue: mpsc::Sender<AlertTriggered>,
}

impl Notifier {
    /// Spawns the dispatch task. Its handle resolves to the number of events processed.
    ///
    /// # Errors
    /// Fails when `capacity` is zero.
    pub fn spawn(capacity: usize) -> Result<(Self, JoinHandle<usize>), AlertsError> {
        if capacity == 0 {
            return Err(AlertsError::Internal {
                message: "notifier capacity must be greater than zero".into(),
                context: None,
            });
        }

        let (queue, mut pending) = mpsc::channel::<AlertTriggered>(capacity);
        let task = tokio::spawn(async move {
            let mut processed = 0_usize;
            while let Some(event) = pending.recv().await {
                dispatch(&event);
                processed += 1;
            }
            debug!(processed, "Alert notifier stopped");
            processed
        });

        Ok((Self { queue }, task))
    }

    /// Queues `event` for dispatch, waiting while the queue is full.
    ///
    /// # Errors
    /// Fails if the dispatch task is gone.
    pub async fn notify(&self, event: AlertTriggered) -> Result<(), AlertsError> {
        self.queue.send(event).await.map_err(|_| AlertsError::Internal {
            message: "alert notifier has stopped".into(),
            context: Some("Queueing AlertTriggered".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alert, Location};
    use chrono::Utc;

    fn event(method: Option<AlertMethod>, mobile: Option<&str>) -> AlertTriggered {
        AlertTriggered {
            alert: Alert {
                id: "a1".to_owned(),
                owner: "u1".to_owned(),
                alert_name: "Smoke".to_owned(),
                threshold: 7,
                alert_method: method,
                mobile_number: mobile.map(str::to_owned),
                is_active: true,
                created_at: Utc::now(),
                location: Location { latitude: 53.5, longitude: -113.5 },
            },
            aqhi: 8,
            email: "ada@example.com".to_owned(),
        }
    }

    #[test]
    fn missing_method_goes_to_email() {
        assert_eq!(
            dispatch(&event(None, None)),
            Some(Dispatch::Email { to: "ada@example.com".to_owned() })
        );
    }

    #[test]
    fn sms_uses_mobile_number() {
        assert_eq!(
            dispatch(&event(Some(AlertMethod::Sms), Some(" +17805550100 "))),
            Some(Dispatch::Sms { to: "+17805550100".to_owned() })
        );
        assert_eq!(dispatch(&event(Some(AlertMethod::Sms), None)), None);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(Notifier::spawn(0), Err(AlertsError::Internal { .. })));
    }

    #[tokio::test]
    async fn bursts_beyond_capacity_are_all_dispatched() {
        let (notifier, task) = Notifier::spawn(4).unwrap();

        for _ in 0..300 {
            notifier.notify(event(None, None)).await.unwrap();
        }
        drop(notifier);

        let processed =
            tokio::time::timeout(std::time::Duration::from_secs(5), task).await.unwrap().unwrap();
        assert_eq!(processed, 300);
    }

    #[tokio::test]
    async fn notify_fails_once_task_is_gone() {
        let (notifier, task) = Notifier::spawn(1).unwrap();
        task.abort();
        let _ = task.await;

        let err = notifier.notify(event(None, None)).await.unwrap_err();
        assert!(matches!(err, AlertsError::Internal { .. }));
    }
}
