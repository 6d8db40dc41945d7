// Event router - Decodes inbound frames and applies them to the dashboard state
use crate::domain::device::{CONNECTED_STATE, ControlState, DeviceStatus, StatusPayload};
use crate::domain::error::TelemetryError;
use crate::domain::events::TelemetryEvent;
use crate::domain::view::LiveState;
use crate::domain::window::SampleWindow;
use std::time::Instant;

/// State an event may touch. `window` is `None` when the current view
/// has no live window to feed.
pub struct RouteContext<'a> {
    pub window: Option<&'a mut SampleWindow>,
    pub live: &'a mut LiveState,
    pub now: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Sample,
    Status,
    /// `notify` is set when a cycle ended on its own and the operator
    /// should be told.
    Progress { notify: bool },
}

#[derive(Debug, Clone)]
pub struct EventRouter {
    user_stop_marker: String,
}

impl EventRouter {
    /// `user_stop_marker` is matched case-insensitively against the status
    /// of final cycle events to recognise operator-initiated stops.
    pub fn new(user_stop_marker: &str) -> Self {
        Self {
            user_stop_marker: user_stop_marker.to_lowercase(),
        }
    }

    pub fn route(&self, frame: &str, ctx: RouteContext<'_>) -> Result<Routed, TelemetryError> {
        let event = TelemetryEvent::decode(frame)?;
        tracing::trace!(kind = event.kind(), "routing event");
        self.dispatch(event, ctx)
    }

    pub fn dispatch(
        &self,
        event: TelemetryEvent,
        ctx: RouteContext<'_>,
    ) -> Result<Routed, TelemetryError> {
        match event {
            TelemetryEvent::Sample(input) => {
                let window = ctx.window.ok_or(TelemetryError::WindowUninitialized)?;
                window.tick(input)?;
                Ok(Routed::Sample)
            }
            TelemetryEvent::Status(payload) => {
                reconcile_status(ctx.live, payload);
                Ok(Routed::Status)
            }
            TelemetryEvent::Progress(payload) => {
                let is_final = payload.is_final;
                let change = ctx.live.cycle.apply(payload, ctx.now);
                let status = ctx.live.cycle.status.as_deref().unwrap_or_default();
                let notify = is_final && !self.is_user_stop(status);

                tracing::debug!(
                    status,
                    is_final,
                    runtime_started = change.runtime_started,
                    runtime_stopped = change.runtime_stopped,
                    notify,
                    "cycle progress"
                );
                Ok(Routed::Progress { notify })
            }
        }
    }

    fn is_user_stop(&self, status: &str) -> bool {
        !self.user_stop_marker.is_empty()
            && status.to_lowercase().contains(&self.user_stop_marker)
    }
}

fn reconcile_status(live: &mut LiveState, payload: StatusPayload) {
    if payload.state != CONNECTED_STATE {
        live.device = DeviceStatus::offline(payload.state);
        live.controls = ControlState::disabled();
        return;
    }
    live.device = DeviceStatus::from_payload(payload);
    live.controls = ControlState::for_device(&live.device);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const CONNECTED_IDLE: &str =
        r#"{"Type":"state","Data":{"State":"Connected","ChargeState":"Idle","Voltage":1234,"Firmware":"1.0"}}"#;

    fn cycle(status: &str, is_final: bool) -> String {
        serde_json::json!({
            "Type": "cycle",
            "Data": {"Type": "Charge", "Target": 1400, "Status": status, "Final": is_final}
        })
        .to_string()
    }

    fn route(
        router: &EventRouter,
        frame: &str,
        window: Option<&mut SampleWindow>,
        live: &mut LiveState,
        now: Instant,
    ) -> Result<Routed, TelemetryError> {
        router.route(frame, RouteContext { window, live, now })
    }

    #[test]
    fn test_ticker_feeds_window() {
        let router = EventRouter::new("stopped");
        let mut live = LiveState::default();
        let mut window = SampleWindow::with_seed(1, 3, 0.0, 15.0).unwrap();
        let now = Instant::now();

        let routed = route(&router, r#"{"Type":"ticker","Data":1250}"#, Some(&mut window), &mut live, now);
        assert_eq!(routed, Ok(Routed::Sample));
        assert_eq!(window.latest(), Some(&vec![1250.0]));

        let routed = route(&router, r#"{"Type":"ticker","Data":null}"#, Some(&mut window), &mut live, now);
        assert_eq!(routed, Err(TelemetryError::NoData));
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_ticker_without_window_is_dropped() {
        let router = EventRouter::new("stopped");
        let mut live = LiveState::default();
        let routed = route(&router, r#"{"Type":"ticker","Data":1250}"#, None, &mut live, Instant::now());
        assert_eq!(routed, Err(TelemetryError::WindowUninitialized));
    }

    #[test]
    fn test_status_reconciliation() {
        let router = EventRouter::new("stopped");
        let mut live = LiveState::default();
        let now = Instant::now();

        route(&router, CONNECTED_IDLE, None, &mut live, now).unwrap();
        assert_eq!(live.device.voltage, vec![1234.0]);
        assert!(live.controls.start_enabled);
        assert!(!live.controls.stop_enabled);

        route(
            &router,
            r#"{"Type":"state","Data":{"State":"ReadError","ChargeState":"Charging","Voltage":999}}"#,
            None,
            &mut live,
            now,
        )
        .unwrap();
        assert_eq!(live.device.state.as_deref(), Some("ReadError"));
        assert!(live.device.voltage.is_empty());
        assert!(live.device.charge_state.is_none());
        assert_eq!(live.controls, ControlState::disabled());
    }

    #[test]
    fn test_final_cycle_stops_single_counter_and_notifies() {
        let router = EventRouter::new("stopped");
        let mut live = LiveState::default();
        let t0 = Instant::now();

        assert_eq!(
            route(&router, &cycle("Started...", false), None, &mut live, t0),
            Ok(Routed::Progress { notify: false })
        );
        route(&router, &cycle("Charging", false), None, &mut live, t0 + Duration::from_secs(30)).unwrap();
        assert!(live.cycle.runtime.is_running());

        assert_eq!(
            route(&router, &cycle("Target voltage reached", true), None, &mut live, t0 + Duration::from_secs(60)),
            Ok(Routed::Progress { notify: true })
        );
        assert!(!live.cycle.runtime.is_running());
        assert_eq!(
            live.cycle.runtime.elapsed(t0 + Duration::from_secs(600)),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_user_stop_is_silent() {
        let router = EventRouter::new("stopped");
        let mut live = LiveState::default();
        let t0 = Instant::now();

        route(&router, &cycle("Started...", false), None, &mut live, t0).unwrap();
        assert_eq!(
            route(&router, &cycle("Stopped by user", true), None, &mut live, t0),
            Ok(Routed::Progress { notify: false })
        );
        assert!(!live.cycle.runtime.is_running());
    }

    #[test]
    fn test_unknown_and_malformed_frames() {
        let router = EventRouter::new("stopped");
        let mut live = LiveState::default();
        let now = Instant::now();

        assert_eq!(
            route(&router, r#"{"Type":"log","Data":"hi"}"#, None, &mut live, now),
            Err(TelemetryError::UnrecognizedEvent("log".to_string()))
        );
        assert!(matches!(
            route(&router, "{", None, &mut live, now),
            Err(TelemetryError::Decode(_))
        ));
        assert_eq!(live.device, DeviceStatus::unknown());
    }
}
