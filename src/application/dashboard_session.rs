// Dashboard session - Single owner of the live-telemetry state
use crate::application::connection::{ChannelEvent, ConnectionController, ConnectionUpdate};
use crate::application::event_router::{EventRouter, RouteContext, Routed};
use crate::application::history_repository::HistoryRepository;
use crate::application::notifier::CompletionNotifier;
use crate::application::transport::FrameTransport;
use crate::domain::device::ControlState;
use crate::domain::downsample;
use crate::domain::error::TelemetryError;
use crate::domain::history::{MeasureLog, SessionLog, SessionSummary};
use crate::domain::sample::{Reading, SampleInput};
use crate::domain::time_axis::{self, AxisMode};
use crate::domain::view::{ChartView, ConnectionView, DashboardView, LiveState};
use crate::domain::window::{SampleWindow, WindowSeed};
use crate::infrastructure::config::{DashboardConfig, WindowSettings};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Operator requests handled by the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Reconnect { address: Option<String> },
    ShowLive,
    /// Load a recorded cycle by name, or the last one when `None`.
    LoadSession { name: Option<String> },
    /// Drop the channel and reset the live fields.
    Close,
}

enum ViewMode {
    Live,
    History(SessionSummary),
}

/// Result of a background history fetch, tagged with the view request
/// that started it.
enum FetchOutcome {
    LiveLog {
        request: u64,
        result: anyhow::Result<MeasureLog>,
    },
    Session {
        request: u64,
        name: Option<String>,
        result: anyhow::Result<SessionLog>,
    },
}

impl FetchOutcome {
    fn request(&self) -> u64 {
        match self {
            FetchOutcome::LiveLog { request, .. } | FetchOutcome::Session { request, .. } => *request,
        }
    }
}

pub struct DashboardSession {
    controller: ConnectionController,
    router: EventRouter,
    history: Arc<dyn HistoryRepository>,
    notifier: Arc<dyn CompletionNotifier>,
    window_settings: WindowSettings,
    window: Option<SampleWindow>,
    mode: ViewMode,
    live: LiveState,
    /// Live ticks pushed since the live window was last rebuilt.
    live_ticks: usize,
    request: u64,
    pending_fetch: Option<JoinHandle<()>>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    fetch_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    publisher: watch::Sender<DashboardView>,
}

/// Wall clock for the runtime counter; follows tokio's clock so paused
/// test time drives it too.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl DashboardSession {
    pub fn new(
        config: &DashboardConfig,
        transport: Arc<dyn FrameTransport>,
        history: Arc<dyn HistoryRepository>,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        let address = config.server.address.clone();
        let (publisher, _) = watch::channel(DashboardView::new(address.clone()));
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        Self {
            controller: ConnectionController::new(transport, config.connection.clone(), address),
            router: EventRouter::new(&config.notify.user_stop_marker),
            history,
            notifier,
            window_settings: config.window.clone(),
            window: None,
            mode: ViewMode::Live,
            live: LiveState::default(),
            live_ticks: 0,
            request: 0,
            pending_fetch: None,
            fetch_tx,
            fetch_rx,
            publisher,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.publisher.subscribe()
    }

    /// Drive the session until the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        self.reconnect(None);
        self.show_live();

        let mut runtime_tick = tokio::time::interval(Duration::from_secs(1));
        runtime_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = self.controller.next_event() => self.on_channel_event(event),
                Some(outcome) = self.fetch_rx.recv() => self.on_fetch(outcome),
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                _ = runtime_tick.tick(), if self.live.cycle.runtime.is_running() => self.publish(),
            }
        }

        self.cancel_fetch();
        self.controller.close();
        tracing::info!("dashboard session stopped");
    }

    fn on_command(&mut self, command: SessionCommand) {
        tracing::debug!(?command, "operator command");
        match command {
            SessionCommand::Reconnect { address } => self.reconnect(address),
            SessionCommand::ShowLive => self.show_live(),
            SessionCommand::LoadSession { name } => self.load_session(name),
            SessionCommand::Close => {
                self.controller.close();
                self.live.clear();
                self.publish();
            }
        }
    }

    fn reconnect(&mut self, address: Option<String>) {
        match self.controller.open(address) {
            Ok(attempt) => {
                self.live.controls = ControlState::disabled();
                tracing::debug!(attempt, "reconnect requested");
            }
            Err(e) => tracing::warn!(error = %e, "reconnect refused"),
        }
        self.publish();
    }

    fn on_channel_event(&mut self, event: ChannelEvent) {
        match self.controller.handle(event) {
            ConnectionUpdate::Connected | ConnectionUpdate::ReconnectPrompt => {}
            ConnectionUpdate::Frame(text) => self.route_frame(&text),
            ConnectionUpdate::Disconnected(reason) => {
                tracing::warn!(%reason, "lost connection to server");
                self.live.clear();
            }
            ConnectionUpdate::Ignored => return,
        }
        self.publish();
    }

    fn route_frame(&mut self, frame: &str) {
        let window = match self.mode {
            ViewMode::Live => self.window.as_mut(),
            ViewMode::History(_) => None,
        };
        let ctx = RouteContext {
            window,
            live: &mut self.live,
            now: now(),
        };

        match self.router.route(frame, ctx) {
            Ok(Routed::Sample) => self.live_ticks += 1,
            Ok(Routed::Progress { notify: true }) => {
                tracing::info!(status = ?self.live.cycle.status, "cycle finished");
                self.notifier.cycle_finished(&self.live.cycle);
            }
            Ok(_) => {}
            Err(TelemetryError::NoData) => tracing::debug!("ticker without a reading"),
            Err(e) => tracing::warn!(error = %e, "dropping frame"),
        }
    }

    /// Supersede any pending fetch and return the id of a new view request.
    fn begin_request(&mut self) -> u64 {
        self.cancel_fetch();
        self.request += 1;
        self.request
    }

    fn cancel_fetch(&mut self) {
        if let Some(fetch) = self.pending_fetch.take() {
            fetch.abort();
        }
    }

    /// Rebuild the live window from the seed value and switch the view to
    /// it. With a single channel the server's live log is fetched in the
    /// background to back-fill the window.
    fn show_live(&mut self) {
        let request = self.begin_request();
        let settings = &self.window_settings;
        self.window = match SampleWindow::initialize(
            settings.channels,
            settings.live_capacity,
            WindowSeed::Value(settings.seed_value),
            settings.live_interval_seconds,
        ) {
            Ok(window) => Some(window),
            Err(e) => {
                tracing::error!(error = %e, "couldn't initialize live window");
                None
            }
        };
        self.mode = ViewMode::Live;
        self.live_ticks = 0;

        if settings.channels == 1 && self.window.is_some() {
            let history = self.history.clone();
            let address = self.controller.address().to_string();
            let tx = self.fetch_tx.clone();
            self.pending_fetch = Some(tokio::spawn(async move {
                let result = history.fetch_live_data(&address).await;
                let _ = tx.send(FetchOutcome::LiveLog { request, result });
            }));
        }
        self.publish();
    }

    fn load_session(&mut self, name: Option<String>) {
        let request = self.begin_request();
        let history = self.history.clone();
        let address = self.controller.address().to_string();
        let tx = self.fetch_tx.clone();
        self.pending_fetch = Some(tokio::spawn(async move {
            let result = match &name {
                Some(name) => history.fetch_session(&address, name).await,
                None => history.fetch_last_session(&address).await,
            };
            let _ = tx.send(FetchOutcome::Session {
                request,
                name,
                result,
            });
        }));
    }

    fn on_fetch(&mut self, outcome: FetchOutcome) {
        if outcome.request() != self.request {
            tracing::debug!(request = outcome.request(), "dropping superseded fetch");
            return;
        }
        self.pending_fetch = None;

        match outcome {
            FetchOutcome::LiveLog { result, .. } => match result {
                Ok(log) => match self.bootstrap_live(&log) {
                    Ok(Some(window)) => self.window = Some(window),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "couldn't back-fill live window"),
                },
                Err(e) => tracing::warn!(error = %e, "live log unavailable, keeping seeded window"),
            },
            FetchOutcome::Session { name, result, .. } => match result {
                Ok(log) => {
                    if let Err(e) = self.show_history(log) {
                        tracing::warn!(session = ?name, error = %e, "couldn't display session data");
                    }
                }
                Err(e) => {
                    tracing::error!(session = ?name, error = %e, "couldn't retrieve session data");
                    return;
                }
            },
        }
        self.publish();
    }

    /// The live log's newest values, left-padded with the seed value up to
    /// the live capacity, followed by the ticks received meanwhile.
    fn bootstrap_live(&self, log: &MeasureLog) -> Result<Option<SampleWindow>, TelemetryError> {
        let (Some(current), ViewMode::Live) = (self.window.as_ref(), &self.mode) else {
            return Ok(None);
        };
        let values = log.values();
        if values.is_empty() {
            return Ok(None);
        }

        let settings = &self.window_settings;
        let recent = &values[values.len().saturating_sub(settings.live_capacity)..];
        let padding = settings.live_capacity - recent.len();
        let series: Vec<Reading> = std::iter::repeat(settings.seed_value)
            .take(padding)
            .chain(recent.iter().copied())
            .map(|v| vec![v])
            .collect();

        let mut window = SampleWindow::initialize(
            settings.channels,
            settings.live_capacity,
            WindowSeed::Series(series),
            settings.live_interval_seconds,
        )?;
        let fresh = self.live_ticks.min(current.len());
        for reading in current.snapshot().iter().skip(current.len() - fresh) {
            window.tick(Some(SampleInput::Channels(reading.clone())))?;
        }
        Ok(Some(window))
    }

    fn show_history(&mut self, log: SessionLog) -> Result<(), TelemetryError> {
        let interval = log.interval_seconds()?;
        let recorded_points = log.measures.values().len();
        let (series, interval) =
            downsample::reduce(log.series(), self.window_settings.history_capacity, interval);

        match self.window.as_mut() {
            Some(window) => window.load(series, interval)?,
            None => self.window = Some(SampleWindow::from_series(series, interval)?),
        }

        tracing::info!(
            cycle_type = %log.cycle_type,
            channels = log.channel_count(),
            points = recorded_points,
            interval_seconds = interval,
            "showing recorded session"
        );
        self.mode = ViewMode::History(log.summary());
        Ok(())
    }

    fn chart_view(&self, window: &SampleWindow) -> ChartView {
        let mode = match self.mode {
            ViewMode::Live => AxisMode::Reverse,
            ViewMode::History(_) => AxisMode::Elapsed,
        };
        ChartView {
            mode,
            channels: window.channels(),
            capacity: window.capacity(),
            interval_seconds: window.interval_seconds(),
            samples: window.snapshot().iter().cloned().collect(),
            latest: window.latest().cloned(),
            ticks: time_axis::ticks(
                mode,
                window.len(),
                window.interval_seconds(),
                self.window_settings.axis_ticks,
            ),
        }
    }

    fn publish(&self) {
        let session = match &self.mode {
            ViewMode::Live => None,
            ViewMode::History(summary) => Some(summary.clone()),
        };
        let view = DashboardView {
            connection: ConnectionView::new(
                self.controller.state(),
                self.controller.indicator().clone(),
                self.controller.address().to_string(),
            ),
            controls: self.live.controls,
            device: self.live.device.clone(),
            cycle: self.live.cycle.view(now()),
            chart: self.window.as_ref().map(|w| self.chart_view(w)),
            session,
        };
        self.publisher.send_replace(view);
    }
}
