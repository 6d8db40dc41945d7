// Application state for HTTP handlers
use crate::application::dashboard_session::SessionCommand;
use crate::domain::view::DashboardView;
use crate::infrastructure::control_client::ControlClient;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    pub view: watch::Receiver<DashboardView>,
    pub commands: mpsc::Sender<SessionCommand>,
    pub control: ControlClient,
}

impl AppState {
    /// Address of the server the dashboard is currently bound to.
    pub fn server_address(&self) -> String {
        self.view.borrow().connection.address.clone()
    }
}
