use std::sync::Arc;

use crate::application::services::{HealthProber, JobLifecycleService, ObserverRegistry};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<JobLifecycleService>,
    pub health_prober: Arc<HealthProber>,
    pub observers: Arc<ObserverRegistry>,
    pub settings: Settings,
}
