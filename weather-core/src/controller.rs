//! Fetch controller: one request per mount, one terminal transition.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::FetchConfig,
    error::FetchError,
    model::{Phase, RequestState, Weather},
    provider::{OpenWeatherProvider, WeatherProvider},
};

#[derive(Debug, Clone)]
pub struct FetchController {
    provider: Arc<dyn WeatherProvider>,
    config: FetchConfig,
}

impl FetchController {
    pub fn new(provider: Arc<dyn WeatherProvider>, config: FetchConfig) -> Self {
        Self { provider, config }
    }

    /// Controller backed by the OpenWeather HTTP API.
    pub fn openweather(config: FetchConfig) -> Self {
        let provider = OpenWeatherProvider::from_config(&config);
        Self::new(Arc::new(provider), config)
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Create a fresh `Pending` state and start its fetch.
    ///
    /// Must be called from within a tokio runtime. Every call is a new
    /// mount with its own request; reading the returned handle never
    /// issues another one.
    pub fn mount(&self) -> Mounted {
        let (tx, rx) = watch::channel(RequestState::Pending);
        let mounted = MountFlag::new();

        let task = tokio::spawn(initiate(
            Arc::clone(&self.provider),
            self.config.clone(),
            tx,
            mounted.clone(),
        ));

        Mounted { state: rx, mounted, task }
    }
}

async fn initiate(
    provider: Arc<dyn WeatherProvider>,
    config: FetchConfig,
    tx: watch::Sender<RequestState>,
    mounted: MountFlag,
) {
    let outcome = fetch_with_policy(provider.as_ref(), &config).await;

    match &outcome {
        Ok(weather) => info!(
            location = %weather.location_name,
            temperature = weather.temperature_celsius,
            "weather fetch succeeded"
        ),
        Err(err) => warn!(city = %config.city, error = %err, "weather fetch failed"),
    }

    if !mounted.publish(&tx, RequestState::from(outcome)) {
        debug!(city = %config.city, "discarding weather result after unmount");
    }
}

/// "Still mounted" flag. Publishing and unmounting take the same lock, so
/// no transition lands once `unmount` has returned.
#[derive(Debug, Clone)]
struct MountFlag(Arc<Mutex<bool>>);

impl MountFlag {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(true)))
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unmount(&self) {
        *self.lock() = false;
    }

    /// Apply `state` if still mounted. Returns whether it was applied.
    fn publish(&self, tx: &watch::Sender<RequestState>, state: RequestState) -> bool {
        let mounted = self.lock();
        if !*mounted {
            return false;
        }
        tx.send_replace(state);
        true
    }
}

async fn fetch_with_policy(
    provider: &dyn WeatherProvider,
    config: &FetchConfig,
) -> Result<Weather, FetchError> {
    let policy = &config.policy;
    let mut attempt = 0;

    loop {
        let result = match policy.timeout {
            Some(limit) => tokio::time::timeout(limit, provider.current_weather(&config.city))
                .await
                .unwrap_or(Err(FetchError::Timeout(limit))),
            None => provider.current_weather(&config.city).await,
        };

        match result {
            Err(err) if attempt < policy.retries && err.is_retryable() => {
                let delay = policy.backoff_for(attempt);
                warn!(attempt, ?delay, error = %err, "retrying weather fetch");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            settled => return settled,
        }
    }
}

/// Handle to one mount's state.
///
/// Dropping it unmounts: the pending fetch is abandoned and its result,
/// if it still arrives, is not applied.
#[derive(Debug)]
pub struct Mounted {
    state: watch::Receiver<RequestState>,
    mounted: MountFlag,
    task: JoinHandle<()>,
}

impl Mounted {
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase()
    }

    /// A receiver that observes transitions, for views that re-render on change.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.clone()
    }

    /// Wait for the terminal state.
    ///
    /// Never returns if the provider never settles and no timeout is set.
    pub async fn settled(&mut self) -> RequestState {
        if let Ok(state) = self.state.wait_for(RequestState::is_terminal).await {
            return state.clone();
        }
        // Fetch task ended without a transition (it panicked).
        self.state.borrow().clone()
    }

    pub fn unmount(self) {}
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.mounted.unmount();
        self.task.abort();
    }
}
