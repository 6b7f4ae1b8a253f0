pub mod activities;
pub mod cache;
pub mod game;
pub mod rules;
pub mod selection;
pub mod session;
mod sse;
pub mod timers;
pub mod wardrobe;

use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::{Mutex, RwLock};

use crate::{
    config::AppConfig,
    dao::{content_store::ContentStore, session_store::SessionStore},
    services::{content_service::ContentService, persistence::Persistence},
    state::{activities::ActivityInstance, session::GameSession, timers::TimerSlot},
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Activity on screen together with the timers driving it.
#[derive(Debug)]
pub struct ActivitySlot {
    /// Live activity, `None` while the picker is shown.
    pub instance: Option<ActivityInstance>,
    /// Tasks owned by the live activity.
    pub timers: TimerSlot,
    /// Randomness for every draw, spin, and tie-break.
    pub rng: StdRng,
}

impl Default for ActivitySlot {
    fn default() -> Self {
        Self {
            instance: None,
            timers: TimerSlot::new(),
            rng: StdRng::from_os_rng(),
        }
    }
}

impl ActivitySlot {
    /// Drop the activity and abort its timers.
    pub fn clear(&mut self) -> Option<ActivityInstance> {
        self.timers.cancel();
        self.instance.take()
    }
}

/// Central application state: the session, the live activity, and the shared services.
///
/// When both locks are needed, `activity` is taken before `session`.
pub struct AppState {
    config: AppConfig,
    content: ContentService,
    session: RwLock<GameSession>,
    activity: Mutex<ActivitySlot>,
    persistence: Persistence,
    sse: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Must be called inside a Tokio runtime; the session writer task is spawned here.
    pub fn new(
        config: AppConfig,
        content_store: Arc<dyn ContentStore>,
        session_store: Arc<dyn SessionStore>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            content: ContentService::new(content_store),
            session: RwLock::new(GameSession::new()),
            activity: Mutex::new(ActivitySlot::default()),
            persistence: Persistence::spawn(session_store),
            sse: SseHub::new(64),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Content loader.
    pub fn content(&self) -> &ContentService {
        &self.content
    }

    /// The game session.
    pub fn session(&self) -> &RwLock<GameSession> {
        &self.session
    }

    /// Activity currently on screen.
    pub fn activity(&self) -> &Mutex<ActivitySlot> {
        &self.activity
    }

    /// Session slot writer.
    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }
}
