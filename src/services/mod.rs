/// Activity entry, exit and the resolving operations.
pub mod activity_service;
/// Cached content loading with fallbacks.
pub mod content_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Mini-game selector and games.
pub mod mini_game_service;
/// Ordered writer of the session slot.
pub mod persistence;
/// Session lifecycle operations.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Strip game orchestration and its timers.
pub mod strip_game_service;
/// Countdown and delayed-callback tasks.
pub mod timers;
