use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Duel Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::session::route,
        crate::routes::session::validate_setup,
        crate::routes::session::get_session,
        crate::routes::session::start_session,
        crate::routes::session::switch_turn,
        crate::routes::session::change_difficulty,
        crate::routes::session::set_mode,
        crate::routes::session::toggle_focus,
        crate::routes::session::end_game,
        crate::routes::session::reset_session,
        crate::routes::activity::current_activity,
        crate::routes::activity::enter_activity,
        crate::routes::activity::exit_activity,
        crate::routes::activity::complete,
        crate::routes::activity::skip,
        crate::routes::activity::spin,
        crate::routes::activity::reveal_card,
        crate::routes::activity::explore,
        crate::routes::activity::choose,
        crate::routes::mini_game::select_game,
        crate::routes::mini_game::deselect_game,
        crate::routes::mini_game::start_tap_battle,
        crate::routes::mini_game::tap,
        crate::routes::mini_game::start_reaction,
        crate::routes::mini_game::click,
        crate::routes::mini_game::play,
        crate::routes::strip::current,
        crate::routes::strip::add_item,
        crate::routes::strip::delete_item,
        crate::routes::strip::shift_item,
        crate::routes::strip::start,
        crate::routes::strip::finish,
        crate::routes::strip::take_it,
        crate::routes::strip::double_or_nothing,
        crate::routes::strip::gamble,
        crate::routes::strip::proceed,
        crate::routes::strip::replay,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::session::SetupRequest,
            crate::dto::session::PlayerInput,
            crate::dto::session::SetupValidation,
            crate::dto::session::FieldError,
            crate::dto::session::SessionView,
            crate::dto::session::RouteResponse,
            crate::dto::activity::ActivityView,
            crate::dto::activity::ResolutionView,
            crate::dto::strip::StripView,
            crate::dto::sse::TimerTickEvent,
            crate::state::game::ActivityKind,
            crate::state::game::HistoryEntry,
            crate::state::game::ContentRecord,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "session", description = "Setup screen and session lifecycle"),
        (name = "activity", description = "Activity picker and resolving operations"),
        (name = "mini-game", description = "Tap battle, reaction test and tic-tac-toe"),
        (name = "strip", description = "Strip game rounds and wardrobes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_surface() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/route",
            "/session",
            "/activity/{kind}/enter",
            "/activity/mini-game/tic-tac-toe/move",
            "/strip/wardrobes/{seat}/items/{index}/shift",
            "/sse/public",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
