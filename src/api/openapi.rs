//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{dev, player, session, system};

/// Aggregated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "poker-ledger",
        description = "Live poker session ledger: buy-ins, credits between players and cash-outs."
    ),
    paths(
        session::list_sessions,
        session::list_archived_sessions,
        session::create_session,
        session::get_session,
        session::end_session,
        session::archive_session,
        player::add_player,
        player::list_players,
        player::register_buy_in,
        player::register_credit,
        player::cash_out,
        system::health_handler,
        dev::reset,
    ),
    tags(
        (name = "Sessions", description = "Session lifecycle and listings"),
        (name = "Players", description = "Per-player ledger operations"),
        (name = "System", description = "Service health"),
        (name = "Dev", description = "Development helpers"),
    )
)]
pub struct ApiDoc;

/// Returns the generated OpenAPI document.
#[must_use]
pub fn document() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
