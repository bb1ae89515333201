//! Single binary web server: bracket API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), SESSION_KEY (64+ bytes).

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use knockout_bracket::{BracketEngine, LogAudit, MatchId, Roster, TournamentError, TournamentId};
use serde::Deserialize;
use std::sync::Arc;

/// Session key holding the operator name recorded as round completer.
const OPERATOR_KEY: &str = "operator";

/// Operator name used when the session has none.
const DEFAULT_OPERATOR: &str = "admin";

type EngineState = Data<BracketEngine>;
type RosterState = Data<Roster>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct SessionBody {
    operator: String,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default = "default_max_participants")]
    max_participants: u32,
}

fn default_max_participants() -> u32 {
    32
}

#[derive(Deserialize)]
struct AddParticipantBody {
    name: String,
}

#[derive(Deserialize)]
struct AdvanceBody {
    current_round: String,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner: String,
    #[serde(default)]
    score: Option<String>,
}

#[derive(Deserialize)]
struct AssignmentBody {
    #[serde(default)]
    judge: Option<String>,
    #[serde(default)]
    court: Option<String>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: match id (e.g. /api/matches/{match_id}/result)
#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

/// Map an engine error to a JSON error response.
fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else if matches!(e, TournamentError::LockPoisoned) {
        HttpResponse::InternalServerError().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn operator(session: &Session) -> String {
    session
        .get::<String>(OPERATOR_KEY)
        .ok()
        .flatten()
        .unwrap_or_else(|| DEFAULT_OPERATOR.to_string())
}

/// 404 unless the tournament exists.
fn require_tournament(engine: &BracketEngine, id: TournamentId) -> Result<(), HttpResponse> {
    engine.view(id).map(|_| ()).map_err(|e| error_response(&e))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "knockout-bracket",
    })
}

/// Set the operator name recorded when rounds are closed.
#[post("/api/session")]
async fn api_set_operator(session: Session, body: Json<SessionBody>) -> HttpResponse {
    let name = body.operator.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Operator name must not be empty" }));
    }
    match session.insert(OPERATOR_KEY, name) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "operator": name })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(
    engine: EngineState,
    roster: RosterState,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    let max_participants = body
        .as_ref()
        .map(|b| b.max_participants)
        .unwrap_or_else(default_max_participants);
    let view = match engine.create_tournament(max_participants) {
        Ok(view) => view,
        Err(e) => return error_response(&e),
    };
    match roster.set_capacity(view.id, max_participants as usize) {
        Ok(()) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&TournamentError::from(e)),
    }
}

/// Bracket read model (404 if not found).
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(engine: EngineState, path: Path<TournamentPath>) -> HttpResponse {
    match engine.view(path.id) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// Register one participant.
#[post("/api/tournaments/{id}/participants")]
async fn api_add_participant(
    engine: EngineState,
    roster: RosterState,
    path: Path<TournamentPath>,
    body: Json<AddParticipantBody>,
) -> HttpResponse {
    if let Err(resp) = require_tournament(&engine, path.id) {
        return resp;
    }
    match roster.register(path.id, &body.name) {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Register every name of a CSV roster (header row with a `name` column).
#[post("/api/tournaments/{id}/participants/import")]
async fn api_import_participants(
    engine: EngineState,
    roster: RosterState,
    path: Path<TournamentPath>,
    body: web::Bytes,
) -> HttpResponse {
    let names = match knockout_bracket::read_csv_names(body.as_ref()) {
        Ok(names) => names,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    if let Err(resp) = require_tournament(&engine, path.id) {
        return resp;
    }
    match roster.register_all(path.id, &names) {
        Ok(added) => HttpResponse::Ok().json(added),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Build (or rebuild) the bracket from the roster.
#[post("/api/tournaments/{id}/initialize")]
async fn api_initialize(engine: EngineState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    match engine.initialize(path.id, &operator(&session)) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

/// Close the named round and build the next one.
#[post("/api/tournaments/{id}/advance")]
async fn api_advance_round(
    engine: EngineState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<AdvanceBody>,
) -> HttpResponse {
    match engine.advance_round(path.id, &body.current_round, &operator(&session)) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

/// Cancel the tournament.
#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel(engine: EngineState, path: Path<TournamentPath>) -> HttpResponse {
    match engine.cancel(path.id) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// Record winner and score of one match.
#[put("/api/matches/{match_id}/result")]
async fn api_record_result(
    engine: EngineState,
    session: Session,
    path: Path<MatchPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    match engine.record_result(path.match_id, &body.winner, body.score.as_deref(), &operator(&session)) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

/// Assign judge and/or court to a match.
#[put("/api/matches/{match_id}/assignment")]
async fn api_assign(engine: EngineState, path: Path<MatchPath>, body: Json<AssignmentBody>) -> HttpResponse {
    match engine.assign(path.match_id, body.judge.as_deref(), body.court.as_deref()) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_set_operator)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_add_participant)
        .service(api_import_participants)
        .service(api_initialize)
        .service(api_advance_round)
        .service(api_cancel)
        .service(api_record_result)
        .service(api_assign);
}

/// Server settings from the environment.
struct ServerConfig {
    host: String,
    port: u16,
    session_key: Key,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let session_key = match std::env::var("SESSION_KEY") {
            Ok(raw) => Key::try_from(raw.as_bytes()).unwrap_or_else(|_| {
                log::warn!("SESSION_KEY shorter than 64 bytes, using a random key");
                Key::generate()
            }),
            Err(_) => Key::generate(),
        };
        Self {
            host,
            port,
            session_key,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let roster = Arc::new(Roster::new());
    let engine = Data::new(BracketEngine::new(roster.clone(), Arc::new(LogAudit)));
    let roster = Data::from(roster);
    let session_key = config.session_key.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .app_data(engine.clone())
            .app_data(roster.clone())
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use knockout_bracket::{AdvanceSummary, BracketView, InitializeSummary};

    fn app_state() -> (EngineState, RosterState) {
        let roster = Arc::new(Roster::new());
        let engine = Data::new(BracketEngine::new(roster.clone(), Arc::new(LogAudit)));
        (engine, Data::from(roster))
    }

    macro_rules! app {
        ($engine:expr, $roster:expr) => {
            test::init_service(
                App::new()
                    .wrap(SessionMiddleware::new(CookieSessionStore::default(), Key::generate()))
                    .app_data($engine.clone())
                    .app_data($roster.clone())
                    .configure(routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn full_bracket_over_http() {
        let (engine, roster) = app_state();
        let app = app!(engine, roster);

        let req = test::TestRequest::post()
            .uri("/api/tournaments")
            .set_json(serde_json::json!({ "max_participants": 4 }))
            .to_request();
        let view: BracketView = test::call_and_read_body_json(&app, req).await;
        let id = view.id;

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{id}/participants/import"))
            .set_payload("name\nAnn\nBen\nCal\nDee\n")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{id}/participants"))
            .set_json(serde_json::json!({ "name": "Eve" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{id}/initialize"))
            .to_request();
        let summary: InitializeSummary = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary.total_participants, 4);

        let req = test::TestRequest::get()
            .uri(&format!("/api/tournaments/{id}"))
            .to_request();
        let view: BracketView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view.current_round.as_deref(), Some("Semifinal"));
        let semis = view
            .rounds
            .iter()
            .find(|r| r.name == "Semifinal")
            .map(|r| r.matches.clone())
            .unwrap();
        assert_eq!(semis.len(), 2);

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{id}/advance"))
            .set_json(serde_json::json!({ "current_round": "Semifinal" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        for m in &semis {
            let req = test::TestRequest::put()
                .uri(&format!("/api/matches/{}/result", m.id))
                .set_json(serde_json::json!({ "winner": m.player1, "score": "2-0" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{id}/advance"))
            .set_json(serde_json::json!({ "current_round": "Semifinal" }))
            .to_request();
        let summary: AdvanceSummary = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary.to_round, "Final");
        assert_eq!(summary.completed_matches, 2);
    }

    #[actix_web::test]
    async fn unknown_ids_are_404() {
        let (engine, roster) = app_state();
        let app = app!(engine, roster);

        let req = test::TestRequest::get()
            .uri(&format!("/api/tournaments/{}", uuid_string()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri(&format!("/api/matches/{}/result", uuid_string()))
            .set_json(serde_json::json!({ "winner": "Ann" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn initialize_without_participants_is_rejected() {
        let (engine, roster) = app_state();
        let app = app!(engine, roster);
        let id = engine.create_tournament(8).unwrap().id;

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{id}/initialize"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    fn uuid_string() -> String {
        "00000000-0000-4000-8000-000000000000".to_string()
    }
}
