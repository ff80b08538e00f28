use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use server::{app, utils::test_setup::setup_test_env};
use tower::ServiceExt;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_game(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/game/create", None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_game() {
    setup_test_env();
    let app = app::create_app();
    let game_id = create_game(&app).await;

    let (status, games) = send(&app, "GET", "/api/game/games", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(games.as_array().unwrap().contains(&Value::String(game_id)));
}

#[tokio::test]
async fn test_join_and_list_players() {
    setup_test_env();
    let app = app::create_app();
    let game_id = create_game(&app).await;

    for (id, name) in [(1, "Maxim"), (2, "Alexander"), (3, "Artem")] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/game/{}/join", game_id),
            Some(json!({ "player_id": id, "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["joined"], true);
    }

    let (_, count) = send(&app, "GET", &format!("/api/game/{}/players/count", game_id), None).await;
    assert_eq!(count, 3);

    let (_, exists) = send(&app, "GET", &format!("/api/game/{}/players/2/exists", game_id), None).await;
    assert_eq!(exists, true);
    let (_, exists) = send(&app, "GET", &format!("/api/game/{}/players/9/exists", game_id), None).await;
    assert_eq!(exists, false);

    let (_, alive) = send(&app, "GET", &format!("/api/game/{}/players/alive", game_id), None).await;
    let mut alive: Vec<String> = serde_json::from_value(alive).unwrap();
    alive.sort();
    assert_eq!(alive, vec!["Alexander", "Artem", "Maxim"]);
}

#[tokio::test]
async fn test_full_round_over_http() {
    setup_test_env();
    let app = app::create_app();
    let game_id = create_game(&app).await;
    for id in 1..=5 {
        send(
            &app,
            "POST",
            &format!("/api/game/{}/join", game_id),
            Some(json!({ "player_id": id, "name": format!("P{}", id) })),
        )
        .await;
    }

    let (status, summary) = send(&app, "POST", &format!("/api/game/{}/start", game_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["mafia"], 1);

    let (_, roles) = send(&app, "GET", &format!("/api/game/{}/roles", game_id), None).await;
    let roles = roles.as_object().unwrap();
    let mafia: i64 = roles
        .iter()
        .find(|(_, role)| *role == "mafia")
        .map(|(id, _)| id.parse().unwrap())
        .unwrap();
    let citizen: i64 = roles
        .iter()
        .find(|(_, role)| *role == "citizen")
        .map(|(id, _)| id.parse().unwrap())
        .unwrap();

    let (_, phase) = send(&app, "POST", &format!("/api/game/{}/phase/next", game_id), None).await;
    assert_eq!(phase, "night_voting");

    // 市民は夜に投票できない
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/vote", game_id),
        Some(json!({ "phase": "night", "voter_id": citizen, "target_id": mafia })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "action not available");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/game/{}/actions/vote", game_id),
        Some(json!({ "phase": "night", "voter_id": mafia, "target_name": format!("P{}", citizen) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = send(&app, "POST", &format!("/api/game/{}/resolve/night", game_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["elimination"]["outcome"], "eliminated");
    assert_eq!(report["elimination"]["name"], format!("P{}", citizen));
    assert_eq!(report["result"], "in_progress");

    let (_, phase) = send(&app, "POST", &format!("/api/game/{}/phase/next", game_id), None).await;
    assert_eq!(phase, "day_voting");

    // 昼の投票がなければ処刑なし
    let (_, report) = send(&app, "POST", &format!("/api/game/{}/resolve/day", game_id), None).await;
    assert_eq!(report["elimination"]["outcome"], "nobody");

    let (_, winner) = send(&app, "GET", &format!("/api/game/{}/check-winner", game_id), None).await;
    assert_eq!(winner, "Game in progress");

    let (_, state) = send(&app, "GET", &format!("/api/game/{}/state", game_id), None).await;
    assert_eq!(state["phase"], "day_resolved");
    assert_eq!(state["round"], 1);
}
