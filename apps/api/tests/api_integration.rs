//! End-to-end API tests over the in-memory backend
//!
//! These tests drive the full router with `oneshot` requests:
//! - Account registration, login and profile
//! - Admin setup of sports, divisions, leagues and teams
//! - Free agent invitations from send to accept, decline and re-send
//! - Paid checkout completion and registration forms

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use league_signup_api::api::router;
use league_signup_api::auth::jwt::create_token;
use league_signup_api::config::{AppConfig, StorageBackend};
use league_signup_api::domain::registration::METADATA_VALUE_LIMIT;
use league_signup_api::domain::user::{Email, User, UserType};
use league_signup_api::infrastructure::payments::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentGateway, RemotePrice, RemoteProduct,
};
use league_signup_api::state::AppState;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for oneshot
use uuid::Uuid;

/// Payment gateway double; sessions start unpaid until `mark_paid`
#[derive(Default)]
struct FakeGateway {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    requests: Mutex<Vec<CheckoutRequest>>,
}

impl FakeGateway {
    fn mark_paid(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(session_id).unwrap();
        session.payment_status = "paid".to_string();
        session.payment_intent = Some("pi_test_1".to_string());
    }

    fn last_request(&self) -> CheckoutRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, PaymentError> {
        let mut sessions = self.sessions.lock().unwrap();
        let id = format!("cs_test_{}", sessions.len() + 1);
        let session = CheckoutSession {
            id: id.clone(),
            url: Some(format!("https://checkout.test/{}", id)),
            payment_status: "unpaid".to_string(),
            payment_intent: None,
            metadata: request.metadata.clone(),
        };
        sessions.insert(id, session.clone());
        self.requests.lock().unwrap().push(request.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentError::Provider {
                status: 404,
                message: format!("No such checkout.session: {}", session_id),
            })
    }

    async fn list_active_products(&self) -> Result<Vec<RemoteProduct>, PaymentError> {
        Ok(vec![RemoteProduct {
            id: "prod_fall".to_string(),
            name: "Fall League".to_string(),
            description: None,
            active: true,
            metadata: HashMap::new(),
        }])
    }

    async fn list_active_prices(&self, product_id: &str) -> Result<Vec<RemotePrice>, PaymentError> {
        let price = |id: &str, amount: i64, member: &str| RemotePrice {
            id: id.to_string(),
            product: product_id.to_string(),
            currency: "usd".to_string(),
            unit_amount: Some(amount),
            active: true,
            nickname: None,
            recurring: None,
            metadata: HashMap::from([("is_member".to_string(), member.to_string())]),
        };
        Ok(vec![price("price_member", 8000, "true"), price("price_public", 10000, "false")])
    }
}

struct TestApp {
    app: Router,
    state: AppState,
    gateway: Arc<FakeGateway>,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig {
            storage_backend: StorageBackend::Memory,
            jwt_secret: "test-secret".to_string(),
            public_base_url: "http://league.test".to_string(),
            ..AppConfig::default()
        };
        let gateway = Arc::new(FakeGateway::default());
        let state = AppState::in_memory(config, gateway.clone());
        Self {
            app: router(state.clone()),
            state,
            gateway,
        }
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// Stores an account directly and mints a token for it
    async fn user(&self, email: &str, user_type: UserType) -> (User, String) {
        let username = email.split('@').next().unwrap();
        let mut user = User::new_customer(username, Email::new(email).unwrap(), "unused".to_string(), "Test", "User")
            .unwrap();
        user.user_type = user_type;
        self.state.users.create(&user).await.unwrap();
        let token = create_token(user.id, "test-secret").unwrap();
        (user, token)
    }

    /// Admin, sport, division and an open league whose early window has closed
    async fn league(&self, admin: &str) -> (Uuid, Uuid) {
        let (_, sport) = self
            .call("POST", "/api/sports", Some(admin), Some(json!({ "name": "Soccer" })))
            .await;
        let sport_id = sport["id"].as_str().unwrap();

        let (_, division) = self
            .call(
                "POST",
                &format!("/api/sports/{}/divisions", sport_id),
                Some(admin),
                Some(json!({ "name": "Open", "skill_level": "Intermediate", "age_group": "Adult" })),
            )
            .await;
        let division_id = division["id"].as_str().unwrap().to_string();

        let today = Utc::now().date_naive();
        let (status, league) = self
            .call(
                "POST",
                "/api/leagues",
                Some(admin),
                Some(json!({
                    "sport_id": sport_id,
                    "name": "Fall League",
                    "registration_start_date": today - Duration::days(10),
                    "registration_end_date": today + Duration::days(10),
                    "early_registration_deadline": today - Duration::days(1),
                    "league_start_date": today + Duration::days(20),
                    "league_end_date": today + Duration::days(100),
                    "regular_registration_price": "100.00",
                    "early_registration_price": "80.00",
                    "division_ids": [division_id],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", league);

        (
            league["id"].as_str().unwrap().parse().unwrap(),
            division_id.parse().unwrap(),
        )
    }

    async fn team(&self, admin: &str, league_id: Uuid, division_id: Uuid, name: &str, captain_email: &str) -> Value {
        let (status, team) = self
            .call(
                "POST",
                "/api/teams",
                Some(admin),
                Some(json!({
                    "name": name,
                    "league_id": league_id,
                    "division_id": division_id,
                    "captain": {
                        "first_name": "Casey",
                        "last_name": "Captain",
                        "email": captain_email,
                        "phone_number": "555-0100",
                    },
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", team);
        team
    }

    async fn free_agent(&self, token: &str, league_id: Uuid, division_id: Uuid, email: &str) -> Uuid {
        let (status, body) = self
            .call(
                "POST",
                &format!("/api/free-agents/league/{}", league_id),
                Some(token),
                Some(player_body(division_id, email)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

fn player_body(division_id: Uuid, email: &str) -> Value {
    json!({
        "division_id": division_id,
        "first_name": "Frankie",
        "last_name": "Agent",
        "email": email,
        "phone_number": "555-0199",
        "date_of_birth": "2000-05-01",
        "notes": "Can play any position",
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = TestApp::new();
    let register = json!({
        "username": "jordan",
        "email": "Jordan@Example.com",
        "password": "password123",
        "first_name": "Jordan",
        "last_name": "Lee",
    });

    let (status, body) = app.call("POST", "/api/auth/register", None, Some(register.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = app.call("POST", "/api/auth/register", None, Some(register)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "jordan@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app.call("GET", "/api/accounts/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "jordan@example.com");
    assert_eq!(me["is_team_captain"], false);

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "jordan@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_short_password_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "sam",
                "email": "sam@example.com",
                "password": "short",
                "first_name": "Sam",
                "last_name": "Short",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 8 characters");
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new();
    let (_, customer) = app.user("player@example.com", UserType::Customer).await;

    let (status, _) = app.call("POST", "/api/sports", None, Some(json!({ "name": "Hockey" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .call("POST", "/api/sports", Some(customer.as_str()), Some(json!({ "name": "Hockey" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, _) = app.call("GET", "/api/sports", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::OK, "public routes ignore the header");
}

#[tokio::test]
async fn test_invalid_league_dates_rejected() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (_, sport) = app
        .call("POST", "/api/sports", Some(admin.as_str()), Some(json!({ "name": "Soccer" })))
        .await;

    let today = Utc::now().date_naive();
    let (status, body) = app
        .call(
            "POST",
            "/api/leagues",
            Some(admin.as_str()),
            Some(json!({
                "sport_id": sport["id"],
                "name": "Backwards",
                "registration_start_date": today,
                "registration_end_date": today - Duration::days(1),
                "early_registration_deadline": today,
                "league_start_date": today + Duration::days(5),
                "league_end_date": today + Duration::days(50),
                "regular_registration_price": "100.00",
                "early_registration_price": "80.00",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Registration start date must be before end date");
}

#[tokio::test]
async fn test_open_leagues_grouped_by_sport() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (league_id, _) = app.league(&admin).await;

    let (status, body) = app.call("GET", "/api/leagues", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let sports = body.as_array().unwrap();
    assert_eq!(sports.len(), 1);
    assert_eq!(sports[0]["name"], "Soccer");
    assert_eq!(sports[0]["leagues"][0]["id"], league_id.to_string());
    assert_eq!(sports[0]["leagues"][0]["is_early_registration_active"], false);
}

#[tokio::test]
async fn test_team_signup_by_code() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (league_id, division_id) = app.league(&admin).await;
    let team = app.team(&admin, league_id, division_id, "Hawks", "coach@example.com").await;
    let code = team["signup_code"].as_str().unwrap();
    assert_eq!(code.len(), 8);

    let (status, lookup) = app
        .call("GET", &format!("/api/teams/signup/{}", code.to_lowercase()), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lookup["team_name"], "Hawks");

    let (status, signup) = app
        .call(
            "POST",
            &format!("/api/teams/signup/{}", code),
            None,
            Some(player_body(division_id, "kid@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", signup);
    assert_eq!(signup["player"]["team_id"], team["id"]);

    let (status, _) = app.call("GET", "/api/teams/signup/ZZZZZZZZ", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invitation_accept_flow() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (captain, captain_token) = app.user("coach@example.com", UserType::Customer).await;
    let (_, agent_token) = app.user("agent@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;
    let team = app.team(&admin, league_id, division_id, "Hawks", captain.email.as_str()).await;
    let free_agent_id = app.free_agent(&agent_token, league_id, division_id, "agent@example.com").await;

    // Non-captains cannot browse the pool
    let (status, _) = app
        .call("GET", &format!("/api/free-agents/league/{}", league_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pool) = app
        .call("GET", &format!("/api/free-agents/league/{}", league_id), Some(captain_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pool.as_array().unwrap().len(), 1);

    let (status, invitation) = app
        .call(
            "POST",
            &format!("/api/free-agents/{}/invite", free_agent_id),
            Some(captain_token.as_str()),
            Some(json!({ "message": "Join the Hawks" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", invitation);
    assert_eq!(invitation["status"], "PENDING");
    assert_eq!(invitation["team_id"], team["id"]);

    let (status, body) = app
        .call(
            "POST",
            &format!("/api/free-agents/{}/invite", free_agent_id),
            Some(captain_token.as_str()),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "An invitation is already pending for this free agent");

    let (_, notifications) = app.call("GET", "/api/notifications", Some(agent_token.as_str()), None).await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);

    let invitation_id = invitation["id"].as_str().unwrap();
    let (status, _) = app
        .call("POST", &format!("/api/invitations/{}/accept", invitation_id), Some(captain_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, accepted) = app
        .call("POST", &format!("/api/invitations/{}/accept", invitation_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", accepted);
    assert_eq!(accepted["invitation"]["status"], "ACCEPTED");
    assert_eq!(accepted["player"]["team_id"], team["id"]);

    let (_, free_agent) = app
        .call("GET", &format!("/api/free-agents/{}", free_agent_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(free_agent["status"], "JOINED");

    let (_, players) = app
        .call("GET", &format!("/api/teams/{}/players", team["id"].as_str().unwrap()), Some(captain_token.as_str()), None)
        .await;
    assert_eq!(players.as_array().unwrap().len(), 1);

    let (status, sent) = app.call("GET", "/api/invitations/sent", Some(captain_token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent.as_object().unwrap().len(), 5);
    assert_eq!(sent["ACCEPTED"].as_array().unwrap().len(), 1);
    assert!(sent["PENDING"].as_array().unwrap().is_empty());

    let (status, body) = app
        .call(
            "POST",
            &format!("/api/free-agents/{}/invite", free_agent_id),
            Some(captain_token.as_str()),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This free agent has already joined a team");
}

#[tokio::test]
async fn test_declined_invitation_can_be_resent() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (captain, captain_token) = app.user("coach@example.com", UserType::Customer).await;
    let (_, agent_token) = app.user("agent@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;
    app.team(&admin, league_id, division_id, "Hawks", captain.email.as_str()).await;
    let free_agent_id = app.free_agent(&agent_token, league_id, division_id, "agent@example.com").await;
    let invite_uri = format!("/api/free-agents/{}/invite", free_agent_id);

    let (_, invitation) = app.call("POST", &invite_uri, Some(captain_token.as_str()), Some(json!({}))).await;
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    let (status, declined) = app
        .call("POST", &format!("/api/invitations/{}/decline", invitation_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(declined["status"], "DECLINED");
    assert!(declined["response_at"].is_string());

    let (_, free_agent) = app
        .call("GET", &format!("/api/free-agents/{}", free_agent_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(free_agent["status"], "AVAILABLE");

    let (status, reopened) = app
        .call("POST", &invite_uri, Some(captain_token.as_str()), Some(json!({ "message": "Second try" })))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", reopened);
    assert_eq!(reopened["id"], invitation_id.as_str());
    assert_eq!(reopened["status"], "PENDING");
    assert_eq!(reopened["message"], "Second try");

    // A cancelled invitation can no longer be answered
    let (status, _) = app
        .call("POST", &format!("/api/invitations/{}/cancel", invitation_id), Some(captain_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call("POST", &format!("/api/invitations/{}/decline", invitation_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_claim_team_links_captain() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (_, captain_token) = app.user("coach@example.com", UserType::Customer).await;
    let (_, other_token) = app.user("other@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;
    let team = app.team(&admin, league_id, division_id, "Hawks", "coach@example.com").await;
    let team_id = team["id"].as_str().unwrap();

    let (_, dashboard) = app.call("GET", "/api/teams/dashboard", Some(captain_token.as_str()), None).await;
    assert_eq!(dashboard[0]["claimable"], true);

    let (status, _) = app
        .call("POST", &format!("/api/teams/{}/claim", team_id), Some(other_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, claimed) = app
        .call("POST", &format!("/api/teams/{}/claim", team_id), Some(captain_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(claimed["captain"]["user_id"].is_string());

    let (status, detail) = app
        .call("GET", &format!("/api/teams/{}", team_id), Some(captain_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["team"]["name"], "Hawks");

    let (status, _) = app
        .call("GET", &format!("/api/teams/{}", team_id), Some(other_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_checkout_and_success() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (_, token) = app.user("parent@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;

    let (status, started) = app
        .call(
            "POST",
            &format!("/api/leagues/{}/checkout", league_id),
            Some(token.as_str()),
            Some(player_body(division_id, "parent@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", started);
    let session_id = started["session_id"].as_str().unwrap().to_string();

    let request = app.gateway.last_request();
    assert_eq!(request.metadata["is_late_registration"], "true");
    assert_eq!(request.metadata["league_id"], league_id.to_string());
    assert!(request.success_url.ends_with("session_id={CHECKOUT_SESSION_ID}"));

    let success_uri = format!("/api/registrations/success?session_id={}", session_id);
    let (status, _) = app.call("GET", &success_uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

    app.gateway.mark_paid(&session_id);
    let (status, registration) = app.call("GET", &success_uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK, "{}", registration);
    assert_eq!(registration["payment_status"], "paid");
    assert_eq!(registration["is_late_registration"], true);
    assert_eq!(registration["stripe_payment_intent"], "pi_test_1");

    let (_, again) = app.call("GET", &success_uri, Some(token.as_str()), None).await;
    assert_eq!(again["id"], registration["id"]);

    let (status, body) = app.call("GET", "/api/registrations/success", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No session ID provided");

    let (_, stats) = app
        .call("GET", &format!("/api/leagues/{}/registration-stats", league_id), Some(admin.as_str()), None)
        .await;
    assert_eq!(stats["total_registrations"], 1);
    assert_eq!(stats["paid_registrations"], 1);
    assert_eq!(stats["late_registrations"], 1);

    let (_, manage) = app
        .call("GET", "/api/registrations/manage?search=FRANK", Some(admin.as_str()), None)
        .await;
    assert_eq!(manage["stats"]["total_registrations"], 1);
    assert_eq!(manage["stats"]["total_free_agents"], 1);
}

#[tokio::test]
async fn test_registration_form_validation() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (_, token) = app.user("parent@example.com", UserType::Customer).await;
    let (_, stranger) = app.user("stranger@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;

    let (status, form) = app
        .call(
            "POST",
            &format!("/api/leagues/{}/form", league_id),
            Some(admin.as_str()),
            Some(json!({ "title": "Extra questions" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, field) = app
        .call(
            "POST",
            &format!("/api/forms/{}/fields", form["id"].as_str().unwrap()),
            Some(admin.as_str()),
            Some(json!({ "label": "Shirt size", "field_type": "select", "required": true, "choices": ["S", "M", "L"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", field);
    let field_id = field["id"].as_str().unwrap();

    let (_, public_form) = app.call("GET", &format!("/api/leagues/{}/form", league_id), None, None).await;
    assert_eq!(public_form["fields"].as_array().unwrap().len(), 1);

    let (_, started) = app
        .call(
            "POST",
            &format!("/api/leagues/{}/checkout", league_id),
            Some(token.as_str()),
            Some(player_body(division_id, "parent@example.com")),
        )
        .await;
    let session_id = started["session_id"].as_str().unwrap();
    app.gateway.mark_paid(session_id);
    let (_, registration) = app
        .call("GET", &format!("/api/registrations/success?session_id={}", session_id), Some(token.as_str()), None)
        .await;
    let response_uri = format!("/api/registrations/{}/form-response", registration["id"].as_str().unwrap());

    let (status, _) = app
        .call("POST", &response_uri, Some(stranger.as_str()), Some(json!({ "answers": { field_id: "M" } })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("POST", &response_uri, Some(token.as_str()), Some(json!({ "answers": { field_id: "XL" } })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call("POST", &response_uri, Some(token.as_str()), Some(json!({ "answers": { field_id: "M" } })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .call("POST", &response_uri, Some(token.as_str()), Some(json!({ "answers": { field_id: "L" } })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_catalog_sync_counts_new_rows() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;

    let (status, report) = app.call("POST", "/api/admin/stripe/sync", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK, "{}", report);
    assert_eq!(report, json!({ "products_created": 1, "prices_created": 2 }));

    let (_, report) = app.call("POST", "/api/admin/stripe/sync", Some(admin.as_str()), None).await;
    assert_eq!(report, json!({ "products_created": 0, "prices_created": 0 }));
}

#[tokio::test]
async fn test_deleting_team_returns_invited_free_agent_to_pool() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (hawks_captain, hawks_token) = app.user("coach@example.com", UserType::Customer).await;
    let (owls_captain, owls_token) = app.user("owls@example.com", UserType::Customer).await;
    let (_, agent_token) = app.user("agent@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;
    let hawks = app.team(&admin, league_id, division_id, "Hawks", hawks_captain.email.as_str()).await;
    app.team(&admin, league_id, division_id, "Owls", owls_captain.email.as_str()).await;
    let free_agent_id = app.free_agent(&agent_token, league_id, division_id, "agent@example.com").await;

    let (status, _) = app
        .call(
            "POST",
            &format!("/api/free-agents/{}/invite", free_agent_id),
            Some(hawks_token.as_str()),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .call("DELETE", &format!("/api/teams/{}", hawks["id"].as_str().unwrap()), Some(admin.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, free_agent) = app
        .call("GET", &format!("/api/free-agents/{}", free_agent_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(free_agent["status"], "AVAILABLE");

    let (_, received) = app.call("GET", "/api/invitations/received", Some(agent_token.as_str()), None).await;
    assert!(received.as_array().unwrap().is_empty());

    let (status, pool) = app
        .call("GET", &format!("/api/free-agents/league/{}", league_id), Some(owls_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pool.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_accept_cancels_other_pending_invitations() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (hawks_captain, hawks_token) = app.user("coach@example.com", UserType::Customer).await;
    let (owls_captain, owls_token) = app.user("owls@example.com", UserType::Customer).await;
    let (_, agent_token) = app.user("agent@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;
    app.team(&admin, league_id, division_id, "Hawks", hawks_captain.email.as_str()).await;
    app.team(&admin, league_id, division_id, "Owls", owls_captain.email.as_str()).await;
    let free_agent_id = app.free_agent(&agent_token, league_id, division_id, "agent@example.com").await;
    let invite_uri = format!("/api/free-agents/{}/invite", free_agent_id);

    let (status, from_hawks) = app.call("POST", &invite_uri, Some(hawks_token.as_str()), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", from_hawks);
    let (status, from_owls) = app.call("POST", &invite_uri, Some(owls_token.as_str()), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", from_owls);

    let (status, _) = app
        .call(
            "POST",
            &format!("/api/invitations/{}/accept", from_hawks["id"].as_str().unwrap()),
            Some(agent_token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, received) = app.call("GET", "/api/invitations/received", Some(agent_token.as_str()), None).await;
    let status_of = |id: &Value| {
        received
            .as_array()
            .unwrap()
            .iter()
            .find(|i| &i["id"] == id)
            .map(|i| i["status"].clone())
            .unwrap()
    };
    assert_eq!(status_of(&from_hawks["id"]), "ACCEPTED");
    assert_eq!(status_of(&from_owls["id"]), "CANCELLED");

    let (_, sent) = app.call("GET", "/api/invitations/sent", Some(owls_token.as_str()), None).await;
    assert_eq!(sent["CANCELLED"].as_array().unwrap().len(), 1);
    assert!(sent["PENDING"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_invitation_expires_on_read() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (captain, captain_token) = app.user("coach@example.com", UserType::Customer).await;
    let (_, agent_token) = app.user("agent@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;
    app.team(&admin, league_id, division_id, "Hawks", captain.email.as_str()).await;
    let free_agent_id = app.free_agent(&agent_token, league_id, division_id, "agent@example.com").await;
    let invite_uri = format!("/api/free-agents/{}/invite", free_agent_id);

    let (_, invitation) = app.call("POST", &invite_uri, Some(captain_token.as_str()), Some(json!({}))).await;
    let invitation_id: Uuid = invitation["id"].as_str().unwrap().parse().unwrap();

    // Sent eight days ago, past the default seven-day window
    let mut stored = app.state.invitations.find_by_id(invitation_id).await.unwrap().unwrap();
    stored.created_at = Utc::now() - Duration::days(8);
    app.state.invitations.update(&stored).await.unwrap();

    let (_, received) = app.call("GET", "/api/invitations/received", Some(agent_token.as_str()), None).await;
    assert_eq!(received[0]["status"], "EXPIRED");

    let persisted = app.state.invitations.find_by_id(invitation_id).await.unwrap().unwrap();
    assert_eq!(serde_json::to_value(persisted.status).unwrap(), "EXPIRED");

    let (_, free_agent) = app
        .call("GET", &format!("/api/free-agents/{}", free_agent_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(free_agent["status"], "AVAILABLE");

    let (status, _) = app
        .call("POST", &format!("/api/invitations/{}/accept", invitation_id), Some(agent_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, reopened) = app.call("POST", &invite_uri, Some(captain_token.as_str()), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", reopened);
    assert_eq!(reopened["id"], invitation_id.to_string());
    assert_eq!(reopened["status"], "PENDING");
}

#[tokio::test]
async fn test_success_hides_registration_from_other_accounts() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (_, token) = app.user("parent@example.com", UserType::Customer).await;
    let (_, stranger) = app.user("stranger@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;

    let (_, started) = app
        .call(
            "POST",
            &format!("/api/leagues/{}/checkout", league_id),
            Some(token.as_str()),
            Some(player_body(division_id, "parent@example.com")),
        )
        .await;
    let session_id = started["session_id"].as_str().unwrap();
    app.gateway.mark_paid(session_id);
    let success_uri = format!("/api/registrations/success?session_id={}", session_id);

    let (status, registration) = app.call("GET", &success_uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK, "{}", registration);

    let (status, body) = app.call("GET", &success_uri, Some(stranger.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "This registration belongs to another account");

    let (status, seen_by_admin) = app.call("GET", &success_uri, Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seen_by_admin["id"], registration["id"]);
}

#[tokio::test]
async fn test_long_notes_fit_checkout_metadata() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@league.test", UserType::Admin).await;
    let (_, token) = app.user("parent@example.com", UserType::Customer).await;
    let (league_id, division_id) = app.league(&admin).await;

    let mut body = player_body(division_id, "parent@example.com");
    body["notes"] = json!("Prefers defense. ".repeat(100));
    let (status, started) = app
        .call("POST", &format!("/api/leagues/{}/checkout", league_id), Some(token.as_str()), Some(body))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", started);

    let request = app.gateway.last_request();
    assert!(request.metadata["player_data"].chars().count() <= METADATA_VALUE_LIMIT);
}
