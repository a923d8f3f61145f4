//! Backend API client - one HTTP round trip per operation
//!
//! Reads are `GET <endpoint>?action=...`, writes carry a JSON body with an
//! `action` field. Each call returns the one field of the response body it
//! cares about.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::Config;
use crate::models::{Chat, ChatId, ChatKind, Message, MessageId, ProfileUpdate, User, UserId};
use crate::network::error::ApiError;

/// Result of a phone-number login
#[derive(Clone, Debug, PartialEq)]
pub enum LoginOutcome {
    Found(User),
    /// No account with that phone; the caller should offer registration
    NotFound,
}

/// Thin wrapper around the users and chats endpoints
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    users_api: String,
    chats_api: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoints(config.users_api.clone(), config.chats_api.clone(), config.timeout())
    }

    pub fn with_endpoints(users_api: impl Into<String>, chats_api: impl Into<String>, timeout: Duration) -> Self {
        ApiClient {
            http: create_client(timeout),
            users_api: users_api.into(),
            chats_api: chats_api.into(),
        }
    }

    // ========================
    // Users endpoint
    // ========================

    pub async fn login(&self, phone: &str) -> Result<LoginOutcome, ApiError> {
        let resp = self
            .http
            .get(&self.users_api)
            .query(&[("action", "login"), ("phone", phone)])
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(LoginOutcome::NotFound);
        }
        let mut body = check_status(status, &text)?;
        if body.get("success").and_then(Value::as_bool) != Some(true) {
            return Ok(LoginOutcome::NotFound);
        }
        Ok(LoginOutcome::Found(take_field(&mut body, "user")?))
    }

    pub async fn get_profile(&self, user_id: UserId) -> Result<User, ApiError> {
        let user_id = user_id.to_string();
        let mut body = self
            .get(&self.users_api, &[("action", "get_profile"), ("user_id", &user_id)])
            .await?;
        take_field(&mut body, "user")
    }

    pub async fn create_user(&self, username: &str, phone: &str) -> Result<UserId, ApiError> {
        let body = json!({ "action": "create_user", "username": username, "phone": phone });
        let mut body = self.send(Method::POST, &self.users_api, &body).await?;
        take_field(&mut body, "user_id")
    }

    /// Only the fields present in `update` are changed
    pub async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> Result<bool, ApiError> {
        let mut body = serde_json::to_value(update)?;
        if let Value::Object(map) = &mut body {
            map.insert("user_id".to_string(), json!(user_id));
        }
        let mut body = self.send(Method::PUT, &self.users_api, &body).await?;
        take_field(&mut body, "success")
    }

    pub async fn get_contacts(&self, user_id: UserId) -> Result<Vec<User>, ApiError> {
        let user_id = user_id.to_string();
        let mut body = self
            .get(&self.users_api, &[("action", "get_contacts"), ("user_id", &user_id)])
            .await?;
        take_field(&mut body, "contacts")
    }

    pub async fn add_contact(&self, user_id: UserId, contact_user_id: UserId) -> Result<bool, ApiError> {
        let body = json!({ "action": "add_contact", "user_id": user_id, "contact_user_id": contact_user_id });
        let mut body = self.send(Method::POST, &self.users_api, &body).await?;
        take_field(&mut body, "success")
    }

    // ========================
    // Chats endpoint
    // ========================

    pub async fn get_chats(&self, user_id: UserId) -> Result<Vec<Chat>, ApiError> {
        let user_id = user_id.to_string();
        let mut body = self
            .get(&self.chats_api, &[("action", "get_chats"), ("user_id", &user_id)])
            .await?;
        take_field(&mut body, "chats")
    }

    pub async fn get_messages(&self, chat_id: ChatId) -> Result<Vec<Message>, ApiError> {
        let chat_id = chat_id.to_string();
        let mut body = self
            .get(&self.chats_api, &[("action", "get_messages"), ("chat_id", &chat_id)])
            .await?;
        take_field(&mut body, "messages")
    }

    pub async fn create_chat(&self, name: &str, kind: &ChatKind, user_id: UserId) -> Result<ChatId, ApiError> {
        let body = json!({ "action": "create_chat", "name": name, "type": kind.as_str(), "user_id": user_id });
        let mut body = self.send(Method::POST, &self.chats_api, &body).await?;
        take_field(&mut body, "chat_id")
    }

    pub async fn send_message(&self, chat_id: ChatId, user_id: UserId, text: &str) -> Result<MessageId, ApiError> {
        let body = json!({ "action": "send_message", "chat_id": chat_id, "user_id": user_id, "text": text });
        let mut body = self.send(Method::POST, &self.chats_api, &body).await?;
        take_field(&mut body, "message_id")
    }

    // ========================
    // Plumbing
    // ========================

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let resp = self.http.get(url).query(query).send().await?;
        read_body(resp).await
    }

    async fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value, ApiError> {
        let resp = self.http.request(method, url).json(body).send().await?;
        read_body(resp).await
    }
}

async fn read_body(resp: reqwest::Response) -> Result<Value, ApiError> {
    let status = resp.status();
    let text = resp.text().await?;
    check_status(status, &text)
}

/// Non-2xx becomes `ApiError::Status`, using the backend's `error` text when it sent one
fn check_status(status: StatusCode, text: &str) -> Result<Value, ApiError> {
    let parsed = serde_json::from_str::<Value>(text);
    if !status.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(parsed?)
}

fn take_field<T: DeserializeOwned>(body: &mut Value, name: &'static str) -> Result<T, ApiError> {
    match body.get_mut(name).map(Value::take) {
        None | Some(Value::Null) => Err(ApiError::MissingField(name)),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// What the fake backend saw
    struct Captured {
        request_line: String,
        body: String,
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// Accept one connection, record the request, answer with `status` and `body`
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find(&buf, b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break buf.len();
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            Captured {
                request_line: head.lines().next().unwrap_or_default().to_string(),
                body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
            }
        });

        (format!("http://{}/", addr), handle)
    }

    fn client_for(url: &str) -> ApiClient {
        ApiClient::with_endpoints(url, url, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_login_found() {
        let (url, server) = serve_once(
            200,
            r#"{"success": true, "user": {"id": 5, "username": "anna", "phone": "+79991234567", "bio": null, "avatar_url": null, "created_at": "2024-05-01 10:00:00"}}"#,
        )
        .await;

        let outcome = client_for(&url).login("+79991234567").await.unwrap();
        let captured = server.await.unwrap();

        assert!(captured.request_line.starts_with("GET /?"));
        assert!(captured.request_line.contains("action=login"));
        assert!(captured.request_line.contains("phone=%2B79991234567"));
        match outcome {
            LoginOutcome::Found(user) => {
                assert_eq!(user.id, 5);
                assert_eq!(user.username, "anna");
            }
            LoginOutcome::NotFound => panic!("expected a user"),
        }
    }

    #[tokio::test]
    async fn test_login_not_found_on_404() {
        let (url, server) = serve_once(404, r#"{"error": "User not found", "success": false}"#).await;
        let outcome = client_for(&url).login("+1").await.unwrap();
        server.await.unwrap();
        assert_eq!(outcome, LoginOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_login_not_found_on_success_false() {
        let (url, server) = serve_once(200, r#"{"success": false}"#).await;
        let outcome = client_for(&url).login("+1").await.unwrap();
        server.await.unwrap();
        assert_eq!(outcome, LoginOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_get_chats_query_and_decode() {
        let (url, server) = serve_once(
            200,
            r#"{"chats": [{"id": 1, "name": "Work", "type": "group", "last_message": "hi", "last_message_time": "2024-05-01 12:45:10", "unread_count": 3}]}"#,
        )
        .await;

        let chats = client_for(&url).get_chats(7).await.unwrap();
        let captured = server.await.unwrap();

        assert!(captured.request_line.contains("action=get_chats"));
        assert!(captured.request_line.contains("user_id=7"));
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].kind(), ChatKind::Group);
        assert_eq!(chats[0].unread(), 3);
    }

    #[tokio::test]
    async fn test_send_message_posts_action_body() {
        let (url, server) = serve_once(201, r#"{"message_id": 99, "created_at": "2024-05-01 12:00:00", "success": true}"#).await;

        let id = client_for(&url).send_message(3, 7, "hello").await.unwrap();
        let captured = server.await.unwrap();

        assert_eq!(id, 99);
        assert!(captured.request_line.starts_with("POST "));
        let body: Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(body, json!({"action": "send_message", "chat_id": 3, "user_id": 7, "text": "hello"}));
    }

    #[tokio::test]
    async fn test_update_profile_puts_only_present_fields() {
        let (url, server) = serve_once(200, r#"{"success": true}"#).await;
        let update = ProfileUpdate {
            bio: Some("hi there".into()),
            ..ProfileUpdate::default()
        };

        let ok = client_for(&url).update_profile(7, &update).await.unwrap();
        let captured = server.await.unwrap();

        assert!(ok);
        assert!(captured.request_line.starts_with("PUT "));
        let body: Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(body, json!({"user_id": 7, "bio": "hi there"}));
    }

    #[tokio::test]
    async fn test_create_chat_sends_kind_as_type() {
        let (url, server) = serve_once(201, r#"{"chat_id": 12, "success": true}"#).await;
        let id = client_for(&url).create_chat("Team", &ChatKind::Group, 7).await.unwrap();
        let captured = server.await.unwrap();

        assert_eq!(id, 12);
        let body: Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(body["type"], "group");
        assert_eq!(body["action"], "create_chat");
    }

    #[tokio::test]
    async fn test_server_error_carries_backend_message() {
        let (url, server) = serve_once(500, r#"{"error": "database is down"}"#).await;
        let err = client_for(&url).get_messages(1).await.unwrap_err();
        server.await.unwrap();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database is down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_field_is_reported() {
        let (url, server) = serve_once(200, r#"{"something_else": []}"#).await;
        let err = client_for(&url).get_contacts(1).await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, ApiError::MissingField("contacts")));
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (url, server) = serve_once(200, "<html>oops</html>").await;
        let err = client_for(&url).get_profile(1).await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_create_user_posts_action_body() {
        let (url, server) = serve_once(201, r#"{"user_id": 17, "success": true}"#).await;

        let id = client_for(&url).create_user("Ivan", "+79991234567").await.unwrap();
        let captured = server.await.unwrap();

        assert_eq!(id, 17);
        assert!(captured.request_line.starts_with("POST "));
        let body: Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(body, json!({"action": "create_user", "username": "Ivan", "phone": "+79991234567"}));
    }

    #[tokio::test]
    async fn test_add_contact_posts_action_body() {
        let (url, server) = serve_once(201, r#"{"success": true}"#).await;

        let ok = client_for(&url).add_contact(7, 9).await.unwrap();
        let captured = server.await.unwrap();

        assert!(ok);
        assert!(captured.request_line.starts_with("POST "));
        let body: Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(body, json!({"action": "add_contact", "user_id": 7, "contact_user_id": 9}));
    }

    #[tokio::test]
    async fn test_get_profile_query_and_decode() {
        let (url, server) = serve_once(
            200,
            r#"{"user": {"id": 7, "username": "anna", "phone": "+79991234567", "bio": "hi", "avatar_url": null, "created_at": "2024-05-01 10:00:00"}}"#,
        )
        .await;

        let user = client_for(&url).get_profile(7).await.unwrap();
        let captured = server.await.unwrap();

        assert!(captured.request_line.starts_with("GET /?"));
        assert!(captured.request_line.contains("action=get_profile"));
        assert!(captured.request_line.contains("user_id=7"));
        assert_eq!(user.username, "anna");
        assert_eq!(user.bio.as_deref(), Some("hi"));
        assert_eq!(user.avatar_url, None);
    }

    #[tokio::test]
    async fn test_get_profile_404_is_not_found() {
        let (url, server) = serve_once(404, r#"{"error": "User not found"}"#).await;
        let err = client_for(&url).get_profile(7).await.unwrap_err();
        server.await.unwrap();
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "User not found");
    }

    #[tokio::test]
    async fn test_get_contacts_decodes_online_flag() {
        let (url, server) = serve_once(
            200,
            r#"{"contacts": [{"id": 2, "username": "anna", "phone": "+79991234567", "is_online": true}, {"id": 3, "username": "boris"}]}"#,
        )
        .await;

        let contacts = client_for(&url).get_contacts(7).await.unwrap();
        let captured = server.await.unwrap();

        assert!(captured.request_line.contains("action=get_contacts"));
        assert!(captured.request_line.contains("user_id=7"));
        assert_eq!(contacts.len(), 2);
        assert!(contacts[0].online());
        assert!(!contacts[1].online());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}/", addr)).get_chats(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
