use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::PollApi;
use crate::error::RequestError;
use crate::models::{NewPoll, Poll, PollId, PollStats, ServerStatus, VoteRequest};

pub struct HttpPollApi {
    client: Client,
    base_url: Url,
}

// FastAPI-style error body: {"detail": "..."} or {"detail": [...]}
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpPollApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, RequestError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        info!("Using poll service at {}", base_url);
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    // Map non-2xx responses to errors, keeping the server's detail message
    async fn check(response: Response, id: Option<PollId>) -> Result<Response, RequestError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(RequestError::NotFound(id));
            }
        }

        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { detail: serde_json::Value::String(s) }) => s,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) => body,
        };
        Err(RequestError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RequestError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PollApi for HttpPollApi {
    async fn list_polls(&self) -> Result<Vec<Poll>, RequestError> {
        let response = self.client.get(self.endpoint("/polls")).send().await?;
        let polls: Vec<Poll> = Self::decode(Self::check(response, None).await?).await?;
        debug!("Fetched {} polls", polls.len());
        Ok(polls.into_iter().map(Poll::aligned).collect())
    }

    async fn get_poll(&self, id: PollId) -> Result<Poll, RequestError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/polls/{}", id)))
            .send()
            .await?;
        let poll: Poll = Self::decode(Self::check(response, Some(id)).await?).await?;
        Ok(poll.aligned())
    }

    async fn create_poll(&self, poll: &NewPoll) -> Result<Option<Poll>, RequestError> {
        let response = self
            .client
            .post(self.endpoint("/polls"))
            .json(poll)
            .send()
            .await?;
        let bytes = Self::check(response, None).await?.bytes().await?;

        // Success status is enough; the echoed poll is a bonus
        match serde_json::from_slice::<Poll>(&bytes) {
            Ok(created) => {
                info!("Created poll {}: {}", created.id, created.question);
                Ok(Some(created.aligned()))
            }
            Err(e) => {
                debug!("Create response did not contain a poll: {}", e);
                Ok(None)
            }
        }
    }

    async fn delete_poll(&self, id: PollId) -> Result<(), RequestError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/polls/{}", id)))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        info!("Deleted poll {}", id);
        Ok(())
    }

    async fn vote(&self, id: PollId, option_index: usize) -> Result<(), RequestError> {
        let response = self
            .client
            .post(self.endpoint(&format!("/polls/{}/vote", id)))
            .json(&VoteRequest { option_index })
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        info!("Recorded vote: poll_id={}, option_index={}", id, option_index);
        Ok(())
    }

    async fn poll_stats(&self, id: PollId) -> Result<PollStats, RequestError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/polls/{}/stats", id)))
            .send()
            .await?;
        Self::decode(Self::check(response, Some(id)).await?).await
    }

    async fn seed_samples(&self) -> Result<ServerStatus, RequestError> {
        let response = self.client.post(self.endpoint("/init-data")).send().await?;
        Self::decode(Self::check(response, None).await?).await
    }

    async fn health(&self) -> Result<ServerStatus, RequestError> {
        let response = self.client.get(self.endpoint("/")).send().await?;
        Self::decode(Self::check(response, None).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    // Accepts one connection, answers with a canned response and returns the raw request
    async fn serve_once(status_line: &'static str, body: &'static str) -> (HttpPollApi, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        let client = Client::builder().no_proxy().build().unwrap();
        let base = Url::parse(&format!("http://{}", addr)).unwrap();
        (HttpPollApi::with_client(client, base), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    #[tokio::test]
    async fn list_polls_aligns_votes() {
        let (api, server) = serve_once(
            "200 OK",
            r#"[{"id": 1, "question": "Q", "options": ["A", "B"], "votes": [2]}]"#,
        )
        .await;

        let polls = api.list_polls().await.unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].votes, vec![2, 0]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /polls HTTP/1.1"));
    }

    #[tokio::test]
    async fn empty_list_is_not_an_error() {
        let (api, _server) = serve_once("200 OK", "[]").await;
        assert!(api.list_polls().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_poll_is_not_found() {
        let (api, _server) = serve_once("404 Not Found", r#"{"detail": "missing"}"#).await;
        let err = api.get_poll(PollId(42)).await.unwrap_err();
        assert!(matches!(err, RequestError::NotFound(PollId(42))));
    }

    #[tokio::test]
    async fn vote_posts_option_index() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"id": 3, "question": "Q", "options": ["A", "B"], "votes": [0, 1]}"#,
        )
        .await;

        api.vote(PollId(3), 1).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /polls/3/vote HTTP/1.1"));
        assert!(request.ends_with(r#"{"option_index":1}"#));
    }

    #[tokio::test]
    async fn create_sends_body_and_tolerates_bare_status() {
        let (api, server) = serve_once("201 Created", r#"{"status": "ok"}"#).await;
        let new_poll = NewPoll {
            question: "Q".into(),
            options: vec!["A".into(), "B".into()],
        };

        assert_eq!(api.create_poll(&new_poll).await.unwrap(), None);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /polls HTTP/1.1"));
        assert!(request.ends_with(r#"{"question":"Q","options":["A","B"]}"#));
    }

    #[tokio::test]
    async fn server_detail_is_kept_on_failure() {
        let (api, _server) = serve_once(
            "400 Bad Request",
            r#"{"detail": "invalid option"}"#,
        )
        .await;

        match api.delete_poll(PollId(1)).await.unwrap_err() {
            RequestError::Status { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "invalid option");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let api = HttpPollApi::with_client(client, Url::parse(&format!("http://{}", addr)).unwrap());
        assert!(matches!(
            api.list_polls().await.unwrap_err(),
            RequestError::Transport(_)
        ));
    }
}
