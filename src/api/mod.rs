mod http;

pub use http::HttpPollApi;

use crate::error::RequestError;
use crate::models::{NewPoll, Poll, PollId, PollStats, ServerStatus};
use async_trait::async_trait;

// Remote poll repository. Every call is a single round trip; nothing is cached.
#[async_trait]
pub trait PollApi: Send + Sync + 'static {
    // GET /polls
    async fn list_polls(&self) -> Result<Vec<Poll>, RequestError>;

    // GET /polls/{id}; a missing poll is RequestError::NotFound
    async fn get_poll(&self, id: PollId) -> Result<Poll, RequestError>;

    // POST /polls. The body is validated by the caller; the server may or may
    // not echo the created poll back.
    async fn create_poll(&self, poll: &NewPoll) -> Result<Option<Poll>, RequestError>;

    // DELETE /polls/{id}
    async fn delete_poll(&self, id: PollId) -> Result<(), RequestError>;

    // POST /polls/{id}/vote. Tallies are never patched locally.
    async fn vote(&self, id: PollId, option_index: usize) -> Result<(), RequestError>;

    // GET /polls/{id}/stats
    async fn poll_stats(&self, id: PollId) -> Result<PollStats, RequestError>;

    // POST /init-data
    async fn seed_samples(&self) -> Result<ServerStatus, RequestError>;

    // GET /
    async fn health(&self) -> Result<ServerStatus, RequestError>;
}
