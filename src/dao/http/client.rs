use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    dao::{
        error::{RepositoryError, RepositoryResult},
        repository::{
            ActivationRepository, CheckInRepository, EventRepository, LeaderboardRepository,
        },
    },
    dto::{
        activation::{AnswerRequest, BalanceUpdate, NoiseMeterRequest},
        check_in::{CheckInProof, CheckInReceipt},
        event::EventDto,
        leaderboard::LeaderboardDto,
    },
    state::event::{Event, Leaderboard},
};

use super::config::HttpConfig;

/// REST client implementing every repository against the gameday API.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Arc<Url>,
    token: Option<Arc<str>>,
}

impl HttpApiClient {
    /// Build the client; fails on an unusable base URL or TLS setup.
    pub fn new(config: HttpConfig) -> RepositoryResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|source| {
            RepositoryError::transport_caused_by(
                format!("invalid API base URL `{}`", config.base_url),
                source,
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RepositoryError::transport(format!(
                "API base URL `{base_url}` cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| {
                RepositoryError::transport_caused_by("failed to build HTTP client", source)
            })?;

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            token: config.bearer_token.map(Arc::from),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = Url::clone(&self.base_url);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        if let Some(ref token) = self.token {
            builder.bearer_auth(token.as_ref())
        } else {
            builder
        }
    }

    async fn get_json<T>(&self, url: Url) -> RepositoryResult<T>
    where
        T: DeserializeOwned,
    {
        let path = url.path().to_string();
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|source| {
                RepositoryError::transport_caused_by(format!("GET `{path}` failed"), source)
            })?;
        read_json(path, response).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> RepositoryResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = url.path().to_string();
        let response = self
            .request(Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|source| {
                RepositoryError::transport_caused_by(format!("POST `{path}` failed"), source)
            })?;
        read_json(path, response).await
    }
}

async fn read_json<T>(path: String, response: reqwest::Response) -> RepositoryResult<T>
where
    T: DeserializeOwned,
{
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(RepositoryError::Unauthorized),
        StatusCode::NOT_FOUND => Err(RepositoryError::NotFound(path)),
        status if status.is_success() => response
            .json::<T>()
            .await
            .map_err(|source| RepositoryError::decode(path, source)),
        other => Err(RepositoryError::Status {
            path,
            status: other.as_u16(),
        }),
    }
}

impl EventRepository for HttpApiClient {
    fn fetch_event(&self, event_id: &str) -> BoxFuture<'static, RepositoryResult<Event>> {
        let this = self.clone();
        let url = self.url(&["events", event_id]);
        async move {
            let dto: EventDto = this.get_json(url).await?;
            Ok(dto.into())
        }
        .boxed()
    }
}

impl CheckInRepository for HttpApiClient {
    fn submit_check_in(
        &self,
        event_id: &str,
        proof: CheckInProof,
    ) -> BoxFuture<'static, RepositoryResult<CheckInReceipt>> {
        let this = self.clone();
        let url = self.url(&["events", event_id, "check-ins"]);
        async move { this.post_json(url, &proof).await }.boxed()
    }
}

impl ActivationRepository for HttpApiClient {
    fn submit_answer(
        &self,
        activation_id: &str,
        option_id: &str,
    ) -> BoxFuture<'static, RepositoryResult<BalanceUpdate>> {
        let this = self.clone();
        let url = self.url(&["activations", activation_id, "answers"]);
        let option_id = option_id.to_string();
        async move {
            let body = AnswerRequest {
                option_id: &option_id,
            };
            this.post_json(url, &body).await
        }
        .boxed()
    }

    fn submit_noise_meter(
        &self,
        activation_id: &str,
        level: f64,
    ) -> BoxFuture<'static, RepositoryResult<BalanceUpdate>> {
        let this = self.clone();
        let url = self.url(&["activations", activation_id, "noise-meter"]);
        async move { this.post_json(url, &NoiseMeterRequest { level }).await }.boxed()
    }
}

impl LeaderboardRepository for HttpApiClient {
    fn fetch_leaderboard(&self, event_id: &str) -> BoxFuture<'static, RepositoryResult<Leaderboard>> {
        let this = self.clone();
        let url = self.url(&["events", event_id, "leaderboard"]);
        async move {
            let dto: LeaderboardDto = this.get_json(url).await?;
            Ok(dto.into())
        }
        .boxed()
    }
}
