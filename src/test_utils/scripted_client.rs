use crate::http::{HttpClient, HttpResponse};
use anyhow::Result;
use reqwest::Url;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replays canned responses per URL.
///
/// Each URL owns a queue; responses are handed out in order and the last one
/// repeats forever. Unknown URLs answer `404`.
#[derive(Default)]
pub struct ScriptedClient {
    routes: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(self, url: &str, response: HttpResponse) -> Self {
        self.route_sequence(url, vec![response])
    }

    #[must_use]
    pub fn route_sequence(self, url: &str, responses: Vec<HttpResponse>) -> Self {
        self.routes.lock().unwrap().insert(url.to_string(), responses.into());
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(url.as_str()) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| HttpResponse::status(404)))
    }
}
