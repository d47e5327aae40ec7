use super::*;
use crate::ARCHIVE_MAX_GAMES;
use crate::ndjson::Framer;
use serde_json::Value;
use std::collections::BTreeMap;

/// Public export endpoints. No credential needed.
#[derive(Debug, Clone)]
pub struct Archive {
    http: reqwest::Client,
    base: String,
}

impl Archive {
    pub fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn profile(&self, username: &str) -> anyhow::Result<Value> {
        let url = format!("{}/api/user/{}", self.base, username);
        log::debug!("fetching profile of {}", username);
        Ok(self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?)
    }

    /// Most recent games first, at most [`ARCHIVE_MAX_GAMES`].
    pub async fn games(&self, username: &str, max: usize) -> anyhow::Result<Vec<Value>> {
        let max = max.min(ARCHIVE_MAX_GAMES);
        let url = format!("{}/api/games/user/{}", self.base, username);
        log::info!("fetching {} past games of {}", max, username);
        let body = self
            .http
            .get(&url)
            .query(&[("max", max.to_string()), ("sort", "dateDesc".to_string())])
            .header(reqwest::header::ACCEPT, "application/x-ndjson")
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let games = Self::parse(&body);
        log::info!("fetched {} games of {}", games.len(), username);
        Ok(games)
    }

    /// The game the player is in right now, with its position.
    pub async fn current_game(&self, username: &str) -> anyhow::Result<CurrentGame> {
        let url = format!("{}/api/user/{}/current-game", self.base, username);
        log::debug!("fetching current game of {}", username);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("no active game found for {} ({})", username, response.status());
        }
        Ok(CurrentGame::new(username, response.json::<Value>().await?))
    }

    /// Recent games of one player as a [`Dataset`].
    pub async fn dataset(&self, username: &str, max: usize) -> anyhow::Result<Dataset> {
        let games = self.games(username, max).await?;
        Ok(Dataset::from(games.as_slice()))
    }

    /// Recent games of several players merged into one [`Dataset`]. A player
    /// whose export fails is recorded as such and skipped.
    pub async fn batch(&self, usernames: &[String], max: usize) -> Dataset {
        log::info!("fetching games of {} players", usernames.len());
        let mut games = Vec::new();
        let mut fetched = BTreeMap::new();
        for username in usernames {
            let status = match self.games(username, max).await {
                Ok(mut more) => {
                    let status = Fetched::Success {
                        games_count: more.len(),
                    };
                    games.append(&mut more);
                    status
                }
                Err(e) => {
                    log::warn!("could not fetch games of {}: {}", username, e);
                    Fetched::Error {
                        error: e.to_string(),
                    }
                }
            };
            fetched.insert(username.clone(), status);
        }
        let mut dataset = Dataset::from(games.as_slice());
        dataset.user_stats = fetched;
        dataset
    }

    /// Every well-formed line of an NDJSON export.
    fn parse(body: &[u8]) -> Vec<Value> {
        let mut framer = Framer::default();
        framer
            .feed(body)
            .into_iter()
            .chain(framer.finish())
            .filter_map(|line| match serde_json::from_str::<Value>(&line) {
                Ok(game) => Some(game),
                Err(e) => {
                    log::warn!("skipping exported game: {}", e);
                    None
                }
            })
            .collect()
    }
}
