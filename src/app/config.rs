use crate::replay::constants::FRAME_DELAY_MS;
use anyhow::Context;
use std::env;
use std::time::Duration;

const DEFAULT_ENGINE_URL: &str = "http://localhost:3005";
const DEFAULT_PORT: u16 = 8787;

/// Per-session options: which engine and game to watch and how to start.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub engine: String,
    pub game: String,
    pub turn: Option<u32>,
    pub autoplay: bool,
    pub frame_delay: Duration,
}

impl ViewerOptions {
    pub fn new(engine: impl Into<String>, game: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            game: game.into(),
            turn: None,
            autoplay: false,
            frame_delay: Duration::from_millis(FRAME_DELAY_MS),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let game = env::var("GAME_ID")
            .map(|value| value.trim().to_string())
            .ok()
            .filter(|value| !value.is_empty())
            .context("missing GAME_ID")?;
        let engine = env::var("ENGINE_URL")
            .map(|value| value.trim().to_string())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string());
        Ok(Self {
            turn: env::var("TURN").ok().and_then(|value| parse_turn(&value)),
            autoplay: env::var("AUTOPLAY")
                .map(|value| parse_flag(&value))
                .unwrap_or(false),
            frame_delay: Duration::from_millis(
                env::var("FRAME_DELAY_MS")
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(FRAME_DELAY_MS),
            ),
            ..Self::new(engine, game)
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE")
}

// Turn 0 is where every session starts anyway, so it is not a jump target.
fn parse_turn(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|turn| *turn > 0)
}
