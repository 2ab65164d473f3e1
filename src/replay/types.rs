use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPoint {
    #[serde(rename = "X", default)]
    pub x: Option<i64>,
    #[serde(rename = "Y", default)]
    pub y: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDeath {
    #[serde(rename = "Cause", default)]
    pub cause: String,
    #[serde(rename = "Turn", default)]
    pub turn: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnake {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Health", default)]
    pub health: i64,
    #[serde(rename = "Color", default)]
    pub color: String,
    #[serde(rename = "Body", default)]
    pub body: Vec<RawPoint>,
    #[serde(rename = "Death", default)]
    pub death: Option<RawDeath>,
}

/// One turn as the engine reports it. Every field except a snake's id may be
/// missing; the engine drops zero values on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(rename = "Turn", default)]
    pub turn: Option<u32>,
    #[serde(rename = "Food", default)]
    pub food: Vec<RawPoint>,
    #[serde(rename = "Snakes", default)]
    pub snakes: Vec<RawSnake>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameInfo {
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Width", default)]
    pub width: u32,
    #[serde(rename = "Height", default)]
    pub height: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameMeta {
    #[serde(rename = "Game", default)]
    pub game: GameInfo,
}

impl GameMeta {
    pub fn is_running(&self) -> bool {
        self.game.status == "running"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Head,
    Body,
    Tail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub x: i64,
    pub y: i64,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub kind: SegmentType,
    #[serde(rename = "shouldRender")]
    pub should_render: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Death {
    pub cause: String,
    pub turn: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snake {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub health: i64,
    pub color: String,
    pub body: Vec<Segment>,
    #[serde(rename = "isDead")]
    pub is_dead: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death: Option<Death>,
    // Rendering hints, filled in by whoever picks the sprites.
    pub head: Option<String>,
    pub tail: Option<String>,
    #[serde(rename = "headSvg")]
    pub head_svg: Option<String>,
    #[serde(rename = "tailSvg")]
    pub tail_svg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub turn: u32,
    pub food: Vec<Point>,
    pub snakes: Vec<Snake>,
    #[serde(rename = "gameOver")]
    pub game_over: bool,
}
