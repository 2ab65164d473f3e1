use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Reload,
    TogglePause,
    StepBackward,
    StepForward,
}

impl ControlCommand {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "r" => Some(Self::Reload),
            "space" => Some(Self::TogglePause),
            "left" | "arrowleft" => Some(Self::StepBackward),
            "right" | "arrowright" => Some(Self::StepForward),
            _ => None,
        }
    }
}

/// Which media buttons a host should offer for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub reload: bool,
    #[serde(rename = "playPause")]
    pub play_pause: bool,
    pub backward: bool,
    pub forward: bool,
    #[serde(rename = "playLabel")]
    pub play_label: &'static str,
}

impl Controls {
    pub fn for_state(turn: u32, paused: bool) -> Self {
        let rewindable = paused && turn != 0;
        Self {
            reload: rewindable,
            play_pause: true,
            backward: rewindable,
            forward: paused,
            play_label: if paused { "Play" } else { "Pause" },
        }
    }
}
