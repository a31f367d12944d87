// Commands understood by the external playback control executable
use serde::{Serialize, Deserialize};
use strum_macros::{Display, EnumString, AsRefStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ControlCommand {
    /// Toggle between play and pause
    #[serde(rename = "playpause")]
    #[strum(serialize = "playpause")]
    PlayPause,

    /// Skip to the next track
    Next,

    /// Go back to the previous track
    Previous,

    /// Ask the executable for a textual description of the current state
    FetchState,
}
