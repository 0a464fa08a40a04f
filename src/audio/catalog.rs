use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SoundKind {
    Ocean,
    Rain,
    Forest,
    Fireplace,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Sound {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: SoundKind,
}

pub const SOUNDS: [Sound; 4] = [
    Sound {
        id: "ocean",
        name: "Ocean Waves",
        kind: SoundKind::Ocean,
    },
    Sound {
        id: "rain",
        name: "Gentle Rain",
        kind: SoundKind::Rain,
    },
    Sound {
        id: "forest",
        name: "Forest Night",
        kind: SoundKind::Forest,
    },
    Sound {
        id: "fireplace",
        name: "Fireplace",
        kind: SoundKind::Fireplace,
    },
];

pub fn find(id: &str) -> Option<&'static Sound> {
    SOUNDS.iter().find(|s| s.id == id)
}
