use serde::Deserialize;

use crate::geometry::Rect;

/// One `room_NN.toml` file.
#[derive(Debug, Deserialize)]
pub struct RoomDef {
    pub meta: RoomMeta,
    pub narrative: Narrative,
    pub layout: LayoutDef,
    pub activity: ActivityDef,
    /// When false the transition opens without finishing the activity.
    #[serde(default = "default_true")]
    pub requires_activity: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoomMeta {
    pub id: String,
    pub room_number: u32,
    pub title: String,
    pub concept: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Narrative {
    pub intro: String,
    pub success: String,
    #[serde(default)]
    pub failure: Option<String>,
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Concept {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionRule {
    /// Player body overlaps the padded transition rect.
    #[default]
    Overlap,
    /// Player centre lies inside the transition rect.
    Centre,
}

#[derive(Debug, Deserialize)]
pub struct LayoutDef {
    /// Background offset added to every rect and the spawn point.
    #[serde(default)]
    pub offset: [i32; 2],
    #[serde(default)]
    pub collision: Vec<Rect>,
    pub mission: Rect,
    #[serde(default)]
    pub mission_padding: Option<[i32; 2]>,
    pub transition: Rect,
    #[serde(default)]
    pub transition_padding: Option<[i32; 2]>,
    #[serde(default)]
    pub transition_rule: TransitionRule,
    #[serde(default)]
    pub spawn: Option<[i32; 2]>,
    #[serde(default)]
    pub info: Option<Rect>,
    #[serde(default)]
    pub info_padding: Option<[i32; 2]>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KindDef {
    Quiz,
    Matching,
    Ordering,
    Board,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationDef {
    Immediate,
    ExplicitSubmit,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleDef {
    FullMatch,
    Membership,
}

#[derive(Debug, Deserialize)]
pub struct ActivityDef {
    pub kind: KindDef,
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub error_budget: Option<u32>,
    #[serde(default)]
    pub evaluation: Option<EvaluationDef>,
    #[serde(default)]
    pub rule: Option<RuleDef>,
    #[serde(default)]
    pub slot_capacity: Option<usize>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub auto_advance_ticks: Option<u32>,
    #[serde(default)]
    pub questions: Vec<QuestionDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub slots: Vec<SlotDef>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionDef {
    pub prompt: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub answer: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub detail: String,
    /// Accepted slot ids (matching and board activities).
    #[serde(default)]
    pub targets: Vec<String>,
    /// One-based position (ordering activities).
    #[serde(default)]
    pub rank: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SlotDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub detail: String,
}
