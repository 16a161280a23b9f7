pub mod challenge;
pub mod controls;
pub mod machine;

pub use challenge::{
    AnswerRule, Candidate, Card, Challenge, ItemId, PlacementAssignment, Rejection, SlotId, Verdict,
};
pub use controls::{ActivityControls, ActivityKind, ActivityLayout, CardSpot};
pub use machine::{
    ActivityPhase, ActivityStateMachine, EvaluationMode, Feedback, FeedbackKind, SubmitOutcome,
};
