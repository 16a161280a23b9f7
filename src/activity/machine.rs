use std::collections::BTreeSet;

use log::{debug, info, warn};

use super::challenge::{
    Candidate, Challenge, ItemId, PlacementAssignment, Rejection, SlotId, Verdict,
};

/// When player placements get judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Every drop is judged on the spot.
    Immediate,
    /// Drops only build an assignment; the player asks for a verdict.
    ExplicitSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityPhase {
    Inactive,
    Presenting,
    /// Held only while a submission is being judged.
    Evaluating,
    FeedbackCorrect,
    FeedbackIncorrect,
    /// Non-judging message, e.g. an incomplete submission.
    Notice,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    Notice,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

/// What a call into the machine did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct,
    Incorrect { errors: u32, budget: u32 },
    Completed,
    Failed,
    Incomplete { missing: usize },
    /// Placement stored in the working assignment, not judged yet.
    Recorded,
    /// Resubmission of something already resolved, or a call in a terminal state.
    Ignored,
    Rejected(Rejection),
}

#[derive(Debug, Clone, Default)]
struct Progress {
    resolved: BTreeSet<ItemId>,
    finished: bool,
}

/// Lifecycle of one embedded activity: present a challenge, judge answers,
/// show feedback, and end in `Completed` or `Failed` once the error budget
/// is spent. The machine never reaches outside itself; owners poll
/// [`is_terminal`](Self::is_terminal) and act on it.
#[derive(Debug, Clone)]
pub struct ActivityStateMachine {
    challenges: Vec<Challenge>,
    mode: EvaluationMode,
    error_budget: u32,
    error_count: u32,
    current: usize,
    progress: Vec<Progress>,
    working: PlacementAssignment,
    phase: ActivityPhase,
    last_feedback: Option<Feedback>,
    acknowledged: bool,
    auto_advance_ticks: Option<u32>,
    feedback_ticks: u32,
    success_message: String,
}

impl ActivityStateMachine {
    pub fn new(challenges: Vec<Challenge>, mode: EvaluationMode, error_budget: u32) -> Self {
        let progress = vec![Progress::default(); challenges.len()];
        ActivityStateMachine {
            challenges,
            mode,
            error_budget: error_budget.max(1),
            error_count: 0,
            current: 0,
            progress,
            working: PlacementAssignment::new(),
            phase: ActivityPhase::Inactive,
            last_feedback: None,
            acknowledged: false,
            auto_advance_ticks: None,
            feedback_ticks: 0,
            success_message: String::from("Well done! Every answer is correct."),
        }
    }

    /// Correct feedback dismisses itself after this many `update` ticks.
    pub fn with_auto_advance(mut self, ticks: u32) -> Self {
        self.auto_advance_ticks = Some(ticks);
        self
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    pub fn activate(&mut self) {
        self.error_count = 0;
        self.current = 0;
        for p in &mut self.progress {
            *p = Progress::default();
        }
        self.working.clear();
        self.last_feedback = None;
        self.acknowledged = false;
        self.feedback_ticks = 0;
        self.phase = ActivityPhase::Presenting;
        debug!("activity activated ({} challenges)", self.challenges.len());
    }

    /// Closes a non-terminal activity, discarding progress. Terminal
    /// outcomes are kept so the owner can still read them.
    pub fn deactivate(&mut self) {
        if !self.is_terminal() {
            self.phase = ActivityPhase::Inactive;
            self.working.clear();
            self.last_feedback = None;
        }
    }

    pub fn submit_answer(&mut self, candidate: Candidate) -> SubmitOutcome {
        if self.is_terminal() {
            return SubmitOutcome::Ignored;
        }
        if self.phase != ActivityPhase::Presenting {
            warn!("submission while {:?}; ignored", self.phase);
            return SubmitOutcome::Rejected(Rejection::NotPresenting);
        }

        if let Candidate::Placement { item, slot } = &candidate {
            if let Some(cap) = self.challenge().and_then(|c| c.slot_capacity) {
                let occupied = self.working.occupants(slot);
                let moving_within = self.working.slot_of(item) == Some(slot.as_str());
                if occupied >= cap && !moving_within {
                    return SubmitOutcome::Rejected(Rejection::SlotFull);
                }
            }
        }

        let Some(challenge) = self.challenges.get(self.current) else {
            return SubmitOutcome::Rejected(Rejection::NotPresenting);
        };
        self.phase = ActivityPhase::Evaluating;
        let verdict = challenge.evaluate(&candidate, &self.progress[self.current].resolved);
        debug!("challenge {} verdict {:?}", self.current, verdict);

        match verdict {
            Verdict::Correct { resolved, finished } => {
                if let Candidate::Placement { item, slot } = &candidate {
                    self.working.place(item.clone(), slot.clone());
                }
                let progress = &mut self.progress[self.current];
                progress.resolved.extend(resolved);
                progress.finished = finished;

                if self.progress.iter().all(|p| p.finished) {
                    self.phase = ActivityPhase::Completed;
                    self.last_feedback = Some(Feedback {
                        kind: FeedbackKind::Completed,
                        message: self.success_message.clone(),
                    });
                    info!("activity completed with {} errors", self.error_count);
                    SubmitOutcome::Completed
                } else {
                    self.phase = ActivityPhase::FeedbackCorrect;
                    self.feedback_ticks = 0;
                    self.last_feedback = Some(Feedback {
                        kind: FeedbackKind::Correct,
                        message: "Correct!".to_string(),
                    });
                    SubmitOutcome::Correct
                }
            }
            Verdict::Incorrect { explanation } => {
                self.error_count += 1;
                if self.error_count >= self.error_budget {
                    self.error_count = self.error_budget;
                    self.phase = ActivityPhase::Failed;
                    self.last_feedback = Some(Feedback {
                        kind: FeedbackKind::Failed,
                        message: format!(
                            "Too many mistakes: {} of {} allowed errors used.\n\n{}",
                            self.error_count, self.error_budget, explanation
                        ),
                    });
                    info!("activity failed after {} errors", self.error_count);
                    SubmitOutcome::Failed
                } else {
                    let remaining = self.error_budget - self.error_count;
                    self.phase = ActivityPhase::FeedbackIncorrect;
                    self.last_feedback = Some(Feedback {
                        kind: FeedbackKind::Incorrect,
                        message: format!(
                            "{}\n\nErrors: {}/{} ({} {} left)",
                            explanation,
                            self.error_count,
                            self.error_budget,
                            remaining,
                            if remaining == 1 { "attempt" } else { "attempts" }
                        ),
                    });
                    SubmitOutcome::Incorrect {
                        errors: self.error_count,
                        budget: self.error_budget,
                    }
                }
            }
            Verdict::Incomplete { missing } => {
                self.phase = ActivityPhase::Notice;
                self.last_feedback = Some(Feedback {
                    kind: FeedbackKind::Notice,
                    message: format!("Place every card before checking ({missing} left)."),
                });
                SubmitOutcome::Incomplete { missing }
            }
            Verdict::AlreadyResolved => {
                self.phase = ActivityPhase::Presenting;
                SubmitOutcome::Ignored
            }
            Verdict::Invalid(rejection) => {
                warn!("invalid submission: {:?}", rejection);
                self.phase = ActivityPhase::Presenting;
                SubmitOutcome::Rejected(rejection)
            }
        }
    }

    /// Drops `item` onto `slot`. Judged at once in [`EvaluationMode::Immediate`],
    /// otherwise stored until [`submit`](Self::submit).
    pub fn place(&mut self, item: &str, slot: &str) -> SubmitOutcome {
        match self.mode {
            EvaluationMode::Immediate => self.submit_answer(Candidate::placement(item, slot)),
            EvaluationMode::ExplicitSubmit => {
                if self.is_terminal() {
                    return SubmitOutcome::Ignored;
                }
                if self.phase != ActivityPhase::Presenting {
                    return SubmitOutcome::Rejected(Rejection::NotPresenting);
                }
                let Some(challenge) = self.challenge() else {
                    return SubmitOutcome::Rejected(Rejection::NotPresenting);
                };
                if challenge.item(item).is_none() {
                    return SubmitOutcome::Rejected(Rejection::UnknownItem);
                }
                if challenge.slot(slot).is_none() {
                    return SubmitOutcome::Rejected(Rejection::UnknownSlot);
                }
                if let Some(cap) = challenge.slot_capacity {
                    let moving_within = self.working.slot_of(item) == Some(slot);
                    if self.working.occupants(slot) >= cap && !moving_within {
                        return SubmitOutcome::Rejected(Rejection::SlotFull);
                    }
                }
                self.working.place(item, slot);
                SubmitOutcome::Recorded
            }
        }
    }

    /// Takes a card back out of its slot (explicit-submit boards only).
    pub fn unplace(&mut self, item: &str) -> Option<SlotId> {
        if self.mode == EvaluationMode::ExplicitSubmit && self.phase == ActivityPhase::Presenting {
            self.working.remove(item)
        } else {
            None
        }
    }

    /// Judges the working assignment as a whole.
    pub fn submit(&mut self) -> SubmitOutcome {
        let assignment = self.working.clone();
        self.submit_answer(Candidate::Assignment(assignment))
    }

    /// Replaces the working assignment, e.g. after reordering a list.
    pub fn set_assignment(&mut self, assignment: PlacementAssignment) {
        if self.phase == ActivityPhase::Presenting {
            self.working = assignment;
        }
    }

    pub fn dismiss_feedback(&mut self) {
        match self.phase {
            ActivityPhase::FeedbackCorrect => {
                if self.progress[self.current].finished {
                    if let Some(next) = self.progress.iter().position(|p| !p.finished) {
                        self.current = next;
                        self.working.clear();
                    }
                }
                self.phase = ActivityPhase::Presenting;
                self.last_feedback = None;
            }
            ActivityPhase::FeedbackIncorrect | ActivityPhase::Notice => {
                self.phase = ActivityPhase::Presenting;
                self.last_feedback = None;
            }
            ActivityPhase::Completed | ActivityPhase::Failed => {
                self.acknowledged = true;
            }
            ActivityPhase::Inactive | ActivityPhase::Presenting | ActivityPhase::Evaluating => {}
        }
    }

    /// Per-frame tick. Counts down auto-advance of correct feedback.
    pub fn update(&mut self) {
        if self.phase != ActivityPhase::FeedbackCorrect {
            return;
        }
        if let Some(limit) = self.auto_advance_ticks {
            self.feedback_ticks += 1;
            if self.feedback_ticks >= limit {
                self.dismiss_feedback();
            }
        }
    }

    pub fn phase(&self) -> ActivityPhase {
        self.phase
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failed()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == ActivityPhase::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.phase == ActivityPhase::Failed
    }

    pub fn is_active(&self) -> bool {
        self.phase != ActivityPhase::Inactive
    }

    /// Terminal outcome has been seen by the player.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn error_budget(&self) -> u32 {
        self.error_budget
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn challenge_count(&self) -> usize {
        self.challenges.len()
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenges.get(self.current)
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn is_resolved(&self, item: &str) -> bool {
        self.progress
            .get(self.current)
            .is_some_and(|p| p.resolved.contains(item))
    }

    pub fn resolved_count(&self) -> usize {
        self.progress.iter().map(|p| p.resolved.len()).sum()
    }

    pub fn working(&self) -> &PlacementAssignment {
        &self.working
    }

    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }

    pub fn is_showing_feedback(&self) -> bool {
        matches!(
            self.phase,
            ActivityPhase::FeedbackCorrect | ActivityPhase::FeedbackIncorrect | ActivityPhase::Notice
        ) || (self.is_terminal() && !self.acknowledged)
    }
}
