use std::collections::{BTreeMap, BTreeSet};

pub type ItemId = String;
pub type SlotId = String;

/// A piece of content shown to the player: a quiz option, a draggable
/// card, or a drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub label: String,
    pub detail: String,
}

impl Card {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Card {
            id: id.into(),
            label: label.into(),
            detail: String::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// How a candidate answer is judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerRule {
    /// Exactly one option index is right.
    SingleChoice { correct: usize },
    /// Every item has exactly one right slot and the whole mapping must match.
    FullAssignmentMatch { expected: BTreeMap<ItemId, SlotId> },
    /// Every item has a set of acceptable slots.
    SetMembership {
        allowed: BTreeMap<ItemId, BTreeSet<SlotId>>,
    },
}

#[derive(Debug, Clone)]
pub struct Challenge {
    pub prompt: String,
    /// Quiz options, or the movable cards of a placement challenge.
    pub items: Vec<Card>,
    /// Drop targets. Empty for quizzes.
    pub slots: Vec<Card>,
    /// Maximum cards per slot; `None` is unbounded.
    pub slot_capacity: Option<usize>,
    pub rule: AnswerRule,
    /// Extra teaching text appended to incorrect feedback.
    pub explanation: String,
}

/// Item → slot mapping built up while the player drags cards around.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementAssignment {
    placed: BTreeMap<ItemId, SlotId>,
}

impl PlacementAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `item` in `slot`, returning the slot it previously occupied.
    pub fn place(&mut self, item: impl Into<ItemId>, slot: impl Into<SlotId>) -> Option<SlotId> {
        self.placed.insert(item.into(), slot.into())
    }

    pub fn remove(&mut self, item: &str) -> Option<SlotId> {
        self.placed.remove(item)
    }

    pub fn slot_of(&self, item: &str) -> Option<&str> {
        self.placed.get(item).map(String::as_str)
    }

    pub fn occupants(&self, slot: &str) -> usize {
        self.placed.values().filter(|s| s.as_str() == slot).count()
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn clear(&mut self) {
        self.placed.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.placed.iter().map(|(i, s)| (i.as_str(), s.as_str()))
    }
}

impl<I: Into<ItemId>, S: Into<SlotId>> FromIterator<(I, S)> for PlacementAssignment {
    fn from_iter<T: IntoIterator<Item = (I, S)>>(iter: T) -> Self {
        PlacementAssignment {
            placed: iter.into_iter().map(|(i, s)| (i.into(), s.into())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Choice(usize),
    Placement { item: ItemId, slot: SlotId },
    Assignment(PlacementAssignment),
}

impl Candidate {
    pub fn placement(item: impl Into<ItemId>, slot: impl Into<SlotId>) -> Self {
        Candidate::Placement {
            item: item.into(),
            slot: slot.into(),
        }
    }
}

/// Why a submission was refused without being judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotPresenting,
    ChoiceOutOfRange,
    UnknownItem,
    UnknownSlot,
    SlotFull,
    /// E.g. a `Choice` sent to a placement challenge.
    WrongShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct {
        resolved: Vec<ItemId>,
        /// True when the whole challenge is now resolved.
        finished: bool,
    },
    Incorrect {
        explanation: String,
    },
    /// Explicit submission that leaves items unplaced.
    Incomplete {
        missing: usize,
    },
    AlreadyResolved,
    Invalid(Rejection),
}

impl Challenge {
    /// Ids of every item that must be resolved.
    pub fn required_items(&self) -> BTreeSet<&str> {
        match &self.rule {
            AnswerRule::SingleChoice { .. } => BTreeSet::new(),
            AnswerRule::FullAssignmentMatch { expected } => {
                expected.keys().map(String::as_str).collect()
            }
            AnswerRule::SetMembership { allowed } => allowed.keys().map(String::as_str).collect(),
        }
    }

    pub fn item(&self, id: &str) -> Option<&Card> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn slot(&self, id: &str) -> Option<&Card> {
        self.slots.iter().find(|c| c.id == id)
    }

    /// Judges `candidate` given the items already resolved in this challenge.
    pub fn evaluate(&self, candidate: &Candidate, resolved: &BTreeSet<ItemId>) -> Verdict {
        match (&self.rule, candidate) {
            (AnswerRule::SingleChoice { correct }, Candidate::Choice(choice)) => {
                if *choice >= self.items.len() {
                    Verdict::Invalid(Rejection::ChoiceOutOfRange)
                } else if choice == correct {
                    Verdict::Correct {
                        resolved: Vec::new(),
                        finished: true,
                    }
                } else {
                    let answer = self
                        .items
                        .get(*correct)
                        .map(|c| c.label.as_str())
                        .unwrap_or_default();
                    Verdict::Incorrect {
                        explanation: self.explain(format!("The correct answer was: {answer}")),
                    }
                }
            }
            (AnswerRule::SingleChoice { .. }, _) => Verdict::Invalid(Rejection::WrongShape),
            (_, Candidate::Choice(_)) => Verdict::Invalid(Rejection::WrongShape),
            (_, Candidate::Placement { item, slot }) => self.evaluate_placement(item, slot, resolved),
            (_, Candidate::Assignment(assignment)) => self.evaluate_assignment(assignment),
        }
    }

    fn accepts(&self, item: &str, slot: &str) -> bool {
        match &self.rule {
            AnswerRule::SingleChoice { .. } => false,
            AnswerRule::FullAssignmentMatch { expected } => {
                expected.get(item).is_some_and(|s| s == slot)
            }
            AnswerRule::SetMembership { allowed } => {
                allowed.get(item).is_some_and(|s| s.contains(slot))
            }
        }
    }

    fn right_slots(&self, item: &str) -> Vec<&str> {
        match &self.rule {
            AnswerRule::SingleChoice { .. } => Vec::new(),
            AnswerRule::FullAssignmentMatch { expected } => {
                expected.get(item).map(|s| vec![s.as_str()]).unwrap_or_default()
            }
            AnswerRule::SetMembership { allowed } => allowed
                .get(item)
                .map(|s| s.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }

    fn slot_labels(&self, ids: &[&str]) -> String {
        ids.iter()
            .map(|id| self.slot(id).map(|c| c.label.as_str()).unwrap_or(*id))
            .collect::<Vec<_>>()
            .join(" or ")
    }

    fn item_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.item(id).map(|c| c.label.as_str()).unwrap_or(id)
    }

    fn evaluate_placement(&self, item: &str, slot: &str, resolved: &BTreeSet<ItemId>) -> Verdict {
        let required = self.required_items();
        if !required.contains(item) {
            return Verdict::Invalid(Rejection::UnknownItem);
        }
        if self.slot(slot).is_none() {
            return Verdict::Invalid(Rejection::UnknownSlot);
        }
        if resolved.contains(item) {
            return Verdict::AlreadyResolved;
        }

        if self.accepts(item, slot) {
            let finished = required
                .iter()
                .all(|id| *id == item || resolved.contains(*id));
            Verdict::Correct {
                resolved: vec![item.to_string()],
                finished,
            }
        } else {
            let slot_label = self.slot(slot).map(|c| c.label.as_str()).unwrap_or(slot);
            Verdict::Incorrect {
                explanation: self.explain(format!(
                    "'{}' does not belong in '{}'. It belongs in '{}'.",
                    self.item_label(item),
                    slot_label,
                    self.slot_labels(&self.right_slots(item)),
                )),
            }
        }
    }

    fn evaluate_assignment(&self, assignment: &PlacementAssignment) -> Verdict {
        let required = self.required_items();
        for (item, slot) in assignment.iter() {
            if !required.contains(item) {
                return Verdict::Invalid(Rejection::UnknownItem);
            }
            if self.slot(slot).is_none() {
                return Verdict::Invalid(Rejection::UnknownSlot);
            }
        }

        let missing = required
            .iter()
            .filter(|id| assignment.slot_of(id).is_none())
            .count();
        if missing > 0 {
            return Verdict::Incomplete { missing };
        }

        let wrong: Vec<&str> = required
            .iter()
            .copied()
            .filter(|id| {
                assignment
                    .slot_of(id)
                    .is_some_and(|slot| !self.accepts(id, slot))
            })
            .collect();

        if wrong.is_empty() {
            Verdict::Correct {
                resolved: required.iter().map(|s| s.to_string()).collect(),
                finished: true,
            }
        } else {
            let lines = wrong
                .iter()
                .map(|id| {
                    format!(
                        "- '{}' belongs in '{}'",
                        self.item_label(id),
                        self.slot_labels(&self.right_slots(id))
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            Verdict::Incorrect {
                explanation: self.explain(format!(
                    "{} of {} placements are wrong:\n{}",
                    wrong.len(),
                    required.len(),
                    lines
                )),
            }
        }
    }

    fn explain(&self, detail: String) -> String {
        if self.explanation.is_empty() {
            detail
        } else {
            format!("{detail}\n\n{}", self.explanation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Challenge {
        Challenge {
            prompt: "Who owns the product backlog?".into(),
            items: vec![
                Card::new("a", "Scrum Master"),
                Card::new("b", "Product Owner"),
                Card::new("c", "Development Team"),
            ],
            slots: Vec::new(),
            slot_capacity: None,
            rule: AnswerRule::SingleChoice { correct: 1 },
            explanation: String::new(),
        }
    }

    fn board() -> Challenge {
        let allowed = [("hu1", "done"), ("hu2", "doing"), ("hu3", "todo"), ("hu4", "todo")]
            .into_iter()
            .map(|(i, s)| (i.to_string(), BTreeSet::from([s.to_string()])))
            .collect();
        Challenge {
            prompt: "Sort the board".into(),
            items: ["hu1", "hu2", "hu3", "hu4"]
                .into_iter()
                .map(|id| Card::new(id, id.to_uppercase()))
                .collect(),
            slots: vec![
                Card::new("todo", "To do"),
                Card::new("doing", "In progress"),
                Card::new("done", "Done"),
            ],
            slot_capacity: None,
            rule: AnswerRule::SetMembership { allowed },
            explanation: "Keep the board current.".into(),
        }
    }

    #[test]
    fn single_choice_names_the_answer() {
        let q = quiz();
        let none = BTreeSet::new();
        assert!(matches!(
            q.evaluate(&Candidate::Choice(1), &none),
            Verdict::Correct { finished: true, .. }
        ));
        match q.evaluate(&Candidate::Choice(0), &none) {
            Verdict::Incorrect { explanation } => assert!(explanation.contains("Product Owner")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            q.evaluate(&Candidate::Choice(7), &none),
            Verdict::Invalid(Rejection::ChoiceOutOfRange)
        );
        assert_eq!(
            q.evaluate(&Candidate::placement("a", "b"), &none),
            Verdict::Invalid(Rejection::WrongShape)
        );
    }

    #[test]
    fn membership_placement_resolves_one_item() {
        let b = board();
        let mut resolved = BTreeSet::new();
        match b.evaluate(&Candidate::placement("hu3", "todo"), &resolved) {
            Verdict::Correct { resolved: r, finished } => {
                assert_eq!(r, vec!["hu3".to_string()]);
                assert!(!finished);
            }
            other => panic!("unexpected {other:?}"),
        }
        resolved.insert("hu3".to_string());
        assert_eq!(
            b.evaluate(&Candidate::placement("hu3", "done"), &resolved),
            Verdict::AlreadyResolved
        );
        assert_eq!(
            b.evaluate(&Candidate::placement("nope", "todo"), &resolved),
            Verdict::Invalid(Rejection::UnknownItem)
        );
        assert_eq!(
            b.evaluate(&Candidate::placement("hu1", "backlog"), &resolved),
            Verdict::Invalid(Rejection::UnknownSlot)
        );
    }

    #[test]
    fn last_placement_finishes() {
        let b = board();
        let resolved: BTreeSet<ItemId> = ["hu1", "hu2", "hu3"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            b.evaluate(&Candidate::placement("hu4", "todo"), &resolved),
            Verdict::Correct { finished: true, .. }
        ));
    }

    #[test]
    fn assignment_checks_completeness_then_correctness() {
        let b = board();
        let none = BTreeSet::new();
        let partial: PlacementAssignment = [("hu1", "done")].into_iter().collect();
        assert_eq!(
            b.evaluate(&Candidate::Assignment(partial), &none),
            Verdict::Incomplete { missing: 3 }
        );

        let wrong: PlacementAssignment =
            [("hu1", "done"), ("hu2", "todo"), ("hu3", "todo"), ("hu4", "todo")]
                .into_iter()
                .collect();
        match b.evaluate(&Candidate::Assignment(wrong), &none) {
            Verdict::Incorrect { explanation } => {
                assert!(explanation.contains("1 of 4"));
                assert!(explanation.contains("In progress"));
                assert!(explanation.ends_with("Keep the board current."));
            }
            other => panic!("unexpected {other:?}"),
        }

        let right: PlacementAssignment =
            [("hu1", "done"), ("hu2", "doing"), ("hu3", "todo"), ("hu4", "todo")]
                .into_iter()
                .collect();
        assert!(matches!(
            b.evaluate(&Candidate::Assignment(right), &none),
            Verdict::Correct { finished: true, .. }
        ));
    }

    #[test]
    fn full_match_requires_exact_mapping() {
        let expected: BTreeMap<ItemId, SlotId> = [("x", "1"), ("y", "2")]
            .into_iter()
            .map(|(i, s)| (i.to_string(), s.to_string()))
            .collect();
        let c = Challenge {
            prompt: String::new(),
            items: vec![Card::new("x", "X"), Card::new("y", "Y")],
            slots: vec![Card::new("1", "First"), Card::new("2", "Second")],
            slot_capacity: Some(1),
            rule: AnswerRule::FullAssignmentMatch { expected },
            explanation: String::new(),
        };
        let none = BTreeSet::new();
        let swapped: PlacementAssignment = [("x", "2"), ("y", "1")].into_iter().collect();
        assert!(matches!(
            c.evaluate(&Candidate::Assignment(swapped), &none),
            Verdict::Incorrect { .. }
        ));
        let exact: PlacementAssignment = [("x", "1"), ("y", "2")].into_iter().collect();
        assert!(matches!(
            c.evaluate(&Candidate::Assignment(exact), &none),
            Verdict::Correct { .. }
        ));
    }
}
