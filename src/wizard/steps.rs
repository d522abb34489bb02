use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Repository,
    Environment,
    Database,
    Compute,
    Security,
    Review,
}

pub const STEPS: [Step; 6] = [
    Step::Repository,
    Step::Environment,
    Step::Database,
    Step::Compute,
    Step::Security,
    Step::Review,
];

/// Work a session performs when a step becomes current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    None,
    RecomputeReview,
}

/// Why a jump is admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Revisit,
    /// A finished analysis unlocks the first configuration step from anywhere.
    AnalysisFastForward,
}

struct Transition {
    step: Step,
    next: Option<Step>,
    previous: Option<Step>,
    entry: EntryAction,
}

const TABLE: [Transition; 6] = [
    Transition {
        step: Step::Repository,
        next: Some(Step::Environment),
        previous: None,
        entry: EntryAction::None,
    },
    Transition {
        step: Step::Environment,
        next: Some(Step::Database),
        previous: Some(Step::Repository),
        entry: EntryAction::None,
    },
    Transition {
        step: Step::Database,
        next: Some(Step::Compute),
        previous: Some(Step::Environment),
        entry: EntryAction::None,
    },
    Transition {
        step: Step::Compute,
        next: Some(Step::Security),
        previous: Some(Step::Database),
        entry: EntryAction::None,
    },
    Transition {
        step: Step::Security,
        next: Some(Step::Review),
        previous: Some(Step::Compute),
        entry: EntryAction::None,
    },
    Transition {
        step: Step::Review,
        next: None,
        previous: Some(Step::Security),
        entry: EntryAction::RecomputeReview,
    },
];

fn transition(step: Step) -> &'static Transition {
    let transition = &TABLE[step.index()];
    debug_assert_eq!(transition.step, step);
    transition
}

impl Step {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Repository => "Repository",
            Step::Environment => "Environment",
            Step::Database => "Database",
            Step::Compute => "Compute",
            Step::Security => "Security",
            Step::Review => "Review",
        }
    }

    pub fn next(self) -> Option<Step> {
        transition(self).next
    }

    pub fn previous(self) -> Option<Step> {
        transition(self).previous
    }

    pub fn entry_action(self) -> EntryAction {
        transition(self).entry
    }

    /// Decides whether a jump from `self` to `target` is allowed.
    pub fn admits(self, target: Step, has_analysis: bool) -> Option<Admission> {
        if target <= self {
            Some(Admission::Revisit)
        } else if target == Step::Environment && has_analysis {
            Some(Admission::AnalysisFastForward)
        } else {
            None
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_declaration_order() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(TABLE[index].step, *step);
            assert_eq!(step.index(), index);
        }

        for pair in STEPS.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[1].previous(), Some(pair[0]));
        }

        assert_eq!(Step::Review.next(), None);
        assert_eq!(Step::Repository.previous(), None);
    }

    #[test]
    fn test_jump_admission() {
        assert_eq!(
            Step::Security.admits(Step::Database, false),
            Some(Admission::Revisit)
        );
        assert_eq!(
            Step::Compute.admits(Step::Compute, false),
            Some(Admission::Revisit)
        );
        assert_eq!(Step::Repository.admits(Step::Review, false), None);
        assert_eq!(Step::Repository.admits(Step::Environment, false), None);
        assert_eq!(
            Step::Repository.admits(Step::Environment, true),
            Some(Admission::AnalysisFastForward)
        );
        assert_eq!(Step::Repository.admits(Step::Database, true), None);
    }

    #[test]
    fn test_only_review_recomputes_on_entry() {
        for step in STEPS {
            let expected = if step == Step::Review {
                EntryAction::RecomputeReview
            } else {
                EntryAction::None
            };
            assert_eq!(step.entry_action(), expected);
        }
    }
}
