//! Best-submission selection for certification tests.

use std::collections::HashMap;

use crate::domain::TestSubmission;

/// Outcome of collapsing test attempts to one per person.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestSubmissions {
    /// One record per person, in newest-first order of the kept record
    pub best: Vec<TestSubmission>,
    /// Attempts with neither person id nor phone
    pub skipped: usize,
}

fn submission_key(submission: &TestSubmission) -> Option<String> {
    submission
        .person_id()
        .map(str::to_string)
        .or_else(|| submission.normalized_phone().map(|p| format!("phone:{}", p)))
}

/// Keep the highest score per person; among equal scores the newest wins.
///
/// Attempts are walked newest-first. The first attempt seen for a person is
/// kept unless a later (older) one has a strictly higher score.
pub fn select_best_submission(submissions: &[TestSubmission]) -> BestSubmissions {
    let mut ordered: Vec<&TestSubmission> = submissions.iter().collect();
    ordered.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut best: Vec<TestSubmission> = Vec::new();
    let mut skipped = 0;

    for submission in ordered {
        let Some(key) = submission_key(submission) else {
            skipped += 1;
            continue;
        };

        match slots.get(&key) {
            Some(&slot) => {
                if submission.score > best[slot].score {
                    best[slot] = submission.clone();
                }
            }
            None => {
                slots.insert(key, best.len());
                best.push(submission.clone());
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Test submissions without identity were skipped");
    }

    BestSubmissions { best, skipped }
}
