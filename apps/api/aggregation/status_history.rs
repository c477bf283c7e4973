use crate::subsquid::StatusEvent;

pub const DECISION_DEPOSIT_PLACED: &str = "DecisionDepositPlaced";
pub const DECIDING: &str = "Deciding";

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHistory {
    pub history: Vec<StatusEvent>,
    pub is_swap: bool,
}

/// Move the first "DecisionDepositPlaced" event next to "Deciding": it is
/// removed from its position and reinserted at the pre-removal index of the
/// first "Deciding" event. When either event is missing the timeline is
/// returned unchanged.
pub fn normalize_status_history(history: &[StatusEvent]) -> NormalizedHistory {
    let deposit_idx = history
        .iter()
        .position(|event| event.status == DECISION_DEPOSIT_PLACED);
    let deciding_idx = history.iter().position(|event| event.status == DECIDING);

    match (deposit_idx, deciding_idx) {
        (Some(deposit), Some(deciding)) => {
            let mut reordered = history.to_vec();
            let event = reordered.remove(deposit);
            // `deciding` is at most the original length minus one, which is
            // exactly the length after removal, so the insert never panics.
            reordered.insert(deciding, event);
            NormalizedHistory {
                history: reordered,
                is_swap: true,
            }
        }
        _ => NormalizedHistory {
            history: history.to_vec(),
            is_swap: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn history_of(statuses: &[&str]) -> Vec<StatusEvent> {
        statuses.iter().map(|s| StatusEvent::new(s)).collect()
    }

    fn statuses_of(history: &[StatusEvent]) -> Vec<String> {
        history.iter().map(|e| e.status.clone()).collect()
    }

    #[test]
    fn deposit_before_deciding_moves_to_decidings_index() {
        let input = history_of(&["DecisionDepositPlaced", "Submitted", "Deciding"]);
        let normalized = normalize_status_history(&input);

        assert!(normalized.is_swap);
        assert_eq!(
            statuses_of(&normalized.history),
            vec!["Submitted", "Deciding", "DecisionDepositPlaced"]
        );
        // The deposit event now sits at the original index of "Deciding".
        assert_eq!(normalized.history[2].status, DECISION_DEPOSIT_PLACED);
    }

    #[test]
    fn deposit_after_deciding_moves_before_it() {
        let input = history_of(&["Submitted", "Deciding", "DecisionDepositPlaced"]);
        let normalized = normalize_status_history(&input);

        assert!(normalized.is_swap);
        assert_eq!(
            statuses_of(&normalized.history),
            vec!["Submitted", "DecisionDepositPlaced", "Deciding"]
        );
    }

    #[test]
    fn missing_deposit_is_a_no_op() {
        let input = history_of(&["Submitted", "Deciding", "ConfirmStarted"]);
        let normalized = normalize_status_history(&input);

        assert!(!normalized.is_swap);
        assert_eq!(normalized.history, input);
    }

    #[test]
    fn missing_deciding_is_a_no_op() {
        let input = history_of(&["Submitted", "DecisionDepositPlaced"]);
        let normalized = normalize_status_history(&input);

        assert!(!normalized.is_swap);
        assert_eq!(normalized.history, input);
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let normalized = normalize_status_history(&[]);
        assert!(!normalized.is_swap);
        assert!(normalized.history.is_empty());
    }

    fn arb_status() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Submitted".to_string()),
            Just("DecisionDepositPlaced".to_string()),
            Just("Deciding".to_string()),
            Just("ConfirmStarted".to_string()),
            Just("ConfirmAborted".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn swap_preserves_length_and_events(statuses in proptest::collection::vec(arb_status(), 0..12)) {
            let input: Vec<StatusEvent> = statuses.iter().map(|s| StatusEvent::new(s)).collect();
            let normalized = normalize_status_history(&input);

            prop_assert_eq!(normalized.history.len(), input.len());

            let mut lhs = statuses_of(&normalized.history);
            let mut rhs = statuses_of(&input);
            lhs.sort();
            rhs.sort();
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn deposit_lands_at_decidings_original_index(statuses in proptest::collection::vec(arb_status(), 1..12)) {
            let input: Vec<StatusEvent> = statuses.iter().map(|s| StatusEvent::new(s)).collect();
            let deciding_idx = input.iter().position(|e| e.status == DECIDING);
            let deposit_idx = input.iter().position(|e| e.status == DECISION_DEPOSIT_PLACED);
            let normalized = normalize_status_history(&input);

            match (deposit_idx, deciding_idx) {
                (Some(_), Some(deciding)) => {
                    prop_assert!(normalized.is_swap);
                    prop_assert_eq!(normalized.history[deciding].status.as_str(), DECISION_DEPOSIT_PLACED);
                }
                _ => {
                    prop_assert!(!normalized.is_swap);
                    prop_assert_eq!(normalized.history, input);
                }
            }
        }
    }
}
