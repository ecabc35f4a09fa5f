//! Legal-action enumeration.

/// Enumerates the legal actions in a state.
///
/// The returned order matters: agents that break ties by scanning actions
/// pick the earliest one, so an implementation must return the same order
/// for the same state. An empty vector marks a terminal state.
///
/// Any `Fn(&S) -> Vec<A>` is a provider:
///
/// ```rust
/// use qlearn_core::LegalActions;
///
/// let provider = |s: &u8| if *s == 0 { vec!['l', 'r'] } else { vec![] };
/// assert_eq!(provider.legal_actions(&0), vec!['l', 'r']);
/// assert!(provider.legal_actions(&1).is_empty());
/// ```
pub trait LegalActions<S, A> {
    /// Returns the legal actions in `state`.
    fn legal_actions(&self, state: &S) -> Vec<A>;
}

impl<S, A, F> LegalActions<S, A> for F
where
    F: Fn(&S) -> Vec<A>,
{
    fn legal_actions(&self, state: &S) -> Vec<A> {
        self(state)
    }
}
