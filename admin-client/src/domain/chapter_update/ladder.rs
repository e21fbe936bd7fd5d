//! Ordered attempt table for the nested-endpoint ladder.
//!
//! Expressing the retry rules as a table-driven state machine keeps
//! termination mechanical: each (verb, auth-variant) pair is claimed at most
//! once, every transition claims a fresh pair or leaves the ladder, and the
//! table holds six pairs, so no status sequence can produce more than six
//! nested attempts.

use crate::domain::ports::{AuthHeader, BackendMethod};

/// Mutation verbs in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NestedVerb {
    Patch,
    Put,
    Post,
}

impl NestedVerb {
    const ORDER: [Self; 3] = [Self::Patch, Self::Put, Self::Post];

    pub(super) fn method(self) -> BackendMethod {
        match self {
            Self::Patch => BackendMethod::Patch,
            Self::Put => BackendMethod::Put,
            Self::Post => BackendMethod::Post,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Patch => 0,
            Self::Put => 1,
            Self::Post => 2,
        }
    }
}

/// Authorization header conventions in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AuthVariant {
    /// `Bearer {token}` scheme prefix.
    Bearer,
    /// Bare token value, no prefix.
    Raw,
}

impl AuthVariant {
    fn index(self) -> usize {
        match self {
            Self::Bearer => 0,
            Self::Raw => 1,
        }
    }

    /// Render the header for this convention, when a token exists.
    pub(super) fn header(self, token: Option<&str>) -> Option<AuthHeader> {
        let token = token?;
        Some(match self {
            Self::Bearer => AuthHeader::Bearer(token.to_owned()),
            Self::Raw => AuthHeader::Raw(token.to_owned()),
        })
    }
}

/// One nested-endpoint attempt: a verb under an auth convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NestedAttempt {
    pub(super) verb: NestedVerb,
    pub(super) variant: AuthVariant,
}

/// Where the ladder goes after a non-2xx nested response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Transition {
    /// Try this pair next.
    Retry(NestedAttempt),
    /// Verbs exhausted under 404: rewrite the whole aggregate.
    Fallback,
    /// Credentials rejected under every applicable convention.
    AuthExpired,
    /// A status the ladder has no answer for; surface it.
    Rejected,
}

/// Attempt bookkeeping for one mutation's nested ladder.
#[derive(Debug)]
pub(super) struct NestedLadder {
    has_token: bool,
    attempted: [[bool; 2]; 3],
}

impl NestedLadder {
    pub(super) fn new(has_token: bool) -> Self {
        Self {
            has_token,
            attempted: [[false; 2]; 3],
        }
    }

    /// Claim the opening attempt: `PATCH` under the `Bearer` convention.
    pub(super) fn start(&mut self) -> NestedAttempt {
        let first = NestedAttempt {
            verb: NestedVerb::Patch,
            variant: AuthVariant::Bearer,
        };
        self.claim(first);
        first
    }

    /// Decide the next step from the status of the current attempt.
    ///
    /// 2xx never reaches this function; the caller returns success first.
    pub(super) fn on_status(&mut self, current: NestedAttempt, status: u16) -> Transition {
        match status {
            404 => self.next_verb(current),
            401 if self.has_token => self.next_auth(current),
            401 => Transition::AuthExpired,
            _ => Transition::Rejected,
        }
    }

    /// 404: the route/verb pair is unknown; advance the verb under the same
    /// auth convention, then fall back to the aggregate rewrite.
    fn next_verb(&mut self, current: NestedAttempt) -> Transition {
        let candidates = NestedVerb::ORDER
            .into_iter()
            .skip(current.verb.index() + 1)
            .map(|verb| NestedAttempt {
                verb,
                variant: current.variant,
            });
        for candidate in candidates {
            if self.claim(candidate) {
                return Transition::Retry(candidate);
            }
        }
        Transition::Fallback
    }

    /// 401: the header convention was rejected; retry the same verb with the
    /// bare token, then exhaust both conventions on `POST` before declaring
    /// the credentials dead.
    fn next_auth(&mut self, current: NestedAttempt) -> Transition {
        let candidates = match current.variant {
            AuthVariant::Bearer => [
                Some(NestedAttempt {
                    verb: current.verb,
                    variant: AuthVariant::Raw,
                }),
                Some(NestedAttempt {
                    verb: NestedVerb::Post,
                    variant: AuthVariant::Bearer,
                }),
                Some(NestedAttempt {
                    verb: NestedVerb::Post,
                    variant: AuthVariant::Raw,
                }),
            ],
            AuthVariant::Raw => [
                Some(NestedAttempt {
                    verb: NestedVerb::Post,
                    variant: AuthVariant::Bearer,
                }),
                Some(NestedAttempt {
                    verb: NestedVerb::Post,
                    variant: AuthVariant::Raw,
                }),
                None,
            ],
        };
        for candidate in candidates.into_iter().flatten() {
            if self.claim(candidate) {
                return Transition::Retry(candidate);
            }
        }
        Transition::AuthExpired
    }

    fn claim(&mut self, attempt: NestedAttempt) -> bool {
        let slot = &mut self.attempted[attempt.verb.index()][attempt.variant.index()];
        if *slot {
            return false;
        }
        *slot = true;
        true
    }
}

#[cfg(test)]
mod tests {
    //! Transition-table coverage for the nested ladder.

    use rstest::rstest;

    use super::{AuthVariant, NestedAttempt, NestedLadder, NestedVerb, Transition};

    /// Drive the ladder with a fixed status per attempt and record the
    /// attempts made before it leaves the nested tier.
    fn walk(has_token: bool, statuses: &[u16]) -> (Vec<NestedAttempt>, Transition) {
        let mut ladder = NestedLadder::new(has_token);
        let mut attempt = ladder.start();
        let mut attempts = vec![attempt];
        for status in statuses {
            match ladder.on_status(attempt, *status) {
                Transition::Retry(next) => {
                    attempt = next;
                    attempts.push(next);
                }
                terminal => return (attempts, terminal),
            }
        }
        panic!("status script exhausted before the ladder terminated");
    }

    fn pair(verb: NestedVerb, variant: AuthVariant) -> NestedAttempt {
        NestedAttempt { verb, variant }
    }

    #[test]
    fn not_found_walks_verbs_then_falls_back() {
        let (attempts, terminal) = walk(true, &[404, 404, 404]);
        assert_eq!(
            attempts,
            vec![
                pair(NestedVerb::Patch, AuthVariant::Bearer),
                pair(NestedVerb::Put, AuthVariant::Bearer),
                pair(NestedVerb::Post, AuthVariant::Bearer),
            ]
        );
        assert_eq!(terminal, Transition::Fallback);
    }

    #[test]
    fn unauthorized_walks_two_verbs_by_two_conventions() {
        let (attempts, terminal) = walk(true, &[401, 401, 401, 401]);
        assert_eq!(
            attempts,
            vec![
                pair(NestedVerb::Patch, AuthVariant::Bearer),
                pair(NestedVerb::Patch, AuthVariant::Raw),
                pair(NestedVerb::Post, AuthVariant::Bearer),
                pair(NestedVerb::Post, AuthVariant::Raw),
            ]
        );
        assert_eq!(terminal, Transition::AuthExpired);
    }

    #[test]
    fn unauthorized_without_token_is_immediately_terminal() {
        let (attempts, terminal) = walk(false, &[401]);
        assert_eq!(attempts.len(), 1);
        assert_eq!(terminal, Transition::AuthExpired);
    }

    #[rstest]
    #[case::server_error(500)]
    #[case::validation_failure(422)]
    #[case::conflict(409)]
    fn other_statuses_surface_immediately(#[case] status: u16) {
        let (attempts, terminal) = walk(true, &[status]);
        assert_eq!(attempts.len(), 1);
        assert_eq!(terminal, Transition::Rejected);
    }

    #[test]
    fn mixed_statuses_never_revisit_a_pair() {
        // 404 advances the verb, 401 flips the convention; the claim table
        // must keep the walk strictly forward through fresh pairs.
        let (attempts, terminal) = walk(true, &[404, 401, 404, 401, 404]);
        assert_eq!(
            attempts,
            vec![
                pair(NestedVerb::Patch, AuthVariant::Bearer),
                pair(NestedVerb::Put, AuthVariant::Bearer),
                pair(NestedVerb::Put, AuthVariant::Raw),
                pair(NestedVerb::Post, AuthVariant::Raw),
                pair(NestedVerb::Post, AuthVariant::Bearer),
            ]
        );
        assert_eq!(terminal, Transition::Fallback);
    }

    #[rstest]
    #[case::all_not_found(&[404_u16, 404, 404, 404, 404, 404][..])]
    #[case::all_unauthorized(&[401_u16, 401, 401, 401, 401, 401][..])]
    #[case::alternating(&[401_u16, 404, 401, 404, 401, 404][..])]
    #[case::inverse_alternating(&[404_u16, 401, 404, 401, 404, 401][..])]
    fn ladder_terminates_within_six_attempts(#[case] statuses: &[u16]) {
        let (attempts, _terminal) = walk(true, statuses);
        assert!(attempts.len() <= 6, "made {} attempts", attempts.len());
        for (index, attempt) in attempts.iter().enumerate() {
            assert!(
                !attempts[..index].contains(attempt),
                "pair {attempt:?} was attempted twice"
            );
        }
    }
}
