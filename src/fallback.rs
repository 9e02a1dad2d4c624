//! Ordered fallback strategies for best-effort refinements.
//!
//! Palette lookup and reprojection should never abort a render. Each is expressed as
//! a chain of named attempts; the first success wins, every failure is logged at
//! debug level, and [`FallbackChain::resolve`] falls back to a caller-supplied default
//! when nothing in the chain applies.

use crate::error::Degradation;

type Attempt<'a, T> = Box<dyn FnOnce() -> Result<T, Degradation> + 'a>;

/// Named attempts tried in insertion order.
pub struct FallbackChain<'a, T> {
    what: &'static str,
    attempts: Vec<(&'static str, Attempt<'a, T>)>,
}

/// Outcome of a resolved chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    /// Name of the attempt that produced `value`, or `"default"`.
    pub source: &'static str,
    /// Every failure observed on the way, in order.
    pub degradations: Vec<Degradation>,
}

impl<T> Resolved<T> {
    pub fn degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

impl<'a, T> FallbackChain<'a, T> {
    /// `what` names the refinement in log lines, e.g. `"palette"`.
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            attempts: Vec::new(),
        }
    }

    pub fn then<F>(mut self, name: &'static str, attempt: F) -> Self
    where
        F: FnOnce() -> Result<T, Degradation> + 'a,
    {
        self.attempts.push((name, Box::new(attempt)));
        self
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Run the attempts in order and return the first success, or `default`.
    pub fn resolve(self, default: T) -> Resolved<T> {
        let mut degradations = Vec::new();
        for (name, attempt) in self.attempts {
            match attempt() {
                Ok(value) => {
                    if !degradations.is_empty() {
                        log::debug!("{}: using '{}' after {} failed attempt(s)", self.what, name, degradations.len());
                    }
                    return Resolved {
                        value,
                        source: name,
                        degradations,
                    };
                }
                Err(d) => {
                    log::debug!("{}: '{}' not applicable: {}", self.what, name, d);
                    degradations.push(d);
                }
            }
        }
        log::debug!("{}: falling back to default", self.what);
        Resolved {
            value: default,
            source: "default",
            degradations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_wins() {
        let r = FallbackChain::new("test")
            .then("a", || Err(Degradation::NoCrs))
            .then("b", || Ok(2))
            .then("c", || Ok(3))
            .resolve(0);
        assert_eq!(r.value, 2);
        assert_eq!(r.source, "b");
        assert_eq!(r.degradations, vec![Degradation::NoCrs]);
        assert!(r.degraded());
    }

    #[test]
    fn default_when_nothing_applies() {
        let r = FallbackChain::new("test")
            .then("a", || Err(Degradation::UnknownPalette("x".into())))
            .resolve(7);
        assert_eq!(r.value, 7);
        assert_eq!(r.source, "default");
    }

    #[test]
    fn later_attempts_are_not_run() {
        let mut ran = false;
        let r = FallbackChain::new("test")
            .then("a", || Ok(1))
            .then("b", || {
                ran = true;
                Ok(2)
            })
            .resolve(0);
        assert_eq!(r.value, 1);
        assert!(!r.degraded());
        assert!(!ran);
    }
}
