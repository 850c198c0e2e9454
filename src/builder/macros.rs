//! Macros for composing guards.

/// OR over guards, left to right with short-circuit.
///
/// # Example
///
/// ```
/// use behavior_graph::any_of;
/// use behavior_graph::core::{Guard, Probe, Status};
/// use std::time::Duration;
///
/// let guard: Guard = any_of![Guard::never(), Guard::always()];
/// assert_eq!(guard.evaluate(&Probe::new(&(), Duration::ZERO)), Status::Succeeded);
/// ```
#[macro_export]
macro_rules! any_of {
    ($($guard:expr),+ $(,)?) => {
        $crate::core::Guard::any(vec![$($guard),+])
    };
}

/// AND over guards, left to right with short-circuit.
///
/// # Example
///
/// ```
/// use behavior_graph::all_of;
/// use behavior_graph::core::{Guard, Probe, Status};
/// use std::time::Duration;
///
/// let guard: Guard = all_of![Guard::always(), Guard::never()];
/// assert_eq!(guard.evaluate(&Probe::new(&(), Duration::ZERO)), Status::Failure);
/// ```
#[macro_export]
macro_rules! all_of {
    ($($guard:expr),+ $(,)?) => {
        $crate::core::Guard::all(vec![$($guard),+])
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Guard, Probe, Status};
    use std::time::Duration;

    fn eval(guard: &Guard<u8>, host: u8) -> Status {
        guard.evaluate(&Probe::new(&host, Duration::ZERO))
    }

    #[test]
    fn any_of_is_or() {
        let guard = any_of![
            Guard::from_fn("low", |p: &Probe<'_, u8>| *p.host() < 3),
            Guard::from_fn("high", |p: &Probe<'_, u8>| *p.host() > 7),
        ];
        assert_eq!(eval(&guard, 1), Status::Succeeded);
        assert_eq!(eval(&guard, 9), Status::Succeeded);
        assert_eq!(eval(&guard, 5), Status::Failure);
    }

    #[test]
    fn all_of_is_and() {
        let guard = all_of![
            Guard::from_fn("above", |p: &Probe<'_, u8>| *p.host() > 2),
            Guard::from_fn("below", |p: &Probe<'_, u8>| *p.host() < 6)
        ];
        assert_eq!(eval(&guard, 4), Status::Succeeded);
        assert_eq!(eval(&guard, 1), Status::Failure);
        assert_eq!(eval(&guard, 8), Status::Failure);
    }

    #[test]
    fn macros_nest() {
        let guard: Guard<u8> = all_of![any_of![Guard::never(), Guard::always()], !Guard::never()];
        assert_eq!(eval(&guard, 0), Status::Succeeded);
    }
}
