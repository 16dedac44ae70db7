//! `Result` alias and early-return checks for argument and data validation.

use crate::error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `InvalidArgument` for `$name` from the enclosing function unless `$cond`
/// holds.
///
/// The error message is the formatted trailing arguments, or the condition's source
/// text when none are given.
#[macro_export]
macro_rules! verify_arg {
    ($name:ident, $cond:expr $(,)?) => {
        $crate::verify_arg!($name, $cond, "{}", stringify!($cond))
    };
    ($name:ident, $cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::invalid_arg(
                stringify!($name),
                format!($($fmt)+),
            ));
        }
    };
}

/// Returns `InvalidFormat` for `$element` from the enclosing function unless `$cond`
/// holds. Used when decoding external bytes.
///
/// The error message is the formatted trailing arguments, or the condition's source
/// text when none are given.
#[macro_export]
macro_rules! verify_data {
    ($element:ident, $cond:expr $(,)?) => {
        $crate::verify_data!($element, $cond, "{}", stringify!($cond))
    };
    ($element:ident, $cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::invalid_format(
                stringify!($element),
                format!($($fmt)+),
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_run_count(runs: usize) -> super::Result<usize> {
        verify_data!(runs, runs <= 32768, "{runs} runs exceed the maximum");
        Ok(runs)
    }

    fn check_threshold(threshold: usize) -> super::Result<()> {
        verify_arg!(threshold, threshold > 0);
        Ok(())
    }

    #[test]
    fn verify_data_reports_invalid_format() {
        assert_eq!(check_run_count(10).unwrap(), 10);
        let err = check_run_count(40000).unwrap_err();
        assert!(err.is_format_error());
        match err.kind() {
            ErrorKind::InvalidFormat { element, message } => {
                assert_eq!(element, "runs");
                assert_eq!(message, "40000 runs exceed the maximum");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn verify_arg_defaults_to_condition_text() {
        assert!(check_threshold(1).is_ok());
        let err = check_threshold(0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert_eq!(
            err.to_string(),
            "invalid argument threshold: threshold > 0"
        );
    }
}
