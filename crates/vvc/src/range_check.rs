/// Checks that a decoded value lies within `[lower, upper]`.
///
/// Evaluates to `Result<(), VvcError>`. The field name is taken from the expression unless an
/// explicit name is passed as the first argument.
macro_rules! range_check {
    ($name:literal, $n:expr, $lower:expr, $upper:expr) => {
        $crate::range_check::check($name, $n as i64, $lower as i64, $upper as i64)
    };
    ($n:expr, $lower:expr, $upper:expr) => {
        $crate::range_check::check(stringify!($n), $n as i64, $lower as i64, $upper as i64)
    };
}

pub(crate) const fn check(field: &'static str, value: i64, min: i64, max: i64) -> crate::Result<()> {
    if value < min || value > max {
        Err(crate::VvcError::RangeViolation { field, value, min, max })
    } else {
        Ok(())
    }
}

pub(crate) use range_check;
