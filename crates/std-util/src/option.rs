/// Unwraps a `Some`, panicking with the expression text otherwise.
#[macro_export]
macro_rules! assert_some {
    ($e:expr) => {
        match $e {
            Some(value) => value,
            None => panic!("expected `{}` to be `Some`", stringify!($e)),
        }
    };
}

#[macro_export]
macro_rules! assert_none {
    ($e:expr) => {
        if let Some(actual) = &$e {
            panic!("expected `{}` to be `None`; actual={:?}", stringify!($e), actual);
        }
    };
}
