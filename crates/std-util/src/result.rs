/// Unwraps an `Ok`, panicking with the error otherwise.
#[macro_export]
macro_rules! assert_ok {
    ($e:expr) => {
        match $e {
            Ok(value) => value,
            Err(err) => panic!("expected `Ok`; got error: {err}"),
        }
    };
}

/// Unwraps an `Err`, panicking with the value otherwise.
///
/// With a second argument, the error message must also contain it.
#[macro_export]
macro_rules! assert_err {
    ($e:expr) => {
        match $e {
            Ok(value) => panic!("expected `Err`; got Ok({value:?})"),
            Err(err) => err,
        }
    };
    ($e:expr, $needle:expr) => {{
        let err = $crate::assert_err!($e);
        let message = err.to_string();
        assert!(
            message.contains($needle),
            "expected an error containing {:?}; got {:?}",
            $needle,
            message,
        );
        err
    }};
}
