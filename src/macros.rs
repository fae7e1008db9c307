/// Build a `$t` from its `Default`, overriding the listed fields
#[macro_export]
macro_rules! new_t {
    ($t:ty, $($k:ident = $v:expr),+ $(,)?) => {{
        let mut value = <$t>::default();
        $(value.$k = $v;)+
        value
    }};
}

/// Run the same test body once per listed type, with that type bound to `T`.
/// Used to exercise randomized operators under more than one generator.
#[macro_export]
macro_rules! test_t {
    ($name:ident[T: $($impl:ty)|*]() $body:tt) => {$(
        ::paste::paste! {
            #[test]
            fn [<test_ $name _ $impl:snake>]() {
                type T = $impl;
                $body
            }
        }
    )+};
}

#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        $crate::assert_f64_approx!($l, $r, tol = 1e-9)
    };
    ($l:expr, $r:expr, tol = $tol:expr) => {{
        let (l, r): (f64, f64) = ($l, $r);
        assert!((l - r).abs() < $tol, "assertion failed: {l} !~ {r}");
    }};
}
