//! Declarative registration of golden tests.

/// Declares a golden suite and registers each listed function as a test.
///
/// Every `fn` in the block becomes a `#[test]` inside a module named after the
/// suite. The body receives a [`Recorder`](crate::Recorder) bound to a fresh
/// scratch file; after it returns, the output is compared with
/// `test_results/{file_stem}.{Suite}.{fn}.txt` next to the invoking source
/// file, and any failure panics with a rendered diagnostic.
///
/// An optional [`SuiteConfig`](crate::SuiteConfig) expression follows the
/// suite name.
///
/// ```rust,ignore
/// golden_record::golden_suite! {
///     suite Greeter(golden_record::SuiteConfig::with_echo(true));
///
///     fn hello(rec) {
///         rec.output("hello");
///     }
/// }
/// ```
#[macro_export]
macro_rules! golden_suite {
    (
        $(#[$suite_meta:meta])*
        suite $suite:ident $(($config:expr))?;
        $(
            $(#[$meta:meta])*
            fn $name:ident($rec:ident) $body:block
        )*
    ) => {
        $(#[$suite_meta])*
        #[allow(non_snake_case)]
        mod $suite {
            #[allow(unused_imports)]
            use super::*;

            fn __golden_suite() -> $crate::Suite {
                #[allow(unused_variables)]
                let config = $crate::SuiteConfig::default();
                $( let config: $crate::SuiteConfig = $config; )?
                $crate::assert_golden($crate::Suite::locate(
                    &$crate::SourceLocation::new(env!("CARGO_MANIFEST_DIR"), file!()),
                    stringify!($suite),
                    &config,
                ))
            }

            $(
                $(#[$meta])*
                #[test]
                fn $name() {
                    let suite = __golden_suite();
                    $crate::assert_golden(
                        suite.run(stringify!($name), |$rec| $body),
                    );
                }
            )*
        }
    };
}
