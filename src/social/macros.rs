/// Times a block and reports the elapsed time through `tracing`.
///
/// `time_it!("label" => expr)` logs when the block starts and when it ends,
/// `time_it!(at once | "label" => expr)` logs a single event afterwards.
/// Evaluates to the value of the block.
#[macro_export]
macro_rules! time_it {
    ($comment:literal => $stmt:stmt) => {{
        $crate::time_it!(concat!($comment, "") => {$stmt})
    }};
    (at once | $comment:literal => $stmt:stmt) => {{
        $crate::time_it!(at once | concat!($comment, "") => {$stmt})
    }};
    ($comment:expr => $stmt:stmt) => {{
        ::tracing::info!("{}", $comment);
        let start = ::std::time::Instant::now();
        let result = { $stmt };
        let duration = start.elapsed();
        ::tracing::info!(?duration, "{} done", $comment);
        result
    }};
    (at once | $comment:expr => $stmt:stmt) => {{
        let start = ::std::time::Instant::now();
        let result = { $stmt };
        let duration = start.elapsed();
        ::tracing::info!(?duration, "{}", $comment);
        result
    }};
}
