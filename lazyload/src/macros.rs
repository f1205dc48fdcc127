// Crate-private logging. Every event goes to the `lazyload` target; without the `tracing`
// feature the arguments are dropped unevaluated.

#[cfg(feature = "tracing")]
macro_rules! levent {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!(target: "lazyload", $($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! levent {
    ($level:ident, $($arg:tt)+) => {};
}

macro_rules! ltrace {
    ($($arg:tt)+) => { levent!(trace, $($arg)+) };
}

macro_rules! ldebug {
    ($($arg:tt)+) => { levent!(debug, $($arg)+) };
}

macro_rules! lwarn {
    ($($arg:tt)+) => { levent!(warn, $($arg)+) };
}

/// Reserved for faults the controller recovers from, such as a panicking callback.
macro_rules! lerror {
    ($($arg:tt)+) => { levent!(error, $($arg)+) };
}
