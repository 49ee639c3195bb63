#[cfg(feature = "tracing")]
macro_rules! fldebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "frameloop_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! fldebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! flwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "frameloop_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! flwarn {
    ($($tt:tt)*) => {};
}
