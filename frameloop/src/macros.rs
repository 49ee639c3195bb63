#[cfg(feature = "tracing")]
macro_rules! fltrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "frameloop", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! fltrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! fldebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "frameloop", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! fldebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! flwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "frameloop", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! flwarn {
    ($($tt:tt)*) => {};
}
