//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Data format error (the picker returned a device not in the list)
pub const DATAERR: i32 = 65;

/// Service unavailable (no device connected)
pub const UNAVAILABLE: i32 = 69;

/// Internal software error (dispatched child died from a signal)
pub const SOFTWARE: i32 = 70;

/// Input/output error (adb or the picker could not be spawned)
pub const IOERR: i32 = 74;

/// Interactive selection aborted by the user (128 + SIGINT)
pub const CANCELLED: i32 = 130;
