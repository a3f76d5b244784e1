//! Severity levels.
//!
//! Ordering is numeric: `Trace` is the least severe, `Test` the most.
//! `Disabled` sits above every real level and is only meaningful as a
//! threshold, where it suppresses all output.

/// Color reset sequence appended after a colored record.
pub const COLOR_RESET: &str = "\x1b[0m";

/// Display character for a raw level outside the enumeration.
pub const UNKNOWN_LEVEL_CHAR: char = 'X';

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Crit = 5,
    Test = 6,
    Disabled = 7,
}

impl LogLevel {
    /// Number of defined levels, `Disabled` included.
    pub const COUNT: u8 = 8;

    /// All levels in ascending order.
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Crit,
        LogLevel::Test,
        LogLevel::Disabled,
    ];

    /// Convert from raw u8 value.
    ///
    /// Returns `None` for values `>= COUNT`.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Trace),
            1 => Some(LogLevel::Debug),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Warn),
            4 => Some(LogLevel::Error),
            5 => Some(LogLevel::Crit),
            6 => Some(LogLevel::Test),
            7 => Some(LogLevel::Disabled),
            _ => None,
        }
    }

    /// Single character written in the level column.
    pub const fn as_char(self) -> char {
        match self {
            LogLevel::Trace => 'T',
            LogLevel::Debug => 'D',
            LogLevel::Info => 'I',
            LogLevel::Warn => 'W',
            LogLevel::Error => 'E',
            LogLevel::Crit => 'C',
            LogLevel::Test => 'S',
            LogLevel::Disabled => 'Y',
        }
    }

    /// Level character for a raw value, `X` when it is not a level.
    pub const fn char_for_raw(value: u8) -> char {
        match Self::from_u8(value) {
            Some(level) => level.as_char(),
            None => UNKNOWN_LEVEL_CHAR,
        }
    }

    /// ANSI color prefix.
    pub const fn color(self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[34m",    // blue
            LogLevel::Debug => "\x1b[37m",    // white
            LogLevel::Info => "\x1b[32m",     // green
            LogLevel::Warn => "\x1b[33m",     // yellow
            LogLevel::Error => "\x1b[31m",    // red
            LogLevel::Crit => "\x1b[91m",     // bright red
            LogLevel::Test => "\x1b[36m",     // cyan
            LogLevel::Disabled => "\x1b[90m", // dark grey
        }
    }

    /// Convert to string for output.
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Crit => "CRIT",
            LogLevel::Test => "TEST",
            LogLevel::Disabled => "DISABLED",
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Crit);
        assert!(LogLevel::Crit < LogLevel::Test);
        assert!(LogLevel::Test < LogLevel::Disabled);
    }

    #[test]
    fn test_from_u8_round_trip_and_bounds() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_u8(level as u8), Some(level));
        }
        assert_eq!(LogLevel::from_u8(LogLevel::COUNT), None);
        assert_eq!(LogLevel::from_u8(u8::MAX), None);
    }

    #[test]
    fn test_level_chars() {
        let chars: Vec<char> = LogLevel::ALL.iter().map(|l| l.as_char()).collect();
        assert_eq!(chars, ['T', 'D', 'I', 'W', 'E', 'C', 'S', 'Y']);
        assert_eq!(LogLevel::char_for_raw(LogLevel::COUNT), 'X');
        assert_eq!(LogLevel::char_for_raw(3), 'W');
    }

    #[test]
    fn test_colors_are_escape_sequences() {
        for level in LogLevel::ALL {
            assert!(level.color().starts_with("\x1b["));
            assert!(level.color().ends_with('m'));
        }
        assert_eq!(LogLevel::Warn.color(), "\x1b[33m");
    }
}
