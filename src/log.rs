#![forbid(unsafe_code)]
use std::fmt;
use std::io::stderr;
use std::io::stdout;
use std::io::Write;
use std::sync::Arc;

/// Destination for diagnostic messages.
#[derive(Clone, Default)]
pub enum Rav1lrLogger {
    Stdout,
    #[default]
    Stderr,
    /// Receives each message as UTF-8 text (lossy).
    Callback(Arc<dyn Fn(&str) + Send + Sync>),
}

impl fmt::Debug for Rav1lrLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("Stdout"),
            Self::Stderr => f.write_str("Stderr"),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl Write for Rav1lrLogger {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout => stdout().write(buf),
            Self::Stderr => stderr().write(buf),
            Self::Callback(callback) => {
                callback(&String::from_utf8_lossy(buf));
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout => stdout().flush(),
            Self::Stderr => stderr().flush(),
            Self::Callback(_) => Ok(()),
        }
    }
}

pub trait Rav1lrLog {
    fn log(&self, args: fmt::Arguments);
}

impl Rav1lrLog for Rav1lrLogger {
    fn log(&self, args: fmt::Arguments) {
        // Formatting into one string first keeps a callback message whole.
        let msg = args.to_string();
        let _ = self.clone().write_all(msg.as_bytes());
    }
}

impl<L: Rav1lrLog> Rav1lrLog for Option<L> {
    fn log(&self, args: fmt::Arguments) {
        if let Some(logger) = self {
            logger.log(args);
        }
    }
}

macro_rules! write_log {
    ($logger:expr, $($arg:tt)+) => {
        $crate::src::log::Rav1lrLog::log(&$logger, format_args!($($arg)+))
    };
}

pub(crate) use write_log;
