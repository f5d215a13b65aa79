//! A hand-rolled `std::env::args()` walker, deliberately not a
//! general-purpose option-parsing crate: each binary's flag set is small
//! and fixed, so a plain scan over the argument vector reads clearer than
//! a declarative parser would.

use crate::error::CliError;

/// A mutable argument vector (argv\[1..\]) that flags are plucked out of
/// as they're recognised; whatever remains at the end is positional.
pub struct ArgWalker {
    args: Vec<String>,
}

impl ArgWalker {
    pub fn from_env() -> Self {
        Self {
            args: std::env::args().skip(1).collect(),
        }
    }

    #[cfg(test)]
    pub fn from_args(args: Vec<String>) -> Self {
        Self { args }
    }

    /// Removes `flag` wherever it appears, returning whether it was present.
    pub fn take_flag(&mut self, flag: &str) -> bool {
        match self.args.iter().position(|a| a == flag) {
            Some(idx) => {
                self.args.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Removes `flag` and the value immediately following it, parsed by `f`.
    pub fn take_value<T>(
        &mut self,
        flag: &str,
        f: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, CliError> {
        let Some(idx) = self.args.iter().position(|a| a == flag) else {
            return Ok(None);
        };
        if idx + 1 >= self.args.len() {
            return Err(CliError::Argument(format!("{flag} requires a value")));
        }
        self.args.remove(idx);
        let raw = self.args.remove(idx);
        f(&raw)
            .map(Some)
            .ok_or_else(|| CliError::Argument(format!("invalid value for {flag}: {raw:?}")))
    }

    /// Scans for the first of several mutually exclusive flags, removing
    /// and returning it.
    pub fn take_any_flag(&mut self, flags: &[&str]) -> Option<String> {
        let idx = self.args.iter().position(|a| flags.contains(&a.as_str()))?;
        Some(self.args.remove(idx))
    }

    /// Everything left once all flags have been consumed.
    pub fn remaining(&self) -> &[String] {
        &self.args
    }

    pub fn into_remaining(self) -> Vec<String> {
        self.args
    }
}

pub fn parse_f64(raw: &str) -> Option<f64> {
    raw.parse().ok()
}

pub fn parse_u64(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

pub fn parse_usize(raw: &str) -> Option<usize> {
    raw.parse().ok()
}

pub fn parse_u8(raw: &str) -> Option<u8> {
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_flag_from_anywhere() {
        let mut walker = ArgWalker::from_args(vec!["file.csv".into(), "-p".into()]);
        assert!(walker.take_flag("-p"));
        assert_eq!(walker.remaining(), &["file.csv"]);
    }

    #[test]
    fn takes_value_pair() {
        let mut walker = ArgWalker::from_args(vec!["-w".into(), "10".into(), "f.csv".into()]);
        let w = walker.take_value("-w", parse_usize).unwrap();
        assert_eq!(w, Some(10));
        assert_eq!(walker.remaining(), &["f.csv"]);
    }

    #[test]
    fn missing_value_is_argument_error() {
        let mut walker = ArgWalker::from_args(vec!["-w".into()]);
        let err = walker.take_value("-w", parse_usize).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn take_any_flag_picks_first_match() {
        let mut walker = ArgWalker::from_args(vec!["-l".into(), "f.csv".into()]);
        let picked = walker.take_any_flag(&["-e", "-l", "-L"]);
        assert_eq!(picked.as_deref(), Some("-l"));
        assert_eq!(walker.remaining(), &["f.csv"]);
    }
}
