//! Typed field extraction from one pre-parsed message line.

use std::str::FromStr;

/// [FieldReader] scans one pre-parsed RTCM line for `key=value` tokens.
/// Keys are located by the `"<key>="` substring; values run until the
/// next separator. Missing keys are not an error: the decoders keep
/// their zero-initialized defaults in that case and validate the
/// structural outcome instead.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldReader<'a> {
    line: &'a str,
}

impl<'a> FieldReader<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line }
    }

    /// Locates `"<key>="` and returns the raw value that follows,
    /// stripped of the `", "` token separator and closing wrapper.
    pub fn value_str(&self, key: &str) -> Option<&'a str> {
        let mut search = self.line;
        let mut base = 0;

        loop {
            let offset = search.find(key)?;
            let value_offset = offset + key.len();

            // exact token match: next char must be '=', and the key must
            // not be the tail of a longer one ("PRN" inside "CELLPRN")
            let follows = search[value_offset..].chars().next();
            let leads = search[..offset].chars().next_back();
            let tail_of_longer = matches!(leads, Some(c) if c.is_alphanumeric() || c == '_');

            match follows {
                Some('=') if !tail_of_longer => {
                    let value = &self.line[base + value_offset + 1..];
                    let end = value
                        .find(|c: char| c == ',' || c == ')' || c.is_whitespace())
                        .unwrap_or(value.len());
                    return Some(&value[..end]);
                },
                _ => {
                    // resume past this occurrence
                    base += value_offset;
                    search = &self.line[base..];
                },
            }
        }
    }

    /// Reads one field and parses it to the requested scalar type.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.value_str(key)?.trim().parse::<T>().ok()
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.parse::<f64>(key)
    }

    pub fn u16(&self, key: &str) -> Option<u16> {
        // integer fields may be rendered with a decimal point
        let value = self.value_str(key)?.trim();
        value
            .parse::<u16>()
            .ok()
            .or_else(|| value.parse::<f64>().ok().map(|f| f as u16))
    }

    pub fn u8(&self, key: &str) -> Option<u8> {
        let value = self.value_str(key)?.trim();
        value
            .parse::<u8>()
            .ok()
            .or_else(|| value.parse::<f64>().ok().map(|f| f as u8))
    }

    /// Reads one member of an indexed field group (`DF400_01`, ...).
    /// Group suffixes are two digit, one based.
    pub fn indexed_f64(&self, key: &str, index: usize) -> Option<f64> {
        self.f64(&Self::indexed_key(key, index))
    }

    /// Reads one member of an indexed field group as raw text
    /// (`CELLSIG_01=1C`, ...).
    pub fn indexed_str(&self, key: &str, index: usize) -> Option<&'a str> {
        self.value_str(&Self::indexed_key(key, index))
    }

    pub fn indexed_u8(&self, key: &str, index: usize) -> Option<u8> {
        self.u8(&Self::indexed_key(key, index))
    }

    fn indexed_key(key: &str, index: usize) -> String {
        format!("{}_{:02}", key, index + 1)
    }
}
