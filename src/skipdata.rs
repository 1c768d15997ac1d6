//! Skip-data policy: what to emit for bytes that do not decode.

use std::fmt;

/// Decides how many bytes a data entry covers.
///
/// Called with the whole input buffer and the offset of the undecodable
/// bytes. The slice is only borrowed for the call. Returning 0, or more
/// than the bytes left, stops the sweep.
pub type SkipCallback = Box<dyn FnMut(&[u8], usize) -> usize + Send>;

/// Default mnemonic of data entries.
pub const DEFAULT_MNEMONIC: &str = ".byte";

/// Emit undecodable bytes as synthetic data instructions instead of
/// stopping.
pub struct SkipData {
    mnemonic: String,
    callback: Option<SkipCallback>,
}

impl SkipData {
    /// Policy with the `.byte` mnemonic and the architecture default length.
    pub fn new() -> Self {
        Self {
            mnemonic: DEFAULT_MNEMONIC.to_string(),
            callback: None,
        }
    }

    /// Replace the mnemonic of data entries.
    pub fn with_mnemonic(mut self, mnemonic: impl Into<String>) -> Self {
        self.mnemonic = mnemonic.into();
        self
    }

    /// Install a length callback. Any state it needs travels in the closure.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[u8], usize) -> usize + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Bytes to skip at `offset`, or `None` to stop.
    ///
    /// Without a callback the architecture unit `default_len` is used, and
    /// a tail shorter than one unit stops the sweep.
    pub(crate) fn skip_len(&mut self, code: &[u8], offset: usize, default_len: usize) -> Option<usize> {
        let left = code.len().saturating_sub(offset);
        let len = match self.callback.as_mut() {
            Some(cb) => cb(code, offset),
            None => default_len,
        };
        (len != 0 && len <= left).then_some(len)
    }
}

impl Default for SkipData {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SkipData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipData")
            .field("mnemonic", &self.mnemonic)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Operand text of a data entry: `0x55, 0x48`.
pub(crate) fn data_op_str(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_default_length() {
        let mut skip = SkipData::new();
        assert_eq!(skip.mnemonic(), ".byte");
        assert_eq!(skip.skip_len(&[0; 8], 0, 4), Some(4));
        assert_eq!(skip.skip_len(&[0; 8], 6, 4), None);
    }

    #[test]
    fn test_callback_sees_buffer_and_offset() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut skip = SkipData::new()
            .with_mnemonic("db")
            .with_callback(move |code, offset| {
                seen.fetch_add(1, Ordering::SeqCst);
                code.len() - offset
            });
        assert_eq!(skip.mnemonic(), "db");
        assert_eq!(skip.skip_len(&[1, 2, 3, 4, 5], 2, 1), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_can_stop() {
        let mut zero = SkipData::new().with_callback(|_, _| 0);
        assert_eq!(zero.skip_len(&[0; 4], 0, 1), None);
        let mut past_end = SkipData::new().with_callback(|code, _| code.len() + 1);
        assert_eq!(past_end.skip_len(&[0; 4], 0, 1), None);
    }

    #[test]
    fn test_data_text() {
        assert_eq!(data_op_str(&[0xff, 0x0a]), "0xff, 0x0a");
        assert_eq!(format!("{:?}", SkipData::new()), "SkipData { mnemonic: \".byte\", callback: false }");
    }
}
