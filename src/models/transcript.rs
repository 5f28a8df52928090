/// Raw bytes received from the MUSH during one session.
///
/// Append-only while the session runs. Bytes are kept undecoded until the
/// session stops so a multi-byte character split across two reads is not
/// mangled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    bytes: Vec<u8>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode as UTF-8, replacing invalid sequences.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multibyte_character_survives() {
        let text = "Zoë is here\r\n";
        let bytes = text.as_bytes();
        let split = bytes.iter().position(|&b| b == 0xC3).expect("ë lead byte") + 1;

        let mut transcript = Transcript::new();
        transcript.append(&bytes[..split]);
        transcript.append(&bytes[split..]);

        assert_eq!(transcript.to_text(), text);
        assert_eq!(transcript.len(), bytes.len());
    }
}
