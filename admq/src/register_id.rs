use std::borrow::Cow;

const DEFAULT_PREFIX: &str = "MH26";
const DEFAULT_WIDTH: usize = 6;

/// Formatting for issued registration identifiers, e.g. `MH26000504`.
#[derive(Clone, Debug)]
pub struct IdFormat {
    prefix: Cow<'static, str>,
    width: usize,
}

impl Default for IdFormat {
    fn default() -> Self {
        Self {
            prefix: Cow::Borrowed(DEFAULT_PREFIX),
            width: DEFAULT_WIDTH,
        }
    }
}

impl IdFormat {
    pub fn new(prefix: impl Into<Cow<'static, str>>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width,
        }
    }

    pub fn render(&self, seq: u64) -> String {
        format!("{}{:0width$}", self.prefix, seq, width = self.width)
    }

    /// Inverse of [`render`](Self::render); used to read the current
    /// maximum issued sequence back out of persisted identifiers.
    pub fn parse_seq(&self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(self.prefix.as_ref())?;
        if digits.len() < self.width || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_zero_padded_identifier() {
        let format = IdFormat::default();
        assert_eq!(format.render(504), "MH26000504");
        assert_eq!(format.render(1), "MH26000001");
    }

    #[test]
    fn render_does_not_truncate_past_the_width() {
        let format = IdFormat::default();
        assert_eq!(format.render(1_234_567), "MH261234567");
    }

    #[test]
    fn parse_is_the_inverse_of_render() {
        let format = IdFormat::default();
        for seq in [1u64, 504, 999_999, 1_234_567] {
            assert_eq!(format.parse_seq(&format.render(seq)), Some(seq));
        }
    }

    #[test]
    fn parse_rejects_foreign_identifiers() {
        let format = IdFormat::default();
        assert_eq!(format.parse_seq("CA25000504"), None);
        assert_eq!(format.parse_seq("MH26"), None);
        assert_eq!(format.parse_seq("MH2600O504"), None);
    }
}
