/// Options of an [`AnnexBParser`](crate::AnnexBParser).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Attach the list of decoded syntax elements to every [`ParsedNal`](crate::ParsedNal).
    ///
    /// Defaults to `false`.
    pub record_fields: bool,
    /// Fail picture and slice headers that use an APS which has not been received.
    ///
    /// Defaults to `false`.
    pub strict_aps_references: bool,
    /// The largest NAL unit accepted, in bytes, including the NAL unit header.
    ///
    /// Defaults to 16 MiB.
    pub max_nal_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            record_fields: false,
            strict_aps_references: false,
            max_nal_size: 16 * 1024 * 1024,
        }
    }
}

impl ParserConfig {
    pub fn with_record_fields(mut self, record_fields: bool) -> Self {
        self.record_fields = record_fields;
        self
    }

    pub fn with_strict_aps_references(mut self, strict_aps_references: bool) -> Self {
        self.strict_aps_references = strict_aps_references;
        self
    }

    pub fn with_max_nal_size(mut self, max_nal_size: usize) -> Self {
        self.max_nal_size = max_nal_size;
        self
    }
}
