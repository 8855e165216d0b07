use nutype_enum::nutype_enum;

nutype_enum! {
    /// Name association to `sh_slice_type`.
    ///
    /// ISO/IEC 23090-3 - Table 9
    pub enum SliceType(u8) {
        /// B (bi-predictive) slice
        B = 0,
        /// P (predictive) slice
        P = 1,
        /// I (intra) slice
        I = 2,
    }
}

impl SliceType {
    /// The letter used for this slice type in NAL descriptions.
    pub const fn letter(&self) -> &'static str {
        match self.0 {
            0 => "B",
            1 => "P",
            2 => "I",
            _ => "?",
        }
    }
}
