use nutype_enum::nutype_enum;

nutype_enum! {
    /// Interpretation of sample aspect ratio indicator.
    ///
    /// ITU-T H.273 - Table 1
    pub enum AspectRatioIdc(u8) {
        /// Unspecified
        Unspecified = 0,
        /// 1:1 (square)
        Square = 1,
        /// 12:11
        Aspect12_11 = 2,
        /// 10:11
        Aspect10_11 = 3,
        /// 16:11
        Aspect16_11 = 4,
        /// 40:33
        Aspect40_33 = 5,
        /// 24:11
        Aspect24_11 = 6,
        /// 20:11
        Aspect20_11 = 7,
        /// 32:11
        Aspect32_11 = 8,
        /// 80:33
        Aspect80_33 = 9,
        /// 18:11
        Aspect18_11 = 10,
        /// 15:11
        Aspect15_11 = 11,
        /// 64:33
        Aspect64_33 = 12,
        /// 160:99
        Aspect160_99 = 13,
        /// 4:3
        Aspect4_3 = 14,
        /// 3:2
        Aspect3_2 = 15,
        /// 2:1
        Aspect2_1 = 16,
        /// `sar_width` and `sar_height` are signalled explicitly.
        ExtendedSar = 255,
    }
}

impl AspectRatioIdc {
    /// The `(width, height)` of a predefined sample aspect ratio.
    pub const fn sample_aspect_ratio(&self) -> Option<(u16, u16)> {
        Some(match self.0 {
            1 => (1, 1),
            2 => (12, 11),
            3 => (10, 11),
            4 => (16, 11),
            5 => (40, 33),
            6 => (24, 11),
            7 => (20, 11),
            8 => (32, 11),
            9 => (80, 33),
            10 => (18, 11),
            11 => (15, 11),
            12 => (64, 33),
            13 => (160, 99),
            14 => (4, 3),
            15 => (3, 2),
            16 => (2, 1),
            _ => return None,
        })
    }
}
