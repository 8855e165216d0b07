use nutype_enum::nutype_enum;

nutype_enum! {
    /// APS parameters type codes.
    ///
    /// ISO/IEC 23090-3 - Table 6
    pub enum ApsParamsType(u8) {
        /// ALF parameters
        AlfAps = 0,
        /// LMCS parameters
        LmcsAps = 1,
        /// Scaling list parameters
        ScalingAps = 2,
    }
}

impl ApsParamsType {
    /// The name used in descriptions and registry errors.
    pub const fn name(&self) -> &'static str {
        match self.0 {
            0 => "ALF APS",
            1 => "LMCS APS",
            2 => "SCALING APS",
            _ => "APS",
        }
    }

    /// The largest valid `aps_adaptation_parameter_set_id` for this type.
    pub const fn max_id(&self) -> u8 {
        if self.0 == Self::LmcsAps.0 { 3 } else { 7 }
    }
}
