use nutype_enum::nutype_enum;

nutype_enum! {
    /// NAL unit types as defined by ISO/IEC 23090-3 Table 5.
    pub enum NALUnitType(u8) {
        /// Coded slice of a trailing picture or subpicture
        ///
        /// NAL unit type class: VCL
        TrailNut = 0,
        /// Coded slice of an STSA picture or subpicture
        ///
        /// NAL unit type class: VCL
        StsaNut = 1,
        /// Coded slice of a RADL picture or subpicture
        ///
        /// NAL unit type class: VCL
        RadlNut = 2,
        /// Coded slice of a RASL picture or subpicture
        ///
        /// NAL unit type class: VCL
        RaslNut = 3,
        /// Reserved non-IRAP VCL NAL unit type
        ///
        /// NAL unit type class: VCL
        RsvVcl4 = 4,
        /// Reserved non-IRAP VCL NAL unit type
        ///
        /// NAL unit type class: VCL
        RsvVcl5 = 5,
        /// Reserved non-IRAP VCL NAL unit type
        ///
        /// NAL unit type class: VCL
        RsvVcl6 = 6,
        /// Coded slice of an IDR picture or subpicture
        ///
        /// NAL unit type class: VCL
        IdrWRadl = 7,
        /// Coded slice of an IDR picture or subpicture
        ///
        /// NAL unit type class: VCL
        IdrNLp = 8,
        /// Coded slice of a CRA picture or subpicture
        ///
        /// NAL unit type class: VCL
        CraNut = 9,
        /// Coded slice of a GDR picture or subpicture
        ///
        /// NAL unit type class: VCL
        GdrNut = 10,
        /// Reserved IRAP VCL NAL unit type
        ///
        /// NAL unit type class: VCL
        RsvIrap11 = 11,
        /// Operating point information
        ///
        /// NAL unit type class: non-VCL
        OpiNut = 12,
        /// Decoding capability information
        ///
        /// NAL unit type class: non-VCL
        DciNut = 13,
        /// Video parameter set
        ///
        /// NAL unit type class: non-VCL
        VpsNut = 14,
        /// Sequence parameter set
        ///
        /// NAL unit type class: non-VCL
        SpsNut = 15,
        /// Picture parameter set
        ///
        /// NAL unit type class: non-VCL
        PpsNut = 16,
        /// Adaptation parameter set
        ///
        /// NAL unit type class: non-VCL
        PrefixApsNut = 17,
        /// Adaptation parameter set
        ///
        /// NAL unit type class: non-VCL
        SuffixApsNut = 18,
        /// Picture header
        ///
        /// NAL unit type class: non-VCL
        PhNut = 19,
        /// Access unit delimiter
        ///
        /// NAL unit type class: non-VCL
        AudNut = 20,
        /// End of sequence
        ///
        /// NAL unit type class: non-VCL
        EosNut = 21,
        /// End of bitstream
        ///
        /// NAL unit type class: non-VCL
        EobNut = 22,
        /// Supplemental enhancement information
        ///
        /// NAL unit type class: non-VCL
        PrefixSeiNut = 23,
        /// Supplemental enhancement information
        ///
        /// NAL unit type class: non-VCL
        SuffixSeiNut = 24,
        /// Filler data
        ///
        /// NAL unit type class: non-VCL
        FdNut = 25,
        /// Reserved non-VCL NAL unit type
        ///
        /// NAL unit type class: non-VCL
        RsvNvcl26 = 26,
        /// Reserved non-VCL NAL unit type
        ///
        /// NAL unit type class: non-VCL
        RsvNvcl27 = 27,
        /// Unspecified non-VCL NAL unit type
        ///
        /// NAL unit type class: non-VCL
        Unspec28 = 28,
        /// Unspecified non-VCL NAL unit type
        ///
        /// NAL unit type class: non-VCL
        Unspec29 = 29,
        /// Unspecified non-VCL NAL unit type
        ///
        /// NAL unit type class: non-VCL
        Unspec30 = 30,
        /// Unspecified non-VCL NAL unit type
        ///
        /// NAL unit type class: non-VCL
        Unspec31 = 31,
    }
}

impl NALUnitType {
    /// Returns `true` if the NAL unit type class of this NAL unit type is VCL (Video Coding Layer).
    ///
    /// See ISO/IEC 23090-3 - Table 5, NAL unit type class column.
    pub const fn is_vcl(&self) -> bool {
        self.0 <= 11
    }

    /// Returns `true` for IRAP pictures (IDR and CRA, plus the reserved IRAP type).
    pub const fn is_irap(&self) -> bool {
        self.0 >= Self::IdrWRadl.0 && self.0 <= Self::RsvIrap11.0 && self.0 != Self::GdrNut.0
    }

    /// Returns `true` for `IDR_W_RADL` and `IDR_N_LP`.
    pub const fn is_idr(&self) -> bool {
        self.0 == Self::IdrWRadl.0 || self.0 == Self::IdrNLp.0
    }

    /// Returns `true` for RASL and RADL pictures.
    pub const fn is_leading(&self) -> bool {
        self.0 == Self::RadlNut.0 || self.0 == Self::RaslNut.0
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::NALUnitType;

    #[test]
    fn classes() {
        assert!(NALUnitType::TrailNut.is_vcl());
        assert!(NALUnitType::RsvIrap11.is_vcl());
        assert!(!NALUnitType::OpiNut.is_vcl());
        assert!(!NALUnitType::SpsNut.is_vcl());

        assert!(NALUnitType::CraNut.is_irap());
        assert!(NALUnitType::IdrNLp.is_irap());
        assert!(!NALUnitType::GdrNut.is_irap());
        assert!(!NALUnitType::RaslNut.is_irap());

        assert!(NALUnitType::IdrWRadl.is_idr());
        assert!(!NALUnitType::CraNut.is_idr());
        assert!(NALUnitType::RadlNut.is_leading());
        assert_eq!(NALUnitType::from(16u8), NALUnitType::PpsNut);
        assert_eq!(u8::from(NALUnitType::PhNut), 19);
    }
}
