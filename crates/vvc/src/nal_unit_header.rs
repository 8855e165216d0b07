use std::io;
use std::num::NonZero;

use byteorder::{BigEndian, ReadBytesExt};

use crate::NALUnitType;
use crate::error::{Result, VvcError};
use crate::range_check::range_check;

/// The two byte VVC NAL unit header.
///
/// ISO/IEC 23090-3 - 7.3.1.2
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NALUnitHeader {
    /// Specifies the identifier of the layer to which a VCL NAL unit belongs or the identifier of a
    /// layer to which a non-VCL NAL unit applies.
    ///
    /// This value ranges from \[0, 55\]. Values 56 to 63 are reserved.
    pub nuh_layer_id: u8,

    pub nal_unit_type: NALUnitType,

    /// The `nuh_temporal_id_plus1` is 3 bits, where the value minus 1 is the temporal id for the NAL unit.
    ///
    /// This value cannot be 0.
    pub nuh_temporal_id_plus1: NonZero<u8>,
}

impl NALUnitHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 2;

    pub fn parse(reader: &mut impl io::Read) -> Result<Self> {
        let header = reader.read_u16::<BigEndian>()?;

        // forbidden_zero_bit
        if header & 0x8000 != 0 {
            return Err(VvcError::ForbiddenZeroBit);
        }

        let nuh_reserved_zero_bit = (header >> 14) & 1;
        range_check!(nuh_reserved_zero_bit, 0, 0)?;

        let nuh_layer_id = ((header >> 8) & 0x3F) as u8;
        range_check!(nuh_layer_id, 0, 55)?;

        let nal_unit_type = NALUnitType::from(((header >> 3) & 0x1F) as u8);

        let nuh_temporal_id_plus1 = (header & 0x7) as u8;
        let nuh_temporal_id_plus1 = NonZero::new(nuh_temporal_id_plus1).ok_or(VvcError::RangeViolation {
            field: "nuh_temporal_id_plus1",
            value: 0,
            min: 1,
            max: 7,
        })?;

        if nal_unit_type.is_irap() && nuh_temporal_id_plus1.get() != 1 {
            return Err(VvcError::RangeViolation {
                field: "TemporalId",
                value: nuh_temporal_id_plus1.get() as i64 - 1,
                min: 0,
                max: 0,
            });
        }

        Ok(Self {
            nuh_layer_id,
            nal_unit_type,
            nuh_temporal_id_plus1,
        })
    }

    /// Returns the temporal id of the NAL unit.
    ///
    /// `TemporalId` (7-1).
    #[inline]
    pub const fn temporal_id(&self) -> u8 {
        self.nuh_temporal_id_plus1.get() - 1
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io;

    use super::NALUnitHeader;
    use crate::{NALUnitType, VvcError};

    #[test]
    fn sps_header() {
        // layer 0, SPS_NUT, temporal id 0
        let header = NALUnitHeader::parse(&mut io::Cursor::new([0x00, 0x79])).unwrap();
        assert_eq!(header.nal_unit_type, NALUnitType::SpsNut);
        assert_eq!(header.nuh_layer_id, 0);
        assert_eq!(header.temporal_id(), 0);
    }

    #[test]
    fn layer_and_temporal_id() {
        // layer 2, TRAIL_NUT, temporal id 3
        let header = NALUnitHeader::parse(&mut io::Cursor::new([0x02, 0x04])).unwrap();
        assert_eq!(header.nal_unit_type, NALUnitType::TrailNut);
        assert_eq!(header.nuh_layer_id, 2);
        assert_eq!(header.temporal_id(), 3);
    }

    #[test]
    fn invalid_headers() {
        assert!(matches!(
            NALUnitHeader::parse(&mut io::Cursor::new([0x80, 0x79])).unwrap_err(),
            VvcError::ForbiddenZeroBit
        ));
        assert_eq!(
            NALUnitHeader::parse(&mut io::Cursor::new([0x00, 0x78])).unwrap_err().to_string(),
            "nuh_temporal_id_plus1 is out of range [1, 7]: 0"
        );
        assert_eq!(
            NALUnitHeader::parse(&mut io::Cursor::new([0x38, 0x79])).unwrap_err().to_string(),
            "nuh_layer_id is out of range [0, 55]: 56"
        );
        // IDR_W_RADL with temporal id 1
        assert!(NALUnitHeader::parse(&mut io::Cursor::new([0x00, 0x3A])).is_err());
        assert!(matches!(
            NALUnitHeader::parse(&mut io::Cursor::new([0x00])).unwrap_err(),
            VvcError::Io(_)
        ));
    }
}
