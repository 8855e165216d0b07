use crate::AspectRatioIdc;
use crate::error::{Result, VvcError};
use crate::reader::RbspReader;

/// `vui_parameters()` carried in the SPS VUI payload.
///
/// ISO/IEC 23090-3 - 7.3.2.21 and ITU-T H.274 - 7.2
#[derive(Debug, Clone, PartialEq)]
pub struct VuiParameters {
    pub vui_progressive_source_flag: bool,
    pub vui_interlaced_source_flag: bool,
    pub vui_non_packed_constraint_flag: bool,
    pub vui_non_projected_constraint_flag: bool,
    pub aspect_ratio_info: Option<AspectRatioInfo>,
    pub vui_overscan_appropriate_flag: Option<bool>,
    pub colour_description: ColourDescription,
    pub chroma_loc_info: Option<ChromaLocInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AspectRatioInfo {
    pub vui_aspect_ratio_constant_flag: bool,
    pub vui_aspect_ratio_idc: AspectRatioIdc,
    /// Only set for [`AspectRatioIdc::ExtendedSar`].
    pub sar: Option<(u16, u16)>,
}

/// The colour description, with the unspecified defaults when not present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColourDescription {
    pub vui_colour_primaries: u8,
    pub vui_transfer_characteristics: u8,
    pub vui_matrix_coeffs: u8,
    pub vui_full_range_flag: bool,
}

impl Default for ColourDescription {
    fn default() -> Self {
        Self {
            vui_colour_primaries: 2,
            vui_transfer_characteristics: 2,
            vui_matrix_coeffs: 2,
            vui_full_range_flag: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromaLocInfo {
    Frame(u8),
    Field { top: u8, bottom: u8 },
}

impl VuiParameters {
    /// Parses `vui_payload(payload_size)`.
    ///
    /// The reader must be byte aligned. It is left at the end of the payload, so any
    /// `vui_extension_data` or payload padding is skipped.
    pub fn parse_payload(reader: &mut RbspReader, payload_size: usize) -> Result<Self> {
        let start = reader.bits_read();
        let vui = Self::parse(reader)?;

        let end = start + payload_size * 8;
        let consumed = reader.bits_read();
        if consumed > end {
            return Err(VvcError::RangeViolation {
                field: "sps_vui_payload_size_minus1",
                value: payload_size as i64 - 1,
                min: (consumed - start).div_ceil(8) as i64 - 1,
                max: 1023,
            });
        }
        reader.skip_bits("vui_payload_bit", end - consumed)?;

        Ok(vui)
    }

    fn parse(reader: &mut RbspReader) -> Result<Self> {
        let vui_progressive_source_flag = reader.read_flag("vui_progressive_source_flag")?;
        let vui_interlaced_source_flag = reader.read_flag("vui_interlaced_source_flag")?;
        let vui_non_packed_constraint_flag = reader.read_flag("vui_non_packed_constraint_flag")?;
        let vui_non_projected_constraint_flag = reader.read_flag("vui_non_projected_constraint_flag")?;

        let mut aspect_ratio_info = None;
        if reader.read_flag("vui_aspect_ratio_info_present_flag")? {
            let vui_aspect_ratio_constant_flag = reader.read_flag("vui_aspect_ratio_constant_flag")?;
            let vui_aspect_ratio_idc = AspectRatioIdc::from(reader.read_bits("vui_aspect_ratio_idc", 8)? as u8);
            let mut sar = None;
            if vui_aspect_ratio_idc == AspectRatioIdc::ExtendedSar {
                let width = reader.read_bits("vui_sar_width", 16)? as u16;
                let height = reader.read_bits("vui_sar_height", 16)? as u16;
                sar = Some((width, height));
            }
            aspect_ratio_info = Some(AspectRatioInfo {
                vui_aspect_ratio_constant_flag,
                vui_aspect_ratio_idc,
                sar,
            });
        }

        let mut vui_overscan_appropriate_flag = None;
        if reader.read_flag("vui_overscan_info_present_flag")? {
            vui_overscan_appropriate_flag = Some(reader.read_flag("vui_overscan_appropriate_flag")?);
        }

        let mut colour_description = ColourDescription::default();
        if reader.read_flag("vui_colour_description_present_flag")? {
            colour_description = ColourDescription {
                vui_colour_primaries: reader.read_bits("vui_colour_primaries", 8)? as u8,
                vui_transfer_characteristics: reader.read_bits("vui_transfer_characteristics", 8)? as u8,
                vui_matrix_coeffs: reader.read_bits("vui_matrix_coeffs", 8)? as u8,
                vui_full_range_flag: reader.read_flag("vui_full_range_flag")?,
            };
        }

        let mut chroma_loc_info = None;
        if reader.read_flag("vui_chroma_loc_info_present_flag")? {
            if vui_progressive_source_flag && !vui_interlaced_source_flag {
                chroma_loc_info = Some(ChromaLocInfo::Frame(read_loc_type(
                    reader,
                    "vui_chroma_sample_loc_type_frame",
                )?));
            } else {
                let top = read_loc_type(reader, "vui_chroma_sample_loc_type_top_field")?;
                let bottom = read_loc_type(reader, "vui_chroma_sample_loc_type_bottom_field")?;
                chroma_loc_info = Some(ChromaLocInfo::Field { top, bottom });
            }
        }

        Ok(Self {
            vui_progressive_source_flag,
            vui_interlaced_source_flag,
            vui_non_packed_constraint_flag,
            vui_non_projected_constraint_flag,
            aspect_ratio_info,
            vui_overscan_appropriate_flag,
            colour_description,
            chroma_loc_info,
        })
    }

    /// The sample aspect ratio as `(width, height)`, if known.
    pub fn sample_aspect_ratio(&self) -> Option<(u16, u16)> {
        let info = self.aspect_ratio_info.as_ref()?;
        info.sar.or(info.vui_aspect_ratio_idc.sample_aspect_ratio())
    }
}

fn read_loc_type(reader: &mut RbspReader, name: &'static str) -> Result<u8> {
    let value = reader.read_uev(name)?;
    crate::range_check::check(name, value as i64, 0, 6)?;
    Ok(value as u8)
}
