//! Annex-B NAL unit dispatcher.

use std::fmt::Write as _;
use std::sync::Arc;

use bytes::Bytes;

use crate::NALUnitType;
use crate::aps::Aps;
use crate::config::ParserConfig;
use crate::enums::ApsParamsType;
use crate::error::{Result, VvcError};
use crate::io::nal_to_rbsp;
use crate::nal_unit_header::NALUnitHeader;
use crate::picture_header::PictureHeader;
use crate::pps::Pps;
use crate::range_check::range_check;
use crate::reader::{FieldRecord, RbspReader};
use crate::registry::ParameterSets;
use crate::sei::{BufferingPeriod, SeiRbsp};
use crate::slice_header::SliceHeader;
use crate::sps::Sps;
use crate::vps::Vps;

/// `access_unit_delimiter_rbsp()`.
///
/// ISO/IEC 23090-3 - 7.3.2.10
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessUnitDelimiter {
    pub aud_irap_or_gdr_flag: bool,
    /// The value ranges from \[0, 2\].
    pub aud_pic_type: u8,
}

impl AccessUnitDelimiter {
    pub fn parse(reader: &mut RbspReader) -> Result<Self> {
        let aud_irap_or_gdr_flag = reader.read_flag("aud_irap_or_gdr_flag")?;
        let aud_pic_type = reader.read_bits("aud_pic_type", 3)?;
        range_check!(aud_pic_type, 0, 2)?;
        reader.read_rbsp_trailing_bits()?;

        Ok(Self {
            aud_irap_or_gdr_flag,
            aud_pic_type: aud_pic_type as u8,
        })
    }
}

/// The decoded content of a NAL unit.
#[derive(Debug, Clone)]
pub enum NalPayload {
    Vps(Arc<Vps>),
    Sps(Arc<Sps>),
    Pps(Arc<Pps>),
    Aps(Arc<Aps>),
    PictureHeader(Arc<PictureHeader>),
    Slice(Arc<SliceHeader>),
    AccessUnitDelimiter(AccessUnitDelimiter),
    /// Prefix or suffix SEI.
    Sei(Arc<SeiRbsp>),
    /// DCI, OPI, end of sequence, end of bitstream or filler data. The payload is not decoded.
    Skipped,
    /// A reserved or unspecified NAL unit type.
    Unhandled,
}

/// The outcome of [`AnnexBParser::parse_nal_unit`].
#[derive(Debug)]
pub struct ParsedNal {
    /// Position of the NAL unit in the stream, starting at 0.
    pub index: usize,
    /// `None` if the NAL unit header itself could not be read.
    pub header: Option<NALUnitHeader>,
    /// A one line summary, e.g. `NAL 2: 8 POC 0 I-Slice`.
    pub description: String,
    pub result: Result<NalPayload>,
    /// The NAL unit is the first of a new access unit.
    pub new_access_unit: bool,
    /// The syntax elements read, when [`ParserConfig::record_fields`] is set.
    pub fields: Vec<FieldRecord>,
}

impl ParsedNal {
    pub fn payload(&self) -> Option<&NalPayload> {
        self.result.as_ref().ok()
    }

    /// Returns `true` for IDR and CRA NAL units.
    pub fn is_keyframe(&self) -> bool {
        self.header.is_some_and(|h| {
            h.nal_unit_type.is_idr() || h.nal_unit_type == NALUnitType::CraNut
        })
    }
}

/// A stateful parser for the NAL units of one VVC stream.
///
/// The parser keeps the parameter sets, the current picture header and the previous picture
/// used for picture order count derivation. A NAL unit that fails to parse leaves this state
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct AnnexBParser {
    config: ParserConfig,
    parameter_sets: ParameterSets,
    picture_header: Option<Arc<PictureHeader>>,
    poc_anchor: Option<Arc<PictureHeader>>,
    last_sps: Option<Arc<Sps>>,
    buffering_period: Option<Arc<BufferingPeriod>>,
    nal_count: usize,
    started: bool,
    last_nal_was_vcl: bool,
    last_vcl: Option<(u8, i32)>,
}

impl AnnexBParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub const fn parameter_sets(&self) -> &ParameterSets {
        &self.parameter_sets
    }

    /// The picture header of the current picture.
    pub fn picture_header(&self) -> Option<&Arc<PictureHeader>> {
        self.picture_header.as_ref()
    }

    /// The most recent buffering period SEI message, used to interpret picture timing SEI messages.
    pub fn buffering_period(&self) -> Option<&Arc<BufferingPeriod>> {
        self.buffering_period.as_ref()
    }

    /// Parses one NAL unit, with or without its start code.
    pub fn parse_nal_unit(&mut self, data: &[u8]) -> ParsedNal {
        let index = self.nal_count;
        self.nal_count += 1;

        let (header, rbsp) = match self.read_header(strip_start_code(data)) {
            Ok(read) => read,
            Err(err) => return Self::failed(index, None, format!("NAL {index}:"), err, Vec::new()),
        };
        let mut description = format!("NAL {index}: {}", header.nal_unit_type.0);

        let mut reader = RbspReader::with_bit_offset(&rbsp, NALUnitHeader::SIZE * 8);
        if self.config.record_fields {
            reader = reader.with_field_log();
        }
        let result = self.parse_payload(&header, &mut reader);
        let fields = reader.take_field_log();

        match result {
            Ok(payload) => {
                describe(&header, &payload, &mut description);
                let new_access_unit = self.commit(&header, &payload);
                tracing::debug!(index, nal_unit_type = header.nal_unit_type.0, new_access_unit, "{description}");

                ParsedNal {
                    index,
                    header: Some(header),
                    description,
                    result: Ok(payload),
                    new_access_unit,
                    fields,
                }
            }
            Err(err) => Self::failed(index, Some(header), description, err, fields),
        }
    }

    fn failed(
        index: usize,
        header: Option<NALUnitHeader>,
        description: String,
        err: VvcError,
        fields: Vec<FieldRecord>,
    ) -> ParsedNal {
        tracing::warn!(index, error = %err, "failed to parse NAL unit");
        ParsedNal {
            index,
            header,
            description: format!("{description} ERROR {err}"),
            result: Err(err),
            new_access_unit: false,
            fields,
        }
    }

    fn read_header(&self, nal: &[u8]) -> Result<(NALUnitHeader, Vec<u8>)> {
        range_check!("nal_unit_size", nal.len(), NALUnitHeader::SIZE, self.config.max_nal_size)?;
        let rbsp = nal_to_rbsp(nal)?;
        let header = NALUnitHeader::parse(&mut rbsp.as_slice())?;
        Ok((header, rbsp))
    }

    fn parse_payload(&self, header: &NALUnitHeader, reader: &mut RbspReader) -> Result<NalPayload> {
        let sets = &self.parameter_sets;
        let nal_unit_type = header.nal_unit_type;

        let payload = match nal_unit_type {
            NALUnitType::VpsNut => NalPayload::Vps(Arc::new(Vps::parse(reader)?)),
            NALUnitType::SpsNut => NalPayload::Sps(Arc::new(Sps::parse(reader)?)),
            NALUnitType::PpsNut => NalPayload::Pps(Arc::new(Pps::parse(reader, sets)?)),
            NALUnitType::PrefixApsNut | NALUnitType::SuffixApsNut => NalPayload::Aps(Arc::new(Aps::parse(reader)?)),
            NALUnitType::PhNut => {
                let ph = PictureHeader::parse(reader, sets, nal_unit_type, self.poc_anchor.as_deref())?;
                reader.read_rbsp_trailing_bits()?;
                if self.config.strict_aps_references {
                    ph.check_aps_references(sets)?;
                }
                NalPayload::PictureHeader(Arc::new(ph))
            }
            NALUnitType::TrailNut
            | NALUnitType::StsaNut
            | NALUnitType::RadlNut
            | NALUnitType::RaslNut
            | NALUnitType::IdrWRadl
            | NALUnitType::IdrNLp
            | NALUnitType::CraNut
            | NALUnitType::GdrNut => {
                let mut picture_header = self.picture_header.clone();
                if let Some(ph) = &mut picture_header {
                    // a picture header NAL unit does not know it belongs to an IDR picture
                    if nal_unit_type.is_idr() && !ph.ph_poc_msb_cycle_present_flag && ph.pic_order_cnt_msb() != 0 {
                        Arc::make_mut(ph).calculate_picture_order_count(nal_unit_type, None)?;
                    }
                }

                let sh = SliceHeader::parse(reader, nal_unit_type, sets, picture_header, self.poc_anchor.as_deref())?;
                if self.config.strict_aps_references {
                    sh.check_aps_references(sets)?;
                }
                NalPayload::Slice(Arc::new(sh))
            }
            NALUnitType::AudNut => NalPayload::AccessUnitDelimiter(AccessUnitDelimiter::parse(reader)?),
            NALUnitType::PrefixSeiNut | NALUnitType::SuffixSeiNut => NalPayload::Sei(Arc::new(SeiRbsp::parse(
                reader,
                nal_unit_type,
                header.temporal_id(),
                self.last_sps.as_deref(),
                self.buffering_period.as_ref(),
            )?)),
            NALUnitType::DciNut
            | NALUnitType::OpiNut
            | NALUnitType::EosNut
            | NALUnitType::EobNut
            | NALUnitType::FdNut => NalPayload::Skipped,
            _ => NalPayload::Unhandled,
        };

        Ok(payload)
    }

    /// Applies a successfully parsed NAL unit to the parser state and returns whether it starts a
    /// new access unit.
    fn commit(&mut self, header: &NALUnitHeader, payload: &NalPayload) -> bool {
        match payload {
            NalPayload::Vps(vps) => {
                self.parameter_sets.insert_vps(vps.clone());
            }
            NalPayload::Sps(sps) => {
                self.parameter_sets.insert_sps(sps.clone());
                self.last_sps = Some(sps.clone());
            }
            NalPayload::Pps(pps) => {
                self.parameter_sets.insert_pps(pps.clone());
            }
            NalPayload::Aps(aps) => {
                self.parameter_sets.insert_aps(aps.clone());
            }
            NalPayload::PictureHeader(ph) => self.picture_header = Some(ph.clone()),
            NalPayload::Sei(sei) => {
                if let Some(bp) = sei.buffering_period() {
                    self.buffering_period = Some(bp.clone());
                }
            }
            NalPayload::Slice(sh) => {
                let ph = &sh.picture_header;
                if ph.is_poc_anchor(header.nal_unit_type, header.temporal_id()) {
                    self.poc_anchor = Some(ph.clone());
                }
                self.picture_header = Some(ph.clone());
            }
            _ => {}
        }

        self.detect_access_unit(header)
    }

    /// ISO/IEC 23090-3 - 7.4.2.4.3
    fn detect_access_unit(&mut self, header: &NALUnitHeader) -> bool {
        let nal_unit_type = header.nal_unit_type;
        let first = !self.started;
        self.started = true;

        let new_access_unit = if nal_unit_type.is_vcl() {
            let poc = self.picture_header.as_ref().map_or(0, |ph| ph.pic_order_cnt_val());
            let current = (header.nuh_layer_id, poc);
            let changed = self.last_vcl.is_some_and(|last| last != current);
            self.last_vcl = Some(current);
            self.last_nal_was_vcl && changed
        } else {
            self.last_nal_was_vcl
                && matches!(
                    nal_unit_type,
                    NALUnitType::AudNut
                        | NALUnitType::OpiNut
                        | NALUnitType::DciNut
                        | NALUnitType::VpsNut
                        | NALUnitType::SpsNut
                        | NALUnitType::PpsNut
                        | NALUnitType::PrefixApsNut
                        | NALUnitType::PhNut
                        | NALUnitType::PrefixSeiNut
                        | NALUnitType::RsvNvcl26
                        | NALUnitType::Unspec28
                        | NALUnitType::Unspec29
                )
        };
        self.last_nal_was_vcl = nal_unit_type.is_vcl();

        first || new_access_unit
    }
}

fn describe(header: &NALUnitHeader, payload: &NalPayload, out: &mut String) {
    // writing to a String cannot fail
    let _ = match payload {
        NalPayload::Vps(vps) => write!(out, " VPS ID {}", vps.vps_video_parameter_set_id),
        NalPayload::Sps(sps) => write!(out, " SPS ID {}", sps.sps_seq_parameter_set_id),
        NalPayload::Pps(pps) => write!(out, " PPS ID {}", pps.pps_pic_parameter_set_id),
        NalPayload::Aps(aps) => {
            let kind = match aps.aps_params_type {
                ApsParamsType::AlfAps => "ALF",
                ApsParamsType::LmcsAps => "LMCS",
                _ => "SCALING",
            };
            write!(out, " APS {kind} ID {}", aps.aps_adaptation_parameter_set_id)
        }
        NalPayload::PictureHeader(ph) => write!(out, " PH POC {}", ph.pic_order_cnt_val()),
        NalPayload::Slice(sh) => write!(out, " POC {} {}-Slice", sh.pic_order_cnt_val(), sh.sh_slice_type.letter()),
        NalPayload::AccessUnitDelimiter(_) => write!(out, " AUD"),
        NalPayload::Sei(sei) => {
            if sei.buffering_period().is_some() {
                write!(out, " Buffering Period SEI")
            } else if sei.pic_timing().is_some() {
                write!(out, " Picture Timing SEI")
            } else {
                write!(out, " SEI")
            }
        }
        NalPayload::Skipped => {
            let name = match header.nal_unit_type {
                NALUnitType::DciNut => "DCI",
                NALUnitType::OpiNut => "OPI",
                NALUnitType::EosNut => "EOS",
                NALUnitType::EobNut => "EOB",
                _ => "FD",
            };
            write!(out, " {name}")
        }
        NalPayload::Unhandled => Ok(()),
    };
}

fn strip_start_code(data: &[u8]) -> &[u8] {
    match data {
        [0, 0, 0, 1, rest @ ..] | [0, 0, 1, rest @ ..] => rest,
        _ => data,
    }
}

/// Returns the position of the next `0x000001` at or after `from`.
fn find_start_code(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(3)
        .position(|w| w == [0, 0, 1])
        .map(|pos| pos + from)
}

/// Iterator over the NAL units of an Annex-B byte stream. See [`split_annex_b`].
#[derive(Debug, Clone)]
pub struct AnnexBNalUnits {
    data: Bytes,
    next_start_code: Option<usize>,
}

impl Iterator for AnnexBNalUnits {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        let start_code = self.next_start_code?;
        // a four byte start code keeps its zero_byte
        let begin = if start_code > 0 && self.data[start_code - 1] == 0 {
            start_code - 1
        } else {
            start_code
        };

        self.next_start_code = find_start_code(&self.data, start_code + 3);
        let mut end = self.next_start_code.unwrap_or(self.data.len());
        // trailing_zero_8bits
        while end > start_code + 3 && self.data[end - 1] == 0 {
            end -= 1;
        }

        Some(self.data.slice(begin..end))
    }
}

/// Splits an Annex-B byte stream into NAL units, each starting with its start code.
///
/// Bytes before the first start code are ignored.
pub fn split_annex_b(data: impl Into<Bytes>) -> AnnexBNalUnits {
    let data = data.into();
    let next_start_code = find_start_code(&data, 0);
    AnnexBNalUnits { data, next_start_code }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::{AnnexBParser, NalPayload, split_annex_b};
    use crate::NALUnitType;
    use crate::config::ParserConfig;
    use crate::test_util::{RbspBuilder, TestPps, TestSps, annex_b, nal_unit};

    fn sps() -> Vec<u8> {
        nal_unit(NALUnitType::SpsNut, 0, &TestSps::default().rbsp())
    }

    fn pps() -> Vec<u8> {
        let rbsp = TestPps {
            width: 1920,
            height: 1088,
            ..Default::default()
        }
        .rbsp(7);
        nal_unit(NALUnitType::PpsNut, 0, &rbsp)
    }

    /// A slice with an embedded intra picture header.
    fn slice(nal_unit_type: NALUnitType, poc_lsb: u64) -> Vec<u8> {
        let irap = nal_unit_type.is_irap();
        let mut b = RbspBuilder::new()
            .flag(true) // sh_picture_header_in_slice_header_flag
            .flag(irap) // ph_gdr_or_irap_pic_flag
            .flag(false);
        if irap {
            b = b.flag(false); // ph_gdr_pic_flag
        }
        b = b.flag(false).ue(0).bits(poc_lsb, 4);
        if irap {
            b = b.flag(false); // sh_no_output_of_prior_pics_flag
        } else {
            b = b.ue(0).ue(0); // num_ref_entries of both lists
        }
        nal_unit(nal_unit_type, 0, &b.se(0).trailing())
    }

    #[test]
    fn send() {
        fn assert_send<T: Send>() {}
        assert_send::<AnnexBParser>();
    }

    #[test]
    fn parameter_sets_and_slices() {
        let stream = annex_b(&[
            sps(),
            pps(),
            slice(NALUnitType::IdrNLp, 0),
            slice(NALUnitType::TrailNut, 1),
            slice(NALUnitType::TrailNut, 2),
        ]);

        let mut parser = AnnexBParser::default();
        let parsed = split_annex_b(stream)
            .map(|nal| parser.parse_nal_unit(&nal))
            .collect::<Vec<_>>();

        let descriptions = parsed.iter().map(|p| p.description.as_str()).collect::<Vec<_>>();
        insta::assert_debug_snapshot!(descriptions, @r#"
        [
            "NAL 0: 15 SPS ID 0",
            "NAL 1: 16 PPS ID 0",
            "NAL 2: 8 POC 0 I-Slice",
            "NAL 3: 0 POC 1 I-Slice",
            "NAL 4: 0 POC 2 I-Slice",
        ]
        "#);

        let new_access_unit = parsed.iter().map(|p| p.new_access_unit).collect::<Vec<_>>();
        assert_eq!(new_access_unit, [true, false, false, true, true]);
        assert!(parsed[2].is_keyframe());
        assert!(!parsed[3].is_keyframe());
        assert_eq!(parser.picture_header().unwrap().pic_order_cnt_val(), 2);
    }

    #[test]
    fn failures_are_isolated() {
        let mut parser = AnnexBParser::default();

        let failed = parser.parse_nal_unit(&pps());
        assert_eq!(failed.description, "NAL 0: 16 ERROR SPS with id 0 not found");
        assert!(failed.result.is_err());
        assert!(parser.parameter_sets().is_empty());

        let failed = parser.parse_nal_unit(&slice(NALUnitType::TrailNut, 1));
        assert_eq!(failed.description, "NAL 1: 0 ERROR PPS with id 0 not found");

        assert!(parser.parse_nal_unit(&sps()).result.is_ok());
        let parsed = parser.parse_nal_unit(&pps());
        assert!(matches!(parsed.payload(), Some(NalPayload::Pps(_))));
        assert_eq!(parsed.description, "NAL 3: 16 PPS ID 0");
        assert!(parser.parameter_sets().pps(0).is_ok());

        // no previous picture for the POC derivation
        let failed = parser.parse_nal_unit(&slice(NALUnitType::TrailNut, 1));
        assert!(failed.description.ends_with("ERROR previous picture not found while deriving the picture order count"));
        assert!(parser.picture_header().is_none());
    }

    #[test]
    fn forbidden_zero_bit() {
        let mut parser = AnnexBParser::default();
        let parsed = parser.parse_nal_unit(&[0x00, 0x00, 0x01, 0x80, 0x01, 0x00]);
        assert!(parsed.header.is_none());
        assert_eq!(parsed.description, "NAL 0: ERROR forbidden_zero_bit is not zero");
    }

    #[test]
    fn max_nal_size() {
        let mut parser = AnnexBParser::new(ParserConfig::default().with_max_nal_size(8));
        let nal = sps();
        let parsed = parser.parse_nal_unit(&nal);
        assert_eq!(
            parsed.description,
            format!("NAL 0: ERROR nal_unit_size is out of range [2, 8]: {}", nal.len())
        );
    }

    #[test]
    fn record_fields() {
        let mut parser = AnnexBParser::new(ParserConfig::default().with_record_fields(true));
        let parsed = parser.parse_nal_unit(&sps());
        assert_eq!(parsed.fields[0].name, "sps_seq_parameter_set_id");
        assert_eq!(parsed.fields[0].bit_count, 4);

        let mut parser = AnnexBParser::default();
        assert!(parser.parse_nal_unit(&sps()).fields.is_empty());
    }

    #[test]
    fn access_unit_delimiter_and_skipped_types() {
        let mut parser = AnnexBParser::default();
        let aud = nal_unit(NALUnitType::AudNut, 0, &RbspBuilder::new().flag(true).bits(0, 3).trailing());
        let parsed = parser.parse_nal_unit(&aud);
        assert_eq!(parsed.description, "NAL 0: 20 AUD");
        assert!(parsed.new_access_unit);

        let sei = nal_unit(NALUnitType::PrefixSeiNut, 0, &[0x05, 0x01, 0xff, 0x80]);
        assert_eq!(parser.parse_nal_unit(&sei).description, "NAL 1: 23 SEI");
        let reserved = nal_unit(NALUnitType::RsvNvcl27, 0, &[0x80]);
        let parsed = parser.parse_nal_unit(&reserved);
        assert_eq!(parsed.description, "NAL 2: 27");
        assert!(matches!(parsed.payload(), Some(NalPayload::Unhandled)));
    }

    #[test]
    fn buffering_period_and_pic_timing() {
        // buffering period without NAL or VCL HRD, 16 bit delays
        let bp = RbspBuilder::new()
            .flag(false)
            .flag(false)
            .bits(15, 5)
            .bits(15, 5)
            .bits(15, 5)
            .bits(0, 3) // du, concatenation and additional concatenation flags
            .bits(0, 16)
            .bits(0, 3) // bp_max_sublayers_minus1
            .ue(0)
            .flag(false)
            .zero_align()
            .into_bytes();
        let mut bp_sei = vec![0, bp.len() as u8];
        bp_sei.extend_from_slice(&bp);
        bp_sei.push(0x80);
        let pt_sei = [1, 5, 0x00, 0x10, 0x00, 0x02, 0x00, 0x80];

        let stream = annex_b(&[
            sps(),
            pps(),
            nal_unit(NALUnitType::PrefixSeiNut, 0, &bp_sei),
            slice(NALUnitType::IdrNLp, 0),
            nal_unit(NALUnitType::PrefixSeiNut, 0, &pt_sei),
            slice(NALUnitType::TrailNut, 1),
        ]);

        let mut parser = AnnexBParser::default();
        let parsed = split_annex_b(stream)
            .map(|nal| parser.parse_nal_unit(&nal))
            .collect::<Vec<_>>();
        assert_eq!(parsed[2].description, "NAL 2: 23 Buffering Period SEI");
        assert_eq!(parsed[4].description, "NAL 4: 23 Picture Timing SEI");

        let Some(NalPayload::Sei(sei)) = parsed[4].payload() else {
            panic!("expected an SEI payload");
        };
        let pt = sei.pic_timing().unwrap();
        assert_eq!(pt.pt_cpb_removal_delay_minus1, [16]);
        assert_eq!(pt.pt_dpb_output_delay, 2);
        assert_eq!(parser.buffering_period().unwrap().bp_cpb_removal_delay_length_minus1, 15);

        // a prefix SEI after a VCL NAL unit opens the next access unit
        let new_access_unit = parsed.iter().map(|p| p.new_access_unit).collect::<Vec<_>>();
        assert_eq!(new_access_unit, [true, false, false, false, true, false]);
    }

    #[test]
    fn split_start_codes() {
        let stream = [
            0xff, // leading garbage
            0x00, 0x00, 0x00, 0x01, 0x00, 0x79, 0x01, 0x00, 0x00, // trailing zeros
            0x00, 0x00, 0x01, 0x00, 0x81, 0x02, //
            0x00, 0x00, 0x01, 0x00, 0x99,
        ];
        let nal_units = split_annex_b(stream.to_vec()).collect::<Vec<_>>();
        assert_eq!(nal_units.len(), 3);
        assert_eq!(nal_units[0].as_ref(), [0x00, 0x00, 0x00, 0x01, 0x00, 0x79, 0x01]);
        assert_eq!(nal_units[1].as_ref(), [0x00, 0x00, 0x00, 0x01, 0x00, 0x81, 0x02]);
        assert_eq!(nal_units[2].as_ref(), [0x00, 0x00, 0x01, 0x00, 0x99]);

        assert_eq!(split_annex_b(vec![0x12, 0x34]).count(), 0);
    }
}
