//! A pure Rust parser for the parameter sets and headers of H.266 / VVC Annex-B streams.
//!
//! ## Why do we need this?
//!
//! Tools that inspect, split or remux VVC streams need the decoded parameter sets, picture
//! headers and slice headers without running a full decoder.
//!
//! ## Notable features
//!
//! - VPS, SPS, PPS, APS (ALF, LMCS and scaling lists), picture header and slice header parsing
//!   with range checks on every syntax element.
//! - Picture order count derivation and access unit boundary detection.
//! - Buffering period and picture timing SEI messages.
//! - Tile, slice and subpicture partitioning, including CTU lists and entry points per slice.
//! - A failing NAL unit never corrupts the parser state.
#![cfg_attr(feature = "docs", doc = "## Feature flags")]
#![cfg_attr(feature = "docs", doc = document_features::document_features!())]
//!
//! ## Examples
//!
//! ```rust,no_run
//! use scuffle_vvc::{AnnexBParser, ParserConfig, split_annex_b};
//!
//! let stream = std::fs::read("video.266").unwrap();
//! let mut parser = AnnexBParser::new(ParserConfig::default());
//!
//! for nal in split_annex_b(stream) {
//!     let parsed = parser.parse_nal_unit(&nal);
//!     println!("{}", parsed.description);
//! }
//! ```
//!
//! ## Status
//!
//! This crate is currently under development and is not yet stable.
//!
//! DCI and OPI NAL units, and SEI payloads other than buffering period and picture timing, are
//! recognized but not decoded.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

/// Adaptation Parameter Set (APS) functionality.
pub mod aps;
mod config;
mod enums;
mod error;
/// Emulation prevention handling.
pub mod io;
mod nal_unit_header;
mod parser;
/// Picture header functionality.
pub mod picture_header;
/// Picture Parameter Set (PPS) functionality.
pub mod pps;
mod pred_weight_table;
mod range_check;
mod reader;
mod ref_pic_lists;
mod registry;
/// Supplemental enhancement information (SEI) functionality.
pub mod sei;
mod slice_header;
/// Sequence Parameter Set (SPS) functionality.
pub mod sps;
mod vps;

pub use self::aps::Aps;
pub use self::config::ParserConfig;
pub use self::enums::{ApsParamsType, AspectRatioIdc, NALUnitType, SliceType};
pub use self::error::{Result, VvcError};
pub use self::nal_unit_header::NALUnitHeader;
pub use self::parser::{AccessUnitDelimiter, AnnexBNalUnits, AnnexBParser, NalPayload, ParsedNal, split_annex_b};
pub use self::picture_header::PictureHeader;
pub use self::pps::Pps;
pub use self::pred_weight_table::{ListWeights, PredWeightTable};
pub use self::reader::{FieldRecord, RbspReader};
pub use self::ref_pic_lists::{LongTermRefPic, RefPicEntry, RefPicList, RefPicListStruct, RefPicLists};
pub use self::registry::ParameterSets;
pub use self::sei::SeiRbsp;
pub use self::slice_header::SliceHeader;
pub use self::sps::Sps;
pub use self::vps::{OlsDpbFormat, Vps, VpsLayer, VpsTimingHrd};

#[cfg(test)]
mod test_util;
