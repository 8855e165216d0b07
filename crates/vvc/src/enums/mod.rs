mod aps_params_type;
mod aspect_ratio_idc;
mod nal_unit_type;
mod slice_type;

pub use aps_params_type::ApsParamsType;
pub use aspect_ratio_idc::AspectRatioIdc;
pub use nal_unit_type::NALUnitType;
pub use slice_type::SliceType;
