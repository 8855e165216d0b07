use std::collections::HashMap;
use std::sync::Arc;

use crate::aps::Aps;
use crate::enums::ApsParamsType;
use crate::error::{Result, VvcError};
use crate::pps::Pps;
use crate::sps::Sps;
use crate::vps::Vps;

/// The parameter sets received so far on one stream.
///
/// Entries are immutable [`Arc`] snapshots. Inserting a parameter set with an id that is already
/// present replaces it; structures that were parsed against the old one keep their snapshot.
#[derive(Debug, Clone, Default)]
pub struct ParameterSets {
    vps: HashMap<u8, Arc<Vps>>,
    sps: HashMap<u8, Arc<Sps>>,
    pps: HashMap<u8, Arc<Pps>>,
    aps: HashMap<(u8, u8), Arc<Aps>>,
}

impl ParameterSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vps(&self, id: u8) -> Result<Arc<Vps>> {
        self.vps
            .get(&id)
            .cloned()
            .ok_or(VvcError::ReferenceNotFound { kind: "VPS", id: id as u32 })
    }

    pub fn sps(&self, id: u8) -> Result<Arc<Sps>> {
        self.sps
            .get(&id)
            .cloned()
            .ok_or(VvcError::ReferenceNotFound { kind: "SPS", id: id as u32 })
    }

    pub fn pps(&self, id: u8) -> Result<Arc<Pps>> {
        self.pps
            .get(&id)
            .cloned()
            .ok_or(VvcError::ReferenceNotFound { kind: "PPS", id: id as u32 })
    }

    pub fn aps(&self, params_type: ApsParamsType, id: u8) -> Result<Arc<Aps>> {
        self.aps
            .get(&(params_type.0, id))
            .cloned()
            .ok_or(VvcError::ReferenceNotFound {
                kind: params_type.name(),
                id: id as u32,
            })
    }

    pub fn insert_vps(&mut self, vps: impl Into<Arc<Vps>>) -> Arc<Vps> {
        let vps = vps.into();
        let id = vps.vps_video_parameter_set_id;
        if self.vps.insert(id, vps.clone()).is_some() {
            tracing::debug!(id, "replaced VPS");
        }
        vps
    }

    pub fn insert_sps(&mut self, sps: impl Into<Arc<Sps>>) -> Arc<Sps> {
        let sps = sps.into();
        let id = sps.sps_seq_parameter_set_id;
        if self.sps.insert(id, sps.clone()).is_some() {
            tracing::debug!(id, "replaced SPS");
        }
        sps
    }

    pub fn insert_pps(&mut self, pps: impl Into<Arc<Pps>>) -> Arc<Pps> {
        let pps = pps.into();
        let id = pps.pps_pic_parameter_set_id;
        if self.pps.insert(id, pps.clone()).is_some() {
            tracing::debug!(id, "replaced PPS");
        }
        pps
    }

    pub fn insert_aps(&mut self, aps: impl Into<Arc<Aps>>) -> Arc<Aps> {
        let aps = aps.into();
        let key = (aps.aps_params_type.0, aps.aps_adaptation_parameter_set_id);
        if self.aps.insert(key, aps.clone()).is_some() {
            tracing::debug!(params_type = key.0, id = key.1, "replaced APS");
        }
        aps
    }

    /// Drops every stored parameter set.
    pub fn clear(&mut self) {
        self.vps.clear();
        self.sps.clear();
        self.pps.clear();
        self.aps.clear();
    }

    /// Returns `true` if no parameter set has been stored.
    pub fn is_empty(&self) -> bool {
        self.vps.is_empty() && self.sps.is_empty() && self.pps.is_empty() && self.aps.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::sync::Arc;

    use super::ParameterSets;
    use crate::enums::ApsParamsType;
    use crate::reader::RbspReader;
    use crate::sps::Sps;
    use crate::test_util::TestSps;
    use crate::VvcError;

    fn sps(id: u8, log2_ctu_size_minus5: u8) -> Sps {
        let data = TestSps {
            sps_id: id,
            log2_ctu_size_minus5,
            ..Default::default()
        }
        .rbsp();
        Sps::parse(&mut RbspReader::new(&data)).unwrap()
    }

    #[test]
    fn missing_entries() {
        let sets = ParameterSets::new();
        assert!(sets.is_empty());
        assert_eq!(sets.sps(3).unwrap_err().to_string(), "SPS with id 3 not found");
        assert_eq!(sets.pps(63).unwrap_err().to_string(), "PPS with id 63 not found");
        assert!(matches!(
            sets.aps(ApsParamsType::LmcsAps, 2).unwrap_err(),
            VvcError::ReferenceNotFound { kind: "LMCS APS", id: 2 }
        ));
    }

    #[test]
    fn last_write_wins_and_snapshots_survive() {
        let mut sets = ParameterSets::new();
        let first = sets.insert_sps(sps(1, 2));
        assert_eq!(sets.sps(1).unwrap().ctb_size_y(), 128);

        sets.insert_sps(sps(1, 1));
        assert_eq!(sets.sps(1).unwrap().ctb_size_y(), 64);
        assert_eq!(first.ctb_size_y(), 128);
        assert!(!Arc::ptr_eq(&first, &sets.sps(1).unwrap()));

        sets.clear();
        assert!(sets.sps(1).is_err());
        assert!(sets.is_empty());
    }
}
