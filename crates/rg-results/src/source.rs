//! Statistics source bound to each result at creation.
//!
//! Most results compute statistics from their own values. Combined results
//! (e.g. `TRANXYZ`) have no values of their own and merge the statistics of
//! their directional components.

use serde::{Deserialize, Serialize};

use crate::address::{ResultAddress, ResultCategory};

pub const COMBINED_TRANSMISSIBILITY: &str = "TRANXYZ";
pub const COMBINED_MULT: &str = "MULTXYZ";
pub const COMBINED_RI_TRANSMISSIBILITY: &str = "riTRANXYZ";
pub const COMBINED_RI_MULT: &str = "riMULTXYZ";
pub const COMBINED_RI_AREA_NORM_TRANSMISSIBILITY: &str = "riTRANXYZbyArea";
pub const COMBINED_WATER_FLUX: &str = "FLRWATIJK";
pub const COMBINED_OIL_FLUX: &str = "FLROILIJK";
pub const COMBINED_GAS_FLUX: &str = "FLRGASIJK";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatisticsSource {
    /// Statistics over the result's own values.
    Native,
    /// Merge of the statistics of each listed result.
    MultiProperty(Vec<ResultAddress>),
}

impl StatisticsSource {
    /// Source for a new result, chosen by name.
    pub fn for_address(address: &ResultAddress) -> Self {
        let name = address.name.as_str();
        let statics = |names: &[&str]| {
            StatisticsSource::MultiProperty(names.iter().map(|n| ResultAddress::static_native(*n)).collect())
        };
        let flux = |prefix: &str| {
            StatisticsSource::MultiProperty(
                ["I+", "J+", "K+"]
                    .iter()
                    .map(|d| ResultAddress::dynamic_native(format!("{prefix}{d}")))
                    .collect(),
            )
        };

        match name {
            COMBINED_TRANSMISSIBILITY => statics(&["TRANX", "TRANY", "TRANZ"]),
            COMBINED_MULT => statics(&["MULTX", "MULTX-", "MULTY", "MULTY-", "MULTZ", "MULTZ-"]),
            COMBINED_RI_TRANSMISSIBILITY => statics(&["riTRANX", "riTRANY", "riTRANZ"]),
            COMBINED_RI_MULT => statics(&["riMULTX", "riMULTY", "riMULTZ"]),
            COMBINED_RI_AREA_NORM_TRANSMISSIBILITY => {
                statics(&["riTRANXbyArea", "riTRANYbyArea", "riTRANZbyArea"])
            }
            COMBINED_WATER_FLUX => flux("FLRWAT"),
            COMBINED_OIL_FLUX => flux("FLROIL"),
            COMBINED_GAS_FLUX => flux("FLRGAS"),
            _ => match name.strip_suffix("IJK") {
                Some(base) if !base.is_empty() => StatisticsSource::MultiProperty(
                    ["I", "J", "K"]
                        .iter()
                        .map(|d| ResultAddress::new(ResultCategory::Generated, format!("{base}{d}")))
                        .collect(),
                ),
                _ => StatisticsSource::Native,
            },
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, StatisticsSource::Native)
    }

    /// Results whose values feed the statistics; `owner` for native sources.
    pub fn inputs<'a>(&'a self, owner: &'a ResultAddress) -> Vec<&'a ResultAddress> {
        match self {
            StatisticsSource::Native => vec![owner],
            StatisticsSource::MultiProperty(parts) => parts.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_native() {
        let source = StatisticsSource::for_address(&ResultAddress::dynamic_native("SOIL"));
        assert!(source.is_native());
        let addr = ResultAddress::dynamic_native("SOIL");
        assert_eq!(source.inputs(&addr), vec![&addr]);
    }

    #[test]
    fn combined_transmissibility() {
        let source = StatisticsSource::for_address(&ResultAddress::static_native(COMBINED_TRANSMISSIBILITY));
        let StatisticsSource::MultiProperty(parts) = source else {
            panic!("expected multi-property source");
        };
        let names: Vec<_> = parts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["TRANX", "TRANY", "TRANZ"]);
        assert!(parts.iter().all(|a| a.category == ResultCategory::StaticNative));
    }

    #[test]
    fn mult_has_six_components() {
        let source = StatisticsSource::for_address(&ResultAddress::static_native(COMBINED_MULT));
        assert!(matches!(source, StatisticsSource::MultiProperty(ref p) if p.len() == 6));
    }

    #[test]
    fn flux_components_are_dynamic() {
        let source = StatisticsSource::for_address(&ResultAddress::dynamic_native(COMBINED_OIL_FLUX));
        let StatisticsSource::MultiProperty(parts) = source else {
            panic!("expected multi-property source");
        };
        assert_eq!(parts[2], ResultAddress::dynamic_native("FLROILK+"));
    }

    #[test]
    fn generic_ijk_suffix() {
        let source = StatisticsSource::for_address(&ResultAddress::generated("FAULTDISTIJK"));
        let StatisticsSource::MultiProperty(parts) = source else {
            panic!("expected multi-property source");
        };
        assert_eq!(parts[0], ResultAddress::generated("FAULTDISTI"));
        assert_eq!(parts[2], ResultAddress::generated("FAULTDISTK"));

        assert!(StatisticsSource::for_address(&ResultAddress::generated("IJK")).is_native());
    }
}
