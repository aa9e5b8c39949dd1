//! Free-text location mentions -> country codes.
//!
//! All tables are built once from the static reference data below;
//! `resolve` does no I/O and holds no mutable state, so one resolver is
//! shared across all aggregation workers.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use strsim::jaro_winkler;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::country::{CountryCode, NAME_INDEX, REGIONS};

/// Outcome of one gazetteer lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    NoMatch,
    SingleCountry(CountryCode),
    RegionMatch(Vec<CountryCode>),
}

/// Minimum Jaro-Winkler score for the fuzzy stage to accept a candidate.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy)]
pub struct Gazetteer {
    fuzzy_threshold: f64,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Resolution cascade: region name, country name, city name, fuzzy
    /// country name. First matching stage wins.
    pub fn resolve(&self, location_text: &str) -> Resolution {
        let needle = fold_location(location_text);
        if needle.is_empty() {
            return Resolution::NoMatch;
        }

        if let Some((_, members)) = REGIONS.iter().find(|(name, _)| *name == needle) {
            return Resolution::RegionMatch(members.clone());
        }

        if let Some(code) = NAME_INDEX.get(needle.as_str()) {
            return Resolution::SingleCountry(*code);
        }

        if let Some(code) = CITY_INDEX.get(needle.as_str()) {
            return Resolution::SingleCountry(*code);
        }

        self.fuzzy_country(&needle)
    }

    fn fuzzy_country(&self, needle: &str) -> Resolution {
        // Scans the country table in its fixed order so score ties always
        // land on the same candidate.
        let mut best: Option<(f64, CountryCode)> = None;
        for (alpha3, names) in crate::country::COUNTRIES {
            let Some(code) = crate::country::from_alpha3(alpha3) else {
                continue;
            };
            for name in *names {
                let score = jaro_winkler(needle, name);
                if best.map_or(true, |(b, _)| score > b) {
                    best = Some((score, code));
                }
            }
        }
        match best {
            Some((score, code)) if score >= self.fuzzy_threshold => {
                debug!(
                    "Fuzzy gazetteer hit - text={}, code={}, score={:.3}",
                    needle, code, score
                );
                Resolution::SingleCountry(code)
            }
            _ => Resolution::NoMatch,
        }
    }
}

/// NFC-normalize, trim, lowercase.
fn fold_location(s: &str) -> String {
    s.nfc().collect::<String>().trim().to_lowercase()
}

/// City name -> country of the highest-population city sharing that name.
/// Built once; ties on population go to the first-seen entry.
static CITY_INDEX: Lazy<HashMap<&'static str, CountryCode>> = Lazy::new(|| {
    let mut best: HashMap<&'static str, (CountryCode, u32)> = HashMap::new();
    for (name, alpha3, population) in CITIES {
        let Some(code) = crate::country::from_alpha3(alpha3) else {
            continue;
        };
        match best.get(name) {
            Some((_, existing)) if *existing >= *population => {}
            _ => {
                best.insert(*name, (code, *population));
            }
        }
    }
    best.into_iter().map(|(name, (code, _))| (name, code)).collect()
});

/// (lowercased city name, country alpha-3, population). Duplicated names
/// are intentional; the index keeps the most populous one.
static CITIES: &[(&str, &str, u32)] = &[
    ("kabul", "AFG", 4_222_000),
    ("algiers", "DZA", 2_768_000),
    ("buenos aires", "ARG", 15_370_000),
    ("yerevan", "ARM", 1_086_000),
    ("sydney", "AUS", 5_312_000),
    ("melbourne", "AUS", 5_078_000),
    ("canberra", "AUS", 431_000),
    ("vienna", "AUT", 1_921_000),
    ("baku", "AZE", 2_293_000),
    ("dhaka", "BGD", 21_006_000),
    ("minsk", "BLR", 2_009_000),
    ("brussels", "BEL", 1_209_000),
    ("la paz", "BOL", 816_000),
    ("sarajevo", "BIH", 275_000),
    ("brasilia", "BRA", 3_055_000),
    ("sao paulo", "BRA", 12_325_000),
    ("rio de janeiro", "BRA", 6_748_000),
    ("sofia", "BGR", 1_242_000),
    ("ouagadougou", "BFA", 2_453_000),
    ("phnom penh", "KHM", 2_129_000),
    ("yaounde", "CMR", 2_765_000),
    ("ottawa", "CAN", 994_000),
    ("toronto", "CAN", 2_930_000),
    ("vancouver", "CAN", 675_000),
    ("montreal", "CAN", 1_780_000),
    ("london", "CAN", 404_000),
    ("santiago", "CHL", 6_158_000),
    ("beijing", "CHN", 20_463_000),
    ("shanghai", "CHN", 24_870_000),
    ("shenzhen", "CHN", 17_560_000),
    ("guangzhou", "CHN", 18_676_000),
    ("hong kong", "CHN", 7_482_000),
    ("bogota", "COL", 7_181_000),
    ("kinshasa", "COD", 14_342_000),
    ("san jose", "CRI", 333_000),
    ("abidjan", "CIV", 4_980_000),
    ("zagreb", "HRV", 767_000),
    ("havana", "CUB", 2_130_000),
    ("nicosia", "CYP", 116_000),
    ("prague", "CZE", 1_309_000),
    ("copenhagen", "DNK", 632_000),
    ("santo domingo", "DOM", 2_201_000),
    ("quito", "ECU", 1_822_000),
    ("cairo", "EGY", 20_901_000),
    ("san salvador", "SLV", 570_000),
    ("tallinn", "EST", 437_000),
    ("addis ababa", "ETH", 4_794_000),
    ("helsinki", "FIN", 656_000),
    ("paris", "FRA", 2_161_000),
    ("marseille", "FRA", 861_000),
    ("lyon", "FRA", 513_000),
    ("tbilisi", "GEO", 1_118_000),
    ("berlin", "DEU", 3_669_000),
    ("munich", "DEU", 1_472_000),
    ("frankfurt", "DEU", 753_000),
    ("hamburg", "DEU", 1_841_000),
    ("accra", "GHA", 2_388_000),
    ("athens", "GRC", 664_000),
    ("guatemala city", "GTM", 995_000),
    ("port-au-prince", "HTI", 987_000),
    ("tegucigalpa", "HND", 1_259_000),
    ("budapest", "HUN", 1_752_000),
    ("reykjavik", "ISL", 131_000),
    ("new delhi", "IND", 29_399_000),
    ("mumbai", "IND", 20_411_000),
    ("hyderabad", "IND", 9_741_000),
    ("jakarta", "IDN", 10_562_000),
    ("tehran", "IRN", 9_134_000),
    ("baghdad", "IRQ", 7_144_000),
    ("dublin", "IRL", 554_000),
    ("jerusalem", "ISR", 936_000),
    ("tel aviv", "ISR", 460_000),
    ("rome", "ITA", 2_873_000),
    ("milan", "ITA", 1_396_000),
    ("kingston", "JAM", 589_000),
    ("tokyo", "JPN", 13_960_000),
    ("osaka", "JPN", 2_691_000),
    ("amman", "JOR", 4_008_000),
    ("astana", "KAZ", 1_136_000),
    ("nairobi", "KEN", 4_397_000),
    ("pyongyang", "PRK", 2_863_000),
    ("seoul", "KOR", 9_776_000),
    ("kuwait city", "KWT", 300_000),
    ("bishkek", "KGZ", 1_012_000),
    ("vientiane", "LAO", 948_000),
    ("riga", "LVA", 632_000),
    ("beirut", "LBN", 2_424_000),
    ("tripoli", "LBY", 1_165_000),
    ("tripoli", "LBN", 730_000),
    ("vilnius", "LTU", 588_000),
    ("luxembourg", "LUX", 124_000),
    ("antananarivo", "MDG", 1_275_000),
    ("kuala lumpur", "MYS", 1_808_000),
    ("bamako", "MLI", 2_713_000),
    ("valletta", "MLT", 6_000),
    ("mexico city", "MEX", 9_209_000),
    ("chisinau", "MDA", 690_000),
    ("monaco", "MCO", 38_000),
    ("ulaanbaatar", "MNG", 1_645_000),
    ("podgorica", "MNE", 186_000),
    ("rabat", "MAR", 577_000),
    ("casablanca", "MAR", 3_359_000),
    ("maputo", "MOZ", 1_101_000),
    ("yangon", "MMR", 5_214_000),
    ("kathmandu", "NPL", 1_442_000),
    ("amsterdam", "NLD", 872_000),
    ("the hague", "NLD", 545_000),
    ("wellington", "NZL", 215_000),
    ("auckland", "NZL", 1_657_000),
    ("managua", "NIC", 1_055_000),
    ("abuja", "NGA", 3_464_000),
    ("lagos", "NGA", 14_862_000),
    ("skopje", "MKD", 595_000),
    ("oslo", "NOR", 693_000),
    ("muscat", "OMN", 1_421_000),
    ("islamabad", "PAK", 1_015_000),
    ("karachi", "PAK", 16_094_000),
    ("hyderabad", "PAK", 1_733_000),
    ("panama city", "PAN", 881_000),
    ("asuncion", "PRY", 525_000),
    ("lima", "PER", 9_752_000),
    ("manila", "PHL", 1_781_000),
    ("warsaw", "POL", 1_794_000),
    ("lisbon", "PRT", 506_000),
    ("doha", "QAT", 644_000),
    ("bucharest", "ROU", 1_836_000),
    ("moscow", "RUS", 12_538_000),
    ("saint petersburg", "RUS", 5_398_000),
    ("kigali", "RWA", 1_132_000),
    ("riyadh", "SAU", 7_676_000),
    ("jeddah", "SAU", 4_697_000),
    ("dakar", "SEN", 1_438_000),
    ("belgrade", "SRB", 1_397_000),
    ("singapore", "SGP", 5_686_000),
    ("bratislava", "SVK", 433_000),
    ("ljubljana", "SVN", 295_000),
    ("mogadishu", "SOM", 2_388_000),
    ("pretoria", "ZAF", 741_000),
    ("cape town", "ZAF", 4_618_000),
    ("johannesburg", "ZAF", 5_635_000),
    ("juba", "SSD", 525_000),
    ("madrid", "ESP", 3_223_000),
    ("barcelona", "ESP", 1_620_000),
    ("valencia", "ESP", 791_000),
    ("valencia", "VEN", 1_396_000),
    ("colombo", "LKA", 752_000),
    ("khartoum", "SDN", 5_534_000),
    ("stockholm", "SWE", 975_000),
    ("bern", "CHE", 133_000),
    ("geneva", "CHE", 201_000),
    ("zurich", "CHE", 415_000),
    ("damascus", "SYR", 2_079_000),
    ("taipei", "TWN", 2_646_000),
    ("dushanbe", "TJK", 863_000),
    ("dodoma", "TZA", 410_000),
    ("dar es salaam", "TZA", 6_702_000),
    ("bangkok", "THA", 10_539_000),
    ("tunis", "TUN", 638_000),
    ("ankara", "TUR", 5_663_000),
    ("istanbul", "TUR", 15_462_000),
    ("ashgabat", "TKM", 1_031_000),
    ("kampala", "UGA", 1_650_000),
    ("kyiv", "UKR", 2_962_000),
    ("kharkiv", "UKR", 1_433_000),
    ("abu dhabi", "ARE", 1_483_000),
    ("dubai", "ARE", 3_331_000),
    ("london", "GBR", 8_982_000),
    ("manchester", "GBR", 553_000),
    ("birmingham", "GBR", 1_141_000),
    ("edinburgh", "GBR", 524_000),
    ("washington", "USA", 705_000),
    ("new york", "USA", 8_336_000),
    ("los angeles", "USA", 3_979_000),
    ("chicago", "USA", 2_693_000),
    ("houston", "USA", 2_320_000),
    ("san francisco", "USA", 881_000),
    ("boston", "USA", 692_000),
    ("san jose", "USA", 1_021_000),
    ("birmingham", "USA", 209_000),
    ("manchester", "USA", 115_000),
    ("paris", "USA", 25_000),
    ("montevideo", "URY", 1_319_000),
    ("tashkent", "UZB", 2_571_000),
    ("caracas", "VEN", 2_245_000),
    ("hanoi", "VNM", 8_054_000),
    ("ho chi minh city", "VNM", 8_993_000),
    ("sanaa", "YEM", 2_545_000),
    ("lusaka", "ZMB", 2_731_000),
    ("harare", "ZWE", 1_530_000),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::from_alpha3;

    fn code(s: &str) -> CountryCode {
        from_alpha3(s).unwrap()
    }

    #[test]
    fn empty_and_blank_input_is_no_match() {
        let g = Gazetteer::new();
        assert_eq!(g.resolve(""), Resolution::NoMatch);
        assert_eq!(g.resolve("   "), Resolution::NoMatch);
    }

    #[test]
    fn region_stage_wins_first() {
        let g = Gazetteer::new();
        match g.resolve("Europe") {
            Resolution::RegionMatch(members) => {
                assert!(members.len() >= 40);
                assert!(members.contains(&code("FRA")));
            }
            other => panic!("expected region match, got {other:?}"),
        }
    }

    #[test]
    fn country_names_and_variants_resolve() {
        let g = Gazetteer::new();
        assert_eq!(g.resolve("Germany"), Resolution::SingleCountry(code("DEU")));
        assert_eq!(g.resolve(" france "), Resolution::SingleCountry(code("FRA")));
        assert_eq!(g.resolve("UK"), Resolution::SingleCountry(code("GBR")));
        assert_eq!(
            g.resolve("United States of America"),
            Resolution::SingleCountry(code("USA"))
        );
    }

    #[test]
    fn city_maps_to_most_populous_namesake() {
        let g = Gazetteer::new();
        // London, Ontario loses to London, UK; Paris, Texas to Paris, France.
        assert_eq!(g.resolve("London"), Resolution::SingleCountry(code("GBR")));
        assert_eq!(g.resolve("Paris"), Resolution::SingleCountry(code("FRA")));
        assert_eq!(g.resolve("Valencia"), Resolution::SingleCountry(code("VEN")));
        assert_eq!(g.resolve("Hyderabad"), Resolution::SingleCountry(code("IND")));
    }

    #[test]
    fn fuzzy_stage_catches_near_misses() {
        let g = Gazetteer::new();
        assert_eq!(g.resolve("Germny"), Resolution::SingleCountry(code("DEU")));
        assert_eq!(g.resolve("Francce"), Resolution::SingleCountry(code("FRA")));
    }

    #[test]
    fn garbage_stays_unresolved() {
        let g = Gazetteer::new();
        assert_eq!(g.resolve("qqqqxxxyzz"), Resolution::NoMatch);
        assert_eq!(g.resolve("1234"), Resolution::NoMatch);
    }
}
