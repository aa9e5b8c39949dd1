//! The fixed country universe and named region groups.
//!
//! Every [`CountryCode`] in the system comes out of the static table below;
//! codes are never invented at runtime. Lookups hand back the table's own
//! `&'static str`, so a `CountryCode` is `Copy` and cheap to key maps with.

use once_cell::sync::Lazy;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// ISO 3166-1 alpha-3 code drawn from the fixed universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryCode(&'static str);

impl CountryCode {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for CountryCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        from_alpha3(&raw).ok_or_else(|| de::Error::custom(format!("unknown country code: {raw}")))
    }
}

/// Look up an alpha-3 code (case-insensitive) in the universe.
pub fn from_alpha3(code: &str) -> Option<CountryCode> {
    let upper = code.trim().to_ascii_uppercase();
    ALPHA3_INDEX.get(upper.as_str()).copied()
}

/// All codes in the universe, in table (code) order.
pub fn universe() -> impl Iterator<Item = CountryCode> {
    COUNTRIES.iter().map(|(code, _)| CountryCode(*code))
}

pub fn universe_len() -> usize {
    COUNTRIES.len()
}

static ALPHA3_INDEX: Lazy<HashMap<&'static str, CountryCode>> = Lazy::new(|| {
    COUNTRIES
        .iter()
        .map(|(code, _)| (*code, CountryCode(*code)))
        .collect()
});

/// Lowercased name variant -> code, for the gazetteer's exact-name stage.
pub(crate) static NAME_INDEX: Lazy<HashMap<&'static str, CountryCode>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (code, names) in COUNTRIES {
        for name in *names {
            // First-seen wins on the rare shared variant.
            index.entry(*name).or_insert(CountryCode(*code));
        }
    }
    index
});

/// Named region groups with fixed, ordered member lists. Membership is
/// static configuration, not derived.
pub static REGIONS: Lazy<Vec<(&'static str, Vec<CountryCode>)>> = Lazy::new(|| {
    REGION_TABLE
        .iter()
        .map(|(name, codes)| {
            let members = codes
                .iter()
                .map(|c| from_alpha3(c).unwrap_or_else(|| panic!("region member {c} not in universe")))
                .collect();
            (*name, members)
        })
        .collect()
});

const REGION_TABLE: &[(&str, &[&str])] = &[
    (
        "europe",
        &[
            "AUT", "BEL", "BGR", "HRV", "CYP", "CZE", "DNK", "EST", "FIN", "FRA", "DEU", "GRC",
            "HUN", "IRL", "ITA", "LVA", "LTU", "LUX", "MLT", "NLD", "POL", "PRT", "ROU", "SVK",
            "SVN", "ESP", "SWE", "GBR", "CHE", "NOR", "ISL", "LIE", "MDA", "MKD", "MNE", "SRB",
            "ALB", "AND", "BLR", "BIH", "UKR", "RUS",
        ],
    ),
    (
        "caribbean",
        &[
            "ATG", "BHS", "BRB", "CUB", "DMA", "DOM", "GRD", "HTI", "JAM", "KNA", "LCA", "VCT",
            "TTO", "PRI", "VIR",
        ],
    ),
];

/// (alpha-3, lowercased name variants). The first variant is the common
/// display name; the rest cover official and colloquial forms that show up
/// in translated news copy.
pub(crate) static COUNTRIES: &[(&str, &[&str])] = &[
    ("AFG", &["afghanistan", "islamic republic of afghanistan"]),
    ("ALB", &["albania"]),
    ("DZA", &["algeria"]),
    ("AND", &["andorra"]),
    ("AGO", &["angola"]),
    ("ATG", &["antigua and barbuda", "antigua"]),
    ("ARG", &["argentina"]),
    ("ARM", &["armenia"]),
    ("AUS", &["australia"]),
    ("AUT", &["austria"]),
    ("AZE", &["azerbaijan"]),
    ("BHS", &["bahamas", "the bahamas"]),
    ("BHR", &["bahrain"]),
    ("BGD", &["bangladesh"]),
    ("BRB", &["barbados"]),
    ("BLR", &["belarus"]),
    ("BEL", &["belgium"]),
    ("BLZ", &["belize"]),
    ("BEN", &["benin"]),
    ("BTN", &["bhutan"]),
    ("BOL", &["bolivia", "plurinational state of bolivia"]),
    ("BIH", &["bosnia and herzegovina", "bosnia"]),
    ("BWA", &["botswana"]),
    ("BRA", &["brazil"]),
    ("BRN", &["brunei", "brunei darussalam"]),
    ("BGR", &["bulgaria"]),
    ("BFA", &["burkina faso"]),
    ("BDI", &["burundi"]),
    ("CPV", &["cabo verde", "cape verde"]),
    ("KHM", &["cambodia"]),
    ("CMR", &["cameroon"]),
    ("CAN", &["canada"]),
    ("CAF", &["central african republic"]),
    ("TCD", &["chad"]),
    ("CHL", &["chile"]),
    ("CHN", &["china", "people's republic of china"]),
    ("COL", &["colombia"]),
    ("COM", &["comoros"]),
    ("COG", &["congo", "republic of the congo"]),
    (
        "COD",
        &["democratic republic of the congo", "dr congo", "drc"],
    ),
    ("CRI", &["costa rica"]),
    ("CIV", &["ivory coast", "cote d'ivoire", "côte d'ivoire"]),
    ("HRV", &["croatia"]),
    ("CUB", &["cuba"]),
    ("CYP", &["cyprus"]),
    ("CZE", &["czechia", "czech republic"]),
    ("DNK", &["denmark"]),
    ("DJI", &["djibouti"]),
    ("DMA", &["dominica"]),
    ("DOM", &["dominican republic"]),
    ("ECU", &["ecuador"]),
    ("EGY", &["egypt"]),
    ("SLV", &["el salvador"]),
    ("GNQ", &["equatorial guinea"]),
    ("ERI", &["eritrea"]),
    ("EST", &["estonia"]),
    ("SWZ", &["eswatini", "swaziland"]),
    ("ETH", &["ethiopia"]),
    ("FJI", &["fiji"]),
    ("FIN", &["finland"]),
    ("FRA", &["france", "french republic"]),
    ("GAB", &["gabon"]),
    ("GMB", &["gambia", "the gambia"]),
    ("GEO", &["georgia"]),
    ("DEU", &["germany", "federal republic of germany"]),
    ("GHA", &["ghana"]),
    ("GRC", &["greece"]),
    ("GRD", &["grenada"]),
    ("GTM", &["guatemala"]),
    ("GIN", &["guinea"]),
    ("GNB", &["guinea-bissau"]),
    ("GUY", &["guyana"]),
    ("HTI", &["haiti"]),
    ("HND", &["honduras"]),
    ("HUN", &["hungary"]),
    ("ISL", &["iceland"]),
    ("IND", &["india"]),
    ("IDN", &["indonesia"]),
    ("IRN", &["iran", "islamic republic of iran"]),
    ("IRQ", &["iraq"]),
    ("IRL", &["ireland"]),
    ("ISR", &["israel"]),
    ("ITA", &["italy"]),
    ("JAM", &["jamaica"]),
    ("JPN", &["japan"]),
    ("JOR", &["jordan"]),
    ("KAZ", &["kazakhstan"]),
    ("KEN", &["kenya"]),
    ("KIR", &["kiribati"]),
    (
        "PRK",
        &["north korea", "democratic people's republic of korea"],
    ),
    ("KOR", &["south korea", "republic of korea", "korea"]),
    ("KWT", &["kuwait"]),
    ("KGZ", &["kyrgyzstan"]),
    ("LAO", &["laos", "lao people's democratic republic"]),
    ("LVA", &["latvia"]),
    ("LBN", &["lebanon"]),
    ("LSO", &["lesotho"]),
    ("LBR", &["liberia"]),
    ("LBY", &["libya"]),
    ("LIE", &["liechtenstein"]),
    ("LTU", &["lithuania"]),
    ("LUX", &["luxembourg"]),
    ("MDG", &["madagascar"]),
    ("MWI", &["malawi"]),
    ("MYS", &["malaysia"]),
    ("MDV", &["maldives"]),
    ("MLI", &["mali"]),
    ("MLT", &["malta"]),
    ("MHL", &["marshall islands"]),
    ("MRT", &["mauritania"]),
    ("MUS", &["mauritius"]),
    ("MEX", &["mexico"]),
    ("FSM", &["micronesia", "federated states of micronesia"]),
    ("MDA", &["moldova", "republic of moldova"]),
    ("MCO", &["monaco"]),
    ("MNG", &["mongolia"]),
    ("MNE", &["montenegro"]),
    ("MAR", &["morocco"]),
    ("MOZ", &["mozambique"]),
    ("MMR", &["myanmar", "burma"]),
    ("NAM", &["namibia"]),
    ("NRU", &["nauru"]),
    ("NPL", &["nepal"]),
    ("NLD", &["netherlands", "the netherlands", "holland"]),
    ("NZL", &["new zealand"]),
    ("NIC", &["nicaragua"]),
    ("NER", &["niger"]),
    ("NGA", &["nigeria"]),
    ("MKD", &["north macedonia", "macedonia"]),
    ("NOR", &["norway"]),
    ("OMN", &["oman"]),
    ("PAK", &["pakistan"]),
    ("PLW", &["palau"]),
    (
        "PSE",
        &["palestine", "state of palestine", "palestinian territories"],
    ),
    ("PAN", &["panama"]),
    ("PNG", &["papua new guinea"]),
    ("PRY", &["paraguay"]),
    ("PER", &["peru"]),
    ("PHL", &["philippines", "the philippines"]),
    ("POL", &["poland"]),
    ("PRT", &["portugal"]),
    ("PRI", &["puerto rico"]),
    ("QAT", &["qatar"]),
    ("ROU", &["romania"]),
    ("RUS", &["russia", "russian federation"]),
    ("RWA", &["rwanda"]),
    ("KNA", &["saint kitts and nevis"]),
    ("LCA", &["saint lucia"]),
    (
        "VCT",
        &["saint vincent and the grenadines", "saint vincent"],
    ),
    ("WSM", &["samoa"]),
    ("SMR", &["san marino"]),
    ("STP", &["sao tome and principe"]),
    ("SAU", &["saudi arabia", "kingdom of saudi arabia"]),
    ("SEN", &["senegal"]),
    ("SRB", &["serbia"]),
    ("SYC", &["seychelles"]),
    ("SLE", &["sierra leone"]),
    ("SGP", &["singapore"]),
    ("SVK", &["slovakia"]),
    ("SVN", &["slovenia"]),
    ("SLB", &["solomon islands"]),
    ("SOM", &["somalia"]),
    ("ZAF", &["south africa"]),
    ("SSD", &["south sudan"]),
    ("ESP", &["spain"]),
    ("LKA", &["sri lanka"]),
    ("SDN", &["sudan"]),
    ("SUR", &["suriname"]),
    ("SWE", &["sweden"]),
    ("CHE", &["switzerland"]),
    ("SYR", &["syria", "syrian arab republic"]),
    ("TWN", &["taiwan"]),
    ("TJK", &["tajikistan"]),
    ("TZA", &["tanzania", "united republic of tanzania"]),
    ("THA", &["thailand"]),
    ("TLS", &["timor-leste", "east timor"]),
    ("TGO", &["togo"]),
    ("TON", &["tonga"]),
    ("TTO", &["trinidad and tobago"]),
    ("TUN", &["tunisia"]),
    ("TUR", &["turkey", "türkiye", "turkiye"]),
    ("TKM", &["turkmenistan"]),
    ("TUV", &["tuvalu"]),
    ("UGA", &["uganda"]),
    ("UKR", &["ukraine"]),
    ("ARE", &["united arab emirates", "uae"]),
    (
        "GBR",
        &["united kingdom", "uk", "great britain", "britain"],
    ),
    (
        "USA",
        &["united states", "united states of america", "usa", "america"],
    ),
    ("URY", &["uruguay"]),
    ("UZB", &["uzbekistan"]),
    ("VUT", &["vanuatu"]),
    ("VAT", &["vatican", "vatican city", "holy see"]),
    (
        "VEN",
        &["venezuela", "bolivarian republic of venezuela"],
    ),
    ("VIR", &["u.s. virgin islands", "us virgin islands"]),
    ("VNM", &["vietnam", "viet nam"]),
    ("YEM", &["yemen"]),
    ("ZMB", &["zambia"]),
    ("ZWE", &["zimbabwe"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_size_is_fixed() {
        let n = universe().count();
        assert!(n >= 190 && n <= 200, "unexpected universe size {n}");
    }

    #[test]
    fn alpha3_lookup_is_case_insensitive() {
        assert_eq!(from_alpha3("deu"), from_alpha3("DEU"));
        assert!(from_alpha3("DEU").is_some());
        assert!(from_alpha3("XXX").is_none());
    }

    #[test]
    fn region_members_are_in_universe() {
        for (name, members) in REGIONS.iter() {
            assert!(!members.is_empty(), "region {name} is empty");
        }
        let europe = &REGIONS.iter().find(|(n, _)| *n == "europe").unwrap().1;
        assert!(europe.len() >= 40);
        assert!(europe.contains(&from_alpha3("DEU").unwrap()));
        assert!(europe.contains(&from_alpha3("RUS").unwrap()));
    }

    #[test]
    fn serde_round_trip_rejects_unknown_codes() {
        let code: CountryCode = serde_json::from_str("\"FRA\"").unwrap();
        assert_eq!(code.as_str(), "FRA");
        assert!(serde_json::from_str::<CountryCode>("\"ZZZ\"").is_err());
    }
}
