use rand::Rng;
use serde::{Deserialize, Serialize};

/// Serialized through [`Species::name`], the one list of wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Species {
    CoastLiveOak,
    MontereyPine,
    Redwood,
    CaliforniaBuckeye,
    WesternSycamore,
    LondonPlane,
}

/// Per-tree reference figures. Costs are dollars, CO₂ is kg per year, water is
/// liters per year, heights and spreads are feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeciesData {
    pub planting_cost: f64,
    pub maintenance_cost: f64,
    pub co2_per_year: f64,
    pub water_requirement: f64,
    pub growth_rate: f64,
    pub max_height: f64,
    pub max_crown_spread: f64,
}

impl Species {
    pub const ALL: [Species; 6] = [
        Species::CoastLiveOak,
        Species::MontereyPine,
        Species::Redwood,
        Species::CaliforniaBuckeye,
        Species::WesternSycamore,
        Species::LondonPlane,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Species::CoastLiveOak => "coast_live_oak",
            Species::MontereyPine => "monterey_pine",
            Species::Redwood => "redwood",
            Species::CaliforniaBuckeye => "california_buckeye",
            Species::WesternSycamore => "western_sycamore",
            Species::LondonPlane => "london_plane",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|species| species.name() == name)
    }

    pub fn data(self) -> SpeciesData {
        let (planting, maintenance, co2, water, growth, height, crown) = match self {
            Species::CoastLiveOak => (350.0, 5.0, 20.0, 800.0, 1.5, 70.0, 70.0),
            Species::MontereyPine => (300.0, 4.0, 25.0, 600.0, 2.0, 100.0, 40.0),
            Species::Redwood => (400.0, 6.0, 30.0, 1000.0, 3.0, 200.0, 30.0),
            Species::CaliforniaBuckeye => (250.0, 3.5, 15.0, 400.0, 1.0, 40.0, 30.0),
            Species::WesternSycamore => (320.0, 4.5, 18.0, 700.0, 1.8, 80.0, 60.0),
            Species::LondonPlane => (280.0, 4.0, 20.0, 600.0, 1.5, 75.0, 50.0),
        };
        SpeciesData {
            planting_cost: planting,
            maintenance_cost: maintenance,
            co2_per_year: co2,
            water_requirement: water,
            growth_rate: growth,
            max_height: height,
            max_crown_spread: crown,
        }
    }

    /// Uniform choice over the catalog.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl From<Species> for String {
    fn from(species: Species) -> Self {
        species.name().to_string()
    }
}

impl TryFrom<String> for Species {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Species::from_name(&name).ok_or_else(|| format!("unknown species '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn names_round_trip_through_lookup() {
        for species in Species::ALL {
            assert_eq!(Species::from_name(species.name()), Some(species));
            let json = serde_json::to_string(&species).unwrap();
            assert_eq!(json, format!("\"{}\"", species.name()));
        }
        assert_eq!(Species::from_name("maple"), None);
        assert!(serde_json::from_str::<Species>("\"maple\"").is_err());
    }

    #[test]
    fn species_work_as_json_map_keys() {
        let shares: std::collections::BTreeMap<Species, f64> =
            serde_json::from_str(r#"{"redwood": 0.25, "london_plane": 0.75}"#).unwrap();
        assert_eq!(shares[&Species::Redwood], 0.25);
        let json = serde_json::to_string(&shares).unwrap();
        assert_eq!(json, r#"{"redwood":0.25,"london_plane":0.75}"#);
    }

    #[test]
    fn catalog_figures() {
        let redwood = Species::Redwood.data();
        assert_eq!(redwood.planting_cost, 400.0);
        assert_eq!(redwood.co2_per_year, 30.0);
        assert_eq!(Species::CaliforniaBuckeye.data().maintenance_cost, 3.5);
    }

    #[test]
    fn random_choice_covers_the_catalog() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            seen.insert(Species::random(&mut rng));
        }
        assert_eq!(seen.len(), Species::ALL.len());
    }
}
