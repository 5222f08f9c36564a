use serde::{Deserialize, Serialize};

const EMBEDDED: &str = include_str!("../data/geography.yaml");

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: i32,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: i32,
    pub country_id: i32,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: i32,
    pub state_id: i32,
    pub name: String,
}

// File layout
#[derive(Deserialize)]
struct GeographyFile {
    countries: Vec<CountryEntry>,
}

#[derive(Deserialize)]
struct CountryEntry {
    name: String,
    code: String,
    #[serde(default)]
    states: Vec<StateEntry>,
}

#[derive(Deserialize)]
struct StateEntry {
    name: String,
    code: String,
    #[serde(default)]
    cities: Vec<String>,
}

/// Static country/state/city reference data
#[derive(Debug, Clone, Default)]
pub struct Geography {
    countries: Vec<Country>,
    states: Vec<State>,
    cities: Vec<City>,
}

impl Geography {
    /// The data set compiled into the binary
    pub fn embedded() -> Result<Self, serde_yaml::Error> {
        Self::from_yaml(EMBEDDED)
    }

    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        let file: GeographyFile = serde_yaml::from_str(source)?;
        let mut geography = Geography::default();

        for country in file.countries {
            let country_id = geography.countries.len() as i32 + 1;
            geography.countries.push(Country {
                id: country_id,
                name: country.name,
                code: country.code,
            });

            for state in country.states {
                let state_id = geography.states.len() as i32 + 1;
                geography.states.push(State {
                    id: state_id,
                    country_id,
                    name: state.name,
                    code: state.code,
                });

                for name in state.cities {
                    let id = geography.cities.len() as i32 + 1;
                    geography.cities.push(City { id, state_id, name });
                }
            }
        }

        Ok(geography)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// `None` when the country is unknown
    pub fn states_of(&self, country_id: i32) -> Option<Vec<&State>> {
        self.countries.iter().find(|c| c.id == country_id)?;
        Some(self.states.iter().filter(|s| s.country_id == country_id).collect())
    }

    /// `None` when the state is unknown
    pub fn cities_of(&self, state_id: i32) -> Option<Vec<&City>> {
        self.states.iter().find(|s| s.id == state_id)?;
        Some(self.cities.iter().filter(|c| c.state_id == state_id).collect())
    }
}
