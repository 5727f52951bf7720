//! Static vocabulary of the projection store.
//!
//! Every code the dashboard accepts (modules, items, variables, units and
//! region display names) is declared here once. The tables are compiled into
//! the binary, collected into a [`Catalog`] at start-up and handed to every
//! component that needs to validate or label codes.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

/// One of the four projection tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Module {
    Crop,
    Animal,
    Bioenergy,
    LandCover,
}

impl Module {
    pub const ALL: [Module; 4] = [
        Module::Crop,
        Module::Animal,
        Module::Bioenergy,
        Module::LandCover,
    ];

    /// Selector code used in query strings and by the assistant tool.
    pub fn code(&self) -> &'static str {
        match self {
            Module::Crop => "crop",
            Module::Animal => "animal",
            Module::Bioenergy => "bioenergy",
            Module::LandCover => "landcover",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Module::Crop => "Crop Module Projection",
            Module::Animal => "Animal Module Projection",
            Module::Bioenergy => "Bioenergy Module Projection",
            Module::LandCover => "Land Cover Projection",
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            Module::Crop => "crop_projections",
            Module::Animal => "animal_projections",
            Module::Bioenergy => "bioenergy_projections",
            Module::LandCover => "land_cover_projections",
        }
    }

    pub fn items(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Module::Crop => CROP_ITEMS,
            Module::Animal => ANIMAL_ITEMS,
            Module::Bioenergy => BIOENERGY_ITEMS,
            Module::LandCover => LAND_COVER_ITEMS,
        }
    }

    pub fn variables(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Module::Crop => CROP_VARIABLES,
            Module::Animal => ANIMAL_VARIABLES,
            Module::Bioenergy => BIOENERGY_VARIABLES,
            Module::LandCover => LAND_COVER_VARIABLES,
        }
    }

    pub fn valid_codes() -> String {
        Module::ALL
            .iter()
            .map(|module| module.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Module {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|module| module.code() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl fmt::Display for UnknownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid module '{}'. Valid options: {}",
            self.0,
            Module::valid_codes()
        )
    }
}

impl std::error::Error for UnknownModule {}

pub const CROP_ITEMS: &[(&str, &str)] = &[
    ("wht", "Wheat"),
    ("ric", "Rice"),
    ("cgr", "Coarse Grains"),
    ("osd", "Oilseeds"),
    ("vfn", "Vegetables, Fruits & Nuts"),
];

pub const CROP_VARIABLES: &[(&str, &str)] = &[
    ("area", "Harvested Area"),
    ("prod", "Production"),
    ("yild", "Yield"),
    ("cons", "Total Consumption"),
    ("food", "Food Consumption"),
    ("feed", "Feed Use"),
    ("othu", "Other Uses"),
    ("expo", "Exports"),
    ("impo", "Imports"),
    ("nett", "Net Trade"),
];

pub const ANIMAL_ITEMS: &[(&str, &str)] = &[
    ("rum", "Ruminant Meat"),
    ("nrm", "Non-Ruminant Meat & Eggs"),
    ("dry", "Dairy"),
    ("grs", "Grassland (Grazing)"),
];

pub const ANIMAL_VARIABLES: &[(&str, &str)] = &[
    ("area", "Grazing Area"),
    ("prod", "Production"),
    ("yild", "Yield"),
    ("cons", "Total Consumption"),
    ("food", "Food Consumption"),
    ("othu", "Other Uses"),
    ("expo", "Exports"),
    ("impo", "Imports"),
    ("nett", "Net Trade"),
];

pub const BIOENERGY_ITEMS: &[(&str, &str)] = &[("sgc", "Sugarcane"), ("pfb", "Plant-Based Fiber")];

pub const BIOENERGY_VARIABLES: &[(&str, &str)] = &[
    ("area", "Harvested Area"),
    ("prod", "Production"),
    ("yild", "Yield"),
    ("cons", "Total Consumption"),
    ("othu", "Other Uses"),
    ("expo", "Exports"),
    ("impo", "Imports"),
    ("nett", "Net Trade"),
];

pub const LAND_COVER_ITEMS: &[(&str, &str)] = &[
    ("crp", "Cropland"),
    ("for", "Forest"),
    ("grs", "Grassland"),
    ("nld", "Other Natural Land"),
];

pub const LAND_COVER_VARIABLES: &[(&str, &str)] = &[("land", "Land Area")];

pub const UNITS: &[(&str, &str)] = &[
    ("ha", "Hectares"),
    ("t", "Tonnes"),
    ("t/ha", "Tonnes per Hectare"),
];

/// Prefix marking a value reported in thousands of the base unit.
pub const THOUSAND_PREFIX: &str = "1000 ";

pub const REGION_NAMES: &[(&str, &str)] = &[
    ("ame", "Africa & Middle East"),
    ("anz", "Oceania"),
    ("bra", "Brazil"),
    ("can", "Canada"),
    ("chn", "China"),
    ("eue", "EU Central/East"),
    ("eur", "Europe"),
    ("fsu", "Former USSR"),
    ("ind", "India"),
    ("men", "Middle East & North Africa"),
    ("nam", "North America"),
    ("oam", "Other Americas"),
    ("oas", "Other Asia"),
    ("osa", "Rest of South Asia"),
    ("sas", "South Asia"),
    ("sea", "Southeast Asia"),
    ("ssa", "Sub-Saharan Africa"),
    ("usa", "United States"),
    ("wld", "World"),
];

/// Variables summed across every module on the landing page: (code, label, unit).
pub const HEADLINE_VARIABLES: &[(&str, &str, &str)] = &[
    ("yild", "Yield", "t/ha"),
    ("cons", "Total Consumption", "t"),
    ("nett", "Net Trade", "t"),
    ("prod", "Production", "t"),
];

const GRASSLAND: &str = "grs";
const LAND_VARIABLE: &str = "land";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CodeLabel {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleInfo {
    pub name: String,
    pub label: String,
    pub items: Vec<CodeLabel>,
    pub variables: Vec<CodeLabel>,
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub items: IndexMap<&'static str, &'static str>,
    pub variables: IndexMap<&'static str, &'static str>,
}

impl Vocabulary {
    fn for_module(module: Module) -> Self {
        Self {
            items: module.items().iter().copied().collect(),
            variables: module.variables().iter().copied().collect(),
        }
    }
}

/// Immutable lookup tables shared by the ingestion job, the query layer and
/// the assistant.
#[derive(Debug, Clone)]
pub struct Catalog {
    vocabularies: IndexMap<Module, Vocabulary>,
    units: IndexMap<&'static str, &'static str>,
    region_names: IndexMap<&'static str, &'static str>,
    item_modules: IndexMap<&'static str, Module>,
}

impl Catalog {
    pub fn standard() -> Self {
        let vocabularies = Module::ALL
            .into_iter()
            .map(|module| (module, Vocabulary::for_module(module)))
            .collect();

        // grs lives in two modules and is routed by variable instead
        let mut item_modules = IndexMap::new();
        for module in Module::ALL {
            for (code, _) in module.items() {
                if *code != GRASSLAND {
                    item_modules.insert(*code, module);
                }
            }
        }

        Self {
            vocabularies,
            units: UNITS.iter().copied().collect(),
            region_names: REGION_NAMES.iter().copied().collect(),
            item_modules,
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = (Module, &Vocabulary)> {
        self.vocabularies.iter().map(|(module, vocab)| (*module, vocab))
    }

    pub fn vocabulary(&self, module: Module) -> &Vocabulary {
        // every module is inserted by `standard`
        &self.vocabularies[&module]
    }

    pub fn item_label(&self, module: Module, code: &str) -> Option<&'static str> {
        self.vocabulary(module).items.get(code).copied()
    }

    pub fn variable_label(&self, module: Module, code: &str) -> Option<&'static str> {
        self.vocabulary(module).variables.get(code).copied()
    }

    pub fn has_item(&self, module: Module, code: &str) -> bool {
        self.vocabulary(module).items.contains_key(code)
    }

    pub fn has_variable(&self, module: Module, code: &str) -> bool {
        self.vocabulary(module).variables.contains_key(code)
    }

    pub fn item_codes(&self, module: Module) -> Vec<&'static str> {
        self.vocabulary(module).items.keys().copied().collect()
    }

    pub fn variable_codes(&self, module: Module) -> Vec<&'static str> {
        self.vocabulary(module).variables.keys().copied().collect()
    }

    /// Display name for a region code, falling back to the code itself.
    pub fn region_name<'a>(&self, code: &'a str) -> &'a str {
        match self.region_names.get(code) {
            Some(name) => name,
            None => code,
        }
    }

    /// Target module for an ingested (item, variable) pair.
    ///
    /// Grassland is recorded twice upstream: as a land class (`land`) and as
    /// grazing area for livestock (any other variable).
    pub fn module_for(&self, item: &str, variable: &str) -> Option<Module> {
        if item == GRASSLAND {
            return Some(if variable == LAND_VARIABLE {
                Module::LandCover
            } else {
                Module::Animal
            });
        }
        self.item_modules.get(item).copied()
    }

    /// Normalizes `1000 <unit>` values to the base unit.
    ///
    /// Returns `None` when the unit is not part of the vocabulary.
    pub fn normalize_unit(&self, value: f64, unit: &str) -> Option<(f64, &'static str)> {
        if let Some(base) = unit.strip_prefix(THOUSAND_PREFIX) {
            return self
                .units
                .get_key_value(base.trim())
                .map(|(code, _)| (value * 1000.0, *code));
        }
        self.units
            .get_key_value(unit.trim())
            .map(|(code, _)| (value, *code))
    }

    pub fn module_infos(&self) -> Vec<ModuleInfo> {
        self.modules()
            .map(|(module, vocab)| ModuleInfo {
                name: module.code().to_string(),
                label: module.display_name().to_string(),
                items: to_code_labels(&vocab.items),
                variables: to_code_labels(&vocab.variables),
            })
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn to_code_labels(map: &IndexMap<&'static str, &'static str>) -> Vec<CodeLabel> {
    map.iter()
        .map(|(code, label)| CodeLabel {
            code: code.to_string(),
            label: label.to_string(),
        })
        .collect()
}
