//! Descriptive (catalog) fields shared by every tree record.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The seven taxonomic ranks, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    /// Kingdom.
    Kingdom,
    /// Phylum.
    Phylum,
    /// Class.
    Class,
    /// Order.
    Order,
    /// Family.
    Family,
    /// Genus.
    Genus,
    /// Species.
    Species,
}

impl Rank {
    /// All ranks, kingdom first.
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Key used in stored rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Genus => "genus",
            Self::Species => "species",
        }
    }
}

/// Ranked classification. No vocabulary is enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Kingdom.
    pub kingdom: String,
    /// Phylum.
    pub phylum: String,
    /// Class.
    pub class: String,
    /// Order.
    pub order: String,
    /// Family.
    pub family: String,
    /// Genus.
    pub genus: String,
    /// Species.
    pub species: String,
}

impl Taxonomy {
    /// Value at `rank`.
    pub fn get(&self, rank: Rank) -> &str {
        match rank {
            Rank::Kingdom => &self.kingdom,
            Rank::Phylum => &self.phylum,
            Rank::Class => &self.class,
            Rank::Order => &self.order,
            Rank::Family => &self.family,
            Rank::Genus => &self.genus,
            Rank::Species => &self.species,
        }
    }

    /// Mutable slot at `rank`.
    pub fn get_mut(&mut self, rank: Rank) -> &mut String {
        match rank {
            Rank::Kingdom => &mut self.kingdom,
            Rank::Phylum => &mut self.phylum,
            Rank::Class => &mut self.class,
            Rank::Order => &mut self.order,
            Rank::Family => &mut self.family,
            Rank::Genus => &mut self.genus,
            Rank::Species => &mut self.species,
        }
    }
}

/// Native distribution of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endemic {
    /// Region label.
    pub region: String,
    /// Countries, unordered.
    pub countries: Vec<String>,
    /// Provinces, unordered.
    pub provinces: Vec<String>,
}

/// The descriptive part of a tree, identical in both record variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeProfile {
    /// Common (display) name.
    pub common_name: String,
    /// Scientific name.
    pub scientific_name: String,
    /// Seven-rank taxonomy.
    pub taxonomy: Taxonomy,
    /// Native distribution.
    pub endemic: Endemic,
    /// Free-text description.
    pub description: String,
    /// Characteristics in display order.
    pub characteristics: Vec<String>,
}

impl TreeProfile {
    /// Row fragment written to the classification table.
    ///
    /// All seven ranks are always present, possibly as empty strings.
    pub fn to_row(&self) -> Value {
        let taxonomy: serde_json::Map<String, Value> = Rank::ALL
            .iter()
            .map(|rank| (rank.as_str().to_string(), json!(self.taxonomy.get(*rank))))
            .collect();

        json!({
            "common_name": self.common_name,
            "scientific_name": self.scientific_name,
            "taxonomy": taxonomy,
            "endemic": {
                "region": self.endemic.region,
                "countries": self.endemic.countries,
                "provinces": self.endemic.provinces,
            },
            "description": self.description,
            "characteristics": self.characteristics,
        })
    }
}
