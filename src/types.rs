use serde::{Deserialize, Serialize};

/// One table row: a list entry joined with its detail response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    /// Position-based id (`offset + index + 1`), not the detail `id`.
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
    pub types: Vec<String>,
    pub stats: Vec<Stat>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub base_stat: u32,
}

impl Pokemon {
    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(name))
    }
}

// ----- wire shapes -----

/// `{ name, url }` pair used by every PokeAPI listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// `GET /pokemon?limit=&offset=`
#[derive(Clone, Debug, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

/// `GET /pokemon/{id}/`, only the fields the table shows.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PokemonDetails {
    #[serde(default)]
    pub sprites: Option<Sprites>,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatEntry {
    pub base_stat: u32,
    pub stat: NamedResource,
}

/// `GET /type`
#[derive(Clone, Debug, Deserialize)]
pub struct TypeList {
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

impl PokemonDetails {
    /// Join with the list entry at `id`.
    pub fn into_pokemon(self, id: u32, name: String) -> Pokemon {
        let mut slots = self.types;
        slots.sort_by_key(|s| s.slot);
        Pokemon {
            id,
            name,
            image: self.sprites.and_then(|s| s.front_default),
            types: slots.into_iter().map(|s| s.kind.name).collect(),
            stats: self
                .stats
                .into_iter()
                .map(|s| Stat { name: s.stat.name, base_stat: s.base_stat })
                .collect(),
        }
    }
}

/// Entry in the type multi-select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeOption {
    pub value: String,
    pub label: String,
}

impl TypeOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let label = capitalize(&value);
        Self { value, label }
    }
}

/// First char upper-case, rest lower-case.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

// ----- events -----

/// Page fetch request; also tags the reply so stale pages can be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    PageLoaded {
        request: PageRequest,
        total: u64,
        rows: Vec<Pokemon>,
    },
    PageFailed {
        request: PageRequest,
        error: String,
    },
    TypesLoaded(Vec<TypeOption>),
    TypesFailed(String),
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("fire"), "Fire");
        assert_eq!(capitalize("sHADOW"), "Shadow");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn details_decode_with_missing_fields() {
        let d: PokemonDetails = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        let p = d.into_pokemon(1, "bulbasaur".into());
        assert_eq!(p.image, None);
        assert!(p.types.is_empty());
        assert!(p.stats.is_empty());
    }

    #[test]
    fn details_join_orders_types_by_slot() {
        let json = r#"{
            "sprites": {"front_default": "https://img/1.png", "back_default": null},
            "types": [
                {"slot": 2, "type": {"name": "poison", "url": "u2"}},
                {"slot": 1, "type": {"name": "grass", "url": "u1"}}
            ],
            "stats": [
                {"base_stat": 45, "effort": 0, "stat": {"name": "hp", "url": "s1"}},
                {"base_stat": 49, "effort": 0, "stat": {"name": "attack", "url": "s2"}}
            ]
        }"#;
        let d: PokemonDetails = serde_json::from_str(json).unwrap();
        let p = d.into_pokemon(7, "bulbasaur".into());
        assert_eq!(p.id, 7);
        assert_eq!(p.image.as_deref(), Some("https://img/1.png"));
        assert_eq!(p.types, vec!["grass", "poison"]);
        assert_eq!(p.stats[1], Stat { name: "attack".into(), base_stat: 49 });
        assert!(p.has_type("GRASS"));
    }
}
