//! PokeAPI GraphQL client

use std::sync::OnceLock;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::pagination::Page;
use crate::query::QueryMode;
use crate::state::{capitalize, EvolutionStage, Pokemon, PokemonDetail, PokemonStat};

pub const DEFAULT_ENDPOINT: &str = "https://beta.pokeapi.co/graphql/v1beta";
const ENGLISH_LANGUAGE_ID: u32 = 9;

const POKEMON_FIELDS: &str = r#"
    id
    name
    pokemon_v2_pokemontypes { pokemon_v2_type { name } }
    pokemon_v2_pokemonsprites { sprites }
"#;

const DETAIL_QUERY: &str = r#"
query GetPokemon($name: String!, $language: Int!) {
  pokemon_v2_pokemon(where: { name: { _eq: $name } }) {
    id
    name
    height
    weight
    base_experience
    pokemon_v2_pokemontypes { pokemon_v2_type { name } }
    pokemon_v2_pokemonstats { base_stat pokemon_v2_stat { name } }
    pokemon_v2_pokemonabilities { pokemon_v2_ability { name } }
    pokemon_v2_pokemonsprites { sprites }
    pokemon_v2_pokemonspecy {
      pokemon_v2_evolutionchain {
        pokemon_v2_pokemonspecies(order_by: { order: asc }) {
          id
          name
          order
          pokemon_v2_pokemons(limit: 1) {
            id
            pokemon_v2_pokemonsprites { sprites }
          }
        }
      }
      pokemon_v2_pokemonspeciesflavortexts(where: { language_id: { _eq: $language } }, limit: 1) {
        flavor_text
      }
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("graphql error: {0}")]
    Graphql(String),
    #[error("pokemon '{0}' not found")]
    NotFound(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListData {
    pokemon_v2_pokemon: Vec<RawPokemon>,
    pokemon_v2_pokemon_aggregate: RawAggregate,
}

#[derive(Debug, Deserialize)]
struct RawAggregate {
    aggregate: RawCount,
}

#[derive(Debug, Deserialize)]
struct RawCount {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct RawPokemon {
    id: u32,
    name: String,
    #[serde(default)]
    pokemon_v2_pokemontypes: Vec<RawTypeSlot>,
    #[serde(default)]
    pokemon_v2_pokemonsprites: Vec<RawSprites>,
}

#[derive(Debug, Deserialize)]
struct RawTypeSlot {
    pokemon_v2_type: Option<RawNamed>,
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawSprites {
    sprites: Value,
}

#[derive(Debug, Deserialize)]
struct DetailData {
    pokemon_v2_pokemon: Vec<RawDetail>,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    id: u32,
    name: String,
    #[serde(default)]
    height: Option<u16>,
    #[serde(default)]
    weight: Option<u16>,
    base_experience: Option<u32>,
    #[serde(default)]
    pokemon_v2_pokemontypes: Vec<RawTypeSlot>,
    #[serde(default)]
    pokemon_v2_pokemonstats: Vec<RawStat>,
    #[serde(default)]
    pokemon_v2_pokemonabilities: Vec<RawAbility>,
    #[serde(default)]
    pokemon_v2_pokemonsprites: Vec<RawSprites>,
    pokemon_v2_pokemonspecy: Option<RawSpecies>,
}

#[derive(Debug, Deserialize)]
struct RawStat {
    base_stat: u16,
    pokemon_v2_stat: Option<RawNamed>,
}

#[derive(Debug, Deserialize)]
struct RawAbility {
    pokemon_v2_ability: Option<RawNamed>,
}

#[derive(Debug, Deserialize)]
struct RawSpecies {
    pokemon_v2_evolutionchain: Option<RawEvolutionChain>,
    #[serde(default)]
    pokemon_v2_pokemonspeciesflavortexts: Vec<RawFlavorText>,
}

#[derive(Debug, Deserialize)]
struct RawEvolutionChain {
    #[serde(default)]
    pokemon_v2_pokemonspecies: Vec<RawEvolutionSpecies>,
}

#[derive(Debug, Deserialize)]
struct RawEvolutionSpecies {
    id: u32,
    name: String,
    #[serde(default)]
    pokemon_v2_pokemons: Vec<RawEvolutionPokemon>,
}

#[derive(Debug, Deserialize)]
struct RawEvolutionPokemon {
    id: u32,
    #[serde(default)]
    pokemon_v2_pokemonsprites: Vec<RawSprites>,
}

#[derive(Debug, Deserialize)]
struct RawFlavorText {
    flavor_text: String,
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .user_agent("pokedex-tui/0.1")
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Handle on one GraphQL endpoint; cheap to clone into tasks.
#[derive(Clone, Debug)]
pub struct PokeApi {
    endpoint: String,
}

impl Default for PokeApi {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl PokeApi {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One page of the listing for `mode`, ordered by id.
    pub async fn fetch_page(
        &self,
        mode: &QueryMode,
        offset: usize,
        limit: usize,
    ) -> Result<Page, ApiError> {
        let (query, variables) = list_query(mode, offset, limit);
        let data: ListData = self.post(&query, variables).await?;
        Ok(Page {
            items: data
                .pokemon_v2_pokemon
                .into_iter()
                .map(transform_pokemon)
                .collect(),
            total_count: data.pokemon_v2_pokemon_aggregate.aggregate.count,
        })
    }

    pub async fn fetch_detail(&self, name: &str) -> Result<PokemonDetail, ApiError> {
        let variables = json!({ "name": name, "language": ENGLISH_LANGUAGE_ID });
        let data: DetailData = self.post(DETAIL_QUERY, variables).await?;
        data.pokemon_v2_pokemon
            .into_iter()
            .next()
            .map(transform_detail)
            .ok_or_else(|| ApiError::NotFound(name.to_string()))
    }

    async fn post<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, ApiError> {
        let response = http_client()
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;
        let body: GraphqlResponse<T> = response.json().await?;
        decode_response(body)
    }
}

fn decode_response<T>(body: GraphqlResponse<T>) -> Result<T, ApiError> {
    if let Some(error) = body.errors.first() {
        return Err(ApiError::Graphql(error.message.clone()));
    }
    body.data
        .ok_or_else(|| ApiError::Decode("response had no data".to_string()))
}

/// Builds the listing query and its variables. Names match as a substring,
/// types match exactly on the lowercase API name.
fn list_query(mode: &QueryMode, offset: usize, limit: usize) -> (String, Value) {
    let (params, filter, extra) = match mode {
        QueryMode::All => ("", String::new(), json!({})),
        QueryMode::Search(term) => (
            ", $search: String!",
            "where: { name: { _ilike: $search } }".to_string(),
            json!({ "search": format!("%{}%", term.to_lowercase()) }),
        ),
        QueryMode::Type(name) => (
            ", $type: String!",
            "where: { pokemon_v2_pokemontypes: { pokemon_v2_type: { name: { _eq: $type } } } }"
                .to_string(),
            json!({ "type": name.to_lowercase() }),
        ),
    };
    let aggregate_args = if filter.is_empty() {
        String::new()
    } else {
        format!("({filter})")
    };
    let query = format!(
        "query ListPokemon($limit: Int!, $offset: Int!{params}) {{\n  \
         pokemon_v2_pokemon(limit: $limit, offset: $offset, order_by: {{ id: asc }} {filter}) {{{POKEMON_FIELDS}}}\n  \
         pokemon_v2_pokemon_aggregate{aggregate_args} {{ aggregate {{ count }} }}\n}}"
    );
    let mut variables = json!({ "limit": limit, "offset": offset });
    if let (Some(target), Some(extra)) = (variables.as_object_mut(), extra.as_object()) {
        target.extend(extra.clone());
    }
    (query, variables)
}

fn transform_pokemon(raw: RawPokemon) -> Pokemon {
    let image = raw
        .pokemon_v2_pokemonsprites
        .first()
        .and_then(|sprites| artwork_url(&sprites.sprites));
    Pokemon::new(raw.id, raw.name, type_names(&raw.pokemon_v2_pokemontypes), image)
}

fn transform_detail(raw: RawDetail) -> PokemonDetail {
    let image = raw
        .pokemon_v2_pokemonsprites
        .first()
        .and_then(|sprites| artwork_url(&sprites.sprites))
        .unwrap_or_else(|| crate::state::official_artwork_url(raw.id));
    let (evolutions, flavor_text) = match raw.pokemon_v2_pokemonspecy {
        Some(species) => (
            species
                .pokemon_v2_evolutionchain
                .map(|chain| {
                    chain
                        .pokemon_v2_pokemonspecies
                        .into_iter()
                        .map(evolution_stage)
                        .collect()
                })
                .unwrap_or_default(),
            species
                .pokemon_v2_pokemonspeciesflavortexts
                .into_iter()
                .next()
                .map(|entry| clean_flavor_text(&entry.flavor_text)),
        ),
        None => (Vec::new(), None),
    };
    PokemonDetail {
        id: raw.id,
        number: format!("{:03}", raw.id),
        name: raw.name,
        height: raw.height.unwrap_or_default(),
        weight: raw.weight.unwrap_or_default(),
        base_experience: raw.base_experience,
        types: type_names(&raw.pokemon_v2_pokemontypes),
        stats: raw
            .pokemon_v2_pokemonstats
            .into_iter()
            .filter_map(|stat| {
                stat.pokemon_v2_stat.map(|named| PokemonStat {
                    name: named.name,
                    value: stat.base_stat,
                })
            })
            .collect(),
        abilities: raw
            .pokemon_v2_pokemonabilities
            .into_iter()
            .filter_map(|slot| slot.pokemon_v2_ability.map(|named| named.name))
            .collect(),
        image,
        flavor_text,
        evolutions,
    }
}

fn evolution_stage(species: RawEvolutionSpecies) -> EvolutionStage {
    let first = species.pokemon_v2_pokemons.into_iter().next();
    let id = first.as_ref().map(|pokemon| pokemon.id).unwrap_or(species.id);
    let image = first
        .and_then(|pokemon| {
            pokemon
                .pokemon_v2_pokemonsprites
                .first()
                .and_then(|sprites| artwork_url(&sprites.sprites))
        })
        .unwrap_or_else(|| crate::state::official_artwork_url(id));
    EvolutionStage {
        id,
        name: species.name,
        image,
    }
}

fn type_names(slots: &[RawTypeSlot]) -> Vec<String> {
    slots
        .iter()
        .filter_map(|slot| slot.pokemon_v2_type.as_ref())
        .map(|named| capitalize(&named.name))
        .collect()
}

/// Official artwork from a sprites blob. Some deployments hand the blob back
/// as a JSON-encoded string instead of an object.
fn artwork_url(sprites: &Value) -> Option<String> {
    let parsed;
    let sprites = match sprites {
        Value::String(raw) => {
            parsed = serde_json::from_str::<Value>(raw).ok()?;
            &parsed
        }
        other => other,
    };
    sprites
        .pointer("/other/official-artwork/front_default")
        .and_then(Value::as_str)
        .or_else(|| sprites.pointer("/front_default").and_then(Value::as_str))
        .map(str::to_string)
}

fn clean_flavor_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transform_pokemon_formats_card() {
        let raw: RawPokemon = serde_json::from_value(json!({
            "id": 4,
            "name": "charmander",
            "pokemon_v2_pokemontypes": [{ "pokemon_v2_type": { "name": "fire" } }],
            "pokemon_v2_pokemonsprites": [{
                "sprites": { "other": { "official-artwork": { "front_default": "https://img/4.png" } } }
            }]
        }))
        .expect("raw pokemon");

        let pokemon = transform_pokemon(raw);
        assert_eq!(pokemon.number, "004");
        assert_eq!(pokemon.types, vec!["Fire".to_string()]);
        assert_eq!(pokemon.image, "https://img/4.png");
    }

    #[test]
    fn test_string_encoded_sprites() {
        let sprites = Value::String(
            r#"{"other":{"official-artwork":{"front_default":"https://img/25.png"}}}"#.into(),
        );
        assert_eq!(artwork_url(&sprites).as_deref(), Some("https://img/25.png"));
    }

    #[test]
    fn test_missing_artwork_falls_back_to_id() {
        let raw: RawPokemon = serde_json::from_value(json!({
            "id": 151,
            "name": "mew",
            "pokemon_v2_pokemontypes": [{ "pokemon_v2_type": { "name": "psychic" } }],
            "pokemon_v2_pokemonsprites": [{ "sprites": { "other": {} } }]
        }))
        .expect("raw pokemon");

        let pokemon = transform_pokemon(raw);
        assert!(pokemon.image.ends_with("/official-artwork/151.png"));
    }

    #[test]
    fn test_list_query_variables_per_mode() {
        let (_, all) = list_query(&QueryMode::All, 30, 30);
        assert_eq!(all, json!({ "limit": 30, "offset": 30 }));

        let (query, search) = list_query(&QueryMode::Search("Char".into()), 0, 30);
        assert_eq!(search["search"], "%char%");
        assert!(query.contains("_ilike: $search"));

        let (query, by_type) = list_query(&QueryMode::Type("Fire".into()), 0, 30);
        assert_eq!(by_type["type"], "fire");
        assert!(query.contains("pokemon_v2_pokemon_aggregate(where"));
    }

    #[test]
    fn test_graphql_errors_surface() {
        let body: GraphqlResponse<ListData> = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "field not found" }]
        }))
        .expect("error body");
        assert!(matches!(decode_response(body), Err(ApiError::Graphql(msg)) if msg == "field not found"));
    }

    #[test]
    fn test_transform_detail_orders_evolutions() {
        let raw: RawDetail = serde_json::from_value(json!({
            "id": 2,
            "name": "ivysaur",
            "height": 10,
            "weight": 130,
            "base_experience": 142,
            "pokemon_v2_pokemontypes": [
                { "pokemon_v2_type": { "name": "grass" } },
                { "pokemon_v2_type": { "name": "poison" } }
            ],
            "pokemon_v2_pokemonstats": [{ "base_stat": 60, "pokemon_v2_stat": { "name": "hp" } }],
            "pokemon_v2_pokemonabilities": [{ "pokemon_v2_ability": { "name": "overgrow" } }],
            "pokemon_v2_pokemonsprites": [],
            "pokemon_v2_pokemonspecy": {
                "pokemon_v2_evolutionchain": {
                    "pokemon_v2_pokemonspecies": [
                        { "id": 1, "name": "bulbasaur", "order": 1, "pokemon_v2_pokemons": [{ "id": 1, "pokemon_v2_pokemonsprites": [] }] },
                        { "id": 2, "name": "ivysaur", "order": 2, "pokemon_v2_pokemons": [] }
                    ]
                },
                "pokemon_v2_pokemonspeciesflavortexts": [{ "flavor_text": "When the bulb\non its back\u{000C}grows large" }]
            }
        }))
        .expect("raw detail");

        let detail = transform_detail(raw);
        assert_eq!(detail.types, vec!["Grass".to_string(), "Poison".to_string()]);
        assert_eq!(detail.evolutions.len(), 2);
        assert_eq!(detail.evolutions[0].name, "bulbasaur");
        assert!(detail.image.ends_with("/2.png"));
        assert_eq!(
            detail.flavor_text.as_deref(),
            Some("When the bulb on its back grows large")
        );
    }
}
