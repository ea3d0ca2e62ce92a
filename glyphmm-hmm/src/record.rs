//! JSON representation of a model.
//!
//! ```json
//! {
//!   "alphabet": ["a", "b", "$"],
//!   "initial": [0.6, 0.4],
//!   "nodes": [
//!     { "next": [0.5, 0.5], "prob": [0.4, 0.3, 0.3] },
//!     { "next": [0.5, 0.5], "prob": [0.2, 0.5, 0.3] }
//!   ]
//! }
//! ```
//!
//! The state count is implied by the number of nodes. Files written by older
//! tooling that used `_alphabet`, `_init` and `_nodes` as field names are
//! accepted too, as is an alphabet stored as a single string with one symbol
//! per char (`"alphabet": "ab$"`). Output always uses the array form.

use serde::{Deserialize, Deserializer, Serialize};

use glyphmm_core::{GlyphError, Result};

use crate::alphabet::Alphabet;
use crate::model::HmmModel;

/// Serialized form of an [`HmmModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelRecord {
    /// One single-char string per symbol, in code order.
    #[serde(alias = "_alphabet", deserialize_with = "deserialize_alphabet")]
    pub alphabet: Vec<String>,
    /// Initial state distribution.
    #[serde(alias = "_init")]
    pub initial: Vec<f64>,
    /// One entry per hidden state.
    #[serde(alias = "_nodes")]
    pub nodes: Vec<NodeRecord>,
}

/// Parameters of a single hidden state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeRecord {
    /// Transition probabilities to every state.
    pub next: Vec<f64>,
    /// Emission probability of every symbol.
    pub prob: Vec<f64>,
}

/// Either accepted spelling of the alphabet.
#[derive(Deserialize)]
#[serde(untagged)]
enum AlphabetRepr {
    Symbols(Vec<String>),
    Joined(String),
}

fn deserialize_alphabet<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match AlphabetRepr::deserialize(deserializer)? {
        AlphabetRepr::Symbols(symbols) => symbols,
        AlphabetRepr::Joined(joined) => joined.chars().map(String::from).collect(),
    })
}

impl From<&HmmModel> for ModelRecord {
    fn from(model: &HmmModel) -> Self {
        ModelRecord {
            alphabet: model
                .alphabet()
                .symbols()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            initial: model.initial().to_vec(),
            nodes: (0..model.n_states())
                .map(|i| NodeRecord {
                    next: model.transition_row(i).to_vec(),
                    prob: model.emission_row(i).to_vec(),
                })
                .collect(),
        }
    }
}

impl TryFrom<ModelRecord> for HmmModel {
    type Error = GlyphError;

    /// Validate the record's shape and build a model from it.
    fn try_from(record: ModelRecord) -> Result<Self> {
        let n = record.nodes.len();
        if n == 0 {
            return Err(GlyphError::MalformedModel("model has no nodes".into()));
        }

        let mut symbols = Vec::with_capacity(record.alphabet.len());
        for s in &record.alphabet {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => symbols.push(c),
                _ => {
                    return Err(GlyphError::MalformedModel(format!(
                        "alphabet entry {s:?} is not a single symbol"
                    )))
                }
            }
        }
        let alphabet = Alphabet::new(symbols).map_err(|e| match e {
            GlyphError::InvalidInput(msg) => GlyphError::MalformedModel(msg),
            other => other,
        })?;
        let m = alphabet.len();

        if record.initial.len() != n {
            return Err(GlyphError::MalformedModel(format!(
                "initial has {} entries for {n} nodes",
                record.initial.len()
            )));
        }

        let mut transition = Vec::with_capacity(n * n);
        let mut emission = Vec::with_capacity(n * m);
        for (i, node) in record.nodes.into_iter().enumerate() {
            if node.next.len() != n {
                return Err(GlyphError::MalformedModel(format!(
                    "node {i}: next has {} entries, expected {n}",
                    node.next.len()
                )));
            }
            if node.prob.len() != m {
                return Err(GlyphError::MalformedModel(format!(
                    "node {i}: prob has {} entries, expected {m}",
                    node.prob.len()
                )));
            }
            transition.extend(node.next);
            emission.extend(node.prob);
        }

        HmmModel::from_parts(alphabet, record.initial, transition, emission).map_err(|e| match e {
            GlyphError::InvalidInput(msg) => GlyphError::MalformedModel(msg),
            other => other,
        })
    }
}

impl HmmModel {
    /// Compact JSON encoding of the model.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&ModelRecord::from(self))
            .map_err(|e| GlyphError::Parse(e.to_string()))
    }

    /// Indented JSON encoding of the model.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&ModelRecord::from(self))
            .map_err(|e| GlyphError::Parse(e.to_string()))
    }

    /// Decode a model from JSON.
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid JSON or a record with missing or
    /// unknown fields, and a malformed-model error when the record's shapes
    /// disagree (ragged rows, wrong `initial` length, bad alphabet entries,
    /// negative or non-finite numbers).
    pub fn from_json(json: &str) -> Result<Self> {
        let record: ModelRecord =
            serde_json::from_str(json).map_err(|e| GlyphError::Parse(e.to_string()))?;
        Self::try_from(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn trained_hmm() -> HmmModel {
        let mut rng = StdRng::seed_from_u64(77);
        let alphabet = Alphabet::from_chars("abcé$").unwrap();
        let mut model = HmmModel::random(4, alphabet, &mut rng).unwrap();
        model
            .train_batch(["abc$", "cé$", "bacé$", "a$"], 0.3)
            .unwrap();
        model
    }

    #[test]
    fn round_trip_is_exact() {
        let model = trained_hmm();
        let json = model.to_json().unwrap();
        let back = HmmModel::from_json(&json).unwrap();
        assert_eq!(back, model);

        let pretty = model.to_json_pretty().unwrap();
        assert_eq!(HmmModel::from_json(&pretty).unwrap(), model);
    }

    #[test]
    fn encodes_expected_shape() {
        let model = trained_hmm();
        let v: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
        assert_eq!(v["alphabet"].as_array().unwrap().len(), 5);
        assert_eq!(v["alphabet"][3], "é");
        assert_eq!(v["initial"].as_array().unwrap().len(), 4);
        let nodes = v["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0]["next"].as_array().unwrap().len(), 4);
        assert_eq!(nodes[0]["prob"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn state_count_comes_from_nodes() {
        let json = r#"{
            "alphabet": ["x", "$"],
            "initial": [0.2, 0.3, 0.5],
            "nodes": [
                {"next": [0.1, 0.2, 0.7], "prob": [0.5, 0.5]},
                {"next": [0.3, 0.3, 0.4], "prob": [0.9, 0.1]},
                {"next": [1.0, 0.0, 0.0], "prob": [0.0, 1.0]}
            ]
        }"#;
        let model = HmmModel::from_json(json).unwrap();
        assert_eq!(model.n_states(), 3);
        assert_eq!(model.n_symbols(), 2);
        assert_eq!(model.transition_row(2), &[1.0, 0.0, 0.0]);
        assert_eq!(model.emission_row(1), &[0.9, 0.1]);
    }

    #[test]
    fn legacy_field_names_accepted() {
        let json =
            r#"{"_nodes":[{"next":[1],"prob":[0.5,0.5]}],"_init":[1],"_alphabet":["a","$"]}"#;
        let model = HmmModel::from_json(json).unwrap();
        assert_eq!(model.n_states(), 1);
        assert_eq!(model.alphabet().symbols(), &['a', '$']);
    }

    #[test]
    fn legacy_string_alphabet_accepted() {
        let json = r#"{"_nodes":[{"next":[1],"prob":[0.5,0.5]}],"_init":[1],"_alphabet":"a$"}"#;
        let model = HmmModel::from_json(json).unwrap();
        assert_eq!(model.alphabet().symbols(), &['a', '$']);

        // Re-encoding switches to the array form.
        let v: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
        assert_eq!(v["alphabet"], serde_json::json!(["a", "$"]));

        // A string alphabet still has to match the emission rows.
        let json = r#"{"alphabet":"abc","initial":[1],"nodes":[{"next":[1],"prob":[0.5,0.5]}]}"#;
        assert!(matches!(HmmModel::from_json(json), Err(GlyphError::MalformedModel(_))));
    }

    #[test]
    fn alphabet_of_wrong_type_is_parse_error() {
        let json = r#"{"alphabet":3,"initial":[1],"nodes":[{"next":[1],"prob":[1]}]}"#;
        assert!(matches!(HmmModel::from_json(json), Err(GlyphError::Parse(_))));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(matches!(HmmModel::from_json("{"), Err(GlyphError::Parse(_))));
        assert!(matches!(
            HmmModel::from_json(r#"{"alphabet": ["a"], "initial": [1]}"#),
            Err(GlyphError::Parse(_))
        ));
        assert!(matches!(
            HmmModel::from_json(
                r#"{"alphabet":["a"],"initial":[1],"nodes":[{"next":[1],"prob":[1]}],"extra":1}"#
            ),
            Err(GlyphError::Parse(_))
        ));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let cases = [
            // next too short
            r#"{"alphabet":["a","$"],"initial":[0.5,0.5],"nodes":[{"next":[1],"prob":[0.5,0.5]},{"next":[0.5,0.5],"prob":[0.5,0.5]}]}"#,
            // prob too long
            r#"{"alphabet":["a","$"],"initial":[1],"nodes":[{"next":[1],"prob":[0.2,0.3,0.5]}]}"#,
            // initial length mismatch
            r#"{"alphabet":["a","$"],"initial":[0.5,0.5],"nodes":[{"next":[1],"prob":[0.5,0.5]}]}"#,
            // no nodes
            r#"{"alphabet":["a","$"],"initial":[],"nodes":[]}"#,
            // multi-char symbol
            r#"{"alphabet":["ab","$"],"initial":[1],"nodes":[{"next":[1],"prob":[0.5,0.5]}]}"#,
            // duplicate symbol
            r#"{"alphabet":["a","a"],"initial":[1],"nodes":[{"next":[1],"prob":[0.5,0.5]}]}"#,
            // empty alphabet
            r#"{"alphabet":[],"initial":[1],"nodes":[{"next":[1],"prob":[]}]}"#,
            // negative probability
            r#"{"alphabet":["a","$"],"initial":[1],"nodes":[{"next":[1],"prob":[-0.5,1.5]}]}"#,
        ];
        for json in cases {
            assert!(
                matches!(HmmModel::from_json(json), Err(GlyphError::MalformedModel(_))),
                "{json}"
            );
        }
    }
}
