//! # Skill Keys
//!
//! Skill names arrive from three independent producers (job parser, assessment,
//! resume parser), so they are matched on a normalized key rather than the raw
//! string:
//!
//! - trim, lowercase, collapse inner whitespace (`"  Node   JS "` → `"node js"`)
//! - optional alias table (`"nodejs"` → `"node.js"`) from configuration
//!
//! Keys are built once per candidate in [`SkillIndex`]; the scoring stages only ever
//! look skills up through it. Display names are kept untouched.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;

use crate::model::SkillScore;

/// Normalize a raw skill name into its lookup key.
pub fn normalize_skill(raw: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(raw.trim(), " ").to_lowercase()
}

/// Alternative spelling → canonical key, both sides normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillAliases {
    map: HashMap<String, String>,
}

impl SkillAliases {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (normalize_skill(k.as_ref()), normalize_skill(v.as_ref())))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty() && k != v)
            .collect();
        Self { map }
    }

    /// Normalized key with aliases resolved (single hop).
    pub fn key_for(&self, raw: &str) -> String {
        let key = normalize_skill(raw);
        match self.map.get(&key) {
            Some(canon) => canon.clone(),
            None => key,
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedScore<'a> {
    display: &'a str,
    score: f64,
}

/// Lookup of a candidate's assessed skills by normalized key.
///
/// Duplicate skills resolve to the last entry supplied.
#[derive(Debug, Clone)]
pub struct SkillIndex<'a> {
    scores: HashMap<String, IndexedScore<'a>>,
    aliases: &'a SkillAliases,
}

impl<'a> SkillIndex<'a> {
    pub fn build(scores: &'a [SkillScore], aliases: &'a SkillAliases) -> Self {
        let mut map = HashMap::with_capacity(scores.len());
        for s in scores {
            let key = aliases.key_for(&s.skill);
            if key.is_empty() {
                continue;
            }
            map.insert(
                key,
                IndexedScore {
                    display: s.skill.as_str(),
                    score: s.score,
                },
            );
        }
        Self {
            scores: map,
            aliases,
        }
    }

    /// Raw (unclamped) assessed score for a skill name, if assessed.
    pub fn score_of(&self, skill: &str) -> Option<f64> {
        self.scores.get(&self.aliases.key_for(skill)).map(|s| s.score)
    }

    /// Closest assessed skill by Jaro-Winkler similarity, when it reaches `min_similarity`.
    /// Ties go to the alphabetically first key so the answer is stable.
    pub fn closest(&self, skill: &str, min_similarity: f64) -> Option<&'a str> {
        let key = self.aliases.key_for(skill);
        let mut best: Option<(f64, &String, &'a str)> = None;
        for (k, v) in &self.scores {
            let sim = strsim::jaro_winkler(&key, k);
            if sim < min_similarity {
                continue;
            }
            let better = match best {
                None => true,
                Some((bs, bk, _)) => sim > bs || (sim == bs && k < bk),
            };
            if better {
                best = Some((sim, k, v.display));
            }
        }
        best.map(|(_, _, display)| display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_lowercases_and_collapses() {
        assert_eq!(normalize_skill("  Node   JS "), "node js");
        assert_eq!(normalize_skill("REST\tAPIs"), "rest apis");
        assert_eq!(normalize_skill("   "), "");
    }

    #[test]
    fn index_is_case_insensitive_and_last_wins() {
        let aliases = SkillAliases::default();
        let scores = vec![
            SkillScore::new("Python", 40.0),
            SkillScore::new("python ", 75.0),
            SkillScore::new("React", 90.0),
        ];
        let idx = SkillIndex::build(&scores, &aliases);
        assert_eq!(idx.score_of("PYTHON"), Some(75.0));
        assert_eq!(idx.score_of("react"), Some(90.0));
        assert_eq!(idx.score_of("Go"), None);
    }

    #[test]
    fn aliases_resolve_both_sides() {
        let aliases = SkillAliases::from_pairs([("NodeJS", "Node.js"), ("k8s", "Kubernetes")]);
        let scores = vec![SkillScore::new("node.js", 66.0), SkillScore::new("K8s", 50.0)];
        let idx = SkillIndex::build(&scores, &aliases);
        assert_eq!(idx.score_of("nodejs"), Some(66.0));
        assert_eq!(idx.score_of("Kubernetes"), Some(50.0));
    }

    #[test]
    fn closest_suggests_near_spelling_only() {
        let aliases = SkillAliases::default();
        let scores = vec![SkillScore::new("Node.js", 66.0), SkillScore::new("SQL", 70.0)];
        let idx = SkillIndex::build(&scores, &aliases);
        assert_eq!(idx.closest("NodeJS", 0.85), Some("Node.js"));
        assert_eq!(idx.closest("Kubernetes", 0.85), None);
    }
}
