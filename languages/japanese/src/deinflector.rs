use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use bitflags::bitflags;
use hoshi_core::dictionary::DeinflectionTag;
use hoshi_core::language::{Deinflection, Deinflector};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_MAX_DEPTH: usize = 10;

static DEFAULT_RULES: LazyLock<Arc<RuleTable>> = LazyLock::new(|| {
    let table = RuleTable::from_json(include_str!("../data/deinflect.json"));
    tracing::debug!("Loaded {} deinflection rules", table.len());
    Arc::new(table)
});

bitflags! {
    /// Grammatical classes a base form can carry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WordClass: u16 {
        /// Ichidan verb
        const V1 = 1 << 0;
        /// Godan verb
        const V5 = 1 << 1;
        /// Suru verb
        const VS = 1 << 2;
        /// Kuru verb
        const VK = 1 << 3;
        /// Zuru verb
        const VZ = 1 << 4;
        const ADJ_I = 1 << 5;
        /// Intermediate te-form awaiting the -te rule
        const IRU = 1 << 6;
    }
}

impl WordClass {
    /// Class named in the rule table
    pub fn from_rule_name(name: &str) -> Option<Self> {
        match name {
            "v1" => Some(Self::V1),
            "v5" => Some(Self::V5),
            "vs" => Some(Self::VS),
            "vk" => Some(Self::VK),
            "vz" => Some(Self::VZ),
            "adj-i" => Some(Self::ADJ_I),
            "iru" => Some(Self::IRU),
            _ => None,
        }
    }

    /// Classes of a dictionary term from its rule tags. Subtypes such as
    /// `v5k` or `vs-i` count as their family.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        tags.iter()
            .map(|tag| match tag.as_ref() {
                "adj-i" => Self::ADJ_I,
                t if t.starts_with("v1") => Self::V1,
                t if t.starts_with("v5") => Self::V5,
                t if t.starts_with("vs") => Self::VS,
                t if t.starts_with("vk") => Self::VK,
                t if t.starts_with("vz") => Self::VZ,
                _ => Self::empty(),
            })
            .fold(Self::empty(), |acc, class| acc | class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeinflectionRule {
    pub name: String,
    pub kana_in: String,
    pub kana_out: String,
    pub rules_in: WordClass,
    pub rules_out: WordClass,
}

#[derive(Deserialize)]
struct RawGroup {
    name: String,
    #[serde(default)]
    description: String,
    rules: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    kana_in: String,
    kana_out: String,
    #[serde(default)]
    rules_in: Vec<String>,
    #[serde(default)]
    rules_out: Vec<String>,
}

fn parse_classes(names: &[String]) -> Option<WordClass> {
    names
        .iter()
        .try_fold(WordClass::empty(), |acc, name| Some(acc | WordClass::from_rule_name(name)?))
}

/// Suffix rules with their group descriptions
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<DeinflectionRule>,
    descriptions: HashMap<String, String>,
}

impl RuleTable {
    /// Parses `[{name, description, rules: [...]}]`. Malformed groups and
    /// rules are skipped.
    pub fn from_json(json: &str) -> Self {
        let groups: Vec<Value> = match serde_json::from_str(json) {
            Ok(groups) => groups,
            Err(e) => {
                tracing::warn!("Deinflection table is not a list of groups: {}", e);
                return Self::default();
            }
        };

        let mut table = Self::default();
        for (i, group) in groups.into_iter().enumerate() {
            let group: RawGroup = match serde_json::from_value(group) {
                Ok(group) => group,
                Err(e) => {
                    tracing::warn!("Skipping deinflection group {}: {}", i, e);
                    continue;
                }
            };

            for rule in group.rules {
                match Self::parse_rule(&group.name, rule) {
                    Ok(rule) => table.rules.push(rule),
                    Err(reason) => {
                        tracing::warn!("Skipping rule in group {:?}: {}", group.name, reason)
                    }
                }
            }
            table
                .descriptions
                .entry(group.name)
                .or_insert(group.description);
        }
        table
    }

    fn parse_rule(name: &str, rule: Value) -> Result<DeinflectionRule, String> {
        let raw: RawRule = serde_json::from_value(rule).map_err(|e| e.to_string())?;
        if raw.kana_in.is_empty() {
            return Err("empty kanaIn".to_string());
        }
        let rules_in = parse_classes(&raw.rules_in)
            .ok_or_else(|| format!("unknown word class in {:?}", raw.rules_in))?;
        let rules_out = parse_classes(&raw.rules_out)
            .ok_or_else(|| format!("unknown word class in {:?}", raw.rules_out))?;

        Ok(DeinflectionRule {
            name: name.to_string(),
            kana_in: raw.kana_in,
            kana_out: raw.kana_out,
            rules_in,
            rules_out,
        })
    }

    pub fn rules(&self) -> &[DeinflectionRule] {
        &self.rules
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.descriptions.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

pub type DeinflectionCandidate = Deinflection<WordClass>;

/// Suffix-rewriting deinflector driven by a rule table
#[derive(Debug, Clone)]
pub struct JapaneseDeinflector {
    table: Arc<RuleTable>,
    max_depth: usize,
}

impl JapaneseDeinflector {
    /// Deinflector over the built-in rule table
    pub fn new(max_depth: usize) -> Self {
        Self::with_table(Arc::clone(&DEFAULT_RULES), max_depth)
    }

    pub fn with_table(table: Arc<RuleTable>, max_depth: usize) -> Self {
        Self { table, max_depth }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn applies(rule: &DeinflectionRule, candidate: &DeinflectionCandidate) -> bool {
        candidate.conditions.is_empty() || candidate.conditions.intersects(rule.rules_in)
    }
}

impl Default for JapaneseDeinflector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Deinflector for JapaneseDeinflector {
    type Conditions = WordClass;

    fn deinflect(&self, word: &str) -> Vec<DeinflectionCandidate> {
        let identity = DeinflectionCandidate {
            base_form: word.to_string(),
            trace: Vec::new(),
            conditions: WordClass::empty(),
        };

        let mut results = vec![identity.clone()];
        let mut positions: HashMap<String, usize> = HashMap::from([(word.to_string(), 0)]);
        let mut visited: HashSet<(String, WordClass)> =
            HashSet::from([(word.to_string(), WordClass::empty())]);
        let mut frontier = vec![identity];

        for _ in 0..self.max_depth {
            let mut next = Vec::new();

            for candidate in &frontier {
                for rule in self.table.rules() {
                    if !Self::applies(rule, candidate) {
                        continue;
                    }
                    let Some(stem) = candidate.base_form.strip_suffix(rule.kana_in.as_str()) else {
                        continue;
                    };
                    let base_form = format!("{stem}{}", rule.kana_out);
                    if base_form.is_empty() {
                        continue;
                    }
                    if !visited.insert((base_form.clone(), rule.rules_out)) {
                        continue;
                    }

                    let mut trace = candidate.trace.clone();
                    trace.push(rule.name.clone());
                    let derived = DeinflectionCandidate {
                        base_form,
                        trace,
                        conditions: rule.rules_out,
                    };

                    match positions.get(&derived.base_form) {
                        None => {
                            positions.insert(derived.base_form.clone(), results.len());
                            results.push(derived.clone());
                        }
                        Some(&at) => {
                            let existing = &mut results[at];
                            if !existing.is_identity() && existing.trace.len() == derived.trace.len()
                            {
                                existing.conditions |= derived.conditions;
                            }
                        }
                    }
                    next.push(derived);
                }
            }

            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        results
    }

    fn describe(&self, rule: &str) -> DeinflectionTag {
        DeinflectionTag {
            name: rule.to_string(),
            description: self.table.description(rule).unwrap_or_default().to_string(),
        }
    }
}
